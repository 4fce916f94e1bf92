//! Passthrough integration tests
//!
//! Tests caches borrowing data another cache already computed: chains,
//! the cycle guard, and reads that resolve through the source.

use crate::helpers::*;
use tutti_render_cache::cache::Error as CacheError;
use tutti_render_cache::prelude::*;
use tutti_render_cache::Error;

#[test]
fn test_chain_is_flattened() {
    let (_dir, system) = test_system();
    let a = system.create_waveform_cache(1);
    let b = system.create_waveform_cache(1);
    let c = system.create_waveform_cache(1);
    let (a_id, b_id, c_id) = (a.lock().id(), b.lock().id(), c.lock().id());

    a.lock().validate(&r(0, 5), false);
    system.set_passthrough(b_id, a_id).unwrap();
    b.lock().validate(&r(5, 10), false);
    system.set_passthrough(c_id, b_id).unwrap();

    let c = c.lock();
    assert_eq!(c.passthrough_at(t(2, 1)).map(|p| p.source), Some(a_id));
    assert_eq!(c.passthrough_at(t(7, 1)).map(|p| p.source), Some(b_id));
    assert!(c.passthrough_at(t(12, 1)).is_none());
}

#[test]
fn test_cycle_is_rejected_or_dropped() {
    let (_dir, system) = test_system();
    let a = system.create_waveform_cache(1);
    let b = system.create_waveform_cache(1);
    let (a_id, b_id) = (a.lock().id(), b.lock().id());

    assert!(matches!(
        system.set_passthrough(a_id, a_id),
        Err(Error::Cache(CacheError::PassthroughCycle(_)))
    ));

    a.lock().validate(&r(0, 5), false);
    system.set_passthrough(b_id, a_id).unwrap();
    b.lock().validate(&r(5, 10), false);
    system.set_passthrough(a_id, b_id).unwrap();

    let a = a.lock();
    assert!(a.passthroughs().iter().all(|p| p.source != a_id));
    assert_eq!(a.passthrough_at(t(7, 1)).map(|p| p.source), Some(b_id));
}

#[test]
fn test_params_and_saving_flag_follow_source() {
    let (_dir, system) = test_system();
    let source = system
        .create_audio_cache(AudioParams::new(TEST_SAMPLE_RATE, 1, SampleFormat::S16))
        .unwrap();
    let target = system.create_audio_cache(stereo_f32()).unwrap();
    source.lock().set_saving_enabled(false);

    let (source_id, target_id) = (source.lock().id(), target.lock().id());
    system.set_passthrough(target_id, source_id).unwrap();

    let target = target.lock();
    assert_eq!(target.audio_params().unwrap(), source.lock().audio_params().unwrap());
    assert!(!target.saving_enabled());
}

#[test]
fn test_mismatched_kinds() {
    let (_dir, system) = test_system();
    let audio = system.create_audio_cache(stereo_f32()).unwrap().lock().id();
    let frames = system.create_frame_cache(t(1, 25)).unwrap().lock().id();
    assert!(matches!(
        system.set_passthrough(audio, frames),
        Err(Error::Cache(CacheError::PayloadMismatch { .. }))
    ));
}

#[test]
fn test_audio_reads_through_source() {
    let (_dir, system) = test_system();
    let source = system.create_audio_cache(stereo_f32()).unwrap();
    let target = system.create_audio_cache(stereo_f32()).unwrap();

    let samples = sine_buffer(2.0, 2, 500);
    let range = TimeRange::new(0, t(1, 2));
    source
        .lock()
        .write_pcm(&range, &TimeRangeList::from(range), Some(&samples))
        .unwrap();

    let (source_id, target_id) = (source.lock().id(), target.lock().id());
    system.set_passthrough(target_id, source_id).unwrap();

    let back = target.lock().read_pcm(&r(0, 1)).unwrap();
    assert_eq!(&back.channel(0)[..500], samples.channel(0));
    assert_eq!(&back.channel(1)[..500], samples.channel(1));
    assert!(back.channel(0)[500..].iter().all(|&s| s == 0.0));
}

#[test]
fn test_frames_load_through_source() {
    let (_dir, system) = test_system();
    let source = system.create_frame_cache(t(1, 25)).unwrap();
    let target = system.create_frame_cache(t(1, 25)).unwrap();

    {
        let mut source = source.lock();
        source.save_frame(10, b"encoded frame").unwrap();
        source.validate_timestamp(10).unwrap();
    }
    let (source_id, target_id) = (source.lock().id(), target.lock().id());
    system.set_passthrough(target_id, source_id).unwrap();

    let mut target = target.lock();
    assert_eq!(target.load_frame(10).unwrap(), Some(b"encoded frame".to_vec()));
    assert_eq!(target.load_frame(11).unwrap(), None);
    assert!(!target.is_frame_cached(t(10, 25)));
}
