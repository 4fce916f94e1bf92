//! Persistence integration tests
//!
//! Tests saving every cache in a session and picking the state back up in a
//! new session pointed at the same cache root.

use crate::helpers::*;
use tutti_render_cache::prelude::*;
use tutti_render_cache::CacheConfig;

#[test]
fn test_session_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = CacheConfig::with_cache_root(dir.path());

    let (audio_id, waveform_id, frames_id) = {
        let system = CacheSystem::builder().config(config.clone()).build().unwrap();
        let audio = system.create_audio_cache(stereo_f32()).unwrap();
        let waveform = system.create_waveform_cache(2);
        let frames = system.create_frame_cache(Rational::new(1, 30)).unwrap();

        let range = r(0, 1);
        audio
            .lock()
            .write_pcm(&range, &TimeRangeList::from(range), Some(&sine_buffer(2.0, 2, 1000)))
            .unwrap();
        waveform.lock().validate(&r(3, 7), false);
        frames.lock().validate_timestamp(4).unwrap();

        system.save_all().unwrap();
        let ids = (audio.lock().id(), waveform.lock().id(), frames.lock().id());
        ids
    };

    // A new session re-creates caches under the same ids.
    let system = CacheSystem::builder().config(config).build().unwrap();
    let audio = system.create_audio_cache(AudioParams::default()).unwrap();
    let waveform = system.create_waveform_cache(2);
    let frames = system.create_frame_cache(Rational::new(1, 24)).unwrap();
    for (handle, id) in [(&audio, audio_id), (&waveform, waveform_id), (&frames, frames_id)] {
        let old = handle.lock().id();
        system.set_cache_id(old, id).unwrap();
    }

    assert_eq!(system.load_all().unwrap(), 3);
    assert_eq!(system.load_all().unwrap(), 0);

    let audio = audio.lock();
    assert_eq!(audio.audio_params().unwrap(), stereo_f32());
    assert!(!audio.has_invalidated_ranges(&r(0, 1)));
    assert_eq!(audio.read_pcm(&r(0, 1)).unwrap(), sine_buffer(2.0, 2, 1000));

    assert_eq!(waveform.lock().validated_ranges().as_slice(), &[r(3, 7)]);

    let frames = frames.lock();
    assert_eq!(frames.timebase().unwrap(), Rational::new(1, 30));
    assert!(frames.is_frame_cached(Rational::new(4, 30)));
}

#[test]
fn test_saving_disabled_session() {
    let dir = tempfile::tempdir().unwrap();
    let system = CacheSystem::builder()
        .cache_root(dir.path())
        .saving_enabled(false)
        .build()
        .unwrap();

    let cache = system.create_waveform_cache(1);
    cache.lock().validate(&r(0, 1), false);
    system.save_all().unwrap();

    assert!(!cache.lock().state_path().exists());
    assert_eq!(system.load_all().unwrap(), 0);
}

#[test]
fn test_config_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let root = dir.path().join("caches");
    std::fs::write(
        &path,
        format!(
            r#"{{ "cache_root": {:?}, "segment_size_per_channel": 4096 }}"#,
            root.display().to_string()
        ),
    )
    .unwrap();

    let config = CacheConfig::load(&path).unwrap();
    assert_eq!(config.segment_size_per_channel, 4096);
    assert!(config.saving_enabled);

    let system = CacheSystem::builder().config(config).build().unwrap();
    assert!(root.is_dir());
    assert_eq!(system.config().cache_root, root);
}
