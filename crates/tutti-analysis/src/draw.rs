//! Raster targets for waveform drawing.

/// Anything a waveform can be drawn onto, one vertical stroke at a time.
pub trait WaveformCanvas {
    /// Stroke column `x` from `y_top` to `y_bottom`, both inclusive.
    fn vertical_line(&mut self, x: i32, y_top: i32, y_bottom: i32);
}

/// Pixel rectangle, origin at the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Copy of this rect limited to columns `[x0, x1)`.
    pub fn with_columns(&self, x0: i32, x1: i32) -> PixelRect {
        let x0 = x0.max(self.x);
        let x1 = x1.min(self.right()).max(x0);
        PixelRect::new(x0, self.y, x1 - x0, self.height)
    }
}

/// In-memory coverage mask. Strokes outside the raster are clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: i32,
    height: i32,
    pixels: Vec<bool>,
}

impl Raster {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            pixels: vec![false; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Topmost and bottommost set rows of column `x`.
    pub fn column_extent(&self, x: i32) -> Option<(i32, i32)> {
        let mut rows = (0..self.height).filter(|&y| self.is_set(x, y));
        let top = rows.next()?;
        let bottom = rows.last().unwrap_or(top);
        Some((top, bottom))
    }

    pub fn filled_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p).count()
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }
}

impl WaveformCanvas for Raster {
    fn vertical_line(&mut self, x: i32, y_top: i32, y_bottom: i32) {
        if x < 0 || x >= self.width {
            return;
        }
        let (top, bottom) = if y_top <= y_bottom {
            (y_top, y_bottom)
        } else {
            (y_bottom, y_top)
        };
        for y in top.max(0)..=bottom.min(self.height - 1) {
            let i = (y * self.width + x) as usize;
            self.pixels[i] = true;
        }
    }
}
