use serde::{Deserialize, Serialize};

/// Window size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub cols: u32,
    pub rows: u32,
}

impl Window {
    /// Size used when not fullscreen.
    pub const WINDOWED_DEFAULT: Window = Window {
        cols: 640,
        rows: 480,
    };

    pub fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::WINDOWED_DEFAULT
    }
}

impl From<(u32, u32)> for Window {
    fn from((cols, rows): (u32, u32)) -> Self {
        Self { cols, rows }
    }
}
