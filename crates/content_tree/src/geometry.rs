//! Device-pixel geometry

use serde::{Deserialize, Serialize};

/// A rectangle in device pixels, y growing downwards
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Vertical overlap with the band `[top, bottom)`
    pub fn intersects_band(&self, top: f32, bottom: f32) -> bool {
        self.y < bottom && self.bottom() > top
    }
}
