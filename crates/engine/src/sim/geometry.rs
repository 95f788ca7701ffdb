use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("degenerate rectangle: min ({min_x}, {min_y}) exceeds max ({max_x}, {max_y})")]
pub struct GeometryError {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

/// Raw `{min_x, min_y, max_x, max_y}` bounds as handed over by a loader.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

/// Axis-aligned box, y pointing up. `min <= max` holds for every value built
/// through [`Rect::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Result<Self, GeometryError> {
        // NaN corners fail both comparisons, so they are rejected too.
        if !(min.x <= max.x && min.y <= max.y) {
            return Err(GeometryError {
                min_x: min.x,
                min_y: min.y,
                max_x: max.x,
                max_y: max.y,
            });
        }
        Ok(Self { min, max })
    }

    pub fn from_bounds(bounds: RectBounds) -> Result<Self, GeometryError> {
        Self::new(
            Vec2::new(bounds.min_x, bounds.min_y),
            Vec2::new(bounds.max_x, bounds.max_y),
        )
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: (self.min.x + self.max.x) * 0.5,
            y: (self.min.y + self.max.y) * 0.5,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.min.y
    }

    pub fn top(&self) -> f32 {
        self.max.y
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: Vec2::new(self.min.x + delta.x, self.min.y + delta.y),
            max: Vec2::new(self.max.x + delta.x, self.max.y + delta.y),
        }
    }

    /// Moves the box vertically so its bottom edge sits exactly at `y`.
    pub fn with_bottom_at(&self, y: f32) -> Self {
        let height = self.height();
        Self {
            min: Vec2::new(self.min.x, y),
            max: Vec2::new(self.max.x, y + height),
        }
    }

    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x
    }
}
