//! Control point types.

use serde::{Deserialize, Serialize};

/// Values that can be blended linearly.
pub trait Lerp: Copy + Default {
    /// `self + (other - self) * t`.
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for [f32; 3] {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        [
            self[0].lerp(other[0], t),
            self[1].lerp(other[1], t),
            self[2].lerp(other[2], t),
        ]
    }
}

/// A point on a 1D curve over `x in [0, 1]`.
pub trait ControlPoint {
    /// Value carried by the point.
    type Value: Lerp;

    /// Position along the normalized domain.
    fn x(&self) -> f32;

    /// Value at `x`.
    fn value(&self) -> Self::Value;

    /// Moves the point.
    fn set_x(&mut self, x: f32);
}

/// RGB control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorPoint {
    /// Position in `[0, 1]`
    pub x: f32,
    /// Linear RGB in `[0, 1]`
    pub rgb: [f32; 3],
}

impl ColorPoint {
    /// Creates a color point.
    pub const fn new(x: f32, r: f32, g: f32, b: f32) -> Self {
        Self { x, rgb: [r, g, b] }
    }
}

impl ControlPoint for ColorPoint {
    type Value = [f32; 3];

    fn x(&self) -> f32 {
        self.x
    }

    fn value(&self) -> [f32; 3] {
        self.rgb
    }

    fn set_x(&mut self, x: f32) {
        self.x = x;
    }
}

/// Opacity control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpacityPoint {
    /// Position in `[0, 1]`
    pub x: f32,
    /// Opacity in `[0, 1]`
    pub opacity: f32,
}

impl OpacityPoint {
    /// Creates an opacity point.
    pub const fn new(x: f32, opacity: f32) -> Self {
        Self { x, opacity }
    }
}

impl ControlPoint for OpacityPoint {
    type Value = f32;

    fn x(&self) -> f32 {
        self.x
    }

    fn value(&self) -> f32 {
        self.opacity
    }

    fn set_x(&mut self, x: f32) {
        self.x = x;
    }
}
