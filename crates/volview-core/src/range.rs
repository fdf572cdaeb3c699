//! Scalar value range.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` of scalar values.
///
/// Used both as a field's data range and as the domain a transfer function
/// or isovalue set maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl ValueRange {
    /// Creates a range from its bounds.
    #[inline]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// The unit interval `[0, 1]`.
    #[inline]
    pub const fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Inverted range used as a fold seed: extending it with any value
    /// yields `[v, v]`.
    #[inline]
    pub const fn empty() -> Self {
        Self::new(f32::MAX, -f32::MAX)
    }

    /// Computes the range of a sequence of values.
    ///
    /// Returns [`ValueRange::empty`] for an empty sequence.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<f32>,
    {
        let mut range = Self::empty();
        for v in values {
            range.extend(v.into());
        }
        range
    }

    /// Grows the range to include `value`.
    #[inline]
    pub fn extend(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Smallest range containing both.
    pub fn union(&self, other: &ValueRange) -> ValueRange {
        ValueRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// `max - min`.
    #[inline]
    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    /// True if no value has been folded into an [`empty`](Self::empty) range.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Finite bounds with `min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Like [`is_valid`](Self::is_valid) but reports the offending bounds.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidRange {
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Maps `t` in `[0, 1]` onto the range: `min + t * (max - min)`.
    #[inline]
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + t * (self.max - self.min)
    }

    /// Maps a data value back to `[0, 1]`. A zero-width range maps to 0.
    pub fn normalize(&self, value: f32) -> f32 {
        let w = self.width();
        if w == 0.0 { 0.0 } else { (value - self.min) / w }
    }

    /// Clamps `value` into the range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    /// Bounds as `[min, max]`.
    #[inline]
    pub fn to_array(&self) -> [f32; 2] {
        [self.min, self.max]
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::unit()
    }
}

impl From<[f32; 2]> for ValueRange {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}
