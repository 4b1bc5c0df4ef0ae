//! Math type re-exports and engine-specific math utilities.
//!
//! This module re-exports types from `glam` and provides the bounding-box
//! and time-range types used throughout the engine.

// Re-export glam types
pub use glam::{DMat4, DVec3, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Chrono type - time value (milliseconds).
pub type Chrono = f64;

/// 3D bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3f {
    pub min: Vec3,
    pub max: Vec3,
}

impl BBox3f {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from a single point.
    #[inline]
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Create a bounding box enclosing a set of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut b = Self::EMPTY;
        for &p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Transform all eight corners and return the enclosing box.
    ///
    /// An empty box stays empty.
    pub fn transformed(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut out = Self::EMPTY;
        for corner in corners {
            out.expand_by_point(m.transform_point3(corner));
        }
        out
    }
}

impl Default for BBox3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3f({:?} - {:?})", self.min, self.max)
    }
}

/// Closed time interval in milliseconds.
///
/// Follows the same inverted-empty idiom as [`BBox3f`]: the empty range has
/// `min > max` and expands on first use.
#[derive(Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub min: Chrono,
    pub max: Chrono,
}

impl TimeRange {
    /// Empty range (inverted, will expand on first time).
    pub const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// Create a new range from min and max times.
    #[inline]
    pub const fn new(min: Chrono, max: Chrono) -> Self {
        Self { min, max }
    }

    /// Check if this range is empty (never expanded).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Expand this range to include a time.
    #[inline]
    pub fn expand_by_time(&mut self, t: Chrono) {
        self.min = self.min.min(t);
        self.max = self.max.max(t);
    }

    /// Expand this range to include another range.
    #[inline]
    pub fn expand_by_range(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Check if a time falls inside the range (inclusive on both ends).
    #[inline]
    pub fn contains(&self, t: Chrono) -> bool {
        !self.is_empty() && t >= self.min && t <= self.max
    }

    /// Duration covered by the range, zero when empty.
    #[inline]
    pub fn span(&self) -> Chrono {
        if self.is_empty() {
            0.0
        } else {
            self.max - self.min
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeRange({} - {})", self.min, self.max)
    }
}
