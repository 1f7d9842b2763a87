//! Three-dimensional vector with fluent, in-place composition.
//!
//! Mutating operations (`set`, `add`, `subtract`, `multiply_by_scalar`,
//! `divide_by_scalar`, `rotate`) return `&mut Self` so orbit geometry can be
//! built as a chain:
//!
//! ```
//! use orrery_core::Vector3;
//!
//! let mut p = Vector3::new(1.0, 0.0, 0.0);
//! p.rotate(Vector3::Z, 90.0)?.rotate(Vector3::X, 90.0)?;
//! assert!((p.z - 1.0).abs() < 1e-12);
//! # Ok::<(), orrery_core::VectorError>(())
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Precondition violations raised by vector operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum VectorError {
    #[error("division by a zero scalar")]
    ZeroDivisor,
    #[error("rotation axis has zero length")]
    ZeroAxis,
}

/// Cartesian triple in AU or AU/yr depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);
    pub const X: Vector3 = Vector3::new(1.0, 0.0, 0.0);
    pub const Y: Vector3 = Vector3::new(0.0, 1.0, 0.0);
    pub const Z: Vector3 = Vector3::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Overwrite every component with those of `other`.
    pub fn set(&mut self, other: Vector3) -> &mut Self {
        *self = other;
        self
    }

    pub fn add(&mut self, other: Vector3) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
        self
    }

    pub fn subtract(&mut self, other: Vector3) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
        self
    }

    pub fn multiply_by_scalar(&mut self, s: f64) -> &mut Self {
        self.x *= s;
        self.y *= s;
        self.z *= s;
        self
    }

    /// Divide in place. A zero divisor is rejected instead of producing NaN.
    pub fn divide_by_scalar(&mut self, s: f64) -> Result<&mut Self, VectorError> {
        if s == 0.0 {
            return Err(VectorError::ZeroDivisor);
        }
        self.x /= s;
        self.y /= s;
        self.z /= s;
        Ok(self)
    }

    /// Axis-angle rotation with the angle in degrees.
    pub fn rotate(&mut self, axis: Vector3, degrees: f64) -> Result<&mut Self, VectorError> {
        self.rotate_radians(axis, degrees.to_radians())
    }

    /// Rodrigues rotation about `axis` (normalised internally) by `radians`.
    pub fn rotate_radians(&mut self, axis: Vector3, radians: f64) -> Result<&mut Self, VectorError> {
        let k = axis.normalized()?;
        let (sin, cos) = radians.sin_cos();
        let k_cross_v = k.cross(*self);
        let k_dot_v = k.dot(*self);

        let rotated = Vector3::new(
            self.x * cos + k_cross_v.x * sin + k.x * k_dot_v * (1.0 - cos),
            self.y * cos + k_cross_v.y * sin + k.y * k_dot_v * (1.0 - cos),
            self.z * cos + k_cross_v.z * sin + k.z * k_dot_v * (1.0 - cos),
        );
        Ok(self.set(rotated))
    }

    #[inline]
    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Value-returning sum, for expressions where the fluent form reads poorly.
    #[inline]
    pub fn plus(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn minus(self, other: Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[inline]
    pub fn scaled(self, s: f64) -> Vector3 {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }

    #[inline]
    pub fn distance_to(self, other: Vector3) -> f64 {
        self.minus(other).norm()
    }

    pub fn normalized(self) -> Result<Vector3, VectorError> {
        let n = self.norm();
        if n == 0.0 {
            return Err(VectorError::ZeroAxis);
        }
        Ok(self.scaled(1.0 / n))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}
