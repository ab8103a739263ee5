//! Fundamental geometric types for rig modelling.
//!
//! Positions use diagram coordinates: `x` grows to the right and `y` grows
//! downward, so gravity acts along `+y`.

use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Planar vector used for node positions, directions and forces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component, positive to the right.
    pub x: f64,
    /// Vertical component, positive downward.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unit vector pointing in the direction gravity pulls.
    pub const DOWN: Self = Self::new(0.0, 1.0);

    /// Create a [`Vec2`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise difference.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Multiply both components by `k`.
    #[must_use]
    pub fn scale(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Return the unit vector pointing the same way.
    ///
    /// A vector shorter than `f64::EPSILON` has no meaningful direction and
    /// normalises to [`Vec2::ZERO`].
    ///
    /// # Examples
    /// ```
    /// use rigx::{vec2, Vec2};
    ///
    /// assert_eq!(vec2(3.0, 4.0).normalize(), vec2(0.6, 0.8));
    /// assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    /// ```
    #[must_use]
    pub fn normalize(self) -> Self {
        let length = self.length();
        if length < f64::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / length, self.y / length)
        }
    }

    /// Unit direction from `self` toward `target`, zero when they coincide.
    #[must_use]
    pub fn direction_to(self, target: Self) -> Self {
        target.sub(self).normalize()
    }

    /// Convert into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vec2::add(self, rhs)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vec2::sub(self, rhs)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl From<Vector2<f64>> for Vec2 {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Vec2> for Vector2<f64> {
    fn from(value: Vec2) -> Self {
        value.to_vector()
    }
}

/// Convenience helper for creating [`Vec2`] instances.
///
/// # Examples
/// ```
/// use rigx::vec2;
///
/// let anchor = vec2(0.0, -5.0);
/// assert_eq!(anchor.y, -5.0);
/// ```
#[must_use]
pub const fn vec2(x: f64, y: f64) -> Vec2 {
    Vec2::new(x, y)
}
