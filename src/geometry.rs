//! Fundamental geometric types for planar truss modelling.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Position of a joint in the plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point> for Vector2<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// Cartesian vector representing a planar force.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Force {
    /// Force component acting along the global X axis.
    pub x: f64,
    /// Force component acting along the global Y axis.
    pub y: f64,
}

impl Force {
    /// Create a [`Force`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the force into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean magnitude of the force.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.to_vector().norm()
    }
}

impl Default for Force {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<Vector2<f64>> for Force {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Force> for Vector2<f64> {
    fn from(value: Force) -> Self {
        value.to_vector()
    }
}

/// Direction in the plane, used for roller restraints.
///
/// The direction does not need to be normalised; only its orientation matters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// Component along the global X axis.
    pub x: f64,
    /// Component along the global Y axis.
    pub y: f64,
}

impl Direction {
    /// Create a [`Direction`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit direction along the global X axis.
    #[must_use]
    pub const fn x_axis() -> Self {
        Self::new(1.0, 0.0)
    }

    /// Unit direction along the global Y axis.
    #[must_use]
    pub const fn y_axis() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Return the normalised direction, or `None` when it has no usable orientation.
    ///
    /// # Examples
    /// ```
    /// use truss_statics::Direction;
    ///
    /// let unit = Direction::new(3.0, 4.0).unit().expect("non-zero direction");
    /// assert!((unit.y - 0.8).abs() < 1.0e-12);
    /// assert!(Direction::new(0.0, 0.0).unit().is_none());
    /// ```
    #[must_use]
    pub fn unit(self) -> Option<Vector2<f64>> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return None;
        }
        let vector = Vector2::new(self.x, self.y);
        // Rescale first so squaring neither overflows nor underflows.
        let largest = vector.amax();
        if largest == 0.0 {
            return None;
        }
        let scaled = vector / largest;
        Some(scaled / scaled.norm())
    }
}

/// Vector from `from` to `to` together with its length.
pub(crate) fn span(from: Point, to: Point) -> (Vector2<f64>, f64) {
    let delta = to.to_vector() - from.to_vector();
    let length = delta.norm();
    (delta, length)
}

/// Orientation of `delta` in degrees, counter-clockwise from +X, within `[0, 360)`.
pub(crate) fn angle_degrees(delta: Vector2<f64>) -> f64 {
    let degrees = delta.y.atan2(delta.x).to_degrees();
    if degrees < 0.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use truss_statics::point;
///
/// let origin = point(0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Convenience helper for creating [`Force`] instances.
///
/// # Examples
/// ```
/// use truss_statics::force;
///
/// let load = force(0.0, -20.0);
/// assert_eq!(load.y, -20.0);
/// ```
#[must_use]
pub const fn force(x: f64, y: f64) -> Force {
    Force::new(x, y)
}
