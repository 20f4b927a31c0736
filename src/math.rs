//! Mathematical types.

use cgmath::{Point2, Vector2};

/// A 2D point in px.
pub type Point2d = Point2<f64>;

/// A 2D vector in px.
pub type Vector2d = Vector2<f64>;
