//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use crate::math::{Point2d, Vector2d};
use cgmath::num_traits::Float;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if the interiors of the two intervals overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max > other.min && other.max > self.min
    }

    /// Returns true if the closed intervals share at least one point.
    pub fn touches(&self, other: &Self) -> bool {
        self.max >= other.min && other.max >= self.min
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> std::ops::Add<T> for Interval<T> {
    type Output = Interval<T>;

    fn add(self, rhs: T) -> Self::Output {
        Self {
            min: self.min + rhs,
            max: self.max + rhs,
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// An axis-aligned rectangle in screen space (y grows downwards).
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct Rect {
    /// The horizontal extents in px.
    pub x: Interval<f64>,
    /// The vertical extents in px.
    pub y: Interval<f64>,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(top_left: Point2d, width: f64, height: f64) -> Self {
        Self {
            x: Interval::new(top_left.x, top_left.x + width),
            y: Interval::new(top_left.y, top_left.y + height),
        }
    }

    /// The top-left corner.
    pub fn top_left(&self) -> Point2d {
        Point2d::new(self.x.min, self.y.min)
    }

    pub fn width(&self) -> f64 {
        self.x.length()
    }

    pub fn height(&self) -> f64 {
        self.y.length()
    }

    /// Returns the rectangle moved by `delta`.
    pub fn translate(&self, delta: Vector2d) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }

    /// Returns true if the two rectangles intersect, counting shared edges.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x.touches(&other.x) && self.y.touches(&other.y)
    }

    /// Returns true if the interiors of the two rectangles overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x.overlaps(&other.x) && self.y.overlaps(&other.y)
    }
}

/// Rounds a value to the given number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
