//! Geometry helpers
//!
//! Angles are in degrees, measured clockwise from 12 o'clock, in screen
//! coordinates (y grows downwards).

use core::ops::{Add, Sub};

/// Point in surface coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point2) -> f32 {
        libm::hypotf(self.x - other.x, self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Round to the nearest integer point of an embedded-graphics surface
    pub fn round(&self) -> embedded_graphics::geometry::Point {
        embedded_graphics::geometry::Point::new(libm::roundf(self.x) as i32, libm::roundf(self.y) as i32)
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Point at `radius` from `center` in direction `degrees`
pub fn polar(center: Point2, radius: f32, degrees: f32) -> Point2 {
    let (sin, cos) = libm::sincosf(degrees.to_radians());
    Point2::new(center.x + radius * sin, center.y - radius * cos)
}

/// Rotate `point` clockwise about `pivot`
pub fn rotate_about(point: Point2, pivot: Point2, degrees: f32) -> Point2 {
    Transform::rotation(degrees, pivot).apply(point)
}

/// 2D affine transform `[a c e; b d f]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transform {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self {
            e: dx,
            f: dy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation about `pivot`
    pub fn rotation(degrees: f32, pivot: Point2) -> Self {
        let (sin, cos) = libm::sincosf(degrees.to_radians());
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: pivot.x - cos * pivot.x + sin * pivot.y,
            f: pivot.y - sin * pivot.x - cos * pivot.y,
        }
    }

    /// `self` applied after `inner`
    pub fn then(&self, inner: &Transform) -> Transform {
        Transform {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn apply(&self, point: Point2) -> Point2 {
        Point2::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    /// Uniform scale factor, used for stroke widths
    pub fn scale(&self) -> f32 {
        libm::sqrtf(libm::fabsf(self.a * self.d - self.b * self.c))
    }
}
