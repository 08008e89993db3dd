// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry helpers shared by the scene model and the interaction engine.
//!
//! Everything here is a pure function over plain values: pixel/time
//! mapping, rotation-aware point math, aspect-locked resize math and
//! axis-aligned rectangle intersection.

use serde::{Deserialize, Serialize};

/// A 2D point or delta in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise addition
    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise subtraction
    pub fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }

    /// Scale both components
    pub fn scale(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

/// An axis-aligned rectangle (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from two arbitrary corners
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Axis-aligned intersection test (touching edges count as overlap)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Whether a point lies inside the rectangle
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Rotate a point about a center by an angle in degrees.
pub fn rotate_point(point: Vec2, center: Vec2, degrees: f64) -> Vec2 {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Vec2::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Axis-aligned bounding box of a rectangle rotated about its center.
pub fn rotated_aabb(rect: Rect, degrees: f64) -> Rect {
    if degrees == 0.0 {
        return rect;
    }
    let center = rect.center();
    let corners = [
        Vec2::new(rect.x, rect.y),
        Vec2::new(rect.right(), rect.y),
        Vec2::new(rect.right(), rect.bottom()),
        Vec2::new(rect.x, rect.bottom()),
    ];
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for corner in corners {
        let p = rotate_point(corner, center, degrees);
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Angle in degrees of a pointer position relative to a center, or
/// `None` when the vector is degenerate (pointer exactly at center).
pub fn pointer_angle(pointer: Vec2, center: Vec2) -> Option<f64> {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(dy.atan2(dx).to_degrees())
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Map a time to a horizontal pixel position given a ruler width.
pub fn time_to_x(time: f64, duration: f64, ruler_width: f64) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    (time / duration) * ruler_width
}

/// Map a horizontal pixel position back to a time, clamped to
/// `[0, duration]`.
pub fn x_to_time(x: f64, duration: f64, ruler_width: f64) -> f64 {
    if ruler_width <= 0.0 {
        return 0.0;
    }
    ((x / ruler_width) * duration).clamp(0.0, duration)
}

/// Fit dimensions into a bounding box, preserving the aspect ratio.
/// Dimensions already inside the bounds are returned unchanged.
pub fn fit_within(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    let mut w = width;
    let mut h = height;
    if w > max_width {
        let ratio = max_width / w;
        w = max_width;
        h *= ratio;
    }
    if h > max_height {
        let ratio = max_height / h;
        h = max_height;
        w *= ratio;
    }
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(Vec2::new(1.0, 0.0), Vec2::default(), 90.0);
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_aabb_grows() {
        let rect = Rect::new(0.0, 0.0, 10.0, 4.0);
        let aabb = rotated_aabb(rect, 45.0);
        assert!(aabb.width > rect.width);
        assert!(aabb.height > rect.height);
        // Center is preserved
        let c = aabb.center();
        assert!((c.x - 5.0).abs() < 1e-9);
        assert!((c.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
    }

    #[test]
    fn test_pointer_angle_degenerate() {
        assert!(pointer_angle(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0)).is_none());
        let angle = pointer_angle(Vec2::new(4.0, 3.0), Vec2::new(3.0, 3.0)).unwrap();
        assert!((angle - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_pixel_round_trip() {
        let x = time_to_x(15.0, 60.0, 800.0);
        assert_eq!(x, 200.0);
        assert_eq!(x_to_time(x, 60.0, 800.0), 15.0);
        // Clamped outside the ruler
        assert_eq!(x_to_time(-20.0, 60.0, 800.0), 0.0);
        assert_eq!(x_to_time(900.0, 60.0, 800.0), 60.0);
    }

    #[test]
    fn test_fit_within() {
        let (w, h) = fit_within(1280.0, 960.0, 640.0, 480.0);
        assert_eq!(w, 640.0);
        assert_eq!(h, 480.0);
        let (w, h) = fit_within(320.0, 200.0, 640.0, 480.0);
        assert_eq!((w, h), (320.0, 200.0));
    }
}
