//! Planar joint geometry over landmark positions (image space, y down).

use crate::models::Landmark;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<&Landmark> for Point {
    fn from(landmark: &Landmark) -> Self {
        Self::new(landmark.x, landmark.y)
    }
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Interior angle at `vertex` formed by `a` and `c`, in degrees [0, 180].
/// Degenerate (zero-length) limbs yield `None`.
pub fn joint_angle_deg(a: Point, vertex: Point, c: Point) -> Option<f32> {
    let (ax, ay) = (a.x - vertex.x, a.y - vertex.y);
    let (cx, cy) = (c.x - vertex.x, c.y - vertex.y);
    let len_a = (ax * ax + ay * ay).sqrt();
    let len_c = (cx * cx + cy * cy).sqrt();
    if len_a < f32::EPSILON || len_c < f32::EPSILON {
        return None;
    }
    let cos = ((ax * cx + ay * cy) / (len_a * len_c)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Angle between the segment `bottom → top` and straight up, in degrees.
pub fn lean_from_vertical_deg(top: Point, bottom: Point) -> Option<f32> {
    let up = Point::new(bottom.x, bottom.y - 1.0);
    joint_angle_deg(top, bottom, up)
}

/// Maps a deviation onto [0, 1]: full marks up to `tolerance`, zero at `limit`.
pub fn falloff(deviation: f32, tolerance: f32, limit: f32) -> f64 {
    if deviation <= tolerance {
        return 1.0;
    }
    if deviation >= limit || limit <= tolerance {
        return 0.0;
    }
    f64::from(1.0 - (deviation - tolerance) / (limit - tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_angle() {
        let angle = joint_angle_deg(
            Point::new(0.0, -1.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
        )
        .unwrap();
        assert!((angle - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_straight_limb_is_180() {
        let angle = joint_angle_deg(
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 20.0),
        )
        .unwrap();
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_limb() {
        let p = Point::new(1.0, 1.0);
        assert_eq!(joint_angle_deg(p, p, Point::new(2.0, 2.0)), None);
    }

    #[test]
    fn test_lean_from_vertical() {
        // Image y grows downward: top sits above bottom.
        let upright = lean_from_vertical_deg(Point::new(0.0, 0.0), Point::new(0.0, 100.0)).unwrap();
        assert!(upright.abs() < 1e-3);

        let leaning = lean_from_vertical_deg(Point::new(100.0, 0.0), Point::new(0.0, 100.0)).unwrap();
        assert!((leaning - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_falloff() {
        assert_eq!(falloff(5.0, 10.0, 40.0), 1.0);
        assert!((falloff(25.0, 10.0, 40.0) - 0.5).abs() < 1e-6);
        assert_eq!(falloff(50.0, 10.0, 40.0), 0.0);
    }
}
