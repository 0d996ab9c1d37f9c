use nalgebra::Vector2;

use crate::utils::coordinate::Point2D;

fn ray(from: Point2D, to: Point2D) -> Vector2<f32> {
    Vector2::new(to.x - from.x, to.y - from.y)
}

/// three_point_angle computes the unsigned interior angle at vertex `b`
/// formed by the rays towards `a` and `c`, in degrees within `[0, 180]`.
///
/// The raw difference of the two polar angles can exceed a half turn
/// depending on point ordering, so anything above 180 reflects to
/// `360 - x`. The result is independent of winding direction.
pub fn three_point_angle(a: Point2D, b: Point2D, c: Point2D) -> f32 {
    let to_c = ray(b, c);
    let to_a = ray(b, a);
    let radians = to_c.y.atan2(to_c.x) - to_a.y.atan2(to_a.x);
    let mut angle = radians.to_degrees().abs();
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle
}

/// shoulder_alignment_angle measures torso tilt against the camera's
/// horizontal axis via an auxiliary point at `(left.x, right.y)`.
pub fn shoulder_alignment_angle(left_shoulder: Point2D, right_shoulder: Point2D) -> f32 {
    let auxiliary = Point2D::new(left_shoulder.x, right_shoulder.y);
    three_point_angle(auxiliary, right_shoulder, left_shoulder)
}

pub fn two_point_distance(p: Point2D, q: Point2D) -> f32 {
    ray(p, q).norm()
}

/// stance_width averages the hip-to-knee distances of both legs.
pub fn stance_width(
    left_hip: Point2D,
    right_hip: Point2D,
    left_knee: Point2D,
    right_knee: Point2D,
) -> f32 {
    (two_point_distance(left_hip, left_knee) + two_point_distance(right_hip, right_knee)) / 2.0
}

/// hip_line_angle is the angle at the hip midpoint between both hips.
pub fn hip_line_angle(left_hip: Point2D, right_hip: Point2D) -> f32 {
    let midpoint = Point2D::new(
        (left_hip.x + right_hip.x) / 2.0,
        (left_hip.y + right_hip.y) / 2.0,
    );
    three_point_angle(left_hip, midpoint, right_hip)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_collinear_points_form_straight_angle() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(0.5, 0.5);
        let c = Point2D::new(1.0, 1.0);
        assert!((three_point_angle(a, b, c) - 180.0).abs() < EPS);
    }

    #[test]
    fn test_perpendicular_points_form_right_angle() {
        let a = Point2D::new(1.0, 0.0);
        let b = Point2D::new(0.0, 0.0);
        let c = Point2D::new(0.0, 1.0);
        assert!((three_point_angle(a, b, c) - 90.0).abs() < EPS);
    }

    #[test]
    fn test_angle_is_winding_independent() {
        let a = Point2D::new(0.9, 0.1);
        let b = Point2D::new(0.4, 0.6);
        let c = Point2D::new(0.1, 0.2);
        let forward = three_point_angle(a, b, c);
        let backward = three_point_angle(c, b, a);
        assert!((forward - backward).abs() < EPS);
        assert!((0.0..=180.0).contains(&forward));
    }

    #[test]
    fn test_shoulder_alignment_level_shoulders() {
        let left = Point2D::new(0.3, 0.5);
        let right = Point2D::new(0.7, 0.5);
        assert!(shoulder_alignment_angle(left, right).abs() < EPS);
    }

    #[test]
    fn test_shoulder_alignment_45_degree_tilt() {
        let left = Point2D::new(0.0, 1.0);
        let right = Point2D::new(1.0, 0.0);
        assert!((shoulder_alignment_angle(left, right) - 45.0).abs() < EPS);
    }

    #[test]
    fn test_two_point_distance() {
        let p = Point2D::new(0.0, 0.0);
        let q = Point2D::new(0.3, 0.4);
        assert!((two_point_distance(p, q) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_stance_width_averages_both_legs() {
        let lh = Point2D::new(0.4, 0.5);
        let rh = Point2D::new(0.6, 0.5);
        let lk = Point2D::new(0.4, 0.7);
        let rk = Point2D::new(0.6, 0.9);
        assert!((stance_width(lh, rh, lk, rk) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_hip_line_angle_is_straight() {
        let lh = Point2D::new(0.35, 0.52);
        let rh = Point2D::new(0.61, 0.58);
        assert!((hip_line_angle(lh, rh) - 180.0).abs() < EPS);
    }
}
