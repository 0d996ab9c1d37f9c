use serde::{Deserialize, Serialize};

/// Point in normalized image coordinates as produced by the pose estimator.
/// Values are nominally in `[0, 1]` but nothing here enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Point2D { x, y }
    }
}

/// Fixed vocabulary of body joints tracked per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseLandmarks {
    pub left_shoulder: Point2D,
    pub right_shoulder: Point2D,
    pub left_elbow: Point2D,
    pub right_elbow: Point2D,
    pub left_wrist: Point2D,
    pub right_wrist: Point2D,
    pub left_hip: Point2D,
    pub right_hip: Point2D,
    pub left_knee: Point2D,
    pub right_knee: Point2D,
    pub left_ankle: Point2D,
    pub right_ankle: Point2D,
}

impl PoseLandmarks {
    /// skeleton_segments returns the joint pairs used for the overlay drawing.
    pub fn skeleton_segments(&self) -> [(Point2D, Point2D); 12] {
        [
            (self.left_shoulder, self.right_shoulder),
            (self.left_shoulder, self.left_elbow),
            (self.left_elbow, self.left_wrist),
            (self.right_shoulder, self.right_elbow),
            (self.right_elbow, self.right_wrist),
            (self.left_shoulder, self.left_hip),
            (self.right_shoulder, self.right_hip),
            (self.left_hip, self.right_hip),
            (self.left_hip, self.left_knee),
            (self.left_knee, self.left_ankle),
            (self.right_hip, self.right_knee),
            (self.right_knee, self.right_ankle),
        ]
    }

    pub fn joints(&self) -> [Point2D; 12] {
        [
            self.left_shoulder,
            self.right_shoulder,
            self.left_elbow,
            self.right_elbow,
            self.left_wrist,
            self.right_wrist,
            self.left_hip,
            self.right_hip,
            self.left_knee,
            self.right_knee,
            self.left_ankle,
            self.right_ankle,
        ]
    }

    /// sample returns a plausible upright pose used by the unit tests.
    #[cfg(test)]
    pub(crate) fn sample() -> Self {
        PoseLandmarks {
            left_shoulder: Point2D::new(0.40, 0.24),
            right_shoulder: Point2D::new(0.60, 0.26),
            left_elbow: Point2D::new(0.35, 0.38),
            right_elbow: Point2D::new(0.65, 0.38),
            left_wrist: Point2D::new(0.33, 0.50),
            right_wrist: Point2D::new(0.67, 0.50),
            left_hip: Point2D::new(0.43, 0.55),
            right_hip: Point2D::new(0.57, 0.55),
            left_knee: Point2D::new(0.42, 0.75),
            right_knee: Point2D::new(0.58, 0.75),
            left_ankle: Point2D::new(0.42, 0.93),
            right_ankle: Point2D::new(0.58, 0.93),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PoseLandmarks;

    #[test]
    fn test_skeleton_segments_cover_all_joints() {
        let lmk = PoseLandmarks::sample();
        let segments = lmk.skeleton_segments();
        for joint in lmk.joints() {
            let touched = segments.iter().any(|(a, b)| *a == joint || *b == joint);
            assert!(touched, "joint {:?} missing from skeleton", joint);
        }
    }

    #[test]
    fn test_landmarks_roundtrip_json() {
        let lmk = PoseLandmarks::sample();
        let encoded = serde_json::to_string(&lmk).unwrap();
        let decoded: PoseLandmarks = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.left_wrist, lmk.left_wrist);
        assert_eq!(decoded.right_ankle, lmk.right_ankle);
    }
}
