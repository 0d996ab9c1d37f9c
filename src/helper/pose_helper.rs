use opencv::core::{Mat, Point, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

use crate::config::config::{ComparisonVariant, MetricUnit};
use crate::utils::coordinate::{Point2D, PoseLandmarks};
use crate::utils::geometry::{
    hip_line_angle, shoulder_alignment_angle, stance_width, three_point_angle,
};
use crate::utils::similarity::MetricFrame;

/// Which side of the comparison a frame belongs to. The role decides the
/// label text and the color used consistently across video and chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    Reference,
    Candidate,
}

impl StreamRole {
    pub fn label(&self) -> &'static str {
        match self {
            StreamRole::Reference => "Correct Technique",
            StreamRole::Candidate => "Incorrect Technique",
        }
    }

    /// BGR color: green for the reference, red for the candidate.
    pub fn color(&self) -> Scalar {
        match self {
            StreamRole::Reference => Scalar::new(0.0, 255.0, 0.0, 0.0),
            StreamRole::Candidate => Scalar::new(0.0, 0.0, 255.0, 0.0),
        }
    }
}

fn skeleton_color() -> Scalar {
    Scalar::new(66.0, 117.0, 245.0, 0.0)
}

fn joint_color() -> Scalar {
    Scalar::new(230.0, 66.0, 245.0, 0.0)
}

fn readout_color() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

/// PoseHelper derives the variant's metric frame from landmarks and owns
/// every per-frame drawing concern: skeleton overlay, metric readout and
/// the role label.
#[derive(Debug, Clone)]
pub struct PoseHelper {
    variant: ComparisonVariant,
}

impl PoseHelper {
    /// new initializes new instance of the pose helper module.
    pub fn new(variant: ComparisonVariant) -> Self {
        PoseHelper { variant }
    }

    /// extract_metrics maps a landmark frame to the variant's metric
    /// vocabulary, in the fixed order of `ComparisonVariant::metrics`.
    pub fn extract_metrics(&self, lmk: &PoseLandmarks) -> MetricFrame {
        match self.variant {
            ComparisonVariant::BallHandling => {
                vec![three_point_angle(
                    lmk.right_shoulder,
                    lmk.right_elbow,
                    lmk.right_wrist,
                )]
            }
            ComparisonVariant::Attack => vec![
                shoulder_alignment_angle(lmk.left_shoulder, lmk.right_shoulder),
                three_point_angle(lmk.left_shoulder, lmk.left_elbow, lmk.left_wrist),
                three_point_angle(lmk.right_shoulder, lmk.right_elbow, lmk.right_wrist),
            ],
            ComparisonVariant::Defense => vec![
                three_point_angle(lmk.left_hip, lmk.left_knee, lmk.left_ankle),
                three_point_angle(lmk.right_hip, lmk.right_knee, lmk.right_ankle),
                hip_line_angle(lmk.left_hip, lmk.right_hip),
                stance_width(lmk.left_hip, lmk.right_hip, lmk.left_knee, lmk.right_knee),
            ],
        }
    }

    /// draw_skeleton overlays the estimator's joint connections onto the
    /// frame. Landmarks are normalized coordinates, scaled here to pixels.
    pub fn draw_skeleton(&self, frame: &mut Mat, lmk: &PoseLandmarks) -> Result<(), opencv::Error> {
        let (w, h) = (frame.cols(), frame.rows());
        for (from, to) in lmk.skeleton_segments() {
            imgproc::line(
                frame,
                to_pixel(from, w, h),
                to_pixel(to, w, h),
                skeleton_color(),
                2,
                imgproc::LINE_AA,
                0,
            )?;
        }
        for joint in lmk.joints() {
            imgproc::circle(
                frame,
                to_pixel(joint, w, h),
                3,
                joint_color(),
                -1,
                imgproc::LINE_AA,
                0,
            )?;
        }
        Ok(())
    }

    /// draw_metric_readout prints one line of text per metric family.
    pub fn draw_metric_readout(&self, frame: &mut Mat, values: &[f32]) -> Result<(), opencv::Error> {
        for (idx, (spec, value)) in self.variant.metrics().iter().zip(values).enumerate() {
            let text = match spec.unit {
                MetricUnit::Degrees => format!("{}: {:.1} deg", spec.name, value),
                MetricUnit::Normalized => format!("{}: {:.3}", spec.name, value),
            };
            imgproc::put_text(
                frame,
                &text,
                Point::new(10, 30 + idx as i32 * 30),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.5,
                readout_color(),
                1,
                imgproc::LINE_AA,
                false,
            )?;
        }
        Ok(())
    }

    /// draw_role_label stamps the reference/candidate label near the
    /// bottom-left corner in the role's color.
    pub fn draw_role_label(&self, frame: &mut Mat, role: StreamRole) -> Result<(), opencv::Error> {
        let h = frame.rows();
        imgproc::put_text(
            frame,
            role.label(),
            Point::new(10, h - 20),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.7,
            role.color(),
            2,
            imgproc::LINE_AA,
            false,
        )
    }

    /// draw_overall_banner stamps the overall score onto a combined frame.
    pub fn draw_overall_banner(&self, frame: &mut Mat, overall: f32) -> Result<(), opencv::Error> {
        let w = frame.cols();
        imgproc::put_text(
            frame,
            &format!("Overall Similarity: {:.2}%", overall),
            Point::new(w / 2 - 150, 30),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.8,
            readout_color(),
            2,
            imgproc::LINE_AA,
            false,
        )
    }
}

fn to_pixel(p: Point2D, width: i32, height: i32) -> Point {
    Point::new(
        (p.x * width as f32) as i32,
        (p.y * height as f32) as i32,
    )
}
