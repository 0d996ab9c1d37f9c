use std::path::{Path, PathBuf};

use opencv::core::{self, Mat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::config::{ChartConfig, ComparisonVariant, ComposeConfig};
use crate::helper::pose_helper::{PoseHelper, StreamRole};
use crate::modules::chart::ChartRenderer;
use crate::modules::compose::{Composer, FrameStore};
use crate::modules::pose_estimator::PoseEstimator;
use crate::modules::video::VideoReader;
use crate::utils::similarity::{MetricSeries, SimilarityReport};

/// Failures a comparison run can surface. Detection gaps and degenerate
/// all-zero series are policies handled inline, not errors.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("input video error: {0}")]
    Input(String),
    #[error("video encoding error: {0}")]
    Encoding(String),
    #[error("pose estimator error: {0}")]
    Estimator(#[from] anyhow::Error),
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Externally visible output of one comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub output_path: PathBuf,
    pub similarity: SimilarityReport,
}

/// Single-pass movement comparison engine.
///
/// One instance owns one run's mutable state plus both estimator seats;
/// concurrent comparisons take separate instances, each with its own
/// transient frame-store namespace.
#[derive(Debug, Clone)]
pub struct ComparisonPipeline<P: PoseEstimator> {
    reference_estimator: P,
    candidate_estimator: P,
    chart_config: ChartConfig,
    compose_config: ComposeConfig,
}

impl<P: PoseEstimator> ComparisonPipeline<P> {
    /// new initializes new instance of the pipeline. Separate estimator
    /// instances keep per-stream tracking state isolated between the two
    /// videos.
    pub fn new(reference_estimator: P, candidate_estimator: P) -> Self {
        ComparisonPipeline {
            reference_estimator,
            candidate_estimator,
            chart_config: ChartConfig::new(),
            compose_config: ComposeConfig::new(),
        }
    }

    pub fn with_configs(
        reference_estimator: P,
        candidate_estimator: P,
        chart_config: ChartConfig,
        compose_config: ComposeConfig,
    ) -> Self {
        ComparisonPipeline {
            reference_estimator,
            candidate_estimator,
            chart_config,
            compose_config,
        }
    }

    /// run_comparison compares the candidate movement against the
    /// reference and writes the composited analysis video to
    /// `output_path`.
    ///
    /// # Arguments
    /// * `reference_video` - path to the correct-technique footage
    /// * `candidate_video` - path to the footage under review
    /// * `output_path` - destination of the final video
    /// * `variant` - comparison domain selecting the metric vocabulary
    ///
    /// # Returns
    /// * `Result<ComparisonResult, ComparisonError>`
    pub async fn run_comparison(
        &mut self,
        reference_video: &Path,
        candidate_video: &Path,
        output_path: &Path,
        variant: ComparisonVariant,
    ) -> Result<ComparisonResult, ComparisonError> {
        let mut reference_reader = VideoReader::open(reference_video)?;
        let mut candidate_reader = VideoReader::open(candidate_video)?;
        debug!(
            estimator_config = ?self.reference_estimator.config(),
            ?variant,
            "starting comparison run"
        );

        let store = FrameStore::create()?;
        let helper = PoseHelper::new(variant);
        let metric_count = variant.metrics().len();

        let mut reference_series = MetricSeries::new(metric_count);
        let mut candidate_series = MetricSeries::new(metric_count);
        let mut video_frames: Vec<PathBuf> = Vec::new();

        // Lockstep traversal: the run ends as soon as either stream is
        // exhausted, so the comparison covers min(len(A), len(B)) steps.
        loop {
            let (Some(mut ref_frame), Some(mut cand_frame)) =
                (reference_reader.read_frame(), candidate_reader.read_frame())
            else {
                break;
            };

            let ref_metrics =
                annotate(&helper, &mut self.reference_estimator, &mut ref_frame).await?;
            let cand_metrics =
                annotate(&helper, &mut self.candidate_estimator, &mut cand_frame).await?;

            // Metrics only count when both streams saw a body this step;
            // otherwise the step is dropped from both series to keep them
            // index-aligned (at the cost of losing the time axis).
            if let (Some(ref_metrics), Some(cand_metrics)) = (ref_metrics, cand_metrics) {
                reference_series.push(&ref_metrics);
                candidate_series.push(&cand_metrics);
            }

            helper.draw_role_label(&mut ref_frame, StreamRole::Reference)?;
            helper.draw_role_label(&mut cand_frame, StreamRole::Candidate)?;

            let mut combined = Mat::default();
            core::hconcat2(&ref_frame, &cand_frame, &mut combined)?;
            video_frames.push(store.save_video_frame(video_frames.len(), &combined)?);
        }

        if video_frames.is_empty() {
            let _ = store.remove();
            return Err(ComparisonError::Input(
                "no frames could be read from the input videos".to_string(),
            ));
        }
        info!(
            combined_frames = video_frames.len(),
            aligned_steps = reference_series.len(),
            "dual-stream traversal finished"
        );

        let report = SimilarityReport::from_series(
            &variant.metric_names(),
            &reference_series,
            &candidate_series,
        );
        info!(overall = report.overall, "similarity computed");

        // The last combined frame carries the overall score.
        let last_path = video_frames.last().expect("at least one frame").clone();
        let mut last_frame = store.load(&last_path)?;
        helper.draw_overall_banner(&mut last_frame, report.overall)?;
        store.save_video_frame(video_frames.len() - 1, &last_frame)?;

        let renderer = ChartRenderer::new(self.chart_config.clone(), variant);
        let chart_frames =
            renderer.render_sequence(&reference_series, &candidate_series, &report, &store)?;
        let fallback_chart = renderer.blank_canvas(&report)?;

        let composer = Composer::new(self.compose_config.clone());
        let muxed = composer.mux(
            &store,
            &video_frames,
            &chart_frames,
            &fallback_chart,
            variant.chart_matches_video_width(),
            reference_reader.fps,
            output_path,
        );
        // Encoding failures still tear down the transient namespace.
        if let Err(err) = muxed {
            let _ = store.remove();
            return Err(err);
        }
        store.remove()?;

        Ok(ComparisonResult {
            output_path: output_path.to_path_buf(),
            similarity: report,
        })
    }
}

/// annotate runs the estimator on one frame and, on detection, derives
/// the metric frame and draws the skeleton plus metric readout.
async fn annotate<P: PoseEstimator>(
    helper: &PoseHelper,
    estimator: &mut P,
    frame: &mut Mat,
) -> Result<Option<Vec<f32>>, ComparisonError> {
    let Some(landmarks) = estimator.detect(frame).await? else {
        return Ok(None);
    };
    let metrics = helper.extract_metrics(&landmarks);
    helper.draw_skeleton(frame, &landmarks)?;
    helper.draw_metric_readout(frame, &metrics)?;
    Ok(Some(metrics))
}
