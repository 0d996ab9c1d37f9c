use anyhow::Error;
use opencv::core::Mat;

use crate::config::config::EstimatorConfig;
use crate::utils::coordinate::PoseLandmarks;

/// Seam for the external landmark-estimation model.
///
/// Implementations receive one raw frame and either locate the full joint
/// vocabulary or report that no body was found. `detect` takes `&mut self`
/// because estimators commonly carry tracking state between consecutive
/// frames of the same stream; the pipeline therefore keeps one estimator
/// instance per video.
#[allow(async_fn_in_trait)]
pub trait PoseEstimator {
    async fn detect(&mut self, frame: &Mat) -> Result<Option<PoseLandmarks>, Error>;

    /// Confidence thresholds this estimator runs with. The engine assumes
    /// the defaults unless an implementation overrides this.
    fn config(&self) -> EstimatorConfig {
        EstimatorConfig::new()
    }
}
