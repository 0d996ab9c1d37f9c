pub mod chart;
pub mod compose;
pub mod pose_estimator;
pub mod video;
