use serde::{Deserialize, Serialize};

/// Comparison domain. Each variant fixes its own metric vocabulary and
/// chart layout; everything else in the pipeline is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonVariant {
    BallHandling,
    Attack,
    Defense,
}

/// Unit of one metric family, which also decides the chart y-axis policy:
/// angles plot against a fixed 0-180 range, distances against the series
/// maximum so the sequence stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Degrees,
    Normalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    pub name: &'static str,
    pub unit: MetricUnit,
}

const BALL_HANDLING_METRICS: [MetricSpec; 1] = [MetricSpec {
    name: "arm_angle",
    unit: MetricUnit::Degrees,
}];

const ATTACK_METRICS: [MetricSpec; 3] = [
    MetricSpec {
        name: "shoulder_alignment",
        unit: MetricUnit::Degrees,
    },
    MetricSpec {
        name: "left_elbow",
        unit: MetricUnit::Degrees,
    },
    MetricSpec {
        name: "right_elbow",
        unit: MetricUnit::Degrees,
    },
];

const DEFENSE_METRICS: [MetricSpec; 4] = [
    MetricSpec {
        name: "left_knee",
        unit: MetricUnit::Degrees,
    },
    MetricSpec {
        name: "right_knee",
        unit: MetricUnit::Degrees,
    },
    MetricSpec {
        name: "hip_stance",
        unit: MetricUnit::Degrees,
    },
    MetricSpec {
        name: "stance_width",
        unit: MetricUnit::Normalized,
    },
];

impl ComparisonVariant {
    pub fn metrics(&self) -> &'static [MetricSpec] {
        match self {
            ComparisonVariant::BallHandling => &BALL_HANDLING_METRICS,
            ComparisonVariant::Attack => &ATTACK_METRICS,
            ComparisonVariant::Defense => &DEFENSE_METRICS,
        }
    }

    pub fn metric_names(&self) -> Vec<&'static str> {
        self.metrics().iter().map(|m| m.name).collect()
    }

    /// The attack chart is stretched to the annotated video's width before
    /// height matching; the other variants only match height.
    pub fn chart_matches_video_width(&self) -> bool {
        matches!(self, ComparisonVariant::Attack)
    }
}

/// Confidence thresholds handed to the external pose estimator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimatorConfig {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl EstimatorConfig {
    pub fn new() -> Self {
        EstimatorConfig {
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig::new()
    }
}

/// Layout of the progressive-reveal chart canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartConfig {
    pub width: i32,
    pub subplot_height: i32,
    pub header_height: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_top: i32,
    pub margin_bottom: i32,
}

impl ChartConfig {
    pub fn new() -> Self {
        ChartConfig {
            width: 640,
            subplot_height: 240,
            header_height: 40,
            margin_left: 56,
            margin_right: 16,
            margin_top: 28,
            margin_bottom: 24,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig::new()
    }
}

/// Final canvas the composited sequence is letterboxed onto.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposeConfig {
    pub target_width: i32,
    pub target_height: i32,
    pub fourcc: [char; 4],
}

impl ComposeConfig {
    pub fn new() -> Self {
        ComposeConfig {
            target_width: 1280,
            target_height: 720,
            fourcc: ['m', 'p', '4', 'v'],
        }
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        ComposeConfig::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_metric_vocabularies() {
        assert_eq!(
            ComparisonVariant::BallHandling.metric_names(),
            vec!["arm_angle"]
        );
        assert_eq!(
            ComparisonVariant::Attack.metric_names(),
            vec!["shoulder_alignment", "left_elbow", "right_elbow"]
        );
        assert_eq!(
            ComparisonVariant::Defense.metric_names(),
            vec!["left_knee", "right_knee", "hip_stance", "stance_width"]
        );
    }

    #[test]
    fn test_variant_serde_naming() {
        let encoded = serde_json::to_string(&ComparisonVariant::BallHandling).unwrap();
        assert_eq!(encoded, "\"ball_handling\"");
        let decoded: ComparisonVariant = serde_json::from_str("\"defense\"").unwrap();
        assert_eq!(decoded, ComparisonVariant::Defense);
    }

    #[test]
    fn test_only_attack_matches_video_width() {
        assert!(ComparisonVariant::Attack.chart_matches_video_width());
        assert!(!ComparisonVariant::Defense.chart_matches_video_width());
        assert!(!ComparisonVariant::BallHandling.chart_matches_video_width());
    }
}
