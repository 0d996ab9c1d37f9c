use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// cosine_similarity_percent scores two metric time series in `[-100, 100]`.
///
/// Both series are truncated to the shorter length before scoring; there is
/// no resampling. An all-zero truncated series on either side returns 0,
/// since cosine similarity is undefined for a zero vector. Negative values
/// are genuine anti-correlation and are deliberately not clipped.
///
/// # Arguments
/// * `a` - reference series
/// * `b` - candidate series
///
/// # Returns
/// * `f32`
pub fn cosine_similarity_percent(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    if a.iter().all(|v| *v == 0.0) || b.iter().all(|v| *v == 0.0) {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x.powi(2)).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x.powi(2)).sum::<f32>().sqrt();
    dot_product / (norm_a * norm_b) * 100.0
}

/// One scalar measurement set derived from a single landmarked frame,
/// ordered by the active variant's metric vocabulary.
pub type MetricFrame = Vec<f32>;

/// Per-stream accumulation of metric frames, one row per aligned step.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    values: Array2<f32>,
}

impl MetricSeries {
    pub fn new(metric_count: usize) -> Self {
        MetricSeries {
            values: Array2::zeros((0, metric_count)),
        }
    }

    pub fn push(&mut self, frame: &MetricFrame) {
        self.values
            .push_row(ArrayView1::from(frame.as_slice()))
            .expect("metric frame arity is fixed per variant");
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    /// metric returns the full time series of one metric family.
    pub fn metric(&self, idx: usize) -> Vec<f32> {
        self.values.column(idx).to_vec()
    }

    pub fn metric_max(&self, idx: usize) -> f32 {
        self.values
            .column(idx)
            .iter()
            .fold(0.0_f32, |acc, v| acc.max(*v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    pub name: String,
    pub percent: f32,
}

/// Similarity percentages per metric family plus their unweighted mean.
/// Computed once after the full traversal and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub metrics: Vec<MetricScore>,
    pub overall: f32,
}

impl SimilarityReport {
    /// from_series scores every metric family of the two aligned series.
    pub fn from_series(names: &[&str], reference: &MetricSeries, candidate: &MetricSeries) -> Self {
        let metrics: Vec<MetricScore> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| MetricScore {
                name: (*name).to_string(),
                percent: cosine_similarity_percent(&reference.metric(idx), &candidate.metric(idx)),
            })
            .collect();

        let overall = if metrics.is_empty() {
            0.0
        } else {
            metrics.iter().map(|m| m.percent).sum::<f32>() / metrics.len() as f32
        };

        SimilarityReport { metrics, overall }
    }

    pub fn percent_for(&self, name: &str) -> Option<f32> {
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_identical_series_score_100() {
        let a = vec![35.0, 90.0, 120.0, 77.5];
        assert!((cosine_similarity_percent(&a, &a) - 100.0).abs() < EPS);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = vec![10.0, 20.0, 15.0, 80.0];
        let b = vec![12.0, 18.0, 90.0, 5.0];
        let ab = cosine_similarity_percent(&a, &b);
        let ba = cosine_similarity_percent(&b, &a);
        assert!((ab - ba).abs() < EPS);
    }

    #[test]
    fn test_zero_series_scores_zero() {
        let zeros = vec![0.0; 6];
        let b = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(cosine_similarity_percent(&zeros, &b), 0.0);
        assert_eq!(cosine_similarity_percent(&b, &zeros), 0.0);
        assert_eq!(cosine_similarity_percent(&[], &b), 0.0);
    }

    #[test]
    fn test_longer_series_is_truncated() {
        let a = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        let b = vec![2.0, 7.0, 1.0, 8.0, 2.0, 8.0, 1.0, 8.0];
        let full = cosine_similarity_percent(&a, &b);
        let trimmed = cosine_similarity_percent(&a, &b[..5]);
        assert!((full - trimmed).abs() < EPS);
    }

    #[test]
    fn test_opposed_series_score_negative() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-1.0, -2.0, -3.0];
        assert!((cosine_similarity_percent(&a, &b) + 100.0).abs() < EPS);
    }

    #[test]
    fn test_series_push_and_columns() {
        let mut series = MetricSeries::new(2);
        series.push(&vec![90.0, 0.25]);
        series.push(&vec![120.0, 0.30]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.metric(0), vec![90.0, 120.0]);
        assert!((series.metric_max(1) - 0.30).abs() < EPS);
    }

    #[test]
    fn test_report_overall_is_unweighted_mean() {
        let mut a = MetricSeries::new(2);
        let mut b = MetricSeries::new(2);
        a.push(&vec![1.0, 1.0]);
        a.push(&vec![2.0, 2.0]);
        b.push(&vec![1.0, -1.0]);
        b.push(&vec![2.0, -2.0]);

        let report = SimilarityReport::from_series(&["first", "second"], &a, &b);
        assert!((report.percent_for("first").unwrap() - 100.0).abs() < EPS);
        assert!((report.percent_for("second").unwrap() + 100.0).abs() < EPS);
        // Negative contributions feed the mean unclamped.
        assert!(report.overall.abs() < EPS);
    }

    #[test]
    fn test_empty_series_report_is_all_zero() {
        let a = MetricSeries::new(1);
        let b = MetricSeries::new(1);
        let report = SimilarityReport::from_series(&["only"], &a, &b);
        assert_eq!(report.overall, 0.0);
        assert_eq!(report.percent_for("only"), Some(0.0));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = SimilarityReport {
            metrics: vec![MetricScore {
                name: "left_elbow".to_string(),
                percent: 87.5,
            }],
            overall: 87.5,
        };
        let encoded = serde_json::to_string(&report).unwrap();
        assert!(encoded.contains("\"left_elbow\""));
        assert!(encoded.contains("\"overall\""));
    }
}
