use std::path::PathBuf;

use opencv::core::{Mat, Point, Rect, Scalar, CV_8UC3};
use opencv::imgproc;
use tracing::info;

use crate::config::config::{ChartConfig, ComparisonVariant, MetricSpec, MetricUnit};
use crate::helper::pose_helper::StreamRole;
use crate::modules::compose::FrameStore;
use crate::pipeline::pipeline::ComparisonError;
use crate::utils::similarity::{MetricSeries, SimilarityReport};

fn white() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

fn grid_color() -> Scalar {
    Scalar::new(210.0, 210.0, 210.0, 0.0)
}

fn text_color() -> Scalar {
    Scalar::new(30.0, 30.0, 30.0, 0.0)
}

/// Renders the animated comparison chart: one image per aligned step,
/// each showing both series truncated to that step. Re-rendering from
/// scratch per index keeps the sequence deterministic and regenerable
/// from the same series and report.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
    variant: ComparisonVariant,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig, variant: ComparisonVariant) -> Self {
        ChartRenderer { config, variant }
    }

    pub fn canvas_height(&self) -> i32 {
        self.config.header_height
            + self.config.subplot_height * self.variant.metrics().len() as i32
    }

    /// render_sequence writes one chart artifact per aligned step and
    /// returns their paths in order.
    pub fn render_sequence(
        &self,
        reference: &MetricSeries,
        candidate: &MetricSeries,
        report: &SimilarityReport,
        store: &FrameStore,
    ) -> Result<Vec<PathBuf>, ComparisonError> {
        let steps = reference.len().min(candidate.len());
        let y_ranges = self.y_ranges(reference, candidate);

        let mut paths = Vec::with_capacity(steps);
        for upto in 0..steps {
            let canvas = self.render_frame(upto, steps, reference, candidate, report, &y_ranges)?;
            paths.push(store.save_chart_frame(upto, &canvas)?);
        }
        info!(steps, variant = ?self.variant, "rendered chart sequence");
        Ok(paths)
    }

    /// blank_canvas is the stand-in chart for runs with no aligned steps.
    pub fn blank_canvas(&self, report: &SimilarityReport) -> Result<Mat, ComparisonError> {
        let mut canvas = self.empty_canvas()?;
        self.draw_header(&mut canvas, report)?;
        for (row, spec) in self.variant.metrics().iter().enumerate() {
            let percent = report.percent_for(spec.name).unwrap_or(0.0);
            self.draw_subplot_frame(&mut canvas, row, spec, percent)?;
        }
        Ok(canvas)
    }

    fn empty_canvas(&self) -> Result<Mat, ComparisonError> {
        Ok(Mat::new_rows_cols_with_default(
            self.canvas_height(),
            self.config.width,
            CV_8UC3,
            white(),
        )?)
    }

    /// Axis ranges are fixed for the whole run: angles span 0-180, while
    /// distance metrics span up to the larger series maximum.
    fn y_ranges(&self, reference: &MetricSeries, candidate: &MetricSeries) -> Vec<f32> {
        self.variant
            .metrics()
            .iter()
            .enumerate()
            .map(|(idx, spec)| match spec.unit {
                MetricUnit::Degrees => 180.0,
                MetricUnit::Normalized => {
                    let max = reference.metric_max(idx).max(candidate.metric_max(idx));
                    (max * 1.05).max(1e-3)
                }
            })
            .collect()
    }

    fn render_frame(
        &self,
        upto: usize,
        steps: usize,
        reference: &MetricSeries,
        candidate: &MetricSeries,
        report: &SimilarityReport,
        y_ranges: &[f32],
    ) -> Result<Mat, ComparisonError> {
        let mut canvas = self.empty_canvas()?;
        self.draw_header(&mut canvas, report)?;

        for (row, spec) in self.variant.metrics().iter().enumerate() {
            let percent = report.percent_for(spec.name).unwrap_or(0.0);
            let plot = self.draw_subplot_frame(&mut canvas, row, spec, percent)?;
            let y_max = y_ranges[row];

            self.draw_series(
                &mut canvas,
                plot,
                &reference.metric(row),
                upto,
                steps,
                y_max,
                StreamRole::Reference.color(),
            )?;
            self.draw_series(
                &mut canvas,
                plot,
                &candidate.metric(row),
                upto,
                steps,
                y_max,
                StreamRole::Candidate.color(),
            )?;
        }
        Ok(canvas)
    }

    fn draw_header(&self, canvas: &mut Mat, report: &SimilarityReport) -> Result<(), ComparisonError> {
        imgproc::put_text(
            canvas,
            &format!("Overall Movement Similarity: {:.2}%", report.overall),
            Point::new(self.config.margin_left, 26),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.7,
            text_color(),
            2,
            imgproc::LINE_AA,
            false,
        )?;
        Ok(())
    }

    /// draw_subplot_frame draws the static parts of one subplot (border,
    /// grid, title, legend) and returns its plot area.
    fn draw_subplot_frame(
        &self,
        canvas: &mut Mat,
        row: usize,
        spec: &MetricSpec,
        percent: f32,
    ) -> Result<Rect, ComparisonError> {
        let c = &self.config;
        let top = c.header_height + row as i32 * c.subplot_height;
        let plot = Rect::new(
            c.margin_left,
            top + c.margin_top,
            c.width - c.margin_left - c.margin_right,
            c.subplot_height - c.margin_top - c.margin_bottom,
        );

        imgproc::put_text(
            canvas,
            &format!("{} - Similarity: {:.2}%", spec.name, percent),
            Point::new(c.margin_left, top + 20),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            text_color(),
            1,
            imgproc::LINE_AA,
            false,
        )?;

        imgproc::rectangle(canvas, plot, grid_color(), 1, imgproc::LINE_8, 0)?;
        for i in 1..4 {
            let y = plot.y + plot.height * i / 4;
            imgproc::line(
                canvas,
                Point::new(plot.x, y),
                Point::new(plot.x + plot.width, y),
                grid_color(),
                1,
                imgproc::LINE_8,
                0,
            )?;
        }

        let legend_x = plot.x + plot.width - 150;
        for (slot, role) in [StreamRole::Reference, StreamRole::Candidate]
            .into_iter()
            .enumerate()
        {
            let y = plot.y + 14 + slot as i32 * 16;
            imgproc::line(
                canvas,
                Point::new(legend_x, y - 4),
                Point::new(legend_x + 18, y - 4),
                role.color(),
                2,
                imgproc::LINE_8,
                0,
            )?;
            imgproc::put_text(
                canvas,
                role.label(),
                Point::new(legend_x + 24, y),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.35,
                text_color(),
                1,
                imgproc::LINE_AA,
                false,
            )?;
        }

        imgproc::put_text(
            canvas,
            "Frame",
            Point::new(plot.x + plot.width / 2 - 20, plot.y + plot.height + 18),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.4,
            text_color(),
            1,
            imgproc::LINE_AA,
            false,
        )?;

        Ok(plot)
    }

    /// draw_series plots steps `0..=upto` of one series as a polyline.
    fn draw_series(
        &self,
        canvas: &mut Mat,
        plot: Rect,
        series: &[f32],
        upto: usize,
        steps: usize,
        y_max: f32,
        color: Scalar,
    ) -> Result<(), ComparisonError> {
        if series.is_empty() {
            return Ok(());
        }
        let last = upto.min(series.len() - 1);
        let points: Vec<Point> = series[..=last]
            .iter()
            .enumerate()
            .map(|(t, v)| self.plot_point(plot, t, *v, steps, y_max))
            .collect();

        if points.len() == 1 {
            imgproc::circle(canvas, points[0], 2, color, -1, imgproc::LINE_AA, 0)?;
        }
        for pair in points.windows(2) {
            imgproc::line(canvas, pair[0], pair[1], color, 2, imgproc::LINE_AA, 0)?;
        }
        Ok(())
    }

    fn plot_point(&self, plot: Rect, t: usize, value: f32, steps: usize, y_max: f32) -> Point {
        let denom = steps.saturating_sub(1).max(1) as f32;
        let x = plot.x as f32 + (t as f32 / denom) * plot.width as f32;
        let clamped = value.clamp(0.0, y_max);
        let y = plot.y as f32 + (1.0 - clamped / y_max) * plot.height as f32;
        Point::new(x as i32, y as i32)
    }
}
