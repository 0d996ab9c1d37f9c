use std::path::{Path, PathBuf};

use opencv::core::{self, Mat, Rect, Scalar, Size, Vector, CV_8UC3};
use opencv::imgcodecs::{self, imread, imwrite};
use opencv::imgproc::{self, resize};
use opencv::prelude::*;
use tracing::{debug, info};

use crate::config::config::ComposeConfig;
use crate::pipeline::pipeline::ComparisonError;

/// Transient per-run image storage. Every run owns a unique directory so
/// concurrent runs never collide; frame artifacts are write-once,
/// read-once by the muxing step, then removed with the whole namespace.
#[derive(Debug)]
pub struct FrameStore {
    root: PathBuf,
}

impl FrameStore {
    /// create builds a fresh namespace under the system temp directory.
    pub fn create() -> Result<Self, ComparisonError> {
        let root = std::env::temp_dir().join(format!(
            "motion-compare-{:08x}",
            rand::random::<u32>()
        ));
        Self::create_at(root)
    }

    pub fn create_at(root: PathBuf) -> Result<Self, ComparisonError> {
        std::fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "created frame store");
        Ok(FrameStore { root })
    }

    pub fn save_video_frame(&self, idx: usize, frame: &Mat) -> Result<PathBuf, ComparisonError> {
        self.save(&format!("frame_{idx:04}.png"), frame)
    }

    pub fn save_chart_frame(&self, idx: usize, frame: &Mat) -> Result<PathBuf, ComparisonError> {
        self.save(&format!("graph_{idx:04}.png"), frame)
    }

    fn save(&self, name: &str, frame: &Mat) -> Result<PathBuf, ComparisonError> {
        let path = self.root.join(name);
        let path_str = path
            .to_str()
            .ok_or_else(|| ComparisonError::Encoding(format!("non-UTF-8 artifact path {:?}", path)))?;
        let written = imwrite(path_str, frame, &Vector::new())?;
        if !written {
            return Err(ComparisonError::Encoding(format!(
                "cannot write frame artifact {}",
                path.display()
            )));
        }
        Ok(path)
    }

    pub fn load(&self, path: &Path) -> Result<Mat, ComparisonError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ComparisonError::Encoding(format!("non-UTF-8 artifact path {:?}", path)))?;
        let frame = imread(path_str, imgcodecs::IMREAD_COLOR)?;
        if frame.empty() {
            return Err(ComparisonError::Encoding(format!(
                "cannot read frame artifact {}",
                path.display()
            )));
        }
        Ok(frame)
    }

    /// remove deletes the whole namespace.
    pub fn remove(self) -> std::io::Result<()> {
        std::fs::remove_dir_all(&self.root)
    }
}

/// letterbox_dimensions scales `(orig_w, orig_h)` to the largest size that
/// fits inside the target while preserving aspect ratio. Exactly one
/// dimension matches its target bound (both, when aspects are equal).
pub fn letterbox_dimensions(
    orig_w: i32,
    orig_h: i32,
    target_w: i32,
    target_h: i32,
) -> (i32, i32) {
    let aspect = orig_w as f64 / orig_h as f64;
    let target_aspect = target_w as f64 / target_h as f64;
    if aspect > target_aspect {
        (target_w, (target_w as f64 / aspect) as i32)
    } else {
        ((target_h as f64 * aspect) as i32, target_h)
    }
}

/// letterbox_onto_canvas centers the scaled frame on a white canvas of the
/// exact target resolution.
pub fn letterbox_onto_canvas(frame: &Mat, config: &ComposeConfig) -> Result<Mat, ComparisonError> {
    let (new_w, new_h) = letterbox_dimensions(
        frame.cols(),
        frame.rows(),
        config.target_width,
        config.target_height,
    );

    let mut scaled = Mat::default();
    resize(
        frame,
        &mut scaled,
        Size::new(new_w, new_h),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut canvas = Mat::new_rows_cols_with_default(
        config.target_height,
        config.target_width,
        CV_8UC3,
        Scalar::new(255.0, 255.0, 255.0, 0.0),
    )?;
    let x = (config.target_width - new_w) / 2;
    let y = (config.target_height - new_h) / 2;
    let mut roi = Mat::roi_mut(&mut canvas, Rect::new(x, y, new_w, new_h))?;
    scaled.copy_to(&mut roi)?;
    Ok(canvas)
}

/// Merges the annotated dual-video sequence with the chart sequence into
/// the final letterboxed video.
#[derive(Debug, Clone)]
pub struct Composer {
    config: ComposeConfig,
}

impl Composer {
    pub fn new(config: ComposeConfig) -> Self {
        Composer { config }
    }

    /// compose_frame resizes the chart to the video frame's height (and
    /// optionally width), concatenates both side by side and letterboxes
    /// the result onto the target canvas.
    pub fn compose_frame(
        &self,
        video_frame: &Mat,
        chart_frame: &Mat,
        match_video_width: bool,
    ) -> Result<Mat, ComparisonError> {
        let video_h = video_frame.rows();
        let chart_size = if match_video_width {
            Size::new(video_frame.cols(), video_h)
        } else {
            let scaled_w =
                (chart_frame.cols() as f64 * video_h as f64 / chart_frame.rows() as f64) as i32;
            Size::new(scaled_w.max(1), video_h)
        };

        let mut chart_resized = Mat::default();
        resize(
            chart_frame,
            &mut chart_resized,
            chart_size,
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        let mut combined = Mat::default();
        core::hconcat2(video_frame, &chart_resized, &mut combined)?;
        letterbox_onto_canvas(&combined, &self.config)
    }

    /// mux writes the composited sequence to `output_path` at `fps`.
    /// Chart frames are consumed in step with the video frames; a shorter
    /// chart sequence holds its last image, and `fallback_chart` stands in
    /// when no chart frame exists at all.
    pub fn mux(
        &self,
        store: &FrameStore,
        video_frames: &[PathBuf],
        chart_frames: &[PathBuf],
        fallback_chart: &Mat,
        match_video_width: bool,
        fps: f64,
        output_path: &Path,
    ) -> Result<(), ComparisonError> {
        use crate::modules::video::VideoSink;

        let target = Size::new(self.config.target_width, self.config.target_height);
        let mut sink = VideoSink::create(output_path, fps, target, &self.config)?;

        for (idx, frame_path) in video_frames.iter().enumerate() {
            let video_frame = store.load(frame_path)?;
            let chart_frame = match chart_frames.is_empty() {
                true => fallback_chart.clone(),
                false => store.load(&chart_frames[idx.min(chart_frames.len() - 1)])?,
            };
            let composed = self.compose_frame(&video_frame, &chart_frame, match_video_width)?;
            sink.write(&composed)?;
        }
        sink.release()?;
        info!(
            frames = video_frames.len(),
            output = %output_path.display(),
            "wrote composited video"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: i32, height: i32, value: f64) -> Mat {
        Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(value)).unwrap()
    }

    #[test]
    fn test_letterbox_never_exceeds_target() {
        let cases = [
            (2560, 720),
            (640, 720),
            (1280, 720),
            (3000, 100),
            (100, 3000),
            (1, 1),
        ];
        for (w, h) in cases {
            let (nw, nh) = letterbox_dimensions(w, h, 1280, 720);
            assert!(nw <= 1280 && nh <= 720, "{}x{} scaled to {}x{}", w, h, nw, nh);
            assert!(nw == 1280 || nh == 720, "{}x{} scaled to {}x{}", w, h, nw, nh);
        }
    }

    #[test]
    fn test_letterbox_wide_input_limited_by_width() {
        assert_eq!(letterbox_dimensions(2560, 720, 1280, 720), (1280, 360));
    }

    #[test]
    fn test_letterbox_tall_input_limited_by_height() {
        assert_eq!(letterbox_dimensions(640, 720, 1280, 720), (640, 720));
    }

    #[test]
    fn test_canvas_is_exact_target_resolution() {
        let frame = solid(333, 444, 128.0);
        let canvas = letterbox_onto_canvas(&frame, &ComposeConfig::new()).unwrap();
        assert_eq!(canvas.cols(), 1280);
        assert_eq!(canvas.rows(), 720);
    }

    #[test]
    fn test_compose_frame_is_target_sized() {
        let composer = Composer::new(ComposeConfig::new());
        let video = solid(960, 360, 80.0);
        let chart = solid(640, 760, 255.0);
        for match_width in [false, true] {
            let out = composer.compose_frame(&video, &chart, match_width).unwrap();
            assert_eq!(out.cols(), 1280);
            assert_eq!(out.rows(), 720);
        }
    }

    #[test]
    fn test_mux_consumes_stored_frames() {
        use crate::modules::video::VideoReader;

        let dir = tempfile::tempdir().unwrap();
        let store = FrameStore::create_at(dir.path().join("run")).unwrap();

        let mut video_frames = Vec::new();
        for idx in 0..3 {
            video_frames.push(
                store
                    .save_video_frame(idx, &solid(640, 240, 60.0))
                    .unwrap(),
            );
        }
        let chart_frames = vec![
            store.save_chart_frame(0, &solid(320, 480, 250.0)).unwrap(),
            store.save_chart_frame(1, &solid(320, 480, 250.0)).unwrap(),
        ];

        let output = dir.path().join("out.mp4");
        let composer = Composer::new(ComposeConfig::new());
        let fallback = solid(320, 480, 255.0);
        composer
            .mux(
                &store,
                &video_frames,
                &chart_frames,
                &fallback,
                false,
                30.0,
                &output,
            )
            .unwrap();

        let reader = VideoReader::open(&output).unwrap();
        assert_eq!(reader.width, 1280);
        assert_eq!(reader.height, 720);
        assert!(reader.frame_count >= 3);

        store.remove().unwrap();
        assert!(!dir.path().join("run").exists());
    }
}
