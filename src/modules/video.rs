use std::path::Path;

use opencv::core::{Mat, Size};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoWriter};
use tracing::{info, warn};

use crate::config::config::ComposeConfig;
use crate::pipeline::pipeline::ComparisonError;

const FALLBACK_FPS: f64 = 30.0;

/// Sequential frame source wrapping an OpenCV capture.
#[derive(Debug)]
pub struct VideoReader {
    cap: VideoCapture,
    pub fps: f64,
    pub width: i32,
    pub height: i32,
    pub frame_count: i64,
}

impl VideoReader {
    /// open validates the source up front: an unopenable file or one that
    /// reports zero frames is an input error, raised before any artifact
    /// of the run exists.
    pub fn open(path: &Path) -> Result<Self, ComparisonError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ComparisonError::Input(format!("non-UTF-8 video path {:?}", path)))?;

        let cap = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        if !cap.is_opened()? {
            return Err(ComparisonError::Input(format!(
                "cannot open video {}",
                path.display()
            )));
        }

        let mut fps = cap.get(videoio::CAP_PROP_FPS)?;
        if !(fps.is_finite() && fps > 0.0) {
            warn!(path = %path.display(), "source reports no frame rate, assuming {FALLBACK_FPS}");
            fps = FALLBACK_FPS;
        }
        let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        let frame_count = cap.get(videoio::CAP_PROP_FRAME_COUNT)? as i64;

        if frame_count <= 0 {
            return Err(ComparisonError::Input(format!(
                "video {} yields zero frames",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            fps, width, height, frame_count, "opened video"
        );

        Ok(VideoReader {
            cap,
            fps,
            width,
            height,
            frame_count,
        })
    }

    /// read_frame returns the next frame, or `None` once the stream is
    /// exhausted. A read failure counts as exhaustion, not as an error.
    pub fn read_frame(&mut self) -> Option<Mat> {
        let mut frame = Mat::default();
        match self.cap.read(&mut frame) {
            Ok(true) if !frame.empty() => Some(frame),
            _ => None,
        }
    }
}

/// Sequential frame sink producing the final encoded video.
pub struct VideoSink {
    writer: VideoWriter,
}

impl VideoSink {
    pub fn create(
        path: &Path,
        fps: f64,
        size: Size,
        config: &ComposeConfig,
    ) -> Result<Self, ComparisonError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| ComparisonError::Encoding(format!("non-UTF-8 output path {:?}", path)))?;

        let [a, b, c, d] = config.fourcc;
        let fourcc = VideoWriter::fourcc(a, b, c, d)?;
        let writer = VideoWriter::new(path_str, fourcc, fps, size, true)?;
        if !writer.is_opened()? {
            return Err(ComparisonError::Encoding(format!(
                "cannot create video writer for {}",
                path.display()
            )));
        }
        Ok(VideoSink { writer })
    }

    pub fn write(&mut self, frame: &Mat) -> Result<(), ComparisonError> {
        self.writer.write(frame)?;
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), ComparisonError> {
        self.writer.release()?;
        Ok(())
    }
}
