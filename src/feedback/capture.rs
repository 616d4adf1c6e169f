use crate::feedback::canvas::{encode_png_data_uri, render_scene, CanvasScene};
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use image::RgbaImage;
use screenshots::Screen;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureOptions {
    /// Ask for GPU-rendered surfaces on platforms that capture them through a
    /// separate path. [`DesktopCapture`] reads the composited framebuffer and
    /// ignores it.
    pub include_gpu_surfaces: bool,
}

/// A captured screenshot: where it was stored plus its pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedScreen {
    pub uri: String,
    pub image: Arc<RgbaImage>,
}

pub trait ScreenCapture: Send + Sync {
    fn capture_screen(&self, options: CaptureOptions) -> Result<CapturedScreen>;

    /// Called once the session holding `captured` has ended.
    fn release(&self, _captured: &CapturedScreen) {}
}

/// Flattens a rendered canvas into an uploadable data URI.
pub trait SurfaceCapture: Send + Sync {
    fn capture_data_uri(&self, scene: &CanvasScene<'_>) -> Result<String>;
}

/// Captures the primary display with `screenshots` and keeps a PNG copy on disk.
#[derive(Debug, Clone)]
pub struct DesktopCapture {
    output_dir: PathBuf,
}

impl DesktopCapture {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Writes `img` to the capture folder and wraps it with its `file://` URI.
    pub fn store(&self, img: RgbaImage) -> Result<CapturedScreen> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("create capture folder {}", self.output_dir.display())
        })?;
        let dir = self.output_dir.canonicalize().with_context(|| {
            format!("resolve capture folder {}", self.output_dir.display())
        })?;
        let path = dir.join(capture_filename(Local::now()));
        img.save(&path)
            .with_context(|| format!("write capture {}", path.display()))?;
        let uri = Url::from_file_path(&path)
            .map_err(|_| anyhow!("capture path is not absolute: {}", path.display()))?
            .to_string();
        tracing::debug!(%uri, width = img.width(), height = img.height(), "screen captured");

        Ok(CapturedScreen {
            uri,
            image: Arc::new(img),
        })
    }
}

impl ScreenCapture for DesktopCapture {
    fn capture_screen(&self, _options: CaptureOptions) -> Result<CapturedScreen> {
        let screen = Screen::from_point(0, 0).context("locate primary screen")?;
        let img: RgbaImage = screen.capture().context("capture primary screen")?;
        self.store(img)
    }

    fn release(&self, captured: &CapturedScreen) {
        let Some(path) = Url::parse(&captured.uri)
            .ok()
            .and_then(|url| url.to_file_path().ok())
        else {
            return;
        };
        // Only files this capture wrote are removed.
        let Ok(dir) = self.output_dir.canonicalize() else {
            return;
        };
        if !path.starts_with(dir) {
            return;
        }
        if let Err(err) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove capture");
        }
    }
}

pub fn capture_filename(now: chrono::DateTime<Local>) -> String {
    format!("snap_ticket_{}.png", now.format("%Y%m%d_%H%M%S_%3f"))
}

/// Rasterizes the scene in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCapture;

impl SurfaceCapture for RasterCapture {
    fn capture_data_uri(&self, scene: &CanvasScene<'_>) -> Result<String> {
        let flattened = render_scene(scene);
        encode_png_data_uri(&flattened)
    }
}
