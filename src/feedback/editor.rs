use crate::feedback::canvas::{CanvasScene, ScreenSize, Viewport};
use crate::feedback::capture::CapturedScreen;
use crate::feedback::history::StrokeHistory;
use crate::feedback::model::{PaletteColor, Path, PathPoint};
use crate::feedback::palette::ColorPalette;
use crate::feedback::tracker::GestureTracker;

/// Editing state for one capture. Dropping it is the reset.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    capture: CapturedScreen,
    screen: ScreenSize,
    viewport: Viewport,
    strokes: StrokeHistory,
    tracker: GestureTracker,
    palette: ColorPalette,
    comment: String,
}

impl EditSession {
    pub fn new(capture: CapturedScreen, screen: ScreenSize) -> Self {
        Self {
            capture,
            screen,
            viewport: Viewport::for_screen(screen),
            strokes: StrokeHistory::default(),
            tracker: GestureTracker::new(),
            palette: ColorPalette::default(),
            comment: String::new(),
        }
    }

    pub fn capture(&self) -> &CapturedScreen {
        &self.capture
    }

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn strokes(&self) -> &[Path] {
        self.strokes.strokes()
    }

    pub fn in_progress(&self) -> &[PathPoint] {
        self.tracker.points()
    }

    pub fn active_color(&self) -> PaletteColor {
        self.palette.active()
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn comment_mut(&mut self) -> &mut String {
        &mut self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn add_point(&mut self, x: f32, y: f32) -> PathPoint {
        self.tracker.add_point(x, y)
    }

    /// Ends the current gesture; an empty gesture still yields an (empty) stroke.
    pub fn finish_stroke(&mut self) {
        let path = self.tracker.end(self.palette.active());
        tracing::debug!(points = path.points.len(), color = %path.color.hex(), "stroke finalized");
        self.strokes.commit(path);
    }

    pub fn undo(&mut self) -> Option<Path> {
        self.strokes.undo()
    }

    pub fn toggle_palette(&mut self) {
        self.palette.toggle();
    }

    pub fn select_color(&mut self, color: PaletteColor) {
        self.palette.select(color);
    }

    pub fn scene(&self) -> CanvasScene<'_> {
        CanvasScene {
            background: self.capture.image.as_ref(),
            viewport: self.viewport,
            strokes: self.strokes.strokes(),
            active_color: self.palette.active(),
            in_progress: self.tracker.points(),
        }
    }
}
