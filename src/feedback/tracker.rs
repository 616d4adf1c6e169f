use crate::feedback::model::{PaletteColor, Path, PathPoint};

/// Accumulates one drag gesture into a [`Path`].
///
/// Independent of any event dispatch: the GUI feeds pointer positions in and
/// takes the finished path out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureTracker {
    points: Vec<PathPoint>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.points.clear();
    }

    /// Appends a point; the first point after `begin`/`end` starts the path.
    pub fn add_point(&mut self, x: f32, y: f32) -> PathPoint {
        let point = PathPoint::from_raw(x, y, self.points.is_empty());
        self.points.push(point);
        point
    }

    pub fn end(&mut self, color: PaletteColor) -> Path {
        Path {
            color,
            points: std::mem::take(&mut self.points),
        }
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn is_idle(&self) -> bool {
        self.points.is_empty()
    }
}
