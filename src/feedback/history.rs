use crate::feedback::model::Path;

/// Finalized strokes in drawing order. Undo drops the newest one; there is no
/// redo.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StrokeHistory {
    strokes: Vec<Path>,
}

impl StrokeHistory {
    pub fn commit(&mut self, path: Path) {
        self.strokes.push(path);
    }

    pub fn undo(&mut self) -> Option<Path> {
        self.strokes.pop()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn strokes(&self) -> &[Path] {
        &self.strokes
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }
}
