use crate::feedback::model::PaletteColor;

/// Width of one swatch slot in the toolbar.
pub const SWATCH_UNIT: f32 = 40.0;
/// Duration of the expand/collapse width animation, in seconds.
pub const EXPAND_ANIMATION_SECS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorPalette {
    active: PaletteColor,
    expanded: bool,
}

impl ColorPalette {
    pub fn active(&self) -> PaletteColor {
        self.active
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn select(&mut self, color: PaletteColor) {
        self.active = color;
        self.expanded = false;
    }

    /// Swatches offered beside the active one while expanded.
    pub fn alternatives(&self) -> impl Iterator<Item = PaletteColor> + '_ {
        PaletteColor::ALL
            .into_iter()
            .filter(move |c| *c != self.active)
    }

    pub fn target_width(&self) -> f32 {
        if self.expanded {
            SWATCH_UNIT * PaletteColor::ALL.len() as f32
        } else {
            SWATCH_UNIT
        }
    }
}
