use eframe::egui::Color32;
use std::fmt::Write as _;

/// Width of every annotation stroke, in canvas units.
pub const STROKE_WIDTH: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    Navy,
    Coral,
    Yellow,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 3] = [PaletteColor::Navy, PaletteColor::Coral, PaletteColor::Yellow];

    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            PaletteColor::Navy => (0x16, 0x06, 0x47),
            PaletteColor::Coral => (0xFF, 0x4F, 0x6D),
            PaletteColor::Yellow => (0xFC, 0xFF, 0x52),
        }
    }

    pub fn hex(self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    pub fn color32(self) -> Color32 {
        let (r, g, b) = self.rgb();
        Color32::from_rgb(r, g, b)
    }

    pub fn rgba(self) -> image::Rgba<u8> {
        let (r, g, b) = self.rgb();
        image::Rgba([r, g, b, 255])
    }
}

impl Default for PaletteColor {
    fn default() -> Self {
        PaletteColor::Coral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPoint {
    pub x: i32,
    pub y: i32,
    /// Set on the first point of a path only.
    pub move_to: bool,
}

impl PathPoint {
    pub fn from_raw(x: f32, y: f32, move_to: bool) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
            move_to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub color: PaletteColor,
    pub points: Vec<PathPoint>,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// SVG path data, e.g. `M10,20 11,21 `.
    pub fn svg_data(&self) -> String {
        svg_data(&self.points)
    }
}

pub fn svg_data(points: &[PathPoint]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    for p in points {
        if p.move_to {
            out.push('M');
        }
        let _ = write!(out, "{},{} ", p.x, p.y);
    }
    out
}
