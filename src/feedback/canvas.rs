use crate::feedback::model::{PaletteColor, Path, PathPoint, STROKE_WIDTH};
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::io::Cursor;

/// Share of the screen height taken by the annotation viewport.
pub const VIEWPORT_HEIGHT_RATIO: f32 = 0.72;

/// Editor backdrop; visible wherever the screenshot does not cover the viewport.
pub const BACKDROP: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

impl ScreenSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn for_screen(screen: ScreenSize) -> Self {
        let height = screen.height * VIEWPORT_HEIGHT_RATIO;
        let aspect = if screen.height > 0.0 {
            screen.width / screen.height
        } else {
            0.0
        };
        Self {
            width: height * aspect,
            height,
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Largest centered rect with the image's aspect ratio that fits the viewport.
pub fn contain_fit(image_width: u32, image_height: u32, viewport: Viewport) -> FitRect {
    if image_width == 0 || image_height == 0 {
        return FitRect {
            x: viewport.width / 2.0,
            y: viewport.height / 2.0,
            width: 0.0,
            height: 0.0,
        };
    }
    let scale = (viewport.width / image_width as f32).min(viewport.height / image_height as f32);
    let width = image_width as f32 * scale;
    let height = image_height as f32 * scale;
    FitRect {
        x: (viewport.width - width) / 2.0,
        y: (viewport.height - height) / 2.0,
        width,
        height,
    }
}

/// Everything the annotation canvas shows, in paint order.
///
/// The GUI paints this value and [`render_scene`] rasterizes the same value,
/// so the uploaded image matches what is on screen.
#[derive(Debug, Clone, Copy)]
pub struct CanvasScene<'a> {
    pub background: &'a RgbaImage,
    pub viewport: Viewport,
    pub strokes: &'a [Path],
    pub active_color: PaletteColor,
    pub in_progress: &'a [PathPoint],
}

impl<'a> CanvasScene<'a> {
    /// Finalized strokes first, the in-progress stroke last.
    pub fn layers(&self) -> impl Iterator<Item = (PaletteColor, &'a [PathPoint])> + '_ {
        self.strokes
            .iter()
            .map(|p| (p.color, p.points.as_slice()))
            .chain(std::iter::once((self.active_color, self.in_progress)))
    }

    pub fn background_rect(&self) -> FitRect {
        contain_fit(self.background.width(), self.background.height(), self.viewport)
    }
}

pub fn render_scene(scene: &CanvasScene<'_>) -> RgbaImage {
    let (width, height) = scene.viewport.pixel_size();
    let mut img = RgbaImage::from_pixel(width, height, BACKDROP);

    let fit = scene.background_rect();
    let fit_w = fit.width.round() as u32;
    let fit_h = fit.height.round() as u32;
    let (fit_x, fit_y) = (fit.x.round() as i64, fit.y.round() as i64);
    if (fit_w, fit_h) == scene.background.dimensions() {
        imageops::overlay(&mut img, scene.background, fit_x, fit_y);
    } else if fit_w > 0 && fit_h > 0 {
        let scaled = imageops::resize(scene.background, fit_w, fit_h, FilterType::Triangle);
        imageops::overlay(&mut img, &scaled, fit_x, fit_y);
    }

    let radius = STROKE_WIDTH / 2.0;
    for (color, points) in scene.layers() {
        let rgba = color.rgba();
        for seg in points.windows(2) {
            draw_segment(&mut img, seg[0], seg[1], radius, rgba);
        }
    }
    img
}

// Strokes are opaque, so stamped discs overwrite instead of blending.
fn stamp_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    let radius_sq = radius * radius;
    let width = img.width() as i32;
    let height = img.height() as i32;
    let min_x = (cx - radius).floor().max(0.0) as i32;
    let max_x = ((cx + radius).ceil() as i32).min(width - 1);
    let min_y = (cy - radius).floor().max(0.0) as i32;
    let max_y = ((cy + radius).ceil() as i32).min(height - 1);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= radius_sq {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn draw_segment(img: &mut RgbaImage, a: PathPoint, b: PathPoint, radius: f32, color: Rgba<u8>) {
    // Points are never clamped, so only the part that can touch a pixel is stepped.
    let pad = f64::from(radius) + 1.0;
    let max = (f64::from(img.width()) + pad, f64::from(img.height()) + pad);
    let Some(((ax, ay), (bx, by))) = clip_segment(
        (f64::from(a.x), f64::from(a.y)),
        (f64::from(b.x), f64::from(b.y)),
        (-pad, -pad),
        max,
    ) else {
        return;
    };
    let dx = bx - ax;
    let dy = by - ay;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
    for i in 0..=steps {
        let t = f64::from(i) / f64::from(steps);
        stamp_disc(img, (ax + dx * t) as f32, (ay + dy * t) as f32, radius, color);
    }
}

type Segment = ((f64, f64), (f64, f64));

/// Liang-Barsky clip of `a`-`b` against the box `min`..`max`.
fn clip_segment(a: (f64, f64), b: (f64, f64), min: (f64, f64), max: (f64, f64)) -> Option<Segment> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, a.0 - min.0),
        (dx, max.0 - a.0),
        (-dy, a.1 - min.1),
        (dy, max.1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

pub fn encode_png_data_uri(img: &RgbaImage) -> Result<String> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .context("encode annotated canvas as PNG")?;
    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(bytes)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i32, y: i32, move_to: bool) -> PathPoint {
        PathPoint { x, y, move_to }
    }

    #[test]
    fn viewport_is_72_percent_of_height_with_screen_aspect() {
        let vp = Viewport::for_screen(ScreenSize::new(400.0, 800.0));
        assert!((vp.height - 576.0).abs() < 1e-3);
        assert!((vp.width - 288.0).abs() < 1e-3);
        assert_eq!(vp.pixel_size(), (288, 576));
    }

    #[test]
    fn contain_fit_letterboxes_wide_image() {
        let fit = contain_fit(200, 100, Viewport { width: 100.0, height: 100.0 });
        assert_eq!(fit.width, 100.0);
        assert_eq!(fit.height, 50.0);
        assert_eq!(fit.x, 0.0);
        assert_eq!(fit.y, 25.0);
    }

    #[test]
    fn layers_put_in_progress_stroke_last() {
        let bg = RgbaImage::new(1, 1);
        let strokes = vec![Path {
            color: PaletteColor::Navy,
            points: vec![pt(0, 0, true)],
        }];
        let active = [pt(5, 5, true)];
        let scene = CanvasScene {
            background: &bg,
            viewport: Viewport { width: 10.0, height: 10.0 },
            strokes: &strokes,
            active_color: PaletteColor::Yellow,
            in_progress: &active,
        };
        let colors: Vec<_> = scene.layers().map(|(c, _)| c).collect();
        assert_eq!(colors, vec![PaletteColor::Navy, PaletteColor::Yellow]);
    }

    #[test]
    fn render_draws_strokes_over_background() {
        let bg = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let strokes = vec![Path {
            color: PaletteColor::Navy,
            points: vec![pt(2, 10, true), pt(17, 10, false)],
        }];
        let active = [pt(10, 2, true), pt(10, 4, false)];
        let scene = CanvasScene {
            background: &bg,
            viewport: Viewport { width: 20.0, height: 20.0 },
            strokes: &strokes,
            active_color: PaletteColor::Coral,
            in_progress: &active,
        };
        let out = render_scene(&scene);
        assert_eq!(out.dimensions(), (20, 20));
        assert_eq!(*out.get_pixel(9, 9), PaletteColor::Navy.rgba());
        assert_eq!(*out.get_pixel(9, 3), PaletteColor::Coral.rgba());
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn single_point_path_paints_nothing() {
        let bg = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let strokes = vec![Path {
            color: PaletteColor::Navy,
            points: vec![pt(4, 4, true)],
        }];
        let scene = CanvasScene {
            background: &bg,
            viewport: Viewport { width: 8.0, height: 8.0 },
            strokes: &strokes,
            active_color: PaletteColor::Coral,
            in_progress: &[],
        };
        let out = render_scene(&scene);
        assert!(out.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn clip_keeps_inner_segment_and_trims_outer_ones() {
        let inner = clip_segment((1.0, 1.0), (5.0, 5.0), (0.0, 0.0), (10.0, 10.0));
        assert_eq!(inner, Some(((1.0, 1.0), (5.0, 5.0))));

        let (a, b) = clip_segment((-1e9, 5.0), (1e9, 5.0), (0.0, 0.0), (10.0, 10.0))
            .expect("crosses the box");
        assert!((a.0 - 0.0).abs() < 1e-3 && (b.0 - 10.0).abs() < 1e-3);
        assert_eq!((a.1, b.1), (5.0, 5.0));

        assert_eq!(
            clip_segment((-50.0, -50.0), (-20.0, 80.0), (0.0, 0.0), (10.0, 10.0)),
            None
        );
        assert_eq!(
            clip_segment((20.0, 3.0), (20.0, 8.0), (0.0, 0.0), (10.0, 10.0)),
            None
        );
    }

    #[test]
    fn far_out_stroke_is_clipped_to_canvas() {
        let bg = RgbaImage::from_pixel(288, 576, Rgba([255, 255, 255, 255]));
        let strokes = vec![
            Path {
                color: PaletteColor::Navy,
                points: vec![pt(-200_000_000, 100, true), pt(200_000_000, 100, false)],
            },
            Path {
                color: PaletteColor::Coral,
                points: vec![pt(-300_000_000, -300_000_000, true), pt(-300_000_000, 300_000_000, false)],
            },
        ];
        let scene = CanvasScene {
            background: &bg,
            viewport: Viewport { width: 288.0, height: 576.0 },
            strokes: &strokes,
            active_color: PaletteColor::Coral,
            in_progress: &[],
        };
        let started = std::time::Instant::now();
        let out = render_scene(&scene);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert_eq!(*out.get_pixel(0, 100), PaletteColor::Navy.rgba());
        assert_eq!(*out.get_pixel(144, 100), PaletteColor::Navy.rgba());
        assert_eq!(*out.get_pixel(287, 100), PaletteColor::Navy.rgba());
        assert_eq!(*out.get_pixel(144, 300), Rgba([255, 255, 255, 255]));
        assert!(out.pixels().all(|p| *p != PaletteColor::Coral.rgba()));
    }

    #[test]
    fn data_uri_has_png_prefix() {
        let img = RgbaImage::from_pixel(2, 2, BACKDROP);
        let uri = encode_png_data_uri(&img).expect("encode");
        assert!(uri.starts_with("data:image/png;base64,"));
        let payload = uri.trim_start_matches("data:image/png;base64,");
        let bytes = general_purpose::STANDARD.decode(payload).expect("base64");
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
