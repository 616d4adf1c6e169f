use crate::feedback::canvas::CanvasScene;
use crate::feedback::editor::EditSession;
use crate::feedback::model::{PaletteColor, STROKE_WIDTH};
use crate::feedback::palette::{EXPAND_ANIMATION_SECS, SWATCH_UNIT};
use eframe::egui::{
    self, Align, Color32, Layout, Painter, Pos2, Rect, RichText, Sense, Shape, Stroke, TextureId,
    Vec2,
};

const SWATCH_RADIUS: f32 = 12.0;
const SUBMIT_WIDTH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EditorAction {
    Close,
    Submit,
}

pub(super) enum EditorView<'a> {
    Live(&'a mut EditSession),
    /// A submission is in flight; nothing may change.
    Busy(&'a EditSession),
}

impl EditorView<'_> {
    fn edit(&self) -> &EditSession {
        match self {
            EditorView::Live(edit) => edit,
            EditorView::Busy(edit) => edit,
        }
    }

    fn is_busy(&self) -> bool {
        matches!(self, EditorView::Busy(_))
    }
}

/// Full-screen markup editor: toolbar, annotation canvas, comment footer.
pub(super) fn show_editor(
    ctx: &egui::Context,
    mut view: EditorView<'_>,
    background: TextureId,
) -> Option<EditorAction> {
    let mut action = None;
    let busy = view.is_busy();

    egui::Window::new("Report a bug")
        .id(egui::Id::new("snap_ticket_editor"))
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .fixed_rect(ctx.screen_rect())
        .frame(egui::Frame::none().fill(Color32::BLACK).inner_margin(8.0))
        .show(ctx, |ui| {
            toolbar(ui, &mut view, &mut action);
            ui.add_space(8.0);
            ui.vertical_centered(|ui| canvas(ui, &mut view, background));
            ui.add_space(8.0);
            footer(ui, &mut view, &mut action);
        });

    if busy {
        None
    } else {
        action
    }
}

fn toolbar(ui: &mut egui::Ui, view: &mut EditorView<'_>, action: &mut Option<EditorAction>) {
    let busy = view.is_busy();
    ui.horizontal(|ui| {
        ui.add_enabled_ui(!busy, |ui| {
            let close = egui::Button::new(RichText::new("✕").size(20.0).color(Color32::WHITE))
                .frame(false);
            if ui.add(close).on_hover_text("Close").clicked() {
                *action = Some(EditorAction::Close);
            }
        });
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.add_enabled_ui(!busy, |ui| {
                palette(ui, view);
                let undo = egui::Button::new(RichText::new("↶").size(20.0).color(Color32::WHITE))
                    .frame(false);
                if ui.add(undo).on_hover_text("Undo").clicked() {
                    if let EditorView::Live(edit) = view {
                        edit.undo();
                    }
                }
            });
        });
    });
}

fn swatch(ui: &mut egui::Ui, color: PaletteColor) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(Vec2::splat(SWATCH_UNIT), Sense::click());
    ui.painter().circle(
        rect.center(),
        SWATCH_RADIUS,
        color.color32(),
        Stroke::new(1.0, Color32::WHITE),
    );
    response
}

fn palette(ui: &mut egui::Ui, view: &mut EditorView<'_>) {
    let state = *view.edit().palette();
    let width = ui.ctx().animate_value_with_time(
        egui::Id::new("snap_ticket_palette_width"),
        state.target_width(),
        EXPAND_ANIMATION_SECS,
    );

    let mut toggled = false;
    let mut picked = None;
    ui.allocate_ui_with_layout(
        egui::vec2(width, SWATCH_UNIT),
        Layout::left_to_right(Align::Center),
        |ui| {
            let clip = ui.max_rect().intersect(ui.clip_rect());
            ui.set_clip_rect(clip);
            if swatch(ui, state.active()).clicked() {
                toggled = true;
            }
            for color in state.alternatives() {
                if swatch(ui, color).clicked() {
                    picked = Some(color);
                }
            }
        },
    );

    if let EditorView::Live(edit) = view {
        if let Some(color) = picked {
            edit.select_color(color);
        } else if toggled {
            edit.toggle_palette();
        }
    }
}

fn canvas(ui: &mut egui::Ui, view: &mut EditorView<'_>, background: TextureId) {
    let viewport = view.edit().viewport();
    let (response, painter) =
        ui.allocate_painter(egui::vec2(viewport.width, viewport.height), Sense::drag());
    let origin = response.rect.min;

    if let EditorView::Live(edit) = view {
        let moved = ui.input(|i| i.pointer.delta()) != Vec2::ZERO;
        if response.dragged() && moved {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - origin;
                edit.add_point(local.x, local.y);
                ui.ctx().request_repaint();
            }
        }
        if response.drag_stopped() {
            edit.finish_stroke();
        }
    }

    paint_scene(&painter, origin, &view.edit().scene(), background);
}

/// Paints a canvas scene with its top-left corner at `origin`.
pub fn paint_scene(painter: &Painter, origin: Pos2, scene: &CanvasScene<'_>, background: TextureId) {
    let viewport = Rect::from_min_size(origin, egui::vec2(scene.viewport.width, scene.viewport.height));
    painter.rect_filled(viewport, 0.0, Color32::BLACK);

    let fit = scene.background_rect();
    let image_rect = Rect::from_min_size(
        origin + egui::vec2(fit.x, fit.y),
        egui::vec2(fit.width, fit.height),
    );
    painter.image(
        background,
        image_rect,
        Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
        Color32::WHITE,
    );

    let radius = STROKE_WIDTH / 2.0;
    for (color, points) in scene.layers() {
        if points.len() < 2 {
            continue;
        }
        let color = color.color32();
        let points: Vec<Pos2> = points
            .iter()
            .map(|p| origin + egui::vec2(p.x as f32, p.y as f32))
            .collect();
        // Discs on every vertex give round joins and caps.
        for p in &points {
            painter.circle_filled(*p, radius, color);
        }
        painter.add(Shape::line(points, Stroke::new(STROKE_WIDTH, color)));
    }
}

fn footer(ui: &mut egui::Ui, view: &mut EditorView<'_>, action: &mut Option<EditorAction>) {
    ui.horizontal(|ui| {
        let comment_width = (ui.available_width() - SUBMIT_WIDTH - 8.0).max(0.0);
        match view {
            EditorView::Live(edit) => {
                ui.add_sized(
                    [comment_width, 32.0],
                    egui::TextEdit::singleline(edit.comment_mut()).hint_text("Write a comment"),
                );
                let submit = egui::Button::new("Add").min_size(egui::vec2(SUBMIT_WIDTH, 32.0));
                if ui.add(submit).clicked() {
                    *action = Some(EditorAction::Submit);
                }
            }
            EditorView::Busy(edit) => {
                let mut comment = edit.comment().to_string();
                ui.add_enabled(
                    false,
                    egui::TextEdit::singleline(&mut comment).desired_width(comment_width),
                );
                ui.add_sized([SUBMIT_WIDTH, 32.0], egui::Spinner::new());
            }
        }
    });
}
