use crate::feedback::model::PaletteColor;
use crate::feedback::trigger::{TriggerRelease, TriggerWidget, TRIGGER_SIZE};
use eframe::egui::{self, Color32, FontId, Sense};
use std::time::Instant;

/// Draws the floating trigger above everything else. Returns `true` on a tap.
pub(super) fn show_trigger(ctx: &egui::Context, widget: &mut TriggerWidget, now: Instant) -> bool {
    let (x, y) = widget.position();
    let mut tapped = false;

    egui::Area::new(egui::Id::new("snap_ticket_trigger"))
        .order(egui::Order::Foreground)
        .fixed_pos(egui::pos2(x, y))
        .show(ctx, |ui| {
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(TRIGGER_SIZE, TRIGGER_SIZE),
                Sense::click_and_drag(),
            );
            let (pressed, down, released, pointer) = ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_down(),
                    i.pointer.primary_released(),
                    i.pointer.interact_pos(),
                )
            });

            if let Some(pos) = pointer {
                if pressed && response.hovered() {
                    widget.press((pos.x, pos.y), now);
                } else if down {
                    widget.drag_to((pos.x, pos.y));
                }
            }
            if released {
                match widget.release(now) {
                    TriggerRelease::Tap => tapped = true,
                    TriggerRelease::DragEnd => tracing::debug!(pos = ?widget.position(), "trigger moved"),
                    TriggerRelease::Ignored => {}
                }
            }
            if widget.is_dragging() {
                ctx.request_repaint();
            }

            let painter = ui.painter();
            let radius = TRIGGER_SIZE / 2.0;
            painter.circle_filled(
                rect.center() + egui::vec2(0.0, 3.0),
                radius,
                Color32::from_black_alpha(60),
            );
            painter.circle_filled(rect.center(), radius, PaletteColor::Navy.color32());
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "🐛",
                FontId::proportional(32.0),
                Color32::WHITE,
            );
            response.on_hover_text("Report a bug");
        });

    tapped
}
