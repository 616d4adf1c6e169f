mod editor;
mod trigger;

pub use editor::paint_scene;

use crate::feedback::canvas::ScreenSize;
use crate::feedback::capture::CapturedScreen;
use crate::feedback::trigger::TriggerWidget;
use crate::feedback::{NoticeKind, RootOverlay, SessionPhase};
use crate::settings::Settings;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::time::{Duration, Instant};

const SUBMIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bug-report overlay for an egui host. Call [`FeedbackOverlay::show`] once per
/// frame after the host has drawn its own UI.
pub struct FeedbackOverlay {
    overlay: RootOverlay,
    trigger: Option<TriggerWidget>,
    background: Option<(String, egui::TextureHandle)>,
    toasts: Toasts,
    enable_toasts: bool,
    toast_duration: f32,
}

impl FeedbackOverlay {
    pub fn new(overlay: RootOverlay, settings: &Settings) -> Self {
        Self {
            overlay,
            trigger: None,
            background: None,
            toasts: Toasts::new()
                .anchor(egui::Align2::CENTER_TOP, [0.0, 24.0])
                .direction(egui::Direction::TopDown),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(RootOverlay::from_settings(settings)?, settings))
    }

    pub fn overlay(&self) -> &RootOverlay {
        &self.overlay
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let screen_rect = ctx.screen_rect();
        let screen = ScreenSize::new(screen_rect.width(), screen_rect.height());

        self.overlay.tick(now);
        if let Some(deadline) = self.overlay.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }

        match self.overlay.phase() {
            SessionPhase::Idle => {
                self.background = None;
                let widget = self.trigger.get_or_insert_with(|| TriggerWidget::new(screen));
                widget.set_screen(screen);
                if trigger::show_trigger(ctx, widget, now) {
                    self.overlay.trigger(now, screen);
                    ctx.request_repaint();
                }
            }
            SessionPhase::Capturing => {}
            SessionPhase::Editing | SessionPhase::Submitting => self.show_editor(ctx),
        }

        if self.overlay.phase() == SessionPhase::Submitting {
            ctx.request_repaint_after(SUBMIT_POLL_INTERVAL);
        }

        for notice in self.overlay.take_notices() {
            if !self.enable_toasts {
                continue;
            }
            let kind = match notice.kind {
                NoticeKind::Success => ToastKind::Success,
                NoticeKind::Failure => ToastKind::Error,
            };
            self.toasts.add(Toast {
                text: notice.text.into(),
                kind,
                options: ToastOptions::default().duration_in_seconds(self.toast_duration as f64),
            });
        }
        self.toasts.show(ctx);
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        let Some(capture) = self.overlay.session().edit().map(|edit| edit.capture().clone()) else {
            return;
        };
        let texture = self.background_texture(ctx, &capture);
        let busy = self.overlay.phase() == SessionPhase::Submitting;

        // While submitting the editor stays on screen but read-only.
        let action = if busy {
            self.overlay
                .session()
                .edit()
                .and_then(|edit| editor::show_editor(ctx, editor::EditorView::Busy(edit), texture))
        } else {
            self.overlay
                .edit_mut()
                .and_then(|edit| editor::show_editor(ctx, editor::EditorView::Live(edit), texture))
        };

        match action {
            Some(editor::EditorAction::Close) => {
                self.overlay.close();
            }
            Some(editor::EditorAction::Submit) => {
                self.overlay.submit();
            }
            None => {}
        }
    }

    fn background_texture(
        &mut self,
        ctx: &egui::Context,
        capture: &CapturedScreen,
    ) -> egui::TextureId {
        if let Some((uri, handle)) = &self.background {
            if *uri == capture.uri {
                return handle.id();
            }
        }
        let size = [capture.image.width() as usize, capture.image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, capture.image.as_raw());
        let handle = ctx.load_texture("snap_ticket_capture", color_image, egui::TextureOptions::LINEAR);
        let id = handle.id();
        self.background = Some((capture.uri.clone(), handle));
        id
    }
}
