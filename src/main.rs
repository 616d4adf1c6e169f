use eframe::egui;
use snap_ticket::settings::{Settings, SETTINGS_FILE};
use snap_ticket::{logging, FeedbackOverlay};
use std::path::Path;

struct DemoHost {
    overlay: FeedbackOverlay,
    counter: u32,
}

impl eframe::App for DemoHost {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Demo host");
            ui.label("Tap the bug button to report what you see.");
            if ui.button(format!("Clicked {} times", self.counter)).clicked() {
                self.counter += 1;
            }
        });
        self.overlay.show(ctx);
    }
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    let _log_guard = logging::init(
        settings.debug_logging,
        settings.log_dir.as_deref().map(Path::new),
    );
    let overlay = FeedbackOverlay::from_settings(&settings)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 820.0])
            .with_min_inner_size([320.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "snap_ticket demo",
        native_options,
        Box::new(move |_cc| Box::new(DemoHost { overlay, counter: 0 })),
    )
    .map_err(|e| anyhow::anyhow!("demo window failed: {e}"))
}
