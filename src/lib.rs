//! Floating bug-report overlay for egui applications: tap the trigger, mark up
//! the captured screen, add a comment, and file a ticket.

pub mod feedback;
pub mod gui;
pub mod logging;
pub mod settings;
pub mod telemetry;

pub use feedback::{RootOverlay, Services, Session, SessionPhase};
pub use gui::FeedbackOverlay;
pub use settings::Settings;
