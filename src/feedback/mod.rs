pub mod canvas;
pub mod capture;
pub mod editor;
pub mod error;
pub mod history;
pub mod model;
pub mod overlay;
pub mod palette;
pub mod session;
pub mod ticket;
pub mod tracker;
pub mod trigger;

pub use overlay::{Notice, NoticeKind, RootOverlay, Services};
pub use session::{Session, SessionPhase};
