use crate::feedback::canvas::ScreenSize;
use crate::feedback::capture::CapturedScreen;
use crate::feedback::editor::EditSession;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Capturing,
    Editing,
    Submitting,
}

pub fn can_transition(from: SessionPhase, to: SessionPhase) -> bool {
    matches!(
        (from, to),
        (SessionPhase::Idle, SessionPhase::Capturing)
            | (SessionPhase::Capturing, SessionPhase::Editing)
            | (SessionPhase::Capturing, SessionPhase::Idle)
            | (SessionPhase::Editing, SessionPhase::Submitting)
            | (SessionPhase::Editing, SessionPhase::Idle)
            | (SessionPhase::Submitting, SessionPhase::Editing)
            | (SessionPhase::Submitting, SessionPhase::Idle)
    )
}

/// The whole overlay state. Visibility of the trigger and the editor is
/// derived from the variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Session {
    #[default]
    Idle,
    /// Trigger hidden; the screen is captured once `ready_at` passes.
    Capturing { ready_at: Instant, screen: ScreenSize },
    Editing(EditSession),
    Submitting(EditSession),
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Session::Idle => SessionPhase::Idle,
            Session::Capturing { .. } => SessionPhase::Capturing,
            Session::Editing(_) => SessionPhase::Editing,
            Session::Submitting(_) => SessionPhase::Submitting,
        }
    }

    pub fn trigger_visible(&self) -> bool {
        matches!(self, Session::Idle)
    }

    pub fn editor_visible(&self) -> bool {
        matches!(self, Session::Editing(_) | Session::Submitting(_))
    }

    pub fn edit(&self) -> Option<&EditSession> {
        match self {
            Session::Editing(edit) | Session::Submitting(edit) => Some(edit),
            _ => None,
        }
    }

    /// Mutable editing state; `None` while submitting so in-flight data stays put.
    pub fn edit_mut(&mut self) -> Option<&mut EditSession> {
        match self {
            Session::Editing(edit) => Some(edit),
            _ => None,
        }
    }

    pub fn capture_reference(&self) -> Option<&str> {
        self.edit().map(|edit| edit.capture().uri.as_str())
    }

    /// Screen size to capture at, once the settle deadline has passed.
    pub fn capture_due(&self, now: Instant) -> Option<ScreenSize> {
        match self {
            Session::Capturing { ready_at, screen } if now >= *ready_at => Some(*screen),
            _ => None,
        }
    }

    fn guard(&self, to: SessionPhase) -> bool {
        let from = self.phase();
        if can_transition(from, to) {
            tracing::debug!(?from, ?to, "session transition");
            true
        } else {
            tracing::debug!(?from, ?to, "session transition rejected");
            false
        }
    }

    pub fn begin_capture(&mut self, ready_at: Instant, screen: ScreenSize) -> bool {
        if !self.guard(SessionPhase::Capturing) {
            return false;
        }
        *self = Session::Capturing { ready_at, screen };
        true
    }

    pub fn capture_succeeded(&mut self, captured: CapturedScreen) -> bool {
        let Session::Capturing { screen, .. } = *self else {
            return false;
        };
        if !self.guard(SessionPhase::Editing) {
            return false;
        }
        *self = Session::Editing(EditSession::new(captured, screen));
        true
    }

    pub fn capture_failed(&mut self) -> bool {
        if !matches!(self, Session::Capturing { .. }) || !self.guard(SessionPhase::Idle) {
            return false;
        }
        *self = Session::Idle;
        true
    }

    pub fn begin_submit(&mut self) -> bool {
        if !matches!(self, Session::Editing(_)) || !self.guard(SessionPhase::Submitting) {
            return false;
        }
        if let Session::Editing(edit) = std::mem::take(self) {
            *self = Session::Submitting(edit);
        }
        true
    }

    /// Back to editing with every stroke, the comment, and the color intact.
    pub fn submit_failed(&mut self) -> bool {
        if !matches!(self, Session::Submitting(_)) || !self.guard(SessionPhase::Editing) {
            return false;
        }
        if let Session::Submitting(edit) = std::mem::take(self) {
            *self = Session::Editing(edit);
        }
        true
    }

    pub fn submit_succeeded(&mut self) -> bool {
        if !matches!(self, Session::Submitting(_)) || !self.guard(SessionPhase::Idle) {
            return false;
        }
        *self = Session::Idle;
        true
    }

    /// Explicit close from the editor. Ignored while a submission is in flight.
    pub fn close(&mut self) -> bool {
        if !matches!(self, Session::Editing(_)) || !self.guard(SessionPhase::Idle) {
            return false;
        }
        *self = Session::Idle;
        true
    }
}
