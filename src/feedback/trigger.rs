use crate::feedback::canvas::ScreenSize;
use std::time::{Duration, Instant};

/// Diameter of the floating trigger.
pub const TRIGGER_SIZE: f32 = 72.0;
/// Gap between the trigger and the screen corner at its initial position.
pub const TRIGGER_MARGIN: f32 = 16.0;
/// Movement beyond this turns a press into a drag.
pub const DRAG_SLOP: f32 = 6.0;
/// Presses held longer than this are not taps.
pub const SHORT_PRESS: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRelease {
    Tap,
    DragEnd,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    started: Instant,
    pointer: (f32, f32),
    origin: (f32, f32),
    dragging: bool,
}

/// Position and press state of the floating trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerWidget {
    pos: (f32, f32),
    screen: ScreenSize,
    press: Option<Press>,
}

impl TriggerWidget {
    pub fn new(screen: ScreenSize) -> Self {
        let mut widget = Self {
            pos: (
                screen.width - (TRIGGER_SIZE + TRIGGER_MARGIN),
                screen.height - (TRIGGER_SIZE + TRIGGER_MARGIN),
            ),
            screen,
            press: None,
        };
        widget.pos = widget.clamp(widget.pos);
        widget
    }

    /// Top-left corner of the trigger.
    pub fn position(&self) -> (f32, f32) {
        self.pos
    }

    pub fn is_dragging(&self) -> bool {
        self.press.map(|p| p.dragging).unwrap_or(false)
    }

    pub fn set_screen(&mut self, screen: ScreenSize) {
        if self.screen != screen {
            self.screen = screen;
            self.pos = self.clamp(self.pos);
        }
    }

    fn clamp(&self, (x, y): (f32, f32)) -> (f32, f32) {
        let max_x = (self.screen.width - TRIGGER_SIZE).max(0.0);
        let max_y = (self.screen.height - TRIGGER_SIZE).max(0.0);
        (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }

    pub fn press(&mut self, pointer: (f32, f32), now: Instant) {
        self.press = Some(Press {
            started: now,
            pointer,
            origin: self.pos,
            dragging: false,
        });
    }

    pub fn drag_to(&mut self, pointer: (f32, f32)) {
        let Some(mut press) = self.press else {
            return;
        };
        let dx = pointer.0 - press.pointer.0;
        let dy = pointer.1 - press.pointer.1;
        if !press.dragging && dx * dx + dy * dy > DRAG_SLOP * DRAG_SLOP {
            press.dragging = true;
        }
        if press.dragging {
            self.pos = self.clamp((press.origin.0 + dx, press.origin.1 + dy));
        }
        self.press = Some(press);
    }

    pub fn release(&mut self, now: Instant) -> TriggerRelease {
        match self.press.take() {
            None => TriggerRelease::Ignored,
            Some(press) if press.dragging => TriggerRelease::DragEnd,
            Some(press) if now.duration_since(press.started) <= SHORT_PRESS => TriggerRelease::Tap,
            Some(_) => TriggerRelease::Ignored,
        }
    }
}
