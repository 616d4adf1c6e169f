#![allow(dead_code)]

use anyhow::{bail, Result};
use image::RgbaImage;
use snap_ticket::feedback::capture::{CaptureOptions, CapturedScreen, ScreenCapture};
use snap_ticket::feedback::error::Failure;
use snap_ticket::feedback::ticket::{DeviceInfo, NewTicket, TicketApi, TicketId};
use snap_ticket::telemetry::ErrorReporter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy)]
pub enum CreateMode {
    Succeed,
    Fail,
}

/// Ticket service double that records the path of every call.
pub struct FakeTickets {
    pub create: CreateMode,
    pub attach_fails: bool,
    pub requests: Mutex<Vec<String>>,
    pub tickets: Mutex<Vec<NewTicket>>,
    pub gate: Option<Mutex<Receiver<()>>>,
}

impl FakeTickets {
    pub fn new(create: CreateMode, attach_fails: bool) -> Self {
        Self {
            create,
            attach_fails,
            requests: Mutex::new(Vec::new()),
            tickets: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Create calls block until the gate receives a value.
    pub fn gated(gate: Receiver<()>) -> Self {
        Self {
            gate: Some(Mutex::new(gate)),
            ..Self::new(CreateMode::Succeed, false)
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl TicketApi for FakeTickets {
    fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketId> {
        if let Some(gate) = &self.gate {
            let _ = gate.lock().unwrap().recv();
        }
        self.requests.lock().unwrap().push("/tickets".to_string());
        self.tickets.lock().unwrap().push(ticket.clone());
        match self.create {
            CreateMode::Succeed => Ok(TicketId::new("abc123")),
            CreateMode::Fail => bail!("503 Service Unavailable"),
        }
    }

    fn attach_screenshot(&self, id: &TicketId, image: &str) -> Result<()> {
        assert!(image.starts_with("data:image/png;base64,"));
        self.requests
            .lock()
            .unwrap()
            .push(format!("/tickets/{id}/screenshot"));
        if self.attach_fails {
            bail!("upload rejected");
        }
        Ok(())
    }
}

/// Screen double handing out numbered captures and recording releases.
pub struct FakeScreen {
    pub fail: bool,
    pub calls: AtomicUsize,
    pub released: Mutex<Vec<String>>,
}

impl FakeScreen {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
            released: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }
}

impl ScreenCapture for FakeScreen {
    fn capture_screen(&self, _options: CaptureOptions) -> Result<CapturedScreen> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("capture permission denied");
        }
        Ok(CapturedScreen {
            uri: format!("file:///tmp/capture_{n}.png"),
            image: Arc::new(RgbaImage::from_pixel(40, 80, image::Rgba([200, 200, 200, 255]))),
        })
    }

    fn release(&self, captured: &CapturedScreen) {
        self.released.lock().unwrap().push(captured.uri.clone());
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub failures: Mutex<Vec<Failure>>,
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, failure: &Failure) {
        self.failures.lock().unwrap().push(failure.clone());
    }
}

pub fn device() -> DeviceInfo {
    DeviceInfo {
        app_version: "1.0.0".into(),
        device: "test-device".into(),
        os_name: "TestOS".into(),
    }
}
