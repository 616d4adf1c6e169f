use crate::feedback::canvas::ScreenSize;
use crate::feedback::capture::{
    CaptureOptions, CapturedScreen, DesktopCapture, RasterCapture, ScreenCapture, SurfaceCapture,
};
use crate::feedback::editor::EditSession;
use crate::feedback::error::{Failure, GENERIC_FAILURE_NOTICE};
use crate::feedback::session::{Session, SessionPhase};
use crate::feedback::ticket::{submit_ticket, DeviceInfo, HttpTicketApi, NewTicket, TicketApi, TicketId};
use crate::settings::Settings;
use crate::telemetry::{ErrorReporter, FileReporter};
use anyhow::{anyhow, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SUCCESS_NOTICE: &str = "Report sent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// A user-facing message produced by the overlay, shown by the GUI as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// External collaborators the overlay drives.
#[derive(Clone)]
pub struct Services {
    pub screen: Arc<dyn ScreenCapture>,
    pub surface: Arc<dyn SurfaceCapture>,
    pub tickets: Arc<dyn TicketApi>,
    pub reporter: Option<Arc<dyn ErrorReporter>>,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let reporter = settings
            .telemetry_log
            .as_ref()
            .map(|path| Arc::new(FileReporter::new(path)) as Arc<dyn ErrorReporter>);
        Ok(Self {
            screen: Arc::new(DesktopCapture::new(settings.capture_dir())),
            surface: Arc::new(RasterCapture),
            tickets: Arc::new(HttpTicketApi::from_settings(settings)?),
            reporter,
        })
    }
}

type SubmissionResult = Result<TicketId>;

/// Runs one capture/edit/submit cycle at a time.
///
/// The host calls [`RootOverlay::tick`] every frame; the settle delay and the
/// ticket upload both resolve there, so nothing ever blocks the UI thread.
pub struct RootOverlay {
    session: Session,
    services: Services,
    device: DeviceInfo,
    settle_delay: Duration,
    capture_options: CaptureOptions,
    notices: Vec<Notice>,
    pending: Option<Receiver<SubmissionResult>>,
}

impl RootOverlay {
    pub fn new(services: Services, device: DeviceInfo, settle_delay: Duration) -> Self {
        Self {
            session: Session::Idle,
            services,
            device,
            settle_delay,
            capture_options: CaptureOptions::default(),
            notices: Vec::new(),
            pending: None,
        }
    }

    pub fn with_capture_options(mut self, options: CaptureOptions) -> Self {
        self.capture_options = options;
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let services = Services::from_settings(settings)?;
        Ok(
            Self::new(services, DeviceInfo::detect(settings), settings.settle_delay())
                .with_capture_options(CaptureOptions {
                    include_gpu_surfaces: settings.include_gpu_surfaces,
                }),
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditSession> {
        self.session.edit_mut()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// When the next timed step is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.session {
            Session::Capturing { ready_at, .. } => Some(*ready_at),
            _ => None,
        }
    }

    /// Trigger tap: hide the trigger now and capture once the delay has passed.
    pub fn trigger(&mut self, now: Instant, screen: ScreenSize) -> bool {
        let started = self.session.begin_capture(now + self.settle_delay, screen);
        if started {
            tracing::debug!(delay_ms = self.settle_delay.as_millis() as u64, "capture scheduled");
        }
        started
    }

    pub fn tick(&mut self, now: Instant) {
        if self.session.capture_due(now).is_some() {
            self.capture();
        }
        self.poll_submission();
    }

    fn capture(&mut self) {
        match self.services.screen.capture_screen(self.capture_options) {
            Ok(captured) => {
                tracing::info!(uri = %captured.uri, "editing capture");
                self.session.capture_succeeded(captured);
            }
            Err(err) => {
                self.session.capture_failed();
                self.fail(Failure::capture(&err));
            }
        }
    }

    /// Closes the editor without submitting.
    pub fn close(&mut self) -> bool {
        let captured = self.current_capture();
        let closed = self.session.close();
        if closed {
            self.release(captured);
        }
        closed
    }

    fn current_capture(&self) -> Option<CapturedScreen> {
        self.session.edit().map(|edit| edit.capture().clone())
    }

    fn release(&self, captured: Option<CapturedScreen>) {
        if let Some(captured) = captured {
            self.services.screen.release(&captured);
        }
    }

    /// Flattens the canvas and starts the ticket upload on a worker thread.
    pub fn submit(&mut self) -> bool {
        if !self.session.begin_submit() {
            return false;
        }
        let prepared = match self.session.edit() {
            Some(edit) => self
                .services
                .surface
                .capture_data_uri(&edit.scene())
                .map(|image| (image, NewTicket::new(edit.comment(), &self.device, edit.screen()))),
            None => return false,
        };
        let (image, ticket) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                self.session.submit_failed();
                self.fail(Failure::capture(&err));
                return false;
            }
        };

        let api = Arc::clone(&self.services.tickets);
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("snap-ticket-submit".into())
            .spawn(move || {
                let result = submit_ticket(api.as_ref(), &ticket, &image);
                let _ = tx.send(result);
            });
        match spawned {
            Ok(_) => {
                self.pending = Some(rx);
                true
            }
            Err(err) => {
                self.session.submit_failed();
                self.fail(Failure::network(&anyhow!(err).context("start submission worker")));
                false
            }
        }
    }

    fn poll_submission(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(anyhow!("submission worker exited without a result")),
        };
        self.pending = None;
        self.finish_submission(result);
    }

    /// Blocks until the in-flight submission resolves or `timeout` elapses.
    /// Returns `true` once a result has been applied.
    #[doc(hidden)]
    pub fn wait_for_submission(&mut self, timeout: Duration) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return false,
            Err(RecvTimeoutError::Disconnected) => Err(anyhow!("submission worker exited without a result")),
        };
        self.pending = None;
        self.finish_submission(result);
        true
    }

    fn finish_submission(&mut self, result: SubmissionResult) {
        match result {
            Ok(id) => {
                tracing::info!(ticket = %id, "report submitted");
                let captured = self.current_capture();
                if self.session.submit_succeeded() {
                    self.release(captured);
                }
                self.notices.push(Notice {
                    kind: NoticeKind::Success,
                    text: SUCCESS_NOTICE.into(),
                });
            }
            Err(err) => {
                self.session.submit_failed();
                self.fail(Failure::network(&err));
            }
        }
    }

    fn fail(&mut self, failure: Failure) {
        tracing::error!(kind = %failure.kind, detail = %failure.detail, "feedback operation failed");
        if let Some(reporter) = &self.services.reporter {
            reporter.report(&failure);
        }
        self.notices.push(Notice {
            kind: NoticeKind::Failure,
            text: GENERIC_FAILURE_NOTICE.into(),
        });
    }
}
