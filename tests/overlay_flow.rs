use anyhow::{bail, Result};
use snap_ticket::feedback::canvas::{CanvasScene, ScreenSize};
use snap_ticket::feedback::capture::{RasterCapture, SurfaceCapture};
use snap_ticket::feedback::error::{FailureKind, GENERIC_FAILURE_NOTICE};
use snap_ticket::feedback::model::PaletteColor;
use snap_ticket::feedback::overlay::SUCCESS_NOTICE;
use snap_ticket::feedback::{NoticeKind, RootOverlay, Services, SessionPhase};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[path = "fakes.rs"]
mod fakes;
use fakes::{device, CreateMode, FakeScreen, FakeTickets, RecordingReporter};

const SETTLE: Duration = Duration::from_millis(100);
const WAIT: Duration = Duration::from_secs(5);

struct FailingSurface;

impl SurfaceCapture for FailingSurface {
    fn capture_data_uri(&self, _scene: &CanvasScene<'_>) -> Result<String> {
        bail!("canvas not renderable")
    }
}

struct Harness {
    overlay: RootOverlay,
    tickets: Arc<FakeTickets>,
    screen: Arc<FakeScreen>,
    reporter: Arc<RecordingReporter>,
}

fn harness_with(tickets: FakeTickets, screen: FakeScreen, surface: Arc<dyn SurfaceCapture>) -> Harness {
    let tickets = Arc::new(tickets);
    let screen = Arc::new(screen);
    let reporter = Arc::new(RecordingReporter::default());
    let services = Services {
        screen: screen.clone(),
        surface,
        tickets: tickets.clone(),
        reporter: Some(reporter.clone()),
    };
    Harness {
        overlay: RootOverlay::new(services, device(), SETTLE),
        tickets,
        screen,
        reporter,
    }
}

fn harness(tickets: FakeTickets) -> Harness {
    harness_with(tickets, FakeScreen::new(false), Arc::new(RasterCapture))
}

fn screen_size() -> ScreenSize {
    ScreenSize::new(100.0, 200.0)
}

fn start_editing(overlay: &mut RootOverlay) {
    let t0 = Instant::now();
    assert!(overlay.trigger(t0, screen_size()));
    overlay.tick(t0 + SETTLE);
    assert_eq!(overlay.phase(), SessionPhase::Editing);
}

fn draw(overlay: &mut RootOverlay, points: &[(f32, f32)]) {
    let edit = overlay.edit_mut().expect("editing");
    for (x, y) in points {
        edit.add_point(*x, *y);
    }
    edit.finish_stroke();
}

#[test]
fn successful_submit_resets_and_shows_trigger() {
    let mut h = harness(FakeTickets::new(CreateMode::Succeed, false));
    start_editing(&mut h.overlay);
    draw(&mut h.overlay, &[(5.0, 5.0), (20.0, 30.0)]);
    h.overlay
        .edit_mut()
        .expect("editing")
        .set_comment("login button misaligned");

    assert!(h.overlay.submit());
    assert_eq!(h.overlay.phase(), SessionPhase::Submitting);
    assert!(h.overlay.wait_for_submission(WAIT));

    assert_eq!(h.overlay.phase(), SessionPhase::Idle);
    assert!(h.overlay.session().trigger_visible());
    assert!(!h.overlay.session().editor_visible());
    assert_eq!(h.overlay.session().capture_reference(), None);
    assert_eq!(h.screen.released(), vec!["file:///tmp/capture_0.png".to_string()]);

    let requests = h.tickets.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], "/tickets");
    assert!(requests[1].contains("abc123"));

    let tickets = h.tickets.tickets.lock().expect("tickets lock");
    assert_eq!(tickets[0].comment, "login button misaligned");
    assert_eq!(tickets[0].os_name, "TestOS");
    assert_eq!((tickets[0].width, tickets[0].height), (100.0, 200.0));

    let notices = h.overlay.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Success);
    assert_eq!(notices[0].text, SUCCESS_NOTICE);
}

#[test]
fn failed_create_preserves_editing_state() {
    let mut h = harness(FakeTickets::new(CreateMode::Fail, false));
    start_editing(&mut h.overlay);
    {
        let edit = h.overlay.edit_mut().expect("editing");
        edit.select_color(PaletteColor::Yellow);
    }
    draw(&mut h.overlay, &[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    h.overlay.edit_mut().expect("editing").set_comment("crash");
    let before = h.overlay.session().edit().cloned().expect("edit state");

    assert!(h.overlay.submit());
    assert!(h.overlay.wait_for_submission(WAIT));

    assert_eq!(h.overlay.phase(), SessionPhase::Editing);
    assert_eq!(h.tickets.requests().len(), 1);
    let after = h.overlay.session().edit().expect("edit state");
    assert_eq!(after.strokes(), before.strokes());
    assert_eq!(after.comment(), "crash");
    assert_eq!(after.active_color(), PaletteColor::Yellow);
    assert!(h.screen.released().is_empty());

    let notices = h.overlay.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, NoticeKind::Failure);
    assert_eq!(notices[0].text, GENERIC_FAILURE_NOTICE);

    let failures = h.reporter.failures.lock().expect("failures lock");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FailureKind::Network);
    assert!(failures[0].detail.contains("503"));
}

#[test]
fn failed_attach_keeps_state_and_resubmit_creates_second_ticket() {
    let mut h = harness(FakeTickets::new(CreateMode::Succeed, true));
    start_editing(&mut h.overlay);
    draw(&mut h.overlay, &[(1.0, 1.0), (9.0, 9.0)]);

    assert!(h.overlay.submit());
    assert!(h.overlay.wait_for_submission(WAIT));
    assert_eq!(h.overlay.phase(), SessionPhase::Editing);
    assert_eq!(h.tickets.requests().len(), 2);
    assert_eq!(h.overlay.session().edit().expect("edit").strokes().len(), 1);

    assert!(h.overlay.submit());
    assert!(h.overlay.wait_for_submission(WAIT));
    let requests = h.tickets.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests.iter().filter(|r| *r == "/tickets").count(), 2);
}

#[test]
fn capture_failure_restores_trigger_without_network() {
    let mut h = harness_with(
        FakeTickets::new(CreateMode::Succeed, false),
        FakeScreen::new(true),
        Arc::new(RasterCapture),
    );
    let t0 = Instant::now();
    assert!(h.overlay.trigger(t0, screen_size()));
    assert!(!h.overlay.session().trigger_visible());
    assert!(!h.overlay.session().editor_visible());

    h.overlay.tick(t0 + SETTLE);

    assert_eq!(h.overlay.phase(), SessionPhase::Idle);
    assert!(h.overlay.session().trigger_visible());
    assert!(!h.overlay.session().editor_visible());
    assert!(h.tickets.requests().is_empty());
    assert_eq!(h.screen.calls(), 1);

    let notices = h.overlay.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].text, GENERIC_FAILURE_NOTICE);
    let failures = h.reporter.failures.lock().expect("failures lock");
    assert_eq!(failures[0].kind, FailureKind::Capture);
}

#[test]
fn capture_waits_for_settle_delay() {
    let mut h = harness(FakeTickets::new(CreateMode::Succeed, false));
    let t0 = Instant::now();
    assert!(h.overlay.trigger(t0, screen_size()));
    assert_eq!(h.overlay.next_deadline(), Some(t0 + SETTLE));

    h.overlay.tick(t0 + Duration::from_millis(10));
    assert_eq!(h.overlay.phase(), SessionPhase::Capturing);
    assert_eq!(h.screen.calls(), 0);

    h.overlay.tick(t0 + SETTLE);
    assert_eq!(h.overlay.phase(), SessionPhase::Editing);
    assert_eq!(h.screen.calls(), 1);
    assert_eq!(
        h.overlay.session().capture_reference(),
        Some("file:///tmp/capture_0.png")
    );
    assert!(!h.overlay.trigger(t0 + SETTLE, screen_size()));
}

#[test]
fn submit_and_close_are_ignored_while_in_flight() {
    let (release, gate): (Sender<()>, Receiver<()>) = channel();
    let mut h = harness(FakeTickets::gated(gate));
    start_editing(&mut h.overlay);

    assert!(h.overlay.submit());
    assert!(!h.overlay.submit());
    assert!(!h.overlay.close());
    assert!(h.overlay.edit_mut().is_none());
    h.overlay.tick(Instant::now());
    assert_eq!(h.overlay.phase(), SessionPhase::Submitting);

    release.send(()).expect("release gate");
    assert!(h.overlay.wait_for_submission(WAIT));
    assert_eq!(h.overlay.phase(), SessionPhase::Idle);
    assert_eq!(h.tickets.requests().len(), 2);
}

#[test]
fn close_discards_everything_and_next_session_starts_fresh() {
    let mut h = harness(FakeTickets::new(CreateMode::Succeed, false));
    start_editing(&mut h.overlay);
    {
        let edit = h.overlay.edit_mut().expect("editing");
        edit.select_color(PaletteColor::Navy);
        edit.set_comment("draft");
        edit.add_point(3.0, 3.0);
    }
    draw(&mut h.overlay, &[(1.0, 1.0), (2.0, 2.0)]);

    assert!(h.overlay.close());
    assert_eq!(h.screen.released(), vec!["file:///tmp/capture_0.png".to_string()]);
    assert_eq!(h.overlay.phase(), SessionPhase::Idle);
    assert!(h.overlay.session().trigger_visible());
    assert_eq!(h.overlay.session().capture_reference(), None);
    assert!(h.overlay.take_notices().is_empty());
    assert!(h.tickets.requests().is_empty());

    start_editing(&mut h.overlay);
    let edit = h.overlay.session().edit().expect("edit");
    assert!(edit.strokes().is_empty());
    assert!(edit.in_progress().is_empty());
    assert_eq!(edit.comment(), "");
    assert_eq!(edit.active_color(), PaletteColor::Coral);
    assert_eq!(edit.capture().uri, "file:///tmp/capture_1.png");
}

#[test]
fn flatten_failure_stays_in_editing_without_requests() {
    let mut h = harness_with(
        FakeTickets::new(CreateMode::Succeed, false),
        FakeScreen::new(false),
        Arc::new(FailingSurface),
    );
    start_editing(&mut h.overlay);
    draw(&mut h.overlay, &[(1.0, 1.0), (2.0, 2.0)]);

    assert!(!h.overlay.submit());
    assert_eq!(h.overlay.phase(), SessionPhase::Editing);
    assert!(h.tickets.requests().is_empty());
    assert_eq!(h.overlay.session().edit().expect("edit").strokes().len(), 1);
    let failures = h.reporter.failures.lock().expect("failures lock");
    assert_eq!(failures[0].kind, FailureKind::Capture);
}
