use sbridge_core::event::{Event, KeyCode};
use sbridge_runtime::buffer::CellAttrs;
use sbridge_runtime::frame::Frame;
use sbridge_runtime::program::{Cmd, Model, ProgramCore};
use std::time::Duration;

const CLEAR_ALL: &str = "\x1b[2J";

/// Shows one line of text and remembers every viewport it was told about.
struct Label {
    text: String,
    resizes: Vec<(u16, u16)>,
}

#[derive(Debug)]
enum LabelMsg {
    Set(String),
    Resized(u16, u16),
    Quit,
    Other,
}

impl From<Event> for LabelMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Resize { width, height } => LabelMsg::Resized(width, height),
            Event::Key(k) if k.is_char('q') => LabelMsg::Quit,
            _ => LabelMsg::Other,
        }
    }
}

impl Model for Label {
    type Message = LabelMsg;

    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::msg(LabelMsg::Set("ready".into()))
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
        match msg {
            LabelMsg::Set(text) => self.text = text,
            LabelMsg::Resized(w, h) => self.resizes.push((w, h)),
            LabelMsg::Quit => return Cmd::quit(),
            LabelMsg::Other => {}
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Frame) {
        frame
            .buffer
            .set_string(0, 0, &self.text, CellAttrs::empty());
    }
}

fn started(exit_after: Option<Duration>) -> ProgramCore<Label> {
    let label = Label {
        text: String::new(),
        resizes: Vec::new(),
    };
    let mut core = ProgramCore::new(label, 20, 3).with_exit_after(exit_after);
    let mut out = Vec::new();
    core.start(&mut out).unwrap();
    core
}

fn text(out: &[u8]) -> String {
    String::from_utf8_lossy(out).into_owned()
}

#[test]
fn start_runs_init_announces_size_and_draws() {
    let label = Label {
        text: String::new(),
        resizes: Vec::new(),
    };
    let mut core = ProgramCore::new(label, 20, 3);
    let mut out = Vec::new();
    core.start(&mut out).unwrap();

    assert_eq!(core.model().text, "ready");
    assert_eq!(core.model().resizes, vec![(20, 3)]);
    assert!(text(&out).contains("ready"));
    assert!(text(&out).contains(CLEAR_ALL));
}

#[test]
fn idle_tick_draws_nothing() {
    let mut core = started(None);
    let mut out = Vec::new();
    assert!(core.tick(Duration::from_millis(10), &mut out).unwrap());
    assert!(out.is_empty());
}

#[test]
fn message_dispatched_from_worker_is_applied_and_drawn() {
    let mut core = started(None);
    let dispatch = core.dispatcher();
    std::thread::spawn(move || {
        assert!(dispatch.send(LabelMsg::Set("answer".into())));
    })
    .join()
    .unwrap();

    // Nothing changes until the loop drains its inbox.
    assert_eq!(core.model().text, "ready");

    let mut out = Vec::new();
    assert!(core.tick(Duration::ZERO, &mut out).unwrap());
    assert_eq!(core.model().text, "answer");
    let drawn = text(&out);
    assert!(drawn.contains("answer"));
    assert!(!drawn.contains(CLEAR_ALL), "same size redraws changed rows only");
}

#[test]
fn dispatched_messages_apply_in_arrival_order() {
    let mut core = started(None);
    let dispatch = core.dispatcher();
    dispatch.send(LabelMsg::Set("first".into()));
    dispatch.send(LabelMsg::Set("second".into()));

    core.tick(Duration::ZERO, &mut Vec::new()).unwrap();
    assert_eq!(core.model().text, "second");
}

#[test]
fn resize_forces_full_redraw() {
    let mut core = started(None);
    core.handle_event(Event::Resize {
        width: 30,
        height: 4,
    });
    assert_eq!(core.size(), (30, 4));
    assert_eq!(core.model().resizes, vec![(20, 3), (30, 4)]);

    let mut out = Vec::new();
    core.tick(Duration::ZERO, &mut out).unwrap();
    assert!(text(&out).contains(CLEAR_ALL));
    assert!(text(&out).contains("ready"));
}

#[test]
fn exit_after_deadline_stops_without_drawing() {
    let mut core = started(Some(Duration::from_millis(200)));

    assert!(core.tick(Duration::from_millis(199), &mut Vec::new()).unwrap());

    core.dispatcher().send(LabelMsg::Set("late".into()));
    let mut out = Vec::new();
    assert!(!core.tick(Duration::from_millis(200), &mut out).unwrap());
    assert!(!core.is_running());
    assert!(out.is_empty());
}

#[test]
fn messages_after_quit_are_not_applied() {
    let mut core = started(None);
    core.handle_event(Event::key(KeyCode::Char('q')));
    assert!(!core.is_running());

    core.dispatcher().send(LabelMsg::Set("ignored".into()));
    let mut out = Vec::new();
    assert!(!core.tick(Duration::ZERO, &mut out).unwrap());
    assert_eq!(core.model().text, "ready");
    assert!(out.is_empty());
}

#[test]
fn dispatcher_outliving_the_loop_is_harmless() {
    let core = started(None);
    let dispatch = core.dispatcher();
    drop(core);
    assert!(!dispatch.send(LabelMsg::Other));
}
