#![forbid(unsafe_code)]

//! The application shell: one number, one button.
//!
//! [`AppShell`] owns the displayed number. Activating the button hands the
//! current number to the injected [`NumberBridge`] and returns immediately;
//! whenever an answer arrives it replaces the number, whatever order the
//! answers come back in. Nothing is retried, timed out or reported if the
//! bridge never answers.

use crate::bridge::{NumberBridge, Reply};
use sbridge_core::event::{Event, KeyCode, MouseButton, MouseEventKind};
use sbridge_core::geometry::Rect;
use sbridge_runtime::buffer::CellAttrs;
use sbridge_runtime::frame::Frame;
use sbridge_runtime::program::{Cmd, Model};
use std::fmt;
use std::sync::Arc;
use unicode_width::UnicodeWidthStr;

/// The number shown before any bridge answer arrives.
pub const INITIAL_NUMBER: i64 = 10;

/// Title of the activation control.
pub const BUTTON_TITLE: &str = "Call Rust!";

const HEADING: &str = "Open up src/shell.rs to start working on your app!";
const STATUS_HINT: &str = "Enter/Space/click: call getNumber   q: quit";

/// Height of the centred content block: heading, gap, label, gap, button.
const CONTENT_HEIGHT: u16 = 5;

/// Messages understood by [`AppShell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The button was activated.
    Activate,
    /// The bridge answered call number `call` with `value`.
    Resolved {
        /// Sequence number of the call, for log correlation only.
        call: u64,
        /// The answer.
        value: i64,
    },
    /// Left click at a screen position.
    Click {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
    /// The viewport changed size.
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// Leave the application.
    Quit,
    /// Input the shell does not react to.
    Ignore,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(k) if !k.is_press() => Msg::Ignore,
            Event::Key(k) if k.ctrl() && k.is_char('c') => Msg::Quit,
            Event::Key(k) => match k.code {
                KeyCode::Enter | KeyCode::Char(' ') => Msg::Activate,
                KeyCode::Char('q') | KeyCode::Escape => Msg::Quit,
                _ => Msg::Ignore,
            },
            Event::Mouse(m) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                Msg::Click { x: m.x, y: m.y }
            }
            Event::Resize { width, height } => Msg::Resize { width, height },
            _ => Msg::Ignore,
        }
    }
}

/// The visual tree produced by [`AppShell::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellView {
    /// Introductory line at the top of the content block.
    pub heading: &'static str,
    /// The label showing the current number.
    pub label: String,
    /// The activation control.
    pub button: ButtonView,
    /// Key hints for the bottom status line.
    pub status: &'static str,
}

/// A pressable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonView {
    /// Text on the button.
    pub title: &'static str,
}

impl ButtonView {
    /// The button as drawn, padding included.
    pub fn face(&self) -> String {
        format!("[ {} ]", self.title)
    }

    /// Width of [`face`](Self::face) in terminal columns.
    pub fn width(&self) -> u16 {
        u16::try_from(self.face().width()).unwrap_or(u16::MAX)
    }
}

/// Where each part of the view goes for a given screen area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    /// Heading row.
    pub heading: Rect,
    /// Number label row.
    pub label: Rect,
    /// Exact bounds of the button face (the click target).
    pub button: Rect,
    /// Bottom status row.
    pub status: Rect,
}

impl ShellLayout {
    /// Lay the shell out inside `area`.
    ///
    /// The last row is the status line; the content block is centred in
    /// what remains. Rows that do not fit come out empty.
    pub fn compute(area: Rect) -> Self {
        let status = area.row(area.height.saturating_sub(1));
        let body = Rect::new(
            area.x,
            area.y,
            area.width,
            area.height.saturating_sub(1),
        );
        let block = body.centered(body.width, CONTENT_HEIGHT);
        let button_width = ButtonView {
            title: BUTTON_TITLE,
        }
        .width();
        Self {
            heading: block.row(0),
            label: block.row(2),
            button: block.row(4).centered(button_width, 1),
            status,
        }
    }
}

/// The counter screen.
pub struct AppShell {
    number: i64,
    bridge: Arc<dyn NumberBridge>,
    viewport: Rect,
    calls: u64,
}

impl fmt::Debug for AppShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppShell")
            .field("number", &self.number)
            .field("bridge", &self.bridge.name())
            .field("viewport", &self.viewport)
            .field("calls", &self.calls)
            .finish()
    }
}

impl AppShell {
    /// Create a shell showing [`INITIAL_NUMBER`] and calling `bridge`.
    pub fn new(bridge: Arc<dyn NumberBridge>) -> Self {
        Self {
            number: INITIAL_NUMBER,
            bridge,
            viewport: Rect::from_size(80, 24),
            calls: 0,
        }
    }

    /// The number currently displayed.
    pub fn display_state(&self) -> i64 {
        self.number
    }

    /// How many bridge calls have been started.
    pub fn calls_started(&self) -> u64 {
        self.calls
    }

    /// Build the visual tree for the current number.
    pub fn render(&self) -> ShellView {
        ShellView {
            heading: HEADING,
            label: format!("Number: {}", self.number),
            button: ButtonView {
                title: BUTTON_TITLE,
            },
            status: STATUS_HINT,
        }
    }

    /// Start a bridge call with the current number.
    ///
    /// The returned command hands the call to the bridge and does not wait
    /// for it. The answer comes back as [`Msg::Resolved`].
    pub fn on_activate(&mut self) -> Cmd<Msg> {
        self.calls += 1;
        let call = self.calls;
        let input = self.number;
        let bridge = Arc::clone(&self.bridge);
        tracing::info!(call, input, bridge = bridge.name(), "calling getNumber");
        Cmd::effect(move |dispatch| {
            bridge.get_number(
                input,
                Reply::new(move |value| {
                    dispatch.send(Msg::Resolved { call, value });
                }),
            );
        })
    }
}

impl Model for AppShell {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Activate => self.on_activate(),
            Msg::Resolved { call, value } => {
                tracing::info!(call, previous = self.number, value, "getNumber answered");
                self.number = value;
                Cmd::none()
            }
            Msg::Click { x, y } => {
                if ShellLayout::compute(self.viewport).button.contains(x, y) {
                    self.on_activate()
                } else {
                    Cmd::none()
                }
            }
            Msg::Resize { width, height } => {
                self.viewport = Rect::from_size(width, height);
                Cmd::none()
            }
            Msg::Quit => Cmd::quit(),
            Msg::Ignore => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let layout = ShellLayout::compute(frame.area());
        let view = self.render();
        frame.print_centered(layout.heading, view.heading, CellAttrs::empty());
        frame.print_centered(layout.label, &view.label, CellAttrs::BOLD);
        frame.print_centered(layout.button, &view.button.face(), CellAttrs::REVERSE);
        frame.print_centered(layout.status, view.status, CellAttrs::DIM);
    }
}
