#![forbid(unsafe_code)]

//! Elm-style runtime for terminal applications.
//!
//! The program runtime manages the update/view loop: input events become
//! messages, messages go through `Model::update`, and dirty models are drawn
//! with `Model::view`. Side effects are described by [`Cmd`] values and
//! carried out by the runtime, never by the model itself.
//!
//! # Example
//!
//! ```ignore
//! use sbridge_runtime::program::{Cmd, Model};
//! use sbridge_runtime::frame::Frame;
//! use sbridge_core::event::Event;
//!
//! struct Counter {
//!     count: i64,
//! }
//!
//! enum Msg {
//!     Increment,
//!     Quit,
//! }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             _ => Msg::Increment,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => { self.count += 1; Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         // Render counter value to frame
//!     }
//! }
//! ```

use crate::dispatch::Dispatcher;
use crate::frame::Frame;
use crate::presenter::Presenter;
use sbridge_core::event::Event;
use sbridge_core::terminal_session::{SessionOptions, TerminalSession};
use std::io::{self, Write};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span, info, info_span};

/// The Model trait defines application state and behavior.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Must be convertible from terminal events and sendable across threads,
    /// since effects deliver messages from wherever they complete.
    type Message: From<Event> + Send + 'static;

    /// Initialize the model with startup commands.
    ///
    /// Called once when the program starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    ///
    /// This is the only place state changes. Returns commands for any side
    /// effects that should be executed.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state to a frame.
    ///
    /// Must not mutate anything; the runtime may call it at any time.
    fn view(&self, frame: &mut Frame);
}

/// Work started by an effect, given a handle for reporting back.
pub type Effect<M> = Box<dyn FnOnce(Dispatcher<M>) + Send>;

/// Commands represent side effects to be executed by the runtime.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Quit the application.
    Quit,
    /// Execute commands in order, stopping early after a `Quit`.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Start work that reports back through a [`Dispatcher`].
    ///
    /// The closure runs immediately on the UI thread and must not block; it
    /// hands the dispatcher to whatever asynchronous mechanism completes the
    /// work. Completion order is whatever that mechanism produces.
    Effect(Effect<M>),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Effect(_) => write!(f, "Effect"),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create an effect command.
    #[inline]
    pub fn effect(f: impl FnOnce(Dispatcher<M>) + Send + 'static) -> Self {
        Self::Effect(Box::new(f))
    }

    /// Combine commands, collapsing trivial batches.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => Self::Batch(cmds),
        }
    }

    /// Short name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Effect(_) => "Effect",
        }
    }
}

/// Configuration for [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Draw on the alternate screen.
    pub alternate_screen: bool,
    /// Capture mouse input.
    pub mouse: bool,
    /// How long to wait for input before checking dispatched messages.
    pub poll_interval: Duration,
    /// Quit automatically after this long (used by smoke tests).
    pub exit_after: Option<Duration>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            poll_interval: Duration::from_millis(50),
            exit_after: None,
        }
    }
}

/// Terminal-free half of [`Program`]: model, presenter and dispatched-message
/// inbox.
///
/// [`Program`] feeds it input read from the terminal and points its output at
/// stdout; anything implementing [`Write`] works, which is how the loop is
/// exercised without a tty.
pub struct ProgramCore<M: Model> {
    model: M,
    presenter: Presenter,
    dispatcher: Dispatcher<M::Message>,
    inbox: mpsc::Receiver<M::Message>,
    exit_after: Option<Duration>,
    running: bool,
    dirty: bool,
    width: u16,
    height: u16,
}

impl<M: Model> ProgramCore<M> {
    /// Create a core for a `width` x `height` viewport.
    pub fn new(model: M, width: u16, height: u16) -> Self {
        let (dispatcher, inbox) = Dispatcher::channel();
        Self {
            model,
            presenter: Presenter::new(),
            dispatcher,
            inbox,
            exit_after: None,
            running: true,
            dirty: true,
            width,
            height,
        }
    }

    /// Quit once [`tick`](Self::tick) sees at least this much elapsed time.
    pub fn with_exit_after(mut self, limit: Option<Duration>) -> Self {
        self.exit_after = limit;
        self
    }

    /// The model being driven.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// A dispatcher feeding this core's inbox.
    pub fn dispatcher(&self) -> Dispatcher<M::Message> {
        self.dispatcher.clone()
    }

    /// Whether the model has not quit yet.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current viewport size (columns, rows).
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Run `Model::init`, announce the viewport with an `Event::Resize`, and
    /// draw the first frame.
    pub fn start<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let cmd = {
            let _span = info_span!("sbridge.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd);
        self.handle_event(Event::Resize {
            width: self.width,
            height: self.height,
        });
        self.render(out)
    }

    /// Convert `event` to a message and update the model.
    ///
    /// A resize also forces the next frame to be redrawn in full.
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Resize { width, height } = event {
            self.width = width;
            self.height = height;
            self.presenter.invalidate();
        }
        self.update(M::Message::from(event));
    }

    /// Finish one loop iteration: apply dispatched messages, check the
    /// exit-after deadline against `elapsed`, and redraw if anything changed.
    ///
    /// Returns whether the program should keep running.
    pub fn tick<W: Write>(&mut self, elapsed: Duration, out: &mut W) -> io::Result<bool> {
        self.process_dispatched();

        if let Some(limit) = self.exit_after
            && elapsed >= limit
        {
            info!(?limit, "exit-after deadline reached");
            self.running = false;
        }

        if self.dirty && self.running {
            self.render(out)?;
        }
        Ok(self.running)
    }

    fn process_dispatched(&mut self) {
        while self.running {
            match self.inbox.try_recv() {
                Ok(msg) => self.update(msg),
                Err(_) => break,
            }
        }
    }

    fn update(&mut self, msg: M::Message) {
        let cmd = {
            let _span = debug_span!("sbridge.program.update").entered();
            let start = Instant::now();
            let cmd = self.model.update(msg);
            debug!(
                duration_us = start.elapsed().as_micros() as u64,
                cmd_type = cmd.type_name(),
                "update"
            );
            cmd
        };
        self.dirty = true;
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.update(m),
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Effect(f) => f(self.dispatcher.clone()),
        }
    }

    fn render<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let mut frame = Frame::new(self.width, self.height);
        self.model.view(&mut frame);
        self.presenter.present(&frame.buffer, out)?;
        self.dirty = false;
        Ok(())
    }
}

/// The program runtime that owns the terminal and drives a [`Model`].
pub struct Program<M: Model> {
    core: ProgramCore<M>,
    config: ProgramConfig,
    session: TerminalSession,
}

impl<M: Model> Program<M> {
    /// Create a program with default configuration.
    pub fn new(model: M) -> io::Result<Self> {
        Self::with_config(model, ProgramConfig::default())
    }

    /// Create a program, entering raw mode according to `config`.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: config.alternate_screen,
            mouse_capture: config.mouse,
        })?;
        let (width, height) = session.size()?;
        let core = ProgramCore::new(model, width, height).with_exit_after(config.exit_after);
        Ok(Self {
            core,
            config,
            session,
        })
    }

    /// The model being driven.
    pub fn model(&self) -> &M {
        self.core.model()
    }

    /// Run the main event loop until the model quits.
    ///
    /// 1. `Model::init`, then an initial `Event::Resize` with the real size
    /// 2. Poll input and dispatch it as messages
    /// 3. Drain messages delivered through the [`Dispatcher`]
    /// 4. Render when dirty
    pub fn run(&mut self) -> io::Result<()> {
        let started = Instant::now();
        self.core.start(&mut io::stdout().lock())?;

        while self.core.is_running() {
            if self.session.poll_event(self.config.poll_interval)? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.core.handle_event(event);
                    }
                    if !self.core.is_running() || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            self.core.tick(started.elapsed(), &mut io::stdout().lock())?;
        }

        info!("program loop finished");
        Ok(())
    }
}
