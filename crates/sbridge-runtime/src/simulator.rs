#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a real terminal. Events can be
//! injected, messages sent directly, and frames captured for assertions.
//!
//! Effects run synchronously when their command executes, exactly as in the
//! real runtime. Whatever they report through the [`Dispatcher`] is queued
//! and applied by [`pump`](ProgramSimulator::pump), which stands in for the
//! UI thread draining its inbox. `send` and `inject_event` pump once on the
//! way out, so effects that complete immediately are visible right away;
//! completions that arrive later need an explicit `pump` (or
//! [`wait_for_message`](ProgramSimulator::wait_for_message) when they come
//! from another thread).
//!
//! # Example
//!
//! ```ignore
//! use sbridge_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(Counter { value: 0 });
//! sim.init();
//! sim.send(Msg::Increment);
//! assert_eq!(sim.model().value, 1);
//!
//! let buf = sim.capture_frame(80, 24);
//! assert!(buf.contains_text("1"));
//! ```

use crate::buffer::Buffer;
use crate::dispatch::Dispatcher;
use crate::frame::Frame;
use crate::program::{Cmd, Model};
use sbridge_core::event::Event;
use std::sync::mpsc;
use std::time::Duration;

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    /// No-op command.
    None,
    /// Quit command.
    Quit,
    /// Message sent to model.
    Msg,
    /// Batch of commands.
    Batch(usize),
    /// Effect started.
    Effect,
}

/// Deterministic simulator for [`Model`] testing.
pub struct ProgramSimulator<M: Model> {
    model: M,
    dispatcher: Dispatcher<M::Message>,
    inbox: mpsc::Receiver<M::Message>,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    running: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator with the given model.
    ///
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        let (dispatcher, inbox) = Dispatcher::channel();
        Self {
            model,
            dispatcher,
            inbox,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
        }
    }

    /// Call `Model::init()` and execute the returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.pump();
    }

    /// Inject terminal events into the model, then pump.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            self.update(M::Message::from(event.clone()));
        }
        self.pump();
    }

    /// Inject a single terminal event into the model, then pump.
    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Send a specific message to the model, then pump.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        self.update(msg);
        self.pump();
    }

    /// Apply every message currently queued by effects. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while self.running {
            match self.inbox.try_recv() {
                Ok(msg) => {
                    self.update(msg);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Block until at least one dispatched message arrives (or `timeout`
    /// passes), then pump. Returns `true` if anything was applied.
    pub fn wait_for_message(&mut self, timeout: Duration) -> bool {
        match self.inbox.recv_timeout(timeout) {
            Ok(msg) => {
                if self.running {
                    self.update(msg);
                }
                self.pump();
                true
            }
            Err(_) => false,
        }
    }

    /// A dispatcher feeding this simulator's inbox.
    pub fn dispatcher(&self) -> Dispatcher<M::Message> {
        self.dispatcher.clone()
    }

    /// Render the current model into a fresh buffer and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame.buffer);
        self.frames.last().expect("frame just pushed")
    }

    /// Get all captured frame buffers.
    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    /// Get the most recently captured frame buffer, if any.
    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` once a `Cmd::Quit` has executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the command execution log.
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn update(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                self.update(m);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Effect(f) => {
                self.command_log.push(CmdRecord::Effect);
                f(self.dispatcher.clone());
            }
        }
    }
}
