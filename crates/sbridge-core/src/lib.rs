#![forbid(unsafe_code)]

//! Core: input events, geometry, logging setup, terminal lifecycle.
//!
//! # Role in sbridge
//! `sbridge-core` is the input side of the stack. It owns the terminal
//! session guard and turns raw crossterm input into canonical [`event::Event`]
//! values that the runtime hands to the application model.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod terminal_session;

pub use event::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use geometry::Rect;
