#![forbid(unsafe_code)]

//! Buffer presentation.
//!
//! The presenter remembers the last buffer it wrote and only re-emits rows
//! that changed. A size change (or [`Presenter::invalidate`]) forces a clear
//! and a full redraw.

use crate::buffer::{Buffer, CellAttrs};
use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use std::io::{self, Write};

/// Row-diffing terminal presenter.
#[derive(Debug, Default)]
pub struct Presenter {
    previous: Option<Buffer>,
}

impl Presenter {
    /// Create a presenter with no previous frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame so the next present redraws everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Write `buffer` to `out`, returning how many rows were emitted.
    pub fn present<W: Write>(&mut self, buffer: &Buffer, out: &mut W) -> io::Result<usize> {
        let full = match &self.previous {
            Some(prev) => prev.width() != buffer.width() || prev.height() != buffer.height(),
            None => true,
        };
        if full {
            queue!(out, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
        }

        let mut written = 0;
        for y in 0..buffer.height() {
            let changed = full
                || self
                    .previous
                    .as_ref()
                    .is_some_and(|prev| prev.row(y) != buffer.row(y));
            if changed {
                write_row(buffer, y, out)?;
                written += 1;
            }
        }

        out.flush()?;
        tracing::trace!(rows = written, full, "presented frame");
        self.previous = Some(buffer.clone());
        Ok(written)
    }
}

fn write_row<W: Write>(buffer: &Buffer, y: u16, out: &mut W) -> io::Result<()> {
    queue!(out, MoveTo(0, y))?;
    let mut current = CellAttrs::empty();
    for cell in buffer.row(y) {
        if cell.is_continuation() {
            continue;
        }
        if cell.attrs != current {
            apply_attrs(cell.attrs, out)?;
            current = cell.attrs;
        }
        queue!(out, Print(cell.ch))?;
    }
    if !current.is_empty() {
        queue!(out, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

fn apply_attrs<W: Write>(attrs: CellAttrs, out: &mut W) -> io::Result<()> {
    queue!(out, SetAttribute(Attribute::Reset))?;
    if attrs.contains(CellAttrs::BOLD) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if attrs.contains(CellAttrs::DIM) {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    if attrs.contains(CellAttrs::UNDERLINE) {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if attrs.contains(CellAttrs::REVERSE) {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(rows: &[&str]) -> Buffer {
        let mut buf = Buffer::new(12, rows.len() as u16);
        for (y, text) in rows.iter().enumerate() {
            buf.set_string(0, y as u16, text, CellAttrs::empty());
        }
        buf
    }

    #[test]
    fn first_present_writes_every_row() {
        let mut presenter = Presenter::new();
        let mut out = Vec::new();
        let rows = presenter
            .present(&buffer_with(&["a", "b", "c"]), &mut out)
            .unwrap();
        assert_eq!(rows, 3);
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('a') && text.contains('c'));
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut presenter = Presenter::new();
        let buf = buffer_with(&["Number: 10", "Call Rust!"]);
        presenter.present(&buf, &mut Vec::new()).unwrap();
        assert_eq!(presenter.present(&buf, &mut Vec::new()).unwrap(), 0);
    }

    #[test]
    fn only_changed_rows_are_written() {
        let mut presenter = Presenter::new();
        presenter
            .present(&buffer_with(&["Number: 10", "Call Rust!"]), &mut Vec::new())
            .unwrap();
        let mut out = Vec::new();
        let rows = presenter
            .present(&buffer_with(&["Number: 42", "Call Rust!"]), &mut out)
            .unwrap();
        assert_eq!(rows, 1);
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Number: 42"));
        assert!(!text.contains("Call Rust!"));
    }

    #[test]
    fn resize_and_invalidate_force_full_redraw() {
        let mut presenter = Presenter::new();
        presenter
            .present(&buffer_with(&["a", "b"]), &mut Vec::new())
            .unwrap();
        assert_eq!(
            presenter
                .present(&buffer_with(&["a", "b", "c"]), &mut Vec::new())
                .unwrap(),
            3
        );
        presenter.invalidate();
        assert_eq!(
            presenter
                .present(&buffer_with(&["a", "b", "c"]), &mut Vec::new())
                .unwrap(),
            3
        );
    }

    #[test]
    fn styled_cells_emit_reset_at_row_end() {
        let mut buf = Buffer::new(6, 1);
        buf.set_string(0, 0, "go", CellAttrs::REVERSE);
        let mut presenter = Presenter::new();
        let mut out = Vec::new();
        presenter.present(&buf, &mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("\x1b[7m"), "reverse video missing: {text:?}");
    }
}
