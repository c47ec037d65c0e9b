#![forbid(unsafe_code)]

//! Render target handed to [`Model::view`](crate::program::Model::view).

use crate::buffer::{Buffer, CellAttrs};
use sbridge_core::geometry::Rect;
use unicode_width::UnicodeWidthStr;

/// A frame being rendered.
///
/// Views draw into `buffer`; the runtime presents it afterwards.
#[derive(Debug)]
pub struct Frame {
    /// The cell grid for this frame.
    pub buffer: Buffer,
}

impl Frame {
    /// Create a blank frame.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
        }
    }

    /// Frame width in columns.
    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    /// Frame height in rows.
    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// The full drawable area.
    #[inline]
    pub fn area(&self) -> Rect {
        self.buffer.area()
    }

    /// Draw `text` horizontally centred on the first row of `rect`.
    ///
    /// Text wider than `rect` is clipped at the rect's right edge. Every
    /// column the text covers is overwritten, spaces included; cells outside
    /// it are left alone.
    pub fn print_centered(&mut self, rect: Rect, text: &str, attrs: CellAttrs) {
        if rect.is_empty() {
            return;
        }
        let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        let x = rect.x + rect.width.saturating_sub(width) / 2;
        let mut clipped = Buffer::new(rect.right().saturating_sub(x), 1);
        let covered = usize::from(clipped.set_string(0, 0, text, attrs));
        for (offset, cell) in clipped.row(0).iter().take(covered).enumerate() {
            self.buffer.set(x + offset as u16, rect.y, *cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_text_lands_in_middle() {
        let mut frame = Frame::new(20, 3);
        frame.print_centered(Rect::new(0, 1, 20, 1), "abcd", CellAttrs::empty());
        assert_eq!(frame.buffer.row_text(1), "        abcd");
    }

    #[test]
    fn centered_text_clips_to_rect() {
        let mut frame = Frame::new(20, 1);
        frame.print_centered(Rect::new(2, 0, 4, 1), "abcdefgh", CellAttrs::empty());
        assert_eq!(frame.buffer.row_text(0), "  abcd");
    }

    #[test]
    fn spaces_in_text_overwrite_existing_cells() {
        let mut frame = Frame::new(9, 1);
        frame.print_centered(Rect::new(0, 0, 9, 1), "#########", CellAttrs::empty());
        frame.print_centered(Rect::new(0, 0, 9, 1), "a b", CellAttrs::REVERSE);
        assert_eq!(frame.buffer.row_text(0), "###a b###");
        assert_eq!(frame.buffer.get(4, 0).map(|c| c.attrs), Some(CellAttrs::REVERSE));
        assert_eq!(frame.buffer.get(2, 0).map(|c| c.ch), Some('#'));
    }

    #[test]
    fn empty_rect_draws_nothing() {
        let mut frame = Frame::new(5, 1);
        frame.print_centered(Rect::new(0, 0, 0, 1), "x", CellAttrs::empty());
        assert_eq!(frame.buffer, Buffer::new(5, 1));
    }
}
