#![forbid(unsafe_code)]

//! Cell grid that views render into.
//!
//! A [`Buffer`] is a row-major `width * height` grid of [`Cell`]s. Text is
//! placed by display width: a wide glyph occupies its own cell plus one
//! continuation cell, and anything that would straddle the right edge is
//! clipped rather than wrapped.

use bitflags::bitflags;
use sbridge_core::geometry::Rect;
use unicode_width::UnicodeWidthChar;

bitflags! {
    /// Style flags carried by a cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellAttrs: u8 {
        /// Bold / increased intensity.
        const BOLD      = 0b0001;
        /// Dim / decreased intensity.
        const DIM       = 0b0010;
        /// Underlined.
        const UNDERLINE = 0b0100;
        /// Foreground and background swapped.
        const REVERSE   = 0b1000;
    }
}

/// One terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Displayed character, or `'\0'` for the tail of a wide glyph.
    pub ch: char,
    /// Style flags.
    pub attrs: CellAttrs,
}

impl Cell {
    /// A blank, unstyled cell.
    pub const EMPTY: Cell = Cell {
        ch: ' ',
        attrs: CellAttrs::empty(),
    };

    const CONTINUATION: char = '\0';

    /// Create a cell with the given character and style.
    #[inline]
    pub const fn new(ch: char, attrs: CellAttrs) -> Self {
        Self { ch, attrs }
    }

    /// True for the trailing half of a wide glyph.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.ch == Self::CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A fixed-size grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a blank buffer.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width as usize * height as usize],
        }
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The full buffer area.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Cell at `(x, y)`, if in bounds.
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Overwrite the cell at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Fill `rect` (clipped to the buffer) with `cell`.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y..bottom {
            for x in rect.x..right {
                self.set(x, y, cell);
            }
        }
    }

    /// Write `text` starting at `(x, y)` and return the column after the
    /// last written cell.
    ///
    /// Zero-width characters are skipped. Writing stops at the first glyph
    /// that does not fit before the right edge.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, attrs: CellAttrs) -> u16 {
        if y >= self.height {
            return x;
        }
        let mut col = x;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > self.width {
                break;
            }
            self.set(col, y, Cell::new(ch, attrs));
            if w == 2 {
                self.set(col + 1, y, Cell::new(Cell::CONTINUATION, attrs));
            }
            col += w;
        }
        col
    }

    /// Cells of row `y` (empty slice when out of bounds).
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Text of row `y` with continuation cells removed and trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        let text: String = self
            .row(y)
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect();
        text.trim_end().to_string()
    }

    /// True if any single row contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row_text(y).contains(needle))
    }

    /// Row index of the first row containing `needle`.
    pub fn find_row(&self, needle: &str) -> Option<u16> {
        (0..self.height).find(|&y| self.row_text(y).contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_blank() {
        let buf = Buffer::new(4, 2);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.get(3, 1), Some(&Cell::EMPTY));
        assert_eq!(buf.get(4, 1), None);
        assert_eq!(buf.row_text(0), "");
    }

    #[test]
    fn set_string_returns_next_column() {
        let mut buf = Buffer::new(20, 1);
        let end = buf.set_string(2, 0, "Number: 10", CellAttrs::BOLD);
        assert_eq!(end, 12);
        assert_eq!(buf.row_text(0), "  Number: 10");
        assert_eq!(buf.get(2, 0).map(|c| c.attrs), Some(CellAttrs::BOLD));
    }

    #[test]
    fn set_string_clips_at_right_edge() {
        let mut buf = Buffer::new(5, 1);
        let end = buf.set_string(0, 0, "Call Rust!", CellAttrs::empty());
        assert_eq!(end, 5);
        assert_eq!(buf.row_text(0), "Call");
        assert_eq!(buf.get(4, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn wide_glyph_takes_two_cells() {
        let mut buf = Buffer::new(6, 1);
        let end = buf.set_string(0, 0, "数1", CellAttrs::empty());
        assert_eq!(end, 3);
        assert!(buf.get(1, 0).is_some_and(Cell::is_continuation));
        assert_eq!(buf.row_text(0), "数1");
    }

    #[test]
    fn wide_glyph_that_straddles_edge_is_dropped() {
        let mut buf = Buffer::new(3, 1);
        let end = buf.set_string(2, 0, "数", CellAttrs::empty());
        assert_eq!(end, 2);
        assert_eq!(buf.row_text(0), "");
    }

    #[test]
    fn set_string_below_buffer_is_noop() {
        let mut buf = Buffer::new(3, 1);
        assert_eq!(buf.set_string(0, 5, "abc", CellAttrs::empty()), 0);
        assert_eq!(buf, Buffer::new(3, 1));
    }

    #[test]
    fn fill_is_clipped() {
        let mut buf = Buffer::new(3, 2);
        buf.fill(Rect::new(1, 1, 10, 10), Cell::new('#', CellAttrs::REVERSE));
        assert_eq!(buf.row_text(0), "");
        assert_eq!(buf.row_text(1), " ##");
    }

    #[test]
    fn contains_and_find_row() {
        let mut buf = Buffer::new(12, 3);
        buf.set_string(0, 2, "Number: 42", CellAttrs::empty());
        assert!(buf.contains_text("42"));
        assert_eq!(buf.find_row("Number"), Some(2));
        assert_eq!(buf.find_row("missing"), None);
    }
}
