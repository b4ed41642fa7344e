//! Bounded line extent extraction
//!
//! Given a match position inside a large buffer, a host wants the enclosing
//! line to display around the hit. Scanning to the real line boundaries of an
//! arbitrary buffer is unbounded (a gigabyte file with no newline is one
//! line), so the scan is clipped to a caller-chosen radius around the
//! position. Works on byte buffers and UTF-16 code unit buffers alike.

/// A text unit the line scanner can traverse.
///
/// Implemented for `u8` (byte-oriented text) and `u16` (UTF-16 code units).
pub trait TextUnit: Copy + Eq {
    /// The unit encoding a line feed in this representation.
    const LINE_FEED: Self;
}

impl TextUnit for u8 {
    const LINE_FEED: Self = b'\n';
}

impl TextUnit for u16 {
    const LINE_FEED: Self = b'\n' as u16;
}

/// Offset range of one line around a position, in units of the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineExtent {
    /// Offset of the first unit of the extent.
    pub start: usize,
    /// Number of units in the extent.
    pub len: usize,
}

impl LineExtent {
    /// Offset one past the last unit of the extent.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Find the extent of the line containing `position`, scanning at most
/// `max_offset` units in each direction.
///
/// The line starts just after the nearest line feed before `position` and
/// ends at the line feed at or after it; neither line feed is part of the
/// extent. When a boundary is not found within the radius (or the buffer
/// ends first), the extent is clipped there. Only `\n` terminates a line;
/// a `\r` is ordinary content. `position` and `max_offset` values beyond
/// the buffer are clamped, never read out of bounds.
pub fn find_line_extent<U: TextUnit>(text: &[U], position: usize, max_offset: usize) -> LineExtent {
    let len = text.len();
    let position = position.min(len);
    let low = position.saturating_sub(max_offset);
    let high = position.saturating_add(max_offset).min(len);

    let start = match text[low..position].iter().rposition(|&u| u == U::LINE_FEED) {
        Some(i) => low + i + 1,
        None => low,
    };
    let end = match text[position..high].iter().position(|&u| u == U::LINE_FEED) {
        Some(i) => position + i,
        None => high,
    };

    LineExtent { start, len: end - start }
}
