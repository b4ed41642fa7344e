//! Text analysis utilities surrounding the search engines
//!
//! Everything a host needs around a raw match offset: encoding
//! classification of freshly loaded buffers, bounded extraction of the line
//! enclosing a hit, one-shot UTF-16 search, and exact byte comparison.

mod classify;
mod line_extent;
mod wide;

pub use classify::{strip_utf8_bom, TextKind, UTF8_BOM};
pub use line_extent::{find_line_extent, LineExtent, TextUnit};
pub use wide::{fold_unit, search_wide};

/// Exact equality of two byte buffers, length and content.
///
/// Kept as a named operation because hosts use it to verify candidate hits
/// against the original bytes; slice equality already compares length first
/// and memcmp-compares content.
pub fn compare_bytes(a: &[u8], b: &[u8]) -> bool {
    a == b
}
