//! # Textscan: Pluggable Substring Search Kernel
//!
//! This crate provides exact and regular-expression substring search over
//! large in-memory text buffers, built for hosts that compile a pattern once
//! and scan many buffers, with cooperative cancellation of long scans.
//!
//! ## Key Features
//!
//! - **Six Engines, One Contract**: literal scan, narrow and wide
//!   bit-parallel BNDM, Boyer-Moore-Horspool, backtracking regex, and
//!   linear-time automaton regex behind a single create/search interface
//! - **Creation-Time Preprocessing**: mask tables, shift tables, and
//!   compiled regex programs are built once per pattern, never per call
//! - **Cooperative Cancellation**: every engine polls a shared token at a
//!   bounded byte interval, so an interactive host can abort a scan of a
//!   gigabyte buffer mid-flight
//! - **Text Utilities**: UTF-8 BOM classification, bounded line-extent
//!   extraction over byte and UTF-16 buffers, and wide-character search
//! - **Handle Surface**: an opaque-token arena mirroring the host boundary
//!   the kernel is embedded behind
//!
//! ## Quick Start
//!
//! ```rust
//! use textscan::{SearchKind, SearchOptions, SearchParams, Searcher};
//!
//! # fn main() -> textscan::Result<()> {
//! let searcher = Searcher::new(SearchKind::GeneralSublinear, b"needle", SearchOptions::MATCH_CASE)?;
//! let mut params = SearchParams::new(b"a haystack with a needle in it");
//! let found = searcher.search(&mut params);
//! assert_eq!(found.map(|m| m.start), Some(18));
//! # Ok(())
//! # }
//! ```
//!
//! Classifying a buffer and reporting the line around a hit:
//!
//! ```rust
//! use textscan::{find_line_extent, TextKind};
//!
//! let buffer = b"fn main() {\n    needle();\n}\n";
//! assert_eq!(TextKind::detect(buffer), TextKind::Ascii);
//! let extent = find_line_extent(buffer, 16, 100);
//! assert_eq!(&buffer[extent.start..extent.end()], b"    needle();");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod search;
pub mod text;

pub use error::{Result, TextScanError};
pub use search::registry;
pub use search::registry::SearchHandle;
pub use search::{
    CancelToken, Match, PatternSearch, SearchKind, SearchOptions, SearchParams, Searcher,
    SearcherConfig,
};
pub use text::{
    compare_bytes, find_line_extent, fold_unit, search_wide, strip_utf8_bom, LineExtent, TextKind,
    TextUnit, UTF8_BOM,
};

/// Version of the textscan library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Nothing requires this call today; it anchors version logging for hosts
/// that want a startup marker.
pub fn init() {
    log::debug!("Initializing textscan v{}", VERSION);
}
