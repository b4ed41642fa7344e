//! Literal substring engine
//!
//! The baseline engine: a finder precompiled once per pattern, then reused
//! across calls. Matching is always case-sensitive; hosts wanting folded
//! literal search pick one of the table-driven engines. The scan runs in
//! windows of `cancel_check_interval` bytes, overlapped by one pattern
//! length so no occurrence can straddle a window seam unseen, and polls the
//! cancellation token between windows.

use memchr::memmem;

use super::{CancelToken, Match, PatternSearch, SearcherConfig};

pub(crate) struct LiteralSearch {
    finder: memmem::Finder<'static>,
    len: usize,
    interval: usize,
}

impl LiteralSearch {
    pub(crate) fn new(pattern: &[u8], config: &SearcherConfig) -> Self {
        Self {
            finder: memmem::Finder::new(pattern).into_owned(),
            len: pattern.len(),
            interval: config.cancel_check_interval.max(1),
        }
    }
}

impl PatternSearch for LiteralSearch {
    fn find(&self, haystack: &[u8], start: usize, cancel: &CancelToken) -> Option<Match> {
        if cancel.check() {
            return None;
        }
        let n = haystack.len();
        let m = self.len;
        if m == 0 {
            // An empty pattern matches wherever scanning starts.
            return Some(Match { start, len: 0 });
        }
        if n - start < m {
            return None;
        }
        let mut pos = start;
        loop {
            let window_end = pos.saturating_add(self.interval).saturating_add(m - 1).min(n);
            if let Some(i) = self.finder.find(&haystack[pos..window_end]) {
                return Some(Match { start: pos + i, len: m });
            }
            if window_end == n {
                return None;
            }
            pos = window_end - (m - 1);
            if cancel.check() {
                log::trace!("literal scan cancelled at offset {}", pos);
                return None;
            }
        }
    }
}
