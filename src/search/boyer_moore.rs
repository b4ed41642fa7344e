//! Boyer-Moore-Horspool engine
//!
//! The fallback for patterns too long for a mask word, and the general
//! workhorse for folded literal search. A 256-entry bad-character table is
//! built once at creation; scanning compares the window tail first and
//! shifts by the table entry of the last window byte, skipping most of the
//! input for patterns with a varied byte set.

use super::{fold_byte, CancelToken, Match, PatternSearch, SearchOptions, SearcherConfig};
use crate::error::{Result, TextScanError};

pub(crate) struct BoyerMooreSearch {
    // Pattern stored pre-folded so the scan folds only haystack bytes.
    pattern: Vec<u8>,
    shift: [usize; 256],
    fold: bool,
    interval: usize,
}

impl BoyerMooreSearch {
    pub(crate) fn new(pattern: &[u8], options: SearchOptions, config: &SearcherConfig) -> Result<Self> {
        if pattern.is_empty() {
            return Err(TextScanError::invalid_pattern(
                "shift-table search requires a non-empty pattern",
            ));
        }
        let fold = !options.contains(SearchOptions::MATCH_CASE);
        let folded: Vec<u8> = pattern.iter().map(|&b| fold_byte(b, fold)).collect();
        let m = folded.len();
        let mut shift = [m; 256];
        for (i, &b) in folded[..m - 1].iter().enumerate() {
            shift[b as usize] = m - 1 - i;
        }
        Ok(Self { pattern: folded, shift, fold, interval: config.cancel_check_interval.max(1) })
    }

    fn matches_at(&self, haystack: &[u8], pos: usize) -> bool {
        self.pattern
            .iter()
            .zip(&haystack[pos..pos + self.pattern.len()])
            .all(|(&p, &h)| p == fold_byte(h, self.fold))
    }
}

impl PatternSearch for BoyerMooreSearch {
    fn find(&self, haystack: &[u8], start: usize, cancel: &CancelToken) -> Option<Match> {
        if cancel.check() {
            return None;
        }
        let n = haystack.len();
        let m = self.pattern.len();
        if n - start < m {
            return None;
        }
        let mut pos = start;
        let mut next_poll = start.saturating_add(self.interval);
        while pos + m <= n {
            if pos >= next_poll {
                if cancel.check() {
                    log::trace!("shift-table scan cancelled at offset {}", pos);
                    return None;
                }
                next_poll = pos.saturating_add(self.interval);
            }
            let last = fold_byte(haystack[pos + m - 1], self.fold);
            if last == self.pattern[m - 1] && self.matches_at(haystack, pos) {
                return Some(Match { start: pos, len: m });
            }
            pos += self.shift[last as usize];
        }
        None
    }
}
