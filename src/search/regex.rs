//! Regular expression engines
//!
//! Two engines share this module. `LinearRegexSearch` compiles through the
//! finite-automaton `regex` crate in byte mode with Unicode disabled, which
//! caps execution at time linear in the input and keeps case folding
//! ASCII-only. `BacktrackingRegexSearch` compiles through `fancy-regex` for
//! lookaround and backreferences, trading the linear guarantee for
//! expressiveness; a configured step cap turns runaway backtracking into a
//! not-found result.
//!
//! Cancellation inside one regex execution is not observable, so long scans
//! are split into blocks. Creation parses the pattern into its HIR and
//! proves it can match neither a line feed nor an end-of-haystack anchor;
//! block boundaries are then snapped just past a line feed, which no match
//! can cross, and the token is polled between blocks. Patterns failing the
//! proof (or using syntax the analyzer does not parse) scan the whole tail
//! in one call, with polls only at entry.

use regex_syntax::hir::{Class, Hir, HirKind, Look};

use super::{CancelToken, Match, PatternSearch, SearchOptions, SearcherConfig};
use crate::error::{Result, TextScanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    /// Matches stay within one line; scan block-wise and poll between blocks.
    LineBlocks,
    /// Matches may cross lines or anchor to the end; scan the tail in one call.
    WholeTail,
}

fn pattern_str(pattern: &[u8]) -> Result<&str> {
    std::str::from_utf8(pattern)
        .map_err(|_| TextScanError::invalid_pattern("regex pattern must be valid UTF-8"))
}

/// Decide whether block-wise scanning preserves match semantics.
///
/// `unicode` mirrors the flag the engine compiles with so class contents
/// match what the engine will execute.
fn scan_mode(pattern: &str, unicode: bool) -> ScanMode {
    let mut builder = regex_syntax::ParserBuilder::new();
    builder.utf8(unicode).unicode(unicode);
    match builder.build().parse(pattern) {
        Ok(hir) => {
            if needs_whole_tail(&hir) {
                ScanMode::WholeTail
            } else {
                ScanMode::LineBlocks
            }
        }
        // Syntax beyond the analyzer (lookaround, backreferences): assume
        // the worst.
        Err(_) => ScanMode::WholeTail,
    }
}

fn needs_whole_tail(hir: &Hir) -> bool {
    match hir.kind() {
        HirKind::Empty => false,
        HirKind::Literal(lit) => lit.0.contains(&b'\n'),
        HirKind::Class(class) => class_matches_line_feed(class),
        // Blocks are sliced only at the tail end, so left-facing looks stay
        // exact. A look that can hold at an end-of-text the full buffer
        // rejects would invent a match at a block seam: end anchors, the
        // negated word boundary, and the word-end-half look all pass when
        // the right context is cut off. Positive `\b` and word-start/end
        // cannot hold at a seam, which always sits just past a line feed.
        HirKind::Look(look) => matches!(
            look,
            Look::End
                | Look::EndLF
                | Look::EndCRLF
                | Look::WordAsciiNegate
                | Look::WordUnicodeNegate
                | Look::WordEndHalfAscii
                | Look::WordEndHalfUnicode
        ),
        HirKind::Repetition(rep) => needs_whole_tail(&rep.sub),
        HirKind::Capture(cap) => needs_whole_tail(&cap.sub),
        HirKind::Concat(subs) | HirKind::Alternation(subs) => subs.iter().any(needs_whole_tail),
    }
}

fn class_matches_line_feed(class: &Class) -> bool {
    match class {
        Class::Unicode(cls) => cls.ranges().iter().any(|r| r.start() <= '\n' && '\n' <= r.end()),
        Class::Bytes(cls) => cls.ranges().iter().any(|r| r.start() <= b'\n' && b'\n' <= r.end()),
    }
}

/// End offset of the block beginning at `pos`: at least `interval` bytes,
/// extended to just past the next line feed so no in-line match is split.
#[inline]
fn block_end(haystack: &[u8], pos: usize, interval: usize) -> usize {
    let n = haystack.len();
    let target = pos.saturating_add(interval);
    if target >= n {
        return n;
    }
    match memchr::memchr(b'\n', &haystack[target..]) {
        Some(k) => target + k + 1,
        None => n,
    }
}

pub(crate) struct LinearRegexSearch {
    re: regex::bytes::Regex,
    scan: ScanMode,
    interval: usize,
}

impl LinearRegexSearch {
    pub(crate) fn new(pattern: &[u8], options: SearchOptions, config: &SearcherConfig) -> Result<Self> {
        let pattern = pattern_str(pattern)?;
        let re = regex::bytes::RegexBuilder::new(pattern)
            .unicode(false)
            .case_insensitive(!options.contains(SearchOptions::MATCH_CASE))
            .size_limit(config.regex_size_limit)
            .build()
            .map_err(map_build_error)?;
        Ok(Self {
            re,
            scan: scan_mode(pattern, false),
            interval: config.cancel_check_interval.max(1),
        })
    }
}

fn map_build_error(err: regex::Error) -> TextScanError {
    match err {
        regex::Error::CompiledTooBig(limit) => TextScanError::out_of_memory(limit),
        other => TextScanError::invalid_pattern(other.to_string()),
    }
}

impl PatternSearch for LinearRegexSearch {
    fn find(&self, haystack: &[u8], start: usize, cancel: &CancelToken) -> Option<Match> {
        if cancel.check() {
            return None;
        }
        match self.scan {
            ScanMode::WholeTail => {
                let found = self
                    .re
                    .find_at(haystack, start)
                    .map(|m| Match { start: m.start(), len: m.end() - m.start() });
                // The whole tail ran in one engine call; the exit poll is the
                // first chance to observe a cancel that landed during it.
                if cancel.check() {
                    return None;
                }
                found
            }
            ScanMode::LineBlocks => {
                let n = haystack.len();
                let mut pos = start;
                loop {
                    let end = block_end(haystack, pos, self.interval);
                    if let Some(m) = self.re.find_at(&haystack[..end], pos) {
                        return Some(Match { start: m.start(), len: m.end() - m.start() });
                    }
                    if end >= n {
                        return None;
                    }
                    pos = end;
                    if cancel.check() {
                        log::trace!("linear regex scan cancelled at offset {}", pos);
                        return None;
                    }
                }
            }
        }
    }
}

pub(crate) struct BacktrackingRegexSearch {
    re: fancy_regex::Regex,
    scan: ScanMode,
    interval: usize,
}

impl BacktrackingRegexSearch {
    pub(crate) fn new(pattern: &[u8], options: SearchOptions, config: &SearcherConfig) -> Result<Self> {
        let pattern = pattern_str(pattern)?;
        let re = fancy_regex::RegexBuilder::new(pattern)
            .case_insensitive(!options.contains(SearchOptions::MATCH_CASE))
            .backtrack_limit(config.backtrack_limit)
            .delegate_size_limit(config.regex_size_limit)
            .build()
            .map_err(|e| TextScanError::invalid_pattern(e.to_string()))?;
        Ok(Self {
            re,
            scan: scan_mode(pattern, true),
            interval: config.cancel_check_interval.max(1),
        })
    }

    fn run(&self, text: &str, pos: usize) -> Option<Match> {
        match self.re.find_from_pos(text, pos) {
            Ok(found) => found.map(|m| Match { start: m.start(), len: m.end() - m.start() }),
            Err(err) => {
                log::warn!("backtracking regex aborted: {}", err);
                None
            }
        }
    }
}

impl PatternSearch for BacktrackingRegexSearch {
    fn find(&self, haystack: &[u8], start: usize, cancel: &CancelToken) -> Option<Match> {
        if cancel.check() {
            return None;
        }
        let text = match std::str::from_utf8(haystack) {
            Ok(t) => t,
            Err(_) => {
                log::warn!("backtracking regex skipped: haystack is not valid UTF-8");
                return None;
            }
        };
        // A match never starts inside a code point; snap forward if the
        // caller's offset does.
        let mut pos = start;
        while pos < text.len() && !text.is_char_boundary(pos) {
            pos += 1;
        }
        match self.scan {
            ScanMode::WholeTail => {
                let found = self.run(text, pos);
                if cancel.check() {
                    return None;
                }
                found
            }
            ScanMode::LineBlocks => {
                let n = text.len();
                loop {
                    let end = block_end(text.as_bytes(), pos, self.interval);
                    if let Some(m) = self.run(&text[..end], pos) {
                        return Some(m);
                    }
                    if end >= n {
                        return None;
                    }
                    pos = end;
                    if cancel.check() {
                        log::trace!("backtracking regex scan cancelled at offset {}", pos);
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(pattern: &str, options: SearchOptions) -> LinearRegexSearch {
        LinearRegexSearch::new(pattern.as_bytes(), options, &SearcherConfig::default()).unwrap()
    }

    fn backtracking(pattern: &str, options: SearchOptions) -> BacktrackingRegexSearch {
        BacktrackingRegexSearch::new(pattern.as_bytes(), options, &SearcherConfig::default()).unwrap()
    }

    fn find(e: &dyn PatternSearch, haystack: &[u8], start: usize) -> Option<Match> {
        e.find(haystack, start, &CancelToken::new())
    }

    #[test]
    fn test_linear_basic() {
        let e = linear(r"ne+dle", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"a neeeedle here", 0), Some(Match { start: 2, len: 8 }));
        assert_eq!(find(&e, b"nothing", 0), None);
    }

    #[test]
    fn test_linear_case_insensitive_ascii() {
        let e = linear("abc", SearchOptions::empty());
        assert_eq!(find(&e, b"XXABCYY", 0), Some(Match { start: 2, len: 3 }));
    }

    #[test]
    fn test_linear_matches_arbitrary_bytes() {
        let e = linear(r"a.c", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, &[b'a', 0xFF, b'c'], 0), Some(Match { start: 0, len: 3 }));
    }

    #[test]
    fn test_linear_start_offset() {
        let e = linear("ab", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"ab ab", 1).map(|m| m.start), Some(3));
    }

    #[test]
    fn test_invalid_syntax_is_creation_error() {
        let err = LinearRegexSearch::new(b"(unclosed", SearchOptions::MATCH_CASE, &SearcherConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.category(), "pattern");

        let err = BacktrackingRegexSearch::new(b"(unclosed", SearchOptions::MATCH_CASE, &SearcherConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.category(), "pattern");
    }

    #[test]
    fn test_non_utf8_pattern_rejected() {
        let err = LinearRegexSearch::new(&[0xFF, 0xFE], SearchOptions::MATCH_CASE, &SearcherConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.category(), "pattern");
    }

    #[test]
    fn test_scan_mode_analysis() {
        assert_eq!(scan_mode("abc", false), ScanMode::LineBlocks);
        assert_eq!(scan_mode(r"a\d+c", false), ScanMode::LineBlocks);
        assert_eq!(scan_mode(r"^abc", false), ScanMode::LineBlocks);
        assert_eq!(scan_mode(r"a\nb", false), ScanMode::WholeTail);
        assert_eq!(scan_mode(r"(?s)a.c", false), ScanMode::WholeTail);
        assert_eq!(scan_mode(r"[^x]", false), ScanMode::WholeTail);
        assert_eq!(scan_mode(r"abc$", false), ScanMode::WholeTail);
        assert_eq!(scan_mode(r"(?m)abc$", false), ScanMode::WholeTail);
        // Lookahead parses only in the backtracking engine; the analyzer
        // reports worst-case
        assert_eq!(scan_mode(r"a(?=b)", true), ScanMode::WholeTail);
    }

    #[test]
    fn test_end_sensitive_looks_force_whole_tail() {
        assert_eq!(scan_mode(r"\B", false), ScanMode::WholeTail);
        assert_eq!(scan_mode(r"\B", true), ScanMode::WholeTail);
        assert_eq!(scan_mode(r"foo\B", false), ScanMode::WholeTail);
        assert_eq!(scan_mode(r"\b{end-half}", true), ScanMode::WholeTail);
        // The positive boundary stays block-scannable: a seam sits just
        // past a line feed, where `\b` cannot hold
        assert_eq!(scan_mode(r"\bfoo", false), ScanMode::LineBlocks);
        assert_eq!(scan_mode(r"foo\b", false), ScanMode::LineBlocks);
    }

    #[test]
    fn test_results_do_not_vary_with_poll_interval() {
        // A nullable pattern must not pick up an empty match at a block end
        // that whole-buffer semantics reject
        let hay = b"a\nb";
        for interval in [1usize, 2, 64 * 1024] {
            let config = SearcherConfig { cancel_check_interval: interval, ..SearcherConfig::default() };
            let e = LinearRegexSearch::new(br"\B", SearchOptions::MATCH_CASE, &config).unwrap();
            assert_eq!(find(&e, hay, 0), None, "linear, interval {}", interval);
            let e = BacktrackingRegexSearch::new(br"\B", SearchOptions::MATCH_CASE, &config).unwrap();
            assert_eq!(find(&e, hay, 0), None, "backtracking, interval {}", interval);
        }

        // Inside a word the negated boundary still matches as usual
        let e = linear(r"\B", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"ab\ncd", 0), Some(Match { start: 1, len: 0 }));
    }

    #[test]
    fn test_block_scan_finds_match_far_in() {
        let config = SearcherConfig { cancel_check_interval: 64, ..SearcherConfig::default() };
        let e = LinearRegexSearch::new(br"qu+x", SearchOptions::MATCH_CASE, &config).unwrap();
        let mut hay = Vec::new();
        for i in 0..64 {
            hay.extend_from_slice(format!("line number {}\n", i).as_bytes());
        }
        let at = hay.len();
        hay.extend_from_slice(b"quuux trailer");
        assert_eq!(find(&e, &hay, 0), Some(Match { start: at, len: 5 }));
    }

    #[test]
    fn test_block_scan_match_spanning_would_be_seam() {
        // With a tiny interval every line lands in its own block; matches in
        // the middle of long lines must still be found exactly once.
        let config = SearcherConfig { cancel_check_interval: 3, ..SearcherConfig::default() };
        let e = LinearRegexSearch::new(br"[a-z]{4}", SearchOptions::MATCH_CASE, &config).unwrap();
        let hay = b"ab\ncd\nwxyz\nef";
        assert_eq!(find(&e, hay, 0), Some(Match { start: 6, len: 4 }));
    }

    #[test]
    fn test_end_anchor_only_matches_true_end() {
        let config = SearcherConfig { cancel_check_interval: 4, ..SearcherConfig::default() };
        let e = LinearRegexSearch::new(br"tail$", SearchOptions::MATCH_CASE, &config).unwrap();
        let hay = b"tail\nnot here\nthe tail";
        assert_eq!(find(&e, hay, 0), Some(Match { start: 18, len: 4 }));
    }

    #[test]
    fn test_multiline_pattern_crosses_lines() {
        let e = linear(r"b\nc", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"a b\ncd", 0), Some(Match { start: 2, len: 3 }));
    }

    #[test]
    fn test_empty_pattern_matches_at_start() {
        let e = linear("", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"abc", 0), Some(Match { start: 0, len: 0 }));
        let e = backtracking("", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"abc", 0), Some(Match { start: 0, len: 0 }));
    }

    #[test]
    fn test_backtracking_backreference() {
        let e = backtracking(r"(\w+) \1", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"one two two three", 0), Some(Match { start: 4, len: 7 }));
    }

    #[test]
    fn test_backtracking_lookahead() {
        let e = backtracking(r"foo(?=bar)", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, b"foobaz foobar", 0), Some(Match { start: 7, len: 3 }));
    }

    #[test]
    fn test_backtracking_case_insensitive() {
        let e = backtracking("abc", SearchOptions::empty());
        assert_eq!(find(&e, b"XXABCYY", 0), Some(Match { start: 2, len: 3 }));
    }

    #[test]
    fn test_backtracking_skips_invalid_utf8_haystack() {
        let e = backtracking("abc", SearchOptions::MATCH_CASE);
        assert_eq!(find(&e, &[b'a', 0xFF, b'b'], 0), None);
    }

    #[test]
    fn test_backtracking_block_scan() {
        let config = SearcherConfig { cancel_check_interval: 8, ..SearcherConfig::default() };
        let e = BacktrackingRegexSearch::new(br"z+9", SearchOptions::MATCH_CASE, &config).unwrap();
        let mut hay = String::new();
        for i in 0..32 {
            hay.push_str(&format!("row {}\n", i));
        }
        let at = hay.len();
        hay.push_str("zz9 end");
        assert_eq!(
            find(&e, hay.as_bytes(), 0),
            Some(Match { start: at, len: 3 })
        );
    }

    #[test]
    fn test_preset_cancellation() {
        let e = linear("abc", SearchOptions::MATCH_CASE);
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(e.find(b"xxabcxx", 0, &token), None);

        let e = backtracking("abc", SearchOptions::MATCH_CASE);
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(e.find(b"xxabcxx", 0, &token), None);
    }

    #[test]
    fn test_block_scan_polls_between_blocks() {
        let config = SearcherConfig { cancel_check_interval: 16, ..SearcherConfig::default() };
        let e = LinearRegexSearch::new(b"absent", SearchOptions::MATCH_CASE, &config).unwrap();
        let token = CancelToken::new();
        let mut hay = Vec::new();
        for _ in 0..64 {
            hay.extend_from_slice(b"0123456789abcde\n");
        }
        assert_eq!(e.find(&hay, 0, &token), None);
        assert!(token.poll_count() >= 32, "polls: {}", token.poll_count());
    }
}
