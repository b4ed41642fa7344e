//! Pluggable pattern-search engines behind one contract
//!
//! A [`Searcher`] binds one pattern, one option set, and one algorithm for
//! its whole lifetime: all preprocessing (mask tables, shift tables,
//! compiled regex programs) happens at creation, and every subsequent
//! [`Searcher::search`] call scans a caller-owned buffer without touching
//! shared mutable state. Six algorithm variants cover different pattern
//! regimes:
//!
//! | Kind | Algorithm | Pattern regime |
//! |------|-----------|----------------|
//! | [`SearchKind::LiteralScan`] | precompiled substring finder | any length, case-sensitive baseline |
//! | [`SearchKind::BitParallelNarrow`] | BNDM over a 32-bit mask word | length <= 32 |
//! | [`SearchKind::BitParallelWide`] | BNDM over a 64-bit mask word | length 33..=64 |
//! | [`SearchKind::GeneralSublinear`] | Boyer-Moore-Horspool | any length |
//! | [`SearchKind::BasicRegex`] | backtracking regex | expressiveness over worst-case cost |
//! | [`SearchKind::LinearRegex`] | finite-automaton regex | linear-time guarantee |
//!
//! Long scans cooperate with cancellation: every engine polls a shared
//! [`CancelToken`] at a bounded interval and returns `None` promptly once it
//! is set.

mod bit_parallel;
mod boyer_moore;
mod literal;
mod regex;
pub mod registry;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;

bitflags::bitflags! {
    /// Option bit-set fixed at searcher creation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SearchOptions: u32 {
        /// Match letter case exactly. Absent, engines that support folding
        /// compare through ASCII uppercase; the literal scan ignores the
        /// flag and always matches case-sensitively.
        const MATCH_CASE = 1;
    }
}

/// The matching strategies a [`Searcher`] can be created with.
///
/// The two bit-parallel kinds are requests, not guarantees: creation
/// resolves them against the measured pattern length, promoting between the
/// narrow and wide variants and falling back to [`SearchKind::GeneralSublinear`]
/// past 64 bytes. [`Searcher::kind`] reports the resolved kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchKind {
    /// Substring scan via a precompiled finder; any pattern length.
    LiteralScan,
    /// Bit-parallel BNDM with a 32-bit mask word.
    BitParallelNarrow,
    /// Bit-parallel BNDM with a 64-bit mask word.
    BitParallelWide,
    /// Boyer-Moore-Horspool with a precomputed bad-character table.
    GeneralSublinear,
    /// Backtracking regular expression engine (lookaround, backreferences).
    BasicRegex,
    /// Finite-automaton regular expression engine, linear in input length.
    LinearRegex,
}

/// Tunables shared by every engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearcherConfig {
    /// Bytes scanned between cancellation polls. Bounds how long a search
    /// can keep running after its token is cancelled.
    pub cancel_check_interval: usize,
    /// Cap on the size of a compiled regex program. Exceeding it fails
    /// creation with an out-of-memory error.
    pub regex_size_limit: usize,
    /// Step cap for the backtracking regex engine. A search exceeding it
    /// reports not-found instead of running away.
    pub backtrack_limit: usize,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: 64 * 1024,
            regex_size_limit: 10 * (1 << 20),
            backtrack_limit: 1_000_000,
        }
    }
}

impl SearcherConfig {
    /// Configuration for searches driven from an interactive thread: polls
    /// cancellation every 4 KiB so a keystroke interrupts a scan quickly.
    pub fn responsive() -> Self {
        Self { cancel_check_interval: 4 * 1024, ..Self::default() }
    }
}

/// A single match reported by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Absolute start offset of the match in the scanned buffer.
    pub start: usize,
    /// Length of the match in bytes. Fixed-pattern engines always report
    /// the pattern length; regex engines report the matched span.
    pub len: usize,
}

impl Match {
    /// Offset one past the last matched byte.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    polls: AtomicU64,
}

/// Shared cancellation flag for one in-flight search call.
///
/// Clones share the same flag, so any thread can keep a clone and
/// [`cancel`](CancelToken::cancel) a search running elsewhere. The token
/// spans exactly one call; retries take a fresh token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenState>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent, callable from any thread; the
    /// search observes it within one poll interval.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }

    /// Number of times a search has polled this token. Exposes the poll
    /// cadence so hosts and tests can verify the cancellation latency bound.
    pub fn poll_count(&self) -> u64 {
        self.inner.polls.load(Ordering::Relaxed)
    }

    /// Record one poll and report the flag. Engines call this at bounded
    /// scan intervals.
    pub fn check(&self) -> bool {
        self.inner.polls.fetch_add(1, Ordering::Relaxed);
        self.is_cancelled()
    }
}

/// Per-call inputs to [`Searcher::search`].
///
/// Borrows the haystack and optional scratch for the duration of one call;
/// the engine retains nothing afterwards.
pub struct SearchParams<'a> {
    haystack: &'a [u8],
    start: usize,
    scratch: &'a mut [u8],
    cancel: CancelToken,
}

impl<'a> SearchParams<'a> {
    /// Search the whole haystack from offset 0 with a fresh token and no
    /// scratch.
    pub fn new(haystack: &'a [u8]) -> Self {
        Self { haystack, start: 0, scratch: &mut [], cancel: CancelToken::new() }
    }

    /// Start scanning at `start` instead of 0. Offsets past the end of the
    /// haystack make the search report not-found.
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Provide caller-owned scratch of at least
    /// [`Searcher::scratch_size`] bytes.
    pub fn with_scratch(mut self, scratch: &'a mut [u8]) -> Self {
        self.scratch = scratch;
        self
    }

    /// Attach a specific cancellation token, usually one the caller keeps a
    /// clone of.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The buffer this call scans.
    pub fn haystack(&self) -> &'a [u8] {
        self.haystack
    }

    /// The offset scanning starts at.
    pub fn start(&self) -> usize {
        self.start
    }

    /// A clone of the call's cancellation token, for cancelling from
    /// another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl fmt::Debug for SearchParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchParams")
            .field("haystack_len", &self.haystack.len())
            .field("start", &self.start)
            .field("scratch_len", &self.scratch.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// The contract every engine implements.
///
/// Implementations are immutable after construction, so one engine may serve
/// concurrent calls. `find` must poll `cancel` at a bounded interval and
/// return `None` once it reports cancellation.
pub trait PatternSearch: Send + Sync {
    /// Bytes of caller-owned scratch one call needs. The built-in engines
    /// keep per-call state on the stack and report 0; the operation stays in
    /// the contract for engines that need caller-managed workspace.
    fn scratch_size(&self) -> usize {
        0
    }

    /// Find the first match at or after `start`. `start` is at most
    /// `haystack.len()`.
    fn find(&self, haystack: &[u8], start: usize, cancel: &CancelToken) -> Option<Match>;
}

#[inline]
pub(crate) fn fold_byte(b: u8, fold: bool) -> u8 {
    if fold {
        b.to_ascii_uppercase()
    } else {
        b
    }
}

fn resolve_kind(kind: SearchKind, pattern_len: usize) -> SearchKind {
    match kind {
        SearchKind::BitParallelNarrow | SearchKind::BitParallelWide => {
            if pattern_len <= 32 {
                SearchKind::BitParallelNarrow
            } else if pattern_len <= 64 {
                SearchKind::BitParallelWide
            } else {
                SearchKind::GeneralSublinear
            }
        }
        other => other,
    }
}

/// One pattern compiled into one engine, reusable across buffers.
pub struct Searcher {
    kind: SearchKind,
    requested: SearchKind,
    options: SearchOptions,
    pattern_len: usize,
    config: SearcherConfig,
    engine: Box<dyn PatternSearch>,
}

impl Searcher {
    /// Compile `pattern` into an engine of the given kind with default
    /// configuration.
    pub fn new(kind: SearchKind, pattern: &[u8], options: SearchOptions) -> Result<Self> {
        Self::with_config(kind, pattern, options, SearcherConfig::default())
    }

    /// Compile `pattern` with explicit configuration.
    ///
    /// Bit-parallel kinds resolve against the pattern length here (narrow
    /// up to 32 bytes, wide up to 64, general-sublinear past that). Fails if
    /// the resolved engine rejects the pattern; see [`crate::TextScanError`].
    pub fn with_config(
        kind: SearchKind,
        pattern: &[u8],
        options: SearchOptions,
        config: SearcherConfig,
    ) -> Result<Self> {
        let resolved = resolve_kind(kind, pattern.len());
        if resolved != kind {
            log::debug!(
                "search kind {:?} resolved to {:?} for pattern of {} bytes",
                kind,
                resolved,
                pattern.len()
            );
        }
        let engine: Box<dyn PatternSearch> = match resolved {
            SearchKind::LiteralScan => Box::new(literal::LiteralSearch::new(pattern, &config)),
            SearchKind::BitParallelNarrow => {
                Box::new(bit_parallel::BitParallelSearch::<u32>::new(pattern, options, &config)?)
            }
            SearchKind::BitParallelWide => {
                Box::new(bit_parallel::BitParallelSearch::<u64>::new(pattern, options, &config)?)
            }
            SearchKind::GeneralSublinear => {
                Box::new(boyer_moore::BoyerMooreSearch::new(pattern, options, &config)?)
            }
            SearchKind::BasicRegex => {
                Box::new(regex::BacktrackingRegexSearch::new(pattern, options, &config)?)
            }
            SearchKind::LinearRegex => {
                Box::new(regex::LinearRegexSearch::new(pattern, options, &config)?)
            }
        };
        log::debug!(
            "created {:?} searcher: pattern {} bytes, options {:?}",
            resolved,
            pattern.len(),
            options
        );
        Ok(Self { kind: resolved, requested: kind, options, pattern_len: pattern.len(), config, engine })
    }

    /// Wrap an externally implemented engine in the searcher contract.
    ///
    /// The wrapper reports `kind` and `options` as given, default
    /// configuration, and a [`pattern_len`](Searcher::pattern_len) of 0; the
    /// pattern stays inside the engine.
    pub fn from_engine(kind: SearchKind, options: SearchOptions, engine: Box<dyn PatternSearch>) -> Self {
        Self {
            kind,
            requested: kind,
            options,
            pattern_len: 0,
            config: SearcherConfig::default(),
            engine,
        }
    }

    /// The algorithm actually selected at creation.
    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    /// The algorithm the caller asked for, before length resolution.
    pub fn requested_kind(&self) -> SearchKind {
        self.requested
    }

    /// The option set this searcher was created with.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Length in bytes of the pattern this searcher was compiled from.
    /// Searchers wrapped around an external engine report 0.
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    /// The configuration this searcher was created with.
    pub fn config(&self) -> &SearcherConfig {
        &self.config
    }

    /// Bytes of scratch a call through this searcher needs.
    pub fn scratch_size(&self) -> usize {
        self.engine.scratch_size()
    }

    /// Scan for the first match at or after `params.start`.
    ///
    /// Returns `None` when the pattern does not occur in the remaining
    /// buffer, when the start offset is past the end, or when the call's
    /// token is cancelled before the scan completes. The same inputs always
    /// produce the same result.
    pub fn search(&self, params: &mut SearchParams<'_>) -> Option<Match> {
        debug_assert!(
            params.scratch.len() >= self.scratch_size(),
            "caller scratch smaller than scratch_size()"
        );
        if params.start > params.haystack.len() {
            return None;
        }
        self.engine.find(params.haystack, params.start, &params.cancel)
    }
}

impl fmt::Debug for Searcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("kind", &self.kind)
            .field("requested", &self.requested)
            .field("options", &self.options)
            .field("pattern_len", &self.pattern_len)
            .finish()
    }
}
