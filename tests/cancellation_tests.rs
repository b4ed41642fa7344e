//! Cooperative cancellation tests
//!
//! A cancelled token must stop a search within one poll interval, a search
//! that saw cancellation must report not-found, and polling must actually
//! happen at the configured cadence on every engine.

use textscan::{
    CancelToken, Match, SearchKind, SearchOptions, SearchParams, Searcher, SearcherConfig,
};

const ALL_KINDS: [SearchKind; 6] = [
    SearchKind::LiteralScan,
    SearchKind::BitParallelNarrow,
    SearchKind::BitParallelWide,
    SearchKind::GeneralSublinear,
    SearchKind::BasicRegex,
    SearchKind::LinearRegex,
];

#[test]
fn test_preset_token_blocks_every_engine() {
    let haystack = b"the match is right here: target!";
    for kind in ALL_KINDS {
        let searcher = Searcher::new(kind, b"target", SearchOptions::MATCH_CASE).unwrap();

        // Sanity: the match is reachable without cancellation
        assert_eq!(
            searcher.search(&mut SearchParams::new(haystack)).map(|m| m.start),
            Some(25),
            "kind {:?}",
            kind
        );

        let token = CancelToken::new();
        token.cancel();
        let mut params = SearchParams::new(haystack).with_cancel(token.clone());
        assert_eq!(searcher.search(&mut params), None, "kind {:?}", kind);
        assert!(token.poll_count() >= 1, "kind {:?} never polled", kind);
    }
}

#[test]
fn test_whole_tail_regex_checks_on_entry() {
    // A pattern that can cross line boundaries is matched against the whole
    // tail in one engine call, so the entry poll is the only stop point.
    let searcher = Searcher::new(SearchKind::LinearRegex, b"alpha\nbeta", SearchOptions::MATCH_CASE).unwrap();
    let haystack = b"...alpha\nbeta...";
    assert_eq!(
        searcher.search(&mut SearchParams::new(haystack)),
        Some(Match { start: 3, len: 10 })
    );

    let token = CancelToken::new();
    token.cancel();
    let mut params = SearchParams::new(haystack).with_cancel(token);
    assert_eq!(searcher.search(&mut params), None);
}

#[test]
fn test_poll_cadence_scales_with_buffer_size() {
    // 256 KiB of filler with a 4 KiB poll interval gives 64 intervals; even
    // engines that re-check slightly early must land well above half that.
    let haystack = vec![b'a'; 256 * 1024];
    let config = SearcherConfig::responsive();

    for (kind, pattern) in [
        (SearchKind::LiteralScan, &b"zz"[..]),
        (SearchKind::BitParallelNarrow, &b"zz"[..]),
        (SearchKind::BitParallelWide, &[b'z'; 40][..]),
        (SearchKind::GeneralSublinear, &b"zz"[..]),
    ] {
        let searcher = Searcher::with_config(kind, pattern, SearchOptions::MATCH_CASE, config.clone()).unwrap();
        let token = CancelToken::new();
        let mut params = SearchParams::new(&haystack).with_cancel(token.clone());
        assert_eq!(searcher.search(&mut params), None);
        assert!(
            token.poll_count() >= 32,
            "kind {:?} polled only {} times over 64 intervals",
            kind,
            token.poll_count()
        );
    }
}

#[test]
fn test_line_block_regex_polls_between_blocks() {
    // Newline-dense text keeps the linear engine in line-block mode, which
    // polls after each block of roughly one interval.
    let mut haystack = Vec::with_capacity(256 * 1024);
    while haystack.len() < 256 * 1024 {
        haystack.extend_from_slice(&[b'a'; 63]);
        haystack.push(b'\n');
    }

    let searcher = Searcher::with_config(
        SearchKind::LinearRegex,
        br"zq[0-9]+",
        SearchOptions::MATCH_CASE,
        SearcherConfig::responsive(),
    )
    .unwrap();
    let token = CancelToken::new();
    let mut params = SearchParams::new(&haystack).with_cancel(token.clone());
    assert_eq!(searcher.search(&mut params), None);
    assert!(
        token.poll_count() >= 32,
        "line-block scan polled only {} times",
        token.poll_count()
    );
}

#[test]
fn test_cancelled_token_latches_across_searches() {
    let searcher = Searcher::new(SearchKind::GeneralSublinear, b"word", SearchOptions::MATCH_CASE).unwrap();
    let token = CancelToken::new();
    token.cancel();

    for _ in 0..3 {
        let mut params = SearchParams::new(b"a word appears").with_cancel(token.clone());
        assert_eq!(searcher.search(&mut params), None);
    }

    // A fresh token restores normal behavior on the same searcher
    let mut params = SearchParams::new(b"a word appears").with_cancel(CancelToken::new());
    assert_eq!(searcher.search(&mut params).map(|m| m.start), Some(2));
}

#[test]
fn test_concurrent_cancel_stops_long_scan() {
    // Worst case for the narrow bit-parallel engine: every window shifts by
    // one byte, so the scan is long enough for a mid-flight cancel to land.
    let mut haystack = vec![b'a'; 16 * 1024 * 1024];
    let tail = haystack.len() - 2;
    haystack[tail] = b'a';
    haystack[tail + 1] = b'b';

    let searcher = Searcher::with_config(
        SearchKind::BitParallelNarrow,
        b"ab",
        SearchOptions::MATCH_CASE,
        SearcherConfig::responsive(),
    )
    .unwrap();
    let token = CancelToken::new();

    let result = std::thread::scope(|scope| {
        let worker = scope.spawn(|| {
            let mut params = SearchParams::new(&haystack).with_cancel(token.clone());
            searcher.search(&mut params)
        });
        std::thread::sleep(std::time::Duration::from_millis(1));
        token.cancel();
        worker.join().unwrap()
    });

    // Either the cancel landed mid-scan or the scan won the race; a cancelled
    // run must report not-found rather than a partial result.
    assert!(
        result.is_none() || result == Some(Match { start: tail, len: 2 }),
        "unexpected result {:?}",
        result
    );
    assert!(token.is_cancelled());
    assert!(token.poll_count() >= 1);
}
