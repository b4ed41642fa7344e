//! Substring search over UTF-16 code units
//!
//! One-shot sequential search for interactive queries over wide text, with
//! no precomputation. Case-insensitive mode folds each code unit through its
//! one-to-one uppercase mapping. That is deliberately narrower than full
//! Unicode case folding: multi-character expansions are not applied and
//! surrogate halves compare raw, so callers get stable per-unit semantics
//! instead of a silent behavior upgrade.

use crate::search::SearchOptions;

/// Find the first occurrence of `needle` in `haystack`, both given as UTF-16
/// code units.
///
/// Without [`SearchOptions::MATCH_CASE`] each unit pair is compared through
/// [`fold_unit`]. Runs in O(n * m); build a [`crate::Searcher`] instead when
/// the same pattern is matched against many buffers. An empty needle matches
/// at offset 0.
pub fn search_wide(haystack: &[u16], needle: &[u16], options: SearchOptions) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    if options.contains(SearchOptions::MATCH_CASE) {
        haystack.windows(needle.len()).position(|w| w == needle)
    } else {
        let folded: Vec<u16> = needle.iter().map(|&u| fold_unit(u)).collect();
        haystack
            .windows(folded.len())
            .position(|w| w.iter().zip(&folded).all(|(&h, &n)| fold_unit(h) == n))
    }
}

/// Uppercase a single UTF-16 code unit.
///
/// Units whose uppercase form is a single basic-plane character map to it;
/// everything else (surrogate halves, expanding mappings) is returned
/// unchanged.
pub fn fold_unit(unit: u16) -> u16 {
    if unit < 0x80 {
        return (unit as u8).to_ascii_uppercase() as u16;
    }
    if (0xD800..=0xDFFF).contains(&unit) {
        return unit;
    }
    let c = match char::from_u32(unit as u32) {
        Some(c) => c,
        None => return unit,
    };
    let mut upper = c.to_uppercase();
    let first = upper.next().unwrap_or(c);
    if upper.next().is_none() && (first as u32) <= 0xFFFF {
        first as u32 as u16
    } else {
        unit
    }
}
