//! Bit-parallel BNDM engines
//!
//! Backward nondeterministic DAWG matching: pattern membership is encoded as
//! one mask word per byte value, and a window is verified by AND-ing masks
//! while shifting a state word. A mismatch shifts the window by the longest
//! pattern prefix seen, so common text skips most positions. The pattern
//! must fit the mask word, which is what splits the narrow (32-bit) and wide
//! (64-bit) variants; both are the same skeleton instantiated at a different
//! word width.

use std::ops::{BitAnd, BitOrAssign, Shl, Shr};

use super::{fold_byte, CancelToken, Match, PatternSearch, SearchOptions, SearcherConfig};
use crate::error::{Result, TextScanError};

/// Mask word for the BNDM state machine.
///
/// `Send + Sync` is part of the bound because the engine holding the mask
/// table must satisfy the search contract's thread-safety requirements.
pub(crate) trait MaskWord:
    Copy
    + Eq
    + Send
    + Sync
    + BitOrAssign
    + BitAnd<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    const BITS: usize;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;
}

impl MaskWord for u32 {
    const BITS: usize = 32;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MAX: Self = u32::MAX;
}

impl MaskWord for u64 {
    const BITS: usize = 64;
    const ZERO: Self = 0;
    const ONE: Self = 1;
    const MAX: Self = u64::MAX;
}

pub(crate) struct BitParallelSearch<W: MaskWord> {
    masks: [W; 256],
    len: usize,
    fold: bool,
    interval: usize,
}

impl<W: MaskWord> BitParallelSearch<W> {
    pub(crate) fn new(pattern: &[u8], options: SearchOptions, config: &SearcherConfig) -> Result<Self> {
        let m = pattern.len();
        if m == 0 {
            return Err(TextScanError::invalid_pattern(
                "bit-parallel search requires a non-empty pattern",
            ));
        }
        if m > W::BITS {
            return Err(TextScanError::invalid_pattern(format!(
                "pattern length {} exceeds the {}-bit mask word",
                m,
                W::BITS
            )));
        }
        let fold = !options.contains(SearchOptions::MATCH_CASE);
        let mut masks = [W::ZERO; 256];
        for (i, &b) in pattern.iter().enumerate() {
            // Bit k of a byte's mask marks that byte at pattern position
            // m - 1 - k, so the backward window scan walks bits upward.
            masks[fold_byte(b, fold) as usize] |= W::ONE << (m - 1 - i) as u32;
        }
        Ok(Self { masks, len: m, fold, interval: config.cancel_check_interval.max(1) })
    }

    #[inline]
    fn mask_for(&self, b: u8) -> W {
        self.masks[fold_byte(b, self.fold) as usize]
    }
}

impl<W: MaskWord> PatternSearch for BitParallelSearch<W> {
    fn find(&self, haystack: &[u8], start: usize, cancel: &CancelToken) -> Option<Match> {
        if cancel.check() {
            return None;
        }
        let n = haystack.len();
        let m = self.len;
        if n - start < m {
            return None;
        }
        let accept = W::ONE << (m - 1) as u32;
        let live = W::MAX >> (W::BITS - m) as u32;
        let mut pos = start;
        let mut next_poll = start.saturating_add(self.interval);
        while pos + m <= n {
            if pos >= next_poll {
                if cancel.check() {
                    log::trace!("bit-parallel scan cancelled at offset {}", pos);
                    return None;
                }
                next_poll = pos.saturating_add(self.interval);
            }
            let mut j = m;
            let mut last = m;
            let mut d = live;
            loop {
                d = d & self.mask_for(haystack[pos + j - 1]);
                j -= 1;
                if (d & accept) != W::ZERO {
                    if j > 0 {
                        last = j;
                    } else {
                        return Some(Match { start: pos, len: m });
                    }
                }
                if j == 0 || d == W::ZERO {
                    break;
                }
                d = d << 1;
            }
            pos += last;
        }
        None
    }
}
