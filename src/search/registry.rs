//! Opaque-handle arena over searcher instances
//!
//! The host boundary this kernel grew out of hands callers an opaque token
//! per compiled pattern and requires an explicit destroy. This module keeps
//! that contract as a safe arena: handles index a concurrent map of shared
//! [`Searcher`] instances, and every operation except [`create`] treats a
//! dead handle as a programming error and panics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::{CancelToken, Match, SearchKind, SearchOptions, SearchParams, Searcher, SearcherConfig};
use crate::error::Result;

static INSTANCES: Lazy<DashMap<u64, Arc<Searcher>>> = Lazy::new(DashMap::new);
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque token naming one registered [`Searcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchHandle(u64);

/// Compile a pattern and register the searcher, returning its handle.
pub fn create(kind: SearchKind, pattern: &[u8], options: SearchOptions) -> Result<SearchHandle> {
    create_with_config(kind, pattern, options, SearcherConfig::default())
}

/// Like [`create`], with explicit configuration.
pub fn create_with_config(
    kind: SearchKind,
    pattern: &[u8],
    options: SearchOptions,
    config: SearcherConfig,
) -> Result<SearchHandle> {
    let searcher = Searcher::with_config(kind, pattern, options, config)?;
    let id = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    INSTANCES.insert(id, Arc::new(searcher));
    log::debug!("registered search handle {}", id);
    Ok(SearchHandle(id))
}

/// The registered searcher behind `handle`.
///
/// Cloning the `Arc` out keeps long scans from pinning a map shard, and a
/// racing [`destroy`] lets an in-flight call finish on its own reference.
fn instance(handle: SearchHandle) -> Arc<Searcher> {
    match INSTANCES.get(&handle.0) {
        Some(entry) => Arc::clone(entry.value()),
        None => panic!("use of destroyed or unknown search handle {}", handle.0),
    }
}

/// Scratch bytes a call through `handle` needs.
///
/// # Panics
///
/// Panics if the handle was never created or already destroyed.
pub fn scratch_size(handle: SearchHandle) -> usize {
    instance(handle).scratch_size()
}

/// Run one search through `handle`. See [`Searcher::search`].
///
/// # Panics
///
/// Panics if the handle was never created or already destroyed.
pub fn search(handle: SearchHandle, params: &mut SearchParams<'_>) -> Option<Match> {
    instance(handle).search(params)
}

/// Cancel the in-flight call on `handle` that carries `token`.
///
/// # Panics
///
/// Panics if the handle was never created or already destroyed.
pub fn cancel(handle: SearchHandle, token: &CancelToken) {
    // The handle only gates validity; the token itself carries the signal.
    let _ = instance(handle);
    token.cancel();
}

/// Unregister and drop the searcher behind `handle`.
///
/// # Panics
///
/// Panics if the handle was never created or already destroyed.
pub fn destroy(handle: SearchHandle) {
    match INSTANCES.remove(&handle.0) {
        Some(_) => log::debug!("destroyed search handle {}", handle.0),
        None => panic!("double destroy of search handle {}", handle.0),
    }
}

/// Number of live registered searchers.
pub fn live_count() -> usize {
    INSTANCES.len()
}
