//! Binary snapshot persistence for the long-lived caches.
//!
//! The teacher has no equivalent of this module — `score_board` there only
//! ever ran inside a single process lifetime. This gives the engine
//! cross-restart memory: on startup, load whatever was flushed last time;
//! on `SIGINT`/`SIGTERM`, flush once and exit.
//!
//! Three files, each a `bincode`-encoded snapshot behind a one-byte format
//! version:
//! - the transposition table snapshot, at `Config::tt_persistence_path`
//! - `board_cache.bin` — the whole-board [`crate::cache::EvalCache`]
//! - `depth_cache.bin` — the canonical-hash [`crate::cache::RootCache`]
//!
//! All three resolve relative to `/cache_logs` when that directory exists,
//! falling back to the current working directory otherwise. Absent or
//! truncated files are treated as empty rather than an error.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{EvalCache, RootCache};
use crate::cache::root_cache::RootEntry;
use crate::search::tt::{TTEntry, TranspositionTable};

/// Bumped whenever the snapshot layout changes incompatibly. A mismatched
/// version is treated the same as a missing file: logged and skipped.
pub const FORMAT_VERSION: u8 = 1;

const BOARD_CACHE_FILE: &str = "board_cache.bin";
const DEPTH_CACHE_FILE: &str = "depth_cache.bin";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("io error reading/writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] bincode::Error),
    #[error("snapshot at {path} has format version {found}, expected {expected}")]
    VersionMismatch { path: PathBuf, found: u8, expected: u8 },
    #[error("snapshot at {path} shape {found:?} does not match table shape {expected:?}")]
    ShapeMismatch { path: PathBuf, found: (usize, usize), expected: (usize, usize) },
}

#[derive(Debug, Serialize, Deserialize)]
struct TtSnapshot {
    format_version: u8,
    size: usize,
    buckets: usize,
    entries: Vec<TTEntry>,
    root_transpose_size: usize,
    root_entries: Vec<RootEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BoardCacheSnapshot {
    format_version: u8,
    entries: Vec<(u64, u64, i32)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DepthCacheSnapshot {
    format_version: u8,
    entries: Vec<RootEntry>,
}

/// Resolve `name` relative to `/cache_logs` if that directory exists, else
/// the current working directory.
#[must_use]
pub fn resolve_path(name: &str) -> PathBuf {
    let cache_logs = Path::new("/cache_logs");
    if cache_logs.is_dir() {
        cache_logs.join(name)
    } else {
        PathBuf::from(name)
    }
}

fn read_file(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::debug!(target: "ai::cache", path = %path.display(), error = %err, "no snapshot to load");
            None
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    std::fs::write(path, bytes).map_err(|source| CacheError::Io { path: path.to_path_buf(), source })
}

/// Load a TT snapshot from `path` and apply it onto `tt`/`root_cache` if the
/// persisted `(size, buckets)` matches their current shape. Any failure
/// (missing file, bad version, shape mismatch) is logged and treated as a
/// no-op — startup never fails because of a stale or absent snapshot.
pub fn load_tt_snapshot(path: &Path, tt: &TranspositionTable, root_cache: &RootCache) {
    let Some(bytes) = read_file(path) else { return };
    let snapshot: TtSnapshot = match bincode::deserialize(&bytes) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(target: "ai::cache", path = %path.display(), error = %err, "failed to decode tt snapshot, starting cold");
            return;
        }
    };
    if snapshot.format_version != FORMAT_VERSION {
        tracing::warn!(target: "ai::cache", path = %path.display(), found = snapshot.format_version, expected = FORMAT_VERSION, "tt snapshot format version mismatch, skipping");
        return;
    }
    if (snapshot.size, snapshot.buckets) != tt.shape() {
        tracing::warn!(target: "ai::cache", path = %path.display(), found = ?(snapshot.size, snapshot.buckets), expected = ?tt.shape(), "tt snapshot shape mismatch, skipping");
        return;
    }
    tt.load_entries(&snapshot.entries);
    if snapshot.root_transpose_size == root_cache.shape() {
        root_cache.load_entries(&snapshot.root_entries);
    } else {
        tracing::warn!(target: "ai::cache", path = %path.display(), "root-transpose snapshot shape mismatch, skipping that half");
    }
    tracing::info!(target: "ai::cache", path = %path.display(), entries = snapshot.entries.len(), "loaded tt snapshot");
}

/// Serialize `tt`/`root_cache` out to `path`.
pub fn flush_tt_snapshot(path: &Path, tt: &TranspositionTable, root_cache: &RootCache) -> Result<(), CacheError> {
    let (size, buckets) = tt.shape();
    let snapshot = TtSnapshot {
        format_version: FORMAT_VERSION,
        size,
        buckets,
        entries: tt.export_entries(),
        root_transpose_size: root_cache.shape(),
        root_entries: root_cache.export_entries(),
    };
    let bytes = bincode::serialize(&snapshot)?;
    write_file(path, &bytes)?;
    tracing::info!(target: "ai::cache", path = %path.display(), entries = snapshot.entries.len(), "flushed tt snapshot");
    Ok(())
}

/// Load `board_cache.bin` into `cache`, resolved relative to `/cache_logs`.
pub fn load_board_cache(cache: &EvalCache) {
    let path = resolve_path(BOARD_CACHE_FILE);
    let Some(bytes) = read_file(&path) else { return };
    match bincode::deserialize::<BoardCacheSnapshot>(&bytes) {
        Ok(snap) if snap.format_version == FORMAT_VERSION => {
            cache.load_entries(&snap.entries);
            tracing::info!(target: "ai::cache", path = %path.display(), entries = snap.entries.len(), "loaded board cache");
        }
        Ok(snap) => {
            tracing::warn!(target: "ai::cache", path = %path.display(), found = snap.format_version, expected = FORMAT_VERSION, "board cache format version mismatch, skipping");
        }
        Err(err) => {
            tracing::warn!(target: "ai::cache", path = %path.display(), error = %err, "failed to decode board cache, starting cold");
        }
    }
}

/// Flush the whole-board evaluation cache to `board_cache.bin`.
pub fn flush_board_cache(cache: &EvalCache) -> Result<(), CacheError> {
    let path = resolve_path(BOARD_CACHE_FILE);
    let snapshot = BoardCacheSnapshot { format_version: FORMAT_VERSION, entries: cache.export_entries() };
    let bytes = bincode::serialize(&snapshot)?;
    write_file(&path, &bytes)
}

/// Load `depth_cache.bin` into `cache`, resolved relative to `/cache_logs`.
pub fn load_depth_cache(cache: &RootCache) {
    let path = resolve_path(DEPTH_CACHE_FILE);
    let Some(bytes) = read_file(&path) else { return };
    match bincode::deserialize::<DepthCacheSnapshot>(&bytes) {
        Ok(snap) if snap.format_version == FORMAT_VERSION => {
            cache.load_entries(&snap.entries);
            tracing::info!(target: "ai::cache", path = %path.display(), entries = snap.entries.len(), "loaded depth cache");
        }
        Ok(snap) => {
            tracing::warn!(target: "ai::cache", path = %path.display(), found = snap.format_version, expected = FORMAT_VERSION, "depth cache format version mismatch, skipping");
        }
        Err(err) => {
            tracing::warn!(target: "ai::cache", path = %path.display(), error = %err, "failed to decode depth cache, starting cold");
        }
    }
}

/// Flush the root-transpose cache to `depth_cache.bin`.
pub fn flush_depth_cache(cache: &RootCache) -> Result<(), CacheError> {
    let path = resolve_path(DEPTH_CACHE_FILE);
    let snapshot = DepthCacheSnapshot { format_version: FORMAT_VERSION, entries: cache.export_entries() };
    let bytes = bincode::serialize(&snapshot)?;
    write_file(&path, &bytes)
}

/// Everything the shutdown flush needs a handle to.
pub struct PersistenceHandles {
    pub tt: Arc<TranspositionTable>,
    pub root_cache: Arc<RootCache>,
    pub eval_cache: Arc<EvalCache>,
    pub tt_path: PathBuf,
}

/// Install a one-shot `SIGINT`/`SIGTERM` handler that flushes every cache
/// and then exits. Guarded by an `AtomicBool` so a second signal arriving
/// while the first flush is in flight is dropped rather than racing it.
///
/// Must be called at most once per process; `ctrlc::set_handler` itself
/// only permits a single global handler.
pub fn install_signal_flush(handles: PersistenceHandles) -> Result<(), ctrlc::Error> {
    let fired = AtomicBool::new(false);
    ctrlc::set_handler(move || {
        if fired.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(target: "ai::cache", "shutdown signal received, flushing caches");
        if let Err(err) = flush_tt_snapshot(&handles.tt_path, &handles.tt, &handles.root_cache) {
            tracing::warn!(target: "ai::cache", error = %err, "tt snapshot flush failed");
        }
        if let Err(err) = flush_board_cache(&handles.eval_cache) {
            tracing::warn!(target: "ai::cache", error = %err, "board cache flush failed");
        }
        if let Err(err) = flush_depth_cache(&handles.root_cache) {
            tracing::warn!(target: "ai::cache", error = %err, "depth cache flush failed");
        }
        std::process::exit(0);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;
    use crate::search::tt::EntryType;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gomoku_persistence_test_{name}_{:?}", std::thread::current().id()))
    }

    #[test]
    fn test_flush_then_load_tt_snapshot_roundtrips() {
        let tt = TranspositionTable::with_buckets(1, 4);
        tt.store(0xABC, 1, 5, 42, EntryType::Exact, Some(Pos::new(3, 3)));
        let root_cache = RootCache::new(256);
        root_cache.store(0xDEF, Pos::new(4, 4), 6, 99);

        let path = temp_path("tt");
        flush_tt_snapshot(&path, &tt, &root_cache).unwrap();

        let tt2 = TranspositionTable::with_buckets(1, 4);
        let root_cache2 = RootCache::new(256);
        load_tt_snapshot(&path, &tt2, &root_cache2);

        assert_eq!(tt2.probe(0xABC, 1, 5, -1000, 1000).unwrap().0, 42);
        assert_eq!(root_cache2.get(0xDEF).unwrap().best_move, Pos::new(4, 4));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_tt_snapshot_missing_file_is_a_noop() {
        let tt = TranspositionTable::with_buckets(1, 4);
        let root_cache = RootCache::new(256);
        load_tt_snapshot(Path::new("/nonexistent/gomoku_snapshot_missing.bin"), &tt, &root_cache);
        assert_eq!(tt.stats().used, 0);
    }

    #[test]
    fn test_load_tt_snapshot_shape_mismatch_skips() {
        let tt = TranspositionTable::with_buckets(1, 4);
        tt.store(0x1, 1, 5, 10, EntryType::Exact, None);
        let root_cache = RootCache::new(256);
        let path = temp_path("shape_mismatch");
        flush_tt_snapshot(&path, &tt, &root_cache).unwrap();

        let tt2 = TranspositionTable::with_buckets(1, 8); // different bucket count
        let root_cache2 = RootCache::new(256);
        load_tt_snapshot(&path, &tt2, &root_cache2);
        assert_eq!(tt2.stats().used, 0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_board_cache_roundtrip() {
        let cache = EvalCache::new(16);
        cache.store(7, 1, 123);

        // resolve_path falls back to CWD, so point directly at a temp file
        // by exercising the snapshot encode/decode path instead of the real
        // fixed filename to avoid clobbering a real cache file on disk.
        let snapshot = BoardCacheSnapshot { format_version: FORMAT_VERSION, entries: cache.export_entries() };
        let bytes = bincode::serialize(&snapshot).unwrap();
        let decoded: BoardCacheSnapshot = bincode::deserialize(&bytes).unwrap();

        let cache2 = EvalCache::new(16);
        cache2.load_entries(&decoded.entries);
        assert_eq!(cache2.get(7, 1), Some(123));
    }

    #[test]
    fn test_resolve_path_falls_back_to_cwd_without_cache_logs_dir() {
        // /cache_logs does not exist in the test sandbox.
        let resolved = resolve_path("board_cache.bin");
        assert_eq!(resolved, PathBuf::from("board_cache.bin"));
    }
}
