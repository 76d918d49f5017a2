//! Layered configuration surface: compiled-in defaults, environment
//! overrides, then an optional TOML file — poorest to richest, the way a
//! small ambient config loader composes in the broader corpus. Library
//! code never reads the environment or disk implicitly; the binary entry
//! point calls [`Config::load`] once at startup and threads the result
//! through.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eval::HeuristicConfig;

/// Tuning knobs for one search call: time budget, depth bounds, TT/eval
/// cache sizing, aspiration window, and the evaluator's weight table.
///
/// Mirrors the `Ai*` key set from the spec's Config surface (§4.11); field
/// names are the snake_case form of those keys so [`Config::apply_env`]'s
/// `AI_<SCREAMING_SNAKE_KEY>` convention maps onto them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wall-clock budget for one `score_board` call, in milliseconds.
    pub time_budget_ms: u64,
    /// Always-reached minimum iterative-deepening depth.
    pub min_depth: i8,
    /// Ceiling on iterative-deepening depth regardless of remaining budget.
    pub max_depth: i8,
    /// Transposition table size in megabytes.
    pub tt_size_mb: usize,
    /// Entries per TT slot (associativity).
    pub tt_buckets: usize,
    /// Eval-cache capacity (whole-board entries), FIFO-evicted past this.
    pub eval_cache_capacity: usize,
    /// Aspiration window half-width around the previous iteration's score.
    pub aspiration_window: i32,
    /// Pairs of captures required to win (almost always 5, i.e. 10 stones).
    pub capture_win_pairs: u8,
    /// Number of Lazy-SMP workers for `score_board_direct_depth_parallel`.
    pub parallel_workers: usize,
    /// Enable loading/flushing the TT snapshot at process boundaries.
    pub enable_tt_persistence: bool,
    /// TT snapshot path; resolved relative to `/cache_logs` when it exists.
    pub tt_persistence_path: String,
    /// Evaluator pattern-score weight table.
    pub heuristic: HeuristicConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_budget_ms: 500,
            min_depth: 10,
            max_depth: 20,
            tt_size_mb: 64,
            tt_buckets: 4,
            eval_cache_capacity: 1 << 20,
            aspiration_window: 100,
            capture_win_pairs: 5,
            parallel_workers: 1,
            enable_tt_persistence: false,
            tt_persistence_path: "tt_snapshot.bin".to_string(),
            heuristic: HeuristicConfig::default(),
        }
    }
}

impl Config {
    /// Build the layered config: compiled defaults, then `AI_*` environment
    /// overrides, then an optional TOML file named by `AI_CONFIG_PATH`.
    /// Unknown env vars and unknown TOML keys are ignored (forward-compat),
    /// never a hard error.
    #[must_use]
    pub fn load() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        if let Ok(path) = std::env::var("AI_CONFIG_PATH") {
            cfg.apply_toml_file(Path::new(&path));
        }
        cfg
    }

    /// Apply any recognized `AI_<SCREAMING_SNAKE_KEY>` environment variable
    /// over the current values. Malformed values (fails to parse) are
    /// logged and skipped rather than treated as a hard error.
    pub fn apply_env(&mut self) {
        macro_rules! env_override {
            ($key:literal, $field:expr, $parse:expr) => {
                if let Ok(raw) = std::env::var($key) {
                    match $parse(&raw) {
                        Ok(v) => $field = v,
                        Err(_) => tracing::warn!(target: "ai::cache", key = $key, value = %raw, "ignoring unparseable env override"),
                    }
                }
            };
        }

        env_override!("AI_TIME_BUDGET_MS", self.time_budget_ms, str::parse::<u64>);
        env_override!("AI_MIN_DEPTH", self.min_depth, str::parse::<i8>);
        env_override!("AI_MAX_DEPTH", self.max_depth, str::parse::<i8>);
        env_override!("AI_TT_SIZE_MB", self.tt_size_mb, str::parse::<usize>);
        env_override!("AI_TT_BUCKETS", self.tt_buckets, str::parse::<usize>);
        env_override!("AI_EVAL_CACHE_CAPACITY", self.eval_cache_capacity, str::parse::<usize>);
        env_override!("AI_ASPIRATION_WINDOW", self.aspiration_window, str::parse::<i32>);
        env_override!("AI_CAPTURE_WIN_PAIRS", self.capture_win_pairs, str::parse::<u8>);
        env_override!("AI_PARALLEL_WORKERS", self.parallel_workers, str::parse::<usize>);
        env_override!("AI_ENABLE_TT_PERSISTENCE", self.enable_tt_persistence, str::parse::<bool>);
        if let Ok(path) = std::env::var("AI_TT_PERSISTENCE_PATH") {
            self.tt_persistence_path = path;
        }
    }

    /// Shadow fields with values from a TOML file. A missing file is not an
    /// error (there may simply be no override file configured); a present
    /// but unparseable file is logged and left unapplied.
    pub fn apply_toml_file(&mut self, path: &Path) {
        let Ok(text) = std::fs::read_to_string(path) else {
            tracing::debug!(target: "ai::cache", path = %path.display(), "no config file found, skipping");
            return;
        };
        match toml::from_str::<PartialConfig>(&text) {
            Ok(partial) => partial.apply_onto(self),
            Err(err) => {
                tracing::warn!(target: "ai::cache", path = %path.display(), error = %err, "failed to parse config file, keeping prior values");
            }
        }
    }

    /// Recompute the heuristic hash after a weight-table edit. Call this
    /// before handing the config snapshot to a fresh root search so TT
    /// scoping observes the new weights.
    pub fn refresh_heuristic_hash(&self) -> u64 {
        self.heuristic.heuristic_hash()
    }
}

/// Every field optional, so a TOML file only needs to mention the keys it
/// overrides — the rest fall through to whatever `Config` already holds.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    time_budget_ms: Option<u64>,
    min_depth: Option<i8>,
    max_depth: Option<i8>,
    tt_size_mb: Option<usize>,
    tt_buckets: Option<usize>,
    eval_cache_capacity: Option<usize>,
    aspiration_window: Option<i32>,
    capture_win_pairs: Option<u8>,
    parallel_workers: Option<usize>,
    enable_tt_persistence: Option<bool>,
    tt_persistence_path: Option<String>,
}

impl PartialConfig {
    fn apply_onto(self, cfg: &mut Config) {
        if let Some(v) = self.time_budget_ms { cfg.time_budget_ms = v; }
        if let Some(v) = self.min_depth { cfg.min_depth = v; }
        if let Some(v) = self.max_depth { cfg.max_depth = v; }
        if let Some(v) = self.tt_size_mb { cfg.tt_size_mb = v; }
        if let Some(v) = self.tt_buckets { cfg.tt_buckets = v; }
        if let Some(v) = self.eval_cache_capacity { cfg.eval_cache_capacity = v; }
        if let Some(v) = self.aspiration_window { cfg.aspiration_window = v; }
        if let Some(v) = self.capture_win_pairs { cfg.capture_win_pairs = v; }
        if let Some(v) = self.parallel_workers { cfg.parallel_workers = v; }
        if let Some(v) = self.enable_tt_persistence { cfg.enable_tt_persistence = v; }
        if let Some(v) = self.tt_persistence_path { cfg.tt_persistence_path = v; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.min_depth, 10);
        assert_eq!(cfg.time_budget_ms, 500);
        assert_eq!(cfg.capture_win_pairs, 5);
    }

    #[test]
    fn test_apply_toml_file_overrides_listed_keys_only() {
        let dir = std::env::temp_dir();
        let path = dir.join("gomoku_test_config_override.toml");
        std::fs::write(&path, "time_budget_ms = 250\nmax_depth = 15\n").unwrap();

        let mut cfg = Config::default();
        cfg.apply_toml_file(&path);

        assert_eq!(cfg.time_budget_ms, 250);
        assert_eq!(cfg.max_depth, 15);
        assert_eq!(cfg.min_depth, 10); // untouched key keeps its default

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_apply_toml_file_missing_file_is_not_an_error() {
        let mut cfg = Config::default();
        cfg.apply_toml_file(Path::new("/nonexistent/gomoku_config_does_not_exist.toml"));
        assert_eq!(cfg.time_budget_ms, Config::default().time_budget_ms);
    }

    #[test]
    fn test_refresh_heuristic_hash_matches_default_heuristic_config() {
        let cfg = Config::default();
        assert_eq!(cfg.refresh_heuristic_hash(), HeuristicConfig::default().heuristic_hash());
    }
}
