//! Binary entry point: wires `Config`, structured logging, cross-restart
//! persistence, and signal handling around the `gomoku` library, then runs
//! a self-play demo game to exercise the full staged pipeline end to end.

use std::path::PathBuf;
use std::process::ExitCode;

use gomoku::engine::pos_to_notation;
use gomoku::{AIEngine, Config, GameState, Rules, Status};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gomoku=info")))
        .init();

    let config = Config::load();
    tracing::info!(target: "ai::search", tt_size_mb = config.tt_size_mb, max_depth = config.max_depth, "starting engine");

    let mut engine = AIEngine::from_config(&config);

    let tt_path = PathBuf::from(&config.tt_persistence_path);
    if config.enable_tt_persistence {
        gomoku::persistence::load_tt_snapshot(&tt_path, &engine.shared_tt(), &engine.root_cache());
        gomoku::persistence::load_board_cache(&engine.eval_cache());
        gomoku::persistence::load_depth_cache(&engine.root_cache());

        let handles = gomoku::persistence::PersistenceHandles {
            tt: engine.shared_tt(),
            root_cache: engine.root_cache(),
            eval_cache: engine.eval_cache(),
            tt_path: tt_path.clone(),
        };
        if let Err(err) = gomoku::persistence::install_signal_flush(handles) {
            tracing::warn!(target: "ai::cache", error = %err, "failed to install signal handler");
        }
    }

    let mut state = GameState::new(Rules::default());
    let zobrist = gomoku::zobrist::ZobristTable::new();

    while !state.status.is_over() {
        let to_move = state.to_move;
        let Some(mv) = engine.get_move(&state.board, to_move) else {
            tracing::warn!(target: "ai::search", "no legal move available, ending game");
            break;
        };
        tracing::info!(target: "ai::search", move_pos = %pos_to_notation(mv), color = ?to_move, "self-play move");
        state.apply(&zobrist, mv);
    }

    match state.status {
        Status::BlackWon => tracing::info!(target: "ai::search", "black wins"),
        Status::WhiteWon => tracing::info!(target: "ai::search", "white wins"),
        Status::Draw => tracing::info!(target: "ai::search", "draw"),
        _ => tracing::info!(target: "ai::search", "game ended early"),
    }

    if config.enable_tt_persistence {
        if let Err(err) = gomoku::persistence::flush_tt_snapshot(&tt_path, &engine.shared_tt(), &engine.root_cache()) {
            tracing::warn!(target: "ai::cache", error = %err, "tt snapshot flush failed");
            return ExitCode::FAILURE;
        }
        if let Err(err) = gomoku::persistence::flush_board_cache(&engine.eval_cache()) {
            tracing::warn!(target: "ai::cache", error = %err, "board cache flush failed");
            return ExitCode::FAILURE;
        }
        if let Err(err) = gomoku::persistence::flush_depth_cache(&engine.root_cache()) {
            tracing::warn!(target: "ai::cache", error = %err, "depth cache flush failed");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
