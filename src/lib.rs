//! Chess Backend
//!
//! 国际象棋规则引擎和走法搜索 - 支持 FEN 输入输出

pub mod ai;
pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod fen;
pub mod http;
pub mod san;
pub mod service;
pub mod test_positions;
pub mod types;

pub use ai::{
    evaluate, evaluate_for, AIConfig, AIEngine, AIStrategy, Difficulty, GreedyAI, RandomAI,
    ScoredMove, AVAILABLE_STRATEGIES, MATE_SCORE,
};
pub use board::{get_legal_moves_from_fen, Board};
pub use config::{EngineArgs, ServiceConfig};
pub use engine::{best_move_within, EngineKind, EngineStatus, ExternalEngine, UciEngine};
pub use error::{ChessError, ChessResult};
pub use fen::{apply_move_to_fen, parse_fen, FenState, STARTING_FEN};
pub use san::to_san;
pub use service::{BackendStatus, ChessService, EngineMoveResult, HintResult, MoveOutcome};
pub use types::{ChessMove, Color, DrawReason, GameOutcome, Piece, PieceType, Square};
