//! AI 策略模块
//!
//! 内置两种策略：随机、贪婪（一层评估）。外部引擎见 `crate::engine`。

mod eval;
mod greedy;
mod random;

pub use eval::{evaluate, evaluate_for, material, MATE_SCORE};
pub use greedy::GreedyAI;
pub use random::RandomAI;

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::types::ChessMove;
use serde::Deserialize;
use std::cmp::Ordering;
use std::time::Duration;

/// 可用策略名称
pub const AVAILABLE_STRATEGIES: &[&str] = &["random", "greedy"];

/// AI 配置
#[derive(Debug, Clone, Default)]
pub struct AIConfig {
    /// 随机种子（只影响随机策略）
    pub seed: Option<u64>,
}

/// 走法评分
#[derive(Debug, Clone)]
pub struct ScoredMove {
    pub mv: ChessMove,
    pub score: f64,
}

/// AI 策略接口
pub trait AIStrategy: Send + Sync {
    /// 策略名称
    fn name(&self) -> &'static str;

    /// 选择走法（返回带评分的走法列表）
    fn select_moves(&self, board: &Board, n: usize) -> Vec<ScoredMove>;

    /// 选择最佳走法
    fn select_best_move(&self, board: &Board) -> Option<ChessMove> {
        self.select_moves(board, 1).first().map(|sm| sm.mv)
    }
}

/// 排序辅助函数（稳定排序：同分保持生成顺序）
pub(crate) fn sort_and_truncate(scored: &mut Vec<ScoredMove>, n: usize) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(n);
}

/// 难度等级：决定外部引擎的思考时间，以及没有外部引擎时用哪种内置策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(pub u32);

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty(2)
    }
}

impl Difficulty {
    /// 外部引擎的思考时间
    pub fn time_budget(&self) -> Duration {
        match self.0 {
            1 => Duration::from_millis(100),
            3 => Duration::from_millis(1000),
            _ => Duration::from_millis(500),
        }
    }

    /// 没有外部引擎时使用的策略：1 级随机，其余贪婪
    pub fn fallback_strategy(&self) -> &'static str {
        if self.0 == 1 {
            "random"
        } else {
            "greedy"
        }
    }
}

/// AI 引擎 - 统一的 AI 接口
pub struct AIEngine {
    strategy: Box<dyn AIStrategy>,
}

impl AIEngine {
    /// 创建随机 AI
    pub fn random(seed: Option<u64>) -> Self {
        AIEngine {
            strategy: Box::new(RandomAI::new(seed)),
        }
    }

    /// 创建贪婪 AI
    pub fn greedy() -> Self {
        AIEngine {
            strategy: Box::new(GreedyAI::new()),
        }
    }

    /// 从策略名称创建
    pub fn from_strategy(name: &str, config: &AIConfig) -> ChessResult<Self> {
        match name.to_lowercase().as_str() {
            "random" => Ok(Self::random(config.seed)),
            "greedy" => Ok(Self::greedy()),
            _ => Err(ChessError::UnknownStrategy(name.to_string())),
        }
    }

    /// 按难度创建内置策略
    pub fn for_difficulty(difficulty: Difficulty, config: &AIConfig) -> Self {
        match difficulty.fallback_strategy() {
            "random" => Self::random(config.seed),
            _ => Self::greedy(),
        }
    }

    /// 策略名称
    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    /// 选择走法（带评分）
    pub fn select_moves(&self, board: &Board, n: usize) -> Vec<ScoredMove> {
        self.strategy.select_moves(board, n)
    }

    /// 选择最佳走法；没有合法走法时返回 NoLegalMoves
    pub fn best_move(&self, board: &Board) -> ChessResult<ChessMove> {
        self.strategy
            .select_best_move(board)
            .ok_or(ChessError::NoLegalMoves)
    }

    /// 从 FEN 选择走法（返回带评分的走法字符串）
    pub fn select_moves_fen(&self, fen: &str, n: usize) -> ChessResult<Vec<(String, f64)>> {
        let board = Board::from_fen(fen)?;
        Ok(self
            .select_moves(&board, n)
            .into_iter()
            .map(|sm| (sm.mv.to_uci_str(), sm.score))
            .collect())
    }

    /// 从 FEN 选择最佳走法
    pub fn select_best_move_fen(&self, fen: &str) -> ChessResult<Option<String>> {
        let board = Board::from_fen(fen)?;
        Ok(self
            .strategy
            .select_best_move(&board)
            .map(|m| m.to_uci_str()))
    }
}
