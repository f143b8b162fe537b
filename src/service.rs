//! 对外的四个核心操作
//!
//! 每次调用都从 FEN 重新构造局面，服务本身不保存对局状态。
//! 外部引擎（如有）由服务持有，核心搜索只通过 `ExternalEngine` 调用它。

use crate::ai::{AIEngine, Difficulty, GreedyAI, AIStrategy};
use crate::board::Board;
use crate::config::ServiceConfig;
use crate::engine::{self, best_move_within, EngineKind, EngineStatus, ExternalEngine};
use crate::error::{ChessError, ChessResult};
use crate::san::to_san_with;
use crate::types::{ChessMove, DrawReason, GameOutcome, PieceType, Square, PROMOTION_TYPES};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// 接口版本
pub const API_VERSION: &str = "1.0";

/// 没有提示时的文本
pub const NO_HINT: &str = "No hints available";

/// 走子结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub new_position: String,
    pub move_notation: String,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_draw: bool,
    pub draw_reason: Option<String>,
    pub winner: Option<String>,
    pub outcome: GameOutcome,
}

impl MoveOutcome {
    fn new(next: &Board, notation: String) -> Self {
        let outcome = next.game_outcome();
        if outcome.is_terminal() {
            info!("Game over: {:?}", outcome);
        }
        let draw_reason = match outcome {
            GameOutcome::Stalemate => Some("Stalemate".to_string()),
            GameOutcome::Draw {
                reason: DrawReason::InsufficientMaterial,
            } => Some("Insufficient material".to_string()),
            GameOutcome::Draw {
                reason: DrawReason::Other,
            } => Some("Draw".to_string()),
            _ => None,
        };
        let winner = match outcome {
            GameOutcome::Checkmate { winner } => Some(winner.to_string()),
            _ => None,
        };

        MoveOutcome {
            new_position: next.to_fen(),
            move_notation: notation,
            is_check: next.in_check(),
            is_checkmate: matches!(outcome, GameOutcome::Checkmate { .. }),
            is_draw: draw_reason.is_some(),
            draw_reason,
            winner,
            outcome,
        }
    }
}

/// AI 走子结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineMoveResult {
    #[serde(flatten)]
    pub result: MoveOutcome,
    pub from: String,
    pub to: String,
}

/// 提示结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HintResult {
    pub hint: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl HintResult {
    fn unavailable() -> Self {
        HintResult {
            hint: NO_HINT.to_string(),
            from: None,
            to: None,
        }
    }
}

/// 后端健康状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub status: &'static str,
    pub engine: &'static str,
    pub version: &'static str,
}

/// 解析升变棋子字母；无法识别时按未指定处理
pub fn parse_promotion(s: Option<&str>) -> Option<PieceType> {
    s.and_then(|p| p.chars().next())
        .and_then(PieceType::from_fen_char)
        .filter(|pt| PROMOTION_TYPES.contains(pt))
}

fn parse_square(name: &str) -> ChessResult<Square> {
    Square::from_name(name).ok_or_else(|| ChessError::InvalidSquare(name.to_string()))
}

/// 国际象棋服务
pub struct ChessService {
    engine: Option<Arc<dyn ExternalEngine>>,
    config: ServiceConfig,
}

impl ChessService {
    /// 只使用内置 AI
    pub fn new(config: ServiceConfig) -> Self {
        ChessService {
            engine: None,
            config,
        }
    }

    /// 使用给定的外部引擎
    pub fn with_engine(engine: Arc<dyn ExternalEngine>, config: ServiceConfig) -> Self {
        ChessService {
            engine: Some(engine),
            config,
        }
    }

    /// 按配置查找外部引擎；找不到时退回内置 AI
    pub fn from_config(config: ServiceConfig) -> Self {
        if !config.search_engine {
            info!("External engine disabled, using basic AI");
            return Self::new(config);
        }

        let found = match &config.engine_path {
            Some(path) => engine::discover(std::slice::from_ref(path)),
            None => engine::discover(engine::DEFAULT_ENGINE_PATHS),
        };

        match found {
            Some(uci) => Self::with_engine(Arc::new(uci), config),
            None => Self::new(config),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// 外部引擎能力状态
    pub fn engine_status(&self) -> EngineStatus {
        match &self.engine {
            Some(_) => EngineStatus {
                available: true,
                kind: EngineKind::External,
            },
            None => EngineStatus {
                available: false,
                kind: EngineKind::Basic,
            },
        }
    }

    /// 后端状态
    pub fn status(&self) -> BackendStatus {
        BackendStatus {
            status: "available",
            engine: if self.engine.is_some() {
                "stockfish"
            } else {
                "basic"
            },
            version: API_VERSION,
        }
    }

    /// 某格棋子的合法目标格；空格或无子可走时返回空列表
    pub fn legal_destinations(&self, fen: &str, square: &str) -> ChessResult<Vec<String>> {
        let board = Board::from_fen(fen)?;
        let from = parse_square(square)?;

        let mut targets: Vec<String> = Vec::new();
        for mv in board.moves_from(from) {
            // 四种升变只列一次目标格
            let name = mv.to.name();
            if !targets.contains(&name) {
                targets.push(name);
            }
        }
        Ok(targets)
    }

    /// 走一步棋；兵到底线且未指定升变时升后
    pub fn apply_move(
        &self,
        fen: &str,
        from: &str,
        to: &str,
        promotion: Option<PieceType>,
    ) -> ChessResult<MoveOutcome> {
        let board = Board::from_fen(fen)?;
        let from = parse_square(from)?;
        let to = parse_square(to)?;

        let promotes = matches!(
            board.get_piece(from),
            Some(p) if p.kind == PieceType::Pawn && to.rank == p.color.promotion_rank()
        );
        let mv = if promotes {
            ChessMove::with_promotion(from, to, promotion.unwrap_or(PieceType::Queen))
        } else {
            ChessMove::new(from, to)
        };

        let legal = board.legal_moves();
        if !legal.contains(&mv) {
            return Err(ChessError::illegal(from, to));
        }
        play(&board, &mv, &legal)
    }

    /// AI 走子
    pub fn engine_move(&self, fen: &str, difficulty: Difficulty) -> ChessResult<EngineMoveResult> {
        let board = Board::from_fen(fen)?;
        let legal = board.legal_moves();
        if legal.is_empty() {
            return Err(ChessError::NoLegalMoves);
        }

        let fallback = AIEngine::for_difficulty(difficulty, &self.config.ai_config());
        let mv = self.search(&board, difficulty.time_budget(), &fallback)?;
        let result = play(&board, &mv, &legal)?;

        Ok(EngineMoveResult {
            result,
            from: mv.from.name(),
            to: mv.to.name(),
        })
    }

    /// 提示走法；没有合法走法时返回 "No hints available"
    pub fn hint(&self, fen: &str) -> ChessResult<HintResult> {
        let board = Board::from_fen(fen)?;
        let legal = board.legal_moves();
        if legal.is_empty() {
            return Ok(HintResult::unavailable());
        }

        let from_engine = self.engine.as_ref().and_then(|engine| {
            match best_move_within(engine, &board, self.config.hint_budget) {
                Ok(mv) => Some(mv),
                Err(e) => {
                    warn!("Hint from {} failed: {}, using greedy", engine.name(), e);
                    None
                }
            }
        });

        let mv = match from_engine.or_else(|| GreedyAI::new().select_best_move(&board)) {
            Some(mv) => mv,
            None => return Ok(HintResult::unavailable()),
        };

        Ok(HintResult {
            hint: format!("Consider {}", to_san_with(&board, &mv, &legal)),
            from: Some(mv.from.name()),
            to: Some(mv.to.name()),
        })
    }

    /// 先问外部引擎，引擎不可用时用内置策略；超时直接上报
    fn search(&self, board: &Board, budget: Duration, fallback: &AIEngine) -> ChessResult<ChessMove> {
        if let Some(engine) = &self.engine {
            match best_move_within(engine, board, budget) {
                Ok(mv) => {
                    debug!("AI move {} from {}", mv, engine.name());
                    return Ok(mv);
                }
                Err(ChessError::EngineUnavailable(reason)) => {
                    warn!("Engine unavailable ({}), falling back to {}", reason, fallback.name());
                }
                Err(e) => return Err(e),
            }
        }

        let mv = fallback.best_move(board)?;
        debug!("AI move {} from {}", mv, fallback.name());
        Ok(mv)
    }
}

impl Default for ChessService {
    fn default() -> Self {
        Self::new(ServiceConfig::basic())
    }
}

/// 走子并生成结果（SAN 在走子前的局面上生成）
fn play(board: &Board, mv: &ChessMove, legal: &[ChessMove]) -> ChessResult<MoveOutcome> {
    let notation = to_san_with(board, mv, legal);
    let next = board.apply(mv)?;
    Ok(MoveOutcome::new(&next, notation))
}
