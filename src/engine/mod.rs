//! 外部引擎能力接口
//!
//! 核心只依赖 `ExternalEngine::best_move`，引擎进程的启动和关闭由持有者负责。

mod uci;

pub use uci::{discover, UciEngine, DEFAULT_ENGINE_PATHS};

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::types::ChessMove;
use log::debug;
use serde::Serialize;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// 超出预算后额外等待的时间（进程通信开销）
pub const TIMEOUT_GRACE: Duration = Duration::from_millis(250);

/// 外部引擎：给定局面和思考时间返回一个走法
pub trait ExternalEngine: Send + Sync {
    /// 引擎名称（用于日志和状态）
    fn name(&self) -> &str;

    /// 给定局面和思考时间返回最佳走法
    fn best_move(&self, board: &Board, budget: Duration) -> ChessResult<ChessMove>;
}

/// 引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    External,
    Basic,
}

/// 引擎能力状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub available: bool,
    pub kind: EngineKind,
}

/// 在预算内向外部引擎要走法
///
/// 在独立线程里调用引擎，超过 `budget + TIMEOUT_GRACE` 仍未返回时报 EngineTimeout，
/// 不会无限等待。返回的走法必须是合法走法。
pub fn best_move_within(
    engine: &Arc<dyn ExternalEngine>,
    board: &Board,
    budget: Duration,
) -> ChessResult<ChessMove> {
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(engine);
    let position = board.clone();

    thread::Builder::new()
        .name("external-engine".to_string())
        .spawn(move || {
            let result = worker.best_move(&position, budget);
            // 调用方可能已超时离开
            let _ = tx.send(result);
        })
        .map_err(|e| ChessError::EngineUnavailable(e.to_string()))?;

    let mv = match rx.recv_timeout(budget + TIMEOUT_GRACE) {
        Ok(result) => result?,
        Err(mpsc::RecvTimeoutError::Timeout) => return Err(ChessError::EngineTimeout(budget)),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            return Err(ChessError::EngineUnavailable(format!(
                "{} stopped without answering",
                engine.name()
            )))
        }
    };

    if !board.is_legal(&mv) {
        return Err(ChessError::EngineUnavailable(format!(
            "{} returned illegal move {}",
            engine.name(),
            mv
        )));
    }

    debug!("{} chose {} in budget {:?}", engine.name(), mv, budget);
    Ok(mv)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// 总是返回固定走法的引擎
    pub struct FixedEngine(pub &'static str);

    impl ExternalEngine for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn best_move(&self, _board: &Board, _budget: Duration) -> ChessResult<ChessMove> {
            ChessMove::from_uci_str(self.0)
                .ok_or_else(|| ChessError::EngineUnavailable("bad move".to_string()))
        }
    }

    /// 超时不返回的引擎
    pub struct SleepyEngine(pub Duration);

    impl ExternalEngine for SleepyEngine {
        fn name(&self) -> &str {
            "sleepy"
        }

        fn best_move(&self, board: &Board, _budget: Duration) -> ChessResult<ChessMove> {
            thread::sleep(self.0);
            board.legal_moves().first().copied().ok_or(ChessError::NoLegalMoves)
        }
    }

    /// 已损坏的引擎
    pub struct BrokenEngine;

    impl ExternalEngine for BrokenEngine {
        fn name(&self) -> &str {
            "broken"
        }

        fn best_move(&self, _board: &Board, _budget: Duration) -> ChessResult<ChessMove> {
            Err(ChessError::EngineUnavailable("pipe closed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::test_positions as tp;

    #[test]
    fn test_engine_move_returned() {
        let engine: Arc<dyn ExternalEngine> = Arc::new(FixedEngine("e2e4"));
        let board = Board::starting_position();
        let mv = best_move_within(&engine, &board, Duration::from_millis(50)).unwrap();
        assert_eq!(mv.to_uci_str(), "e2e4");
    }

    #[test]
    fn test_engine_illegal_move_rejected() {
        let engine: Arc<dyn ExternalEngine> = Arc::new(FixedEngine("e2e5"));
        let board = Board::starting_position();
        let err = best_move_within(&engine, &board, Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, ChessError::EngineUnavailable(_)));
    }

    #[test]
    fn test_engine_timeout() {
        let engine: Arc<dyn ExternalEngine> = Arc::new(SleepyEngine(Duration::from_secs(2)));
        let board = Board::from_fen(tp::KIWIPETE).unwrap();
        let budget = Duration::from_millis(10);
        let err = best_move_within(&engine, &board, budget).unwrap_err();
        assert_eq!(err, ChessError::EngineTimeout(budget));
    }

    #[test]
    fn test_engine_error_propagated() {
        let engine: Arc<dyn ExternalEngine> = Arc::new(BrokenEngine);
        let board = Board::starting_position();
        let err = best_move_within(&engine, &board, Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, ChessError::EngineUnavailable(_)));
    }
}
