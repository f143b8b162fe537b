//! 错误类型
//!
//! 每个错误只影响当次调用，核心不保存会被失败调用破坏的状态。

use std::time::Duration;
use thiserror::Error;

/// 解析、走法校验和搜索返回的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// 局面文本无法解析
    #[error("Malformed position: {0}")]
    MalformedPosition(String),

    /// 格子名不在 `a1`..`h8` 内
    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    /// 走法不在当前局面的合法走法中
    #[error("Illegal move: {from}{to}")]
    IllegalMove { from: String, to: String },

    /// 在没有合法走法的局面上请求搜索
    #[error("No legal moves available")]
    NoLegalMoves,

    /// 外部引擎在时间预算内没有返回
    #[error("Engine timed out after {0:?}")]
    EngineTimeout(Duration),

    /// 外部引擎不存在或已损坏，调用方退回内置搜索
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// 无法识别的策略名称
    #[error("Unknown strategy: {0}. Available: random, greedy")]
    UnknownStrategy(String),
}

impl ChessError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ChessError::MalformedPosition(msg.into())
    }

    pub(crate) fn illegal(from: impl ToString, to: impl ToString) -> Self {
        ChessError::IllegalMove {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// 结果类型别名
pub type ChessResult<T> = Result<T, ChessError>;
