//! 静态局面评估
//!
//! 只算子力，不含位置分。这是一个刻意简单的基准评估。

use crate::board::Board;
use crate::types::{Color, GameOutcome};

/// 将杀分（白方视角）
pub const MATE_SCORE: i32 = 1000;

/// 评估局面，白方视角：正数白方优，负数黑方优
pub fn evaluate(board: &Board) -> i32 {
    match board.game_outcome() {
        GameOutcome::Checkmate { winner } => match winner {
            Color::White => MATE_SCORE,
            Color::Black => -MATE_SCORE,
        },
        GameOutcome::Stalemate | GameOutcome::Draw { .. } => 0,
        GameOutcome::Ongoing | GameOutcome::Check => material(board),
    }
}

/// 子力差（白方视角）
pub fn material(board: &Board) -> i32 {
    board
        .pieces()
        .map(|(_, piece)| match piece.color {
            Color::White => piece.kind.value(),
            Color::Black => -piece.kind.value(),
        })
        .sum()
}

/// 从某方视角的评估
#[inline]
pub fn evaluate_for(board: &Board, color: Color) -> i32 {
    match color {
        Color::White => evaluate(board),
        Color::Black => -evaluate(board),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions as tp;

    #[test]
    fn test_start_is_balanced() {
        assert_eq!(evaluate(&Board::starting_position()), 0);
    }

    #[test]
    fn test_missing_white_queen() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(evaluate(&board), -9);
        assert_eq!(evaluate_for(&board, Color::Black), 9);
    }

    #[test]
    fn test_terminal_scores() {
        // 白方被将死
        assert_eq!(evaluate(&Board::from_fen(tp::FOOLS_MATE).unwrap()), -MATE_SCORE);
        // 逼和即使白方多一个后也是 0
        assert_eq!(evaluate(&Board::from_fen(tp::STALEMATE).unwrap()), 0);
        assert_eq!(evaluate(&Board::from_fen(tp::KINGS_ONLY).unwrap()), 0);
    }

    #[test]
    fn test_black_mated_scores_positive() {
        let board = Board::from_fen(tp::MATE_IN_ONE).unwrap();
        let mated = board
            .apply(&crate::types::ChessMove::from_uci_str("a1a8").unwrap())
            .unwrap();
        assert_eq!(evaluate(&mated), MATE_SCORE);
    }
}
