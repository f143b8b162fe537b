//! 贪婪 AI 策略（一层搜索）

use super::eval::evaluate_for;
use super::{sort_and_truncate, AIStrategy, ScoredMove};
use crate::board::Board;

/// 贪婪 AI - 每个合法走法走一步后做静态评估，取走子方得分最高者
///
/// 没有随机性：同样的局面总是返回同样的走法，同分时取生成顺序靠前的。
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyAI;

impl GreedyAI {
    pub fn new() -> Self {
        GreedyAI
    }
}

impl AIStrategy for GreedyAI {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn select_moves(&self, board: &Board, n: usize) -> Vec<ScoredMove> {
        let color = board.side_to_move();

        let mut scored: Vec<ScoredMove> = board
            .legal_moves()
            .into_iter()
            .map(|mv| {
                // 每个走法在副本上评估，原局面不变
                let next = board.play_unchecked(&mv);
                ScoredMove {
                    mv,
                    score: evaluate_for(&next, color) as f64,
                }
            })
            .collect();

        sort_and_truncate(&mut scored, n);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions as tp;
    use crate::types::ChessMove;

    fn best(fen: &str) -> String {
        let board = Board::from_fen(fen).unwrap();
        GreedyAI::new().select_best_move(&board).unwrap().to_uci_str()
    }

    #[test]
    fn test_capture_preference() {
        assert_eq!(best(tp::HANGING_ROOK), "d1d5");
    }

    #[test]
    fn test_black_maximizes_own_advantage() {
        assert_eq!(best(tp::BLACK_WINS_KNIGHT), "d8d4");
    }

    #[test]
    fn test_finds_mate_in_one() {
        assert_eq!(best(tp::MATE_IN_ONE), "a1a8");
    }

    #[test]
    fn test_tie_break_is_generator_order() {
        // 初始局面所有走法都是 0 分，取第一个生成的走法
        let board = Board::starting_position();
        let first = board.legal_moves()[0];
        let picked = GreedyAI::new().select_best_move(&board).unwrap();
        assert_eq!(picked, first);
    }

    #[test]
    fn test_deterministic() {
        let board = Board::from_fen(tp::KIWIPETE).unwrap();
        let a: Vec<ChessMove> = GreedyAI::new()
            .select_moves(&board, 10)
            .into_iter()
            .map(|sm| sm.mv)
            .collect();
        let b: Vec<ChessMove> = GreedyAI::new()
            .select_moves(&board, 10)
            .into_iter()
            .map(|sm| sm.mv)
            .collect();
        assert_eq!(a, b);
        // 搜索不改变原局面
        assert_eq!(board.to_fen(), tp::KIWIPETE);
    }
}
