//! 随机 AI 策略

use super::{sort_and_truncate, AIStrategy, ScoredMove};
use crate::board::Board;
use rand::prelude::*;

/// 随机 AI - 在合法走法中均匀随机选择
pub struct RandomAI {
    rng: StdRng,
}

impl RandomAI {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        RandomAI { rng }
    }
}

impl AIStrategy for RandomAI {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select_moves(&self, board: &Board, n: usize) -> Vec<ScoredMove> {
        let moves = board.legal_moves();
        let mut rng = self.rng.clone();

        let mut scored: Vec<ScoredMove> = moves
            .into_iter()
            .map(|mv| ScoredMove {
                mv,
                score: rng.gen::<f64>(),
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

    #[test]
    fn test_random_moves_are_legal() {
        let board = Board::starting_position();
        let ai = RandomAI::new(Some(7));
        let legal = board.legal_moves();
        let picked = ai.select_moves(&board, 5);
        assert_eq!(picked.len(), 5);
        for sm in picked {
            assert!(legal.contains(&sm.mv));
        }
    }

    #[test]
    fn test_same_seed_same_move() {
        let board = Board::from_fen(tp::KIWIPETE).unwrap();
        let a = RandomAI::new(Some(42)).select_best_move(&board);
        let b = RandomAI::new(Some(42)).select_best_move(&board);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_moves_when_mated() {
        let board = Board::from_fen(tp::FOOLS_MATE).unwrap();
        assert!(RandomAI::new(None).select_best_move(&board).is_none());
    }
}
