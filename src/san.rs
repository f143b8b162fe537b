//! SAN (标准代数记谱) 生成

use crate::board::Board;
use crate::types::{ChessMove, GameOutcome, PieceType};

/// 生成走法的 SAN，走法需在 board 的合法走法中
pub fn to_san(board: &Board, mv: &ChessMove) -> String {
    let legal = board.legal_moves();
    to_san_with(board, mv, &legal)
}

/// 使用已生成的合法走法生成 SAN（避免重复生成）
pub fn to_san_with(board: &Board, mv: &ChessMove, legal_moves: &[ChessMove]) -> String {
    let piece = match board.get_piece(mv.from) {
        Some(p) => p,
        None => return mv.to_uci_str(),
    };

    let mut san = String::with_capacity(8);

    if board.is_castle(mv) {
        san.push_str(if mv.to.file > mv.from.file { "O-O" } else { "O-O-O" });
    } else {
        let capture = board.is_capture(mv);

        match piece.kind.san_char() {
            None => {
                // 兵吃子时写出发列
                if capture {
                    san.push(mv.from.file_char());
                }
            }
            Some(letter) => {
                san.push(letter);
                san.push_str(&disambiguation(mv, piece.kind, board, legal_moves));
            }
        }

        if capture {
            san.push('x');
        }
        san.push_str(&mv.to.name());

        if let Some(pt) = mv.promotion {
            san.push('=');
            if let Some(letter) = pt.san_char() {
                san.push(letter);
            }
        }
    }

    let next = board.play_unchecked(mv);
    match next.game_outcome() {
        GameOutcome::Checkmate { .. } => san.push('#'),
        _ if next.in_check() => san.push('+'),
        _ => {}
    }

    san
}

/// 同类棋子可以走到同一格时的消歧义前缀：优先列，其次横线，都不够时两者都写
fn disambiguation(
    mv: &ChessMove,
    kind: PieceType,
    board: &Board,
    legal_moves: &[ChessMove],
) -> String {
    let rivals: Vec<&ChessMove> = legal_moves
        .iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.get_piece(other.from).map(|p| p.kind) == Some(kind)
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let same_file = rivals.iter().any(|o| o.from.file == mv.from.file);
    let same_rank = rivals.iter().any(|o| o.from.rank == mv.from.rank);

    if !same_file {
        mv.from.file_char().to_string()
    } else if !same_rank {
        mv.from.rank_char().to_string()
    } else {
        mv.from.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions as tp;

    fn san_of(fen: &str, uci: &str) -> String {
        let board = Board::from_fen(fen).unwrap();
        to_san(&board, &ChessMove::from_uci_str(uci).unwrap())
    }

    #[test]
    fn test_basic_moves() {
        assert_eq!(san_of(tp::START, "e2e4"), "e4");
        assert_eq!(san_of(tp::START, "g1f3"), "Nf3");
    }

    #[test]
    fn test_captures() {
        assert_eq!(san_of(tp::HANGING_ROOK, "d1d5"), "Qxd5");
        let ep = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        assert_eq!(san_of(ep, "e5f6"), "exf6");
    }

    #[test]
    fn test_castling() {
        assert_eq!(san_of(tp::CASTLING_READY, "e1g1"), "O-O");
        assert_eq!(san_of(tp::CASTLING_READY, "e1c1"), "O-O-O");
    }

    #[test]
    fn test_promotion_check_and_mate() {
        assert_eq!(san_of(tp::PROMOTION_CAPTURE, "a7b8q"), "axb8=Q+");
        assert_eq!(san_of(tp::PROMOTION, "a7a8n"), "a8=N");
        assert_eq!(san_of(tp::MATE_IN_ONE, "a1a8"), "Qa8#");
    }

    #[test]
    fn test_disambiguation() {
        // 两个车都能到 d1：用列区分
        let fen = "4k3/8/8/8/8/8/8/R4RK1 w - - 0 1";
        assert_eq!(san_of(fen, "a1d1"), "Rad1");
        // 两个车在同一列：用横线区分
        let fen = "4k3/8/8/R7/8/8/8/R5K1 w - - 0 1";
        assert_eq!(san_of(fen, "a5a3"), "R5a3");
        // 三个后：需要完整格子名
        let fen = "4k3/8/8/8/8/Q1Q5/8/Q5K1 w - - 0 1";
        assert_eq!(san_of(fen, "a3b2"), "Qa3b2");
    }
}
