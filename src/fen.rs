//! FEN 解析和生成
//!
//! 标准六字段 FEN
//!
//! 格式: `<棋盘> <回合> <易位权> <过路兵格> <半回合计数> <回合数>`
//!
//! 棋盘符号：
//! - 白方：K Q R B N P
//! - 黑方：k q r b n p
//! - 空格：数字 (1-8)

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::types::{CastlingRights, ChessMove, Color, Piece, Square};

/// 标准初始局面
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FEN 中的棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenPiece {
    pub square: Square,
    pub piece: Piece,
}

/// FEN 解析后的状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenState {
    pub pieces: Vec<FenPiece>,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// 解析 FEN 字符串（只做结构校验，王的数量等由 Board 校验）
pub fn parse_fen(fen: &str) -> ChessResult<FenState> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 6 {
        return Err(ChessError::malformed(format!(
            "expected 6 fields '<board> <turn> <castling> <en-passant> <halfmove> <fullmove>', got {}",
            parts.len()
        )));
    }

    let pieces = parse_board(parts[0])?;

    let mut turn_chars = parts[1].chars();
    let turn = match (turn_chars.next(), turn_chars.next()) {
        (Some(c), None) => Color::from_fen_char(c),
        _ => None,
    }
    .ok_or_else(|| ChessError::malformed(format!("invalid turn: {}", parts[1])))?;

    let castling = CastlingRights::from_fen_str(parts[2])
        .ok_or_else(|| ChessError::malformed(format!("invalid castling rights: {}", parts[2])))?;

    let en_passant = parse_en_passant(parts[3], turn)?;

    let halfmove_clock: u32 = parts[4]
        .parse()
        .map_err(|_| ChessError::malformed(format!("invalid halfmove clock: {}", parts[4])))?;

    let fullmove_number: u32 = parts[5]
        .parse()
        .map_err(|_| ChessError::malformed(format!("invalid fullmove number: {}", parts[5])))?;
    if fullmove_number == 0 {
        return Err(ChessError::malformed("fullmove number must be at least 1"));
    }

    Ok(FenState {
        pieces,
        turn,
        castling,
        en_passant,
        halfmove_clock,
        fullmove_number,
    })
}

/// 解析棋盘字段
fn parse_board(board_str: &str) -> ChessResult<Vec<FenPiece>> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != 8 {
        return Err(ChessError::malformed(format!(
            "expected 8 ranks, got {}",
            rows.len()
        )));
    }

    let mut pieces = Vec::with_capacity(32);

    for (row_idx, row_str) in rows.iter().enumerate() {
        // FEN 从上往下是 rank 8 到 rank 1
        let rank = (7 - row_idx) as i8;
        let mut file: i8 = 0;

        for ch in row_str.chars() {
            if let Some(d) = ch.to_digit(10) {
                if !(1..=8).contains(&d) {
                    return Err(ChessError::malformed(format!("invalid empty count: {}", ch)));
                }
                file += d as i8;
            } else {
                let piece = Piece::from_fen_char(ch)
                    .ok_or_else(|| ChessError::malformed(format!("invalid piece char: {}", ch)))?;
                if file < 8 {
                    pieces.push(FenPiece {
                        square: Square::new(file, rank),
                        piece,
                    });
                }
                file += 1;
            }

            if file > 8 {
                break;
            }
        }

        if file != 8 {
            return Err(ChessError::malformed(format!(
                "rank {} has {} files, expected 8",
                rank + 1,
                file
            )));
        }
    }

    Ok(pieces)
}

/// 解析过路兵字段，目标格必须在走子方对面的第三横线上
fn parse_en_passant(s: &str, turn: Color) -> ChessResult<Option<Square>> {
    if s == "-" {
        return Ok(None);
    }
    let sq = Square::from_name(s)
        .ok_or_else(|| ChessError::malformed(format!("invalid en-passant square: {}", s)))?;
    let expected_rank = match turn {
        Color::White => 5,
        Color::Black => 2,
    };
    if sq.rank != expected_rank {
        return Err(ChessError::malformed(format!(
            "en-passant square {} inconsistent with side to move",
            s
        )));
    }
    Ok(Some(sq))
}

/// 从解析状态生成 FEN 字符串
#[allow(clippy::needless_range_loop)]
pub fn state_to_fen(state: &FenState) -> String {
    let mut board: [[Option<Piece>; 8]; 8] = [[None; 8]; 8];
    for fp in &state.pieces {
        if fp.square.is_valid() {
            board[fp.square.rank as usize][fp.square.file as usize] = Some(fp.piece);
        }
    }

    let mut rows = Vec::with_capacity(8);

    // 从 rank 8 到 rank 1
    for rank in (0..8).rev() {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for file in 0..8 {
            match board[rank][file] {
                Some(piece) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(piece.to_fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    let en_passant = state
        .en_passant
        .map_or_else(|| "-".to_string(), |sq| sq.name());

    format!(
        "{} {} {} {} {} {}",
        rows.join("/"),
        state.turn.to_fen_char(),
        state.castling.to_fen_str(),
        en_passant,
        state.halfmove_clock,
        state.fullmove_number
    )
}

/// 在 FEN 上执行走法（坐标记号），返回新的 FEN
pub fn apply_move_to_fen(fen: &str, move_str: &str) -> ChessResult<String> {
    let board = Board::from_fen(fen)?;
    let mv = ChessMove::from_uci_str(move_str)
        .ok_or_else(|| ChessError::illegal(move_str, ""))?;
    Ok(board.apply(&mv)?.to_fen())
}
