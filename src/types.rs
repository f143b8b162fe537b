//! 国际象棋核心类型定义
//!
//! 定义棋盘、走法和对局状态用到的所有基础数据类型

use serde::Serialize;
use std::fmt;

/// 棋子颜色/阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// 获取对方阵营
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }

    /// 转换为 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// 兵的前进方向（rank 增量）
    #[inline]
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// 底线所在 rank
    #[inline]
    pub fn back_rank(&self) -> i8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// 兵的起始 rank
    #[inline]
    pub fn pawn_rank(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// 兵的升变 rank
    #[inline]
    pub fn promotion_rank(&self) -> i8 {
        self.opposite().back_rank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// 升变可选的棋子（按生成顺序）
pub const PROMOTION_TYPES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

impl PieceType {
    /// 从 FEN 字符解析（大小写均可）
    pub fn from_fen_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    /// 转换为 FEN 字符（小写）
    pub fn to_fen_char(&self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// SAN 中的棋子字母，兵没有字母
    pub fn san_char(&self) -> Option<char> {
        match self {
            PieceType::Pawn => None,
            other => Some(other.to_fen_char().to_ascii_uppercase()),
        }
    }

    /// 获取棋子的子力价值
    pub fn value(&self) -> i32 {
        match self {
            PieceType::Pawn => 1,
            PieceType::Knight => 3,
            PieceType::Bishop => 3,
            PieceType::Rook => 5,
            PieceType::Queen => 9,
            PieceType::King => 0,
        }
    }

    /// 是否为轻子（马/象）
    #[inline]
    pub fn is_minor(&self) -> bool {
        matches!(self, PieceType::Knight | PieceType::Bishop)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::Pawn => "Pawn",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    pub fn new(color: Color, kind: PieceType) -> Self {
        Piece { color, kind }
    }

    /// 从 FEN 字符解析：大写白方，小写黑方
    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceType::from_fen_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { color, kind })
    }

    /// 转换为 FEN 字符
    pub fn to_fen_char(&self) -> char {
        let ch = self.kind.to_fen_char();
        match self.color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}

/// 棋盘格子 (file, rank)
///
/// file: 0-7 (a-h)
/// rank: 0-7 (0 是白方底线)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub file: i8,
    pub rank: i8,
}

impl Square {
    pub fn new(file: i8, rank: i8) -> Self {
        Square { file, rank }
    }

    /// 检查格子是否在棋盘范围内
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..8).contains(&self.file) && (0..8).contains(&self.rank)
    }

    /// 格子加偏移量
    #[inline]
    pub fn offset(&self, file_delta: i8, rank_delta: i8) -> Square {
        Square {
            file: self.file + file_delta,
            rank: self.rank + rank_delta,
        }
    }

    /// 转换为数组索引 (rank * 8 + file)
    #[inline]
    pub fn to_index(&self) -> usize {
        (self.rank as usize) * 8 + self.file as usize
    }

    /// 从数组索引恢复
    #[inline]
    pub fn from_index(idx: usize) -> Square {
        Square {
            file: (idx % 8) as i8,
            rank: (idx / 8) as i8,
        }
    }

    /// 是否为浅色格
    #[inline]
    pub fn is_light(&self) -> bool {
        (self.file + self.rank) % 2 == 1
    }

    /// 从代数记号解析（如 "e4"）
    pub fn from_name(s: &str) -> Option<Square> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = match bytes[0] {
            b'a'..=b'h' => (bytes[0] - b'a') as i8,
            _ => return None,
        };
        let rank = match bytes[1] {
            b'1'..=b'8' => (bytes[1] - b'1') as i8,
            _ => return None,
        };
        Some(Square { file, rank })
    }

    /// 转换为代数记号（如 "e4"）
    pub fn name(&self) -> String {
        format!("{}{}", self.file_char(), self.rank + 1)
    }

    #[inline]
    pub fn file_char(&self) -> char {
        (b'a' + self.file as u8) as char
    }

    #[inline]
    pub fn rank_char(&self) -> char {
        (b'1' + self.rank as u8) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

/// 走法
///
/// 吃子、吃过路兵、王车易位、兵双步等标记不存储，由走子前局面推导。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl ChessMove {
    /// 创建普通走法
    pub fn new(from: Square, to: Square) -> Self {
        ChessMove {
            from,
            to,
            promotion: None,
        }
    }

    /// 创建升变走法
    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        ChessMove {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// 从坐标记号解析
    ///
    /// 格式：
    /// - 普通走法：`e2e4`
    /// - 升变走法：`e7e8q`
    pub fn from_uci_str(s: &str) -> Option<ChessMove> {
        let s = s.trim();
        if s.len() != 4 && s.len() != 5 {
            return None;
        }
        let from = Square::from_name(s.get(0..2)?)?;
        let to = Square::from_name(s.get(2..4)?)?;
        let promotion = match s.get(4..5) {
            Some(p) => {
                let pt = PieceType::from_fen_char(p.chars().next()?)?;
                if !PROMOTION_TYPES.contains(&pt) {
                    return None;
                }
                Some(pt)
            }
            None => None,
        };
        Some(ChessMove {
            from,
            to,
            promotion,
        })
    }

    /// 转换为坐标记号
    pub fn to_uci_str(&self) -> String {
        match self.promotion {
            Some(pt) => format!("{}{}{}", self.from, self.to, pt.to_fen_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci_str())
    }
}

/// 王车易位权利
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    /// 查询某方某侧的易位权
    pub fn has(&self, color: Color, kingside: bool) -> bool {
        match (color, kingside) {
            (Color::White, true) => self.white_kingside,
            (Color::White, false) => self.white_queenside,
            (Color::Black, true) => self.black_kingside,
            (Color::Black, false) => self.black_queenside,
        }
    }

    /// 取消某方全部易位权（王走动）
    pub fn clear(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// 车原始格子被走离或被吃时，取消对应一侧的易位权
    pub fn clear_rook_square(&mut self, sq: Square) {
        match (sq.file, sq.rank) {
            (0, 0) => self.white_queenside = false,
            (7, 0) => self.white_kingside = false,
            (0, 7) => self.black_queenside = false,
            (7, 7) => self.black_kingside = false,
            _ => {}
        }
    }

    /// 从 FEN 字段解析（`KQkq` 子集或 `-`）
    pub fn from_fen_str(s: &str) -> Option<CastlingRights> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        if s.is_empty() {
            return None;
        }
        let mut rights = CastlingRights::NONE;
        for ch in s.chars() {
            let slot = match ch {
                'K' => &mut rights.white_kingside,
                'Q' => &mut rights.white_queenside,
                'k' => &mut rights.black_kingside,
                'q' => &mut rights.black_queenside,
                _ => return None,
            };
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(rights)
    }

    /// 转换为 FEN 字段（固定 `KQkq` 顺序）
    pub fn to_fen_str(&self) -> String {
        let mut s = String::with_capacity(4);
        if self.white_kingside {
            s.push('K');
        }
        if self.white_queenside {
            s.push('Q');
        }
        if self.black_kingside {
            s.push('k');
        }
        if self.black_queenside {
            s.push('q');
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

/// 和棋原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawReason {
    InsufficientMaterial,
    Other,
}

/// 对局状态，每次查询时由局面推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameOutcome {
    Ongoing,
    Check,
    Checkmate { winner: Color },
    Stalemate,
    Draw { reason: DrawReason },
}

impl GameOutcome {
    /// 对局是否已结束
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameOutcome::Checkmate { .. } | GameOutcome::Stalemate | GameOutcome::Draw { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_is_terminal() {
        assert!(!GameOutcome::Ongoing.is_terminal());
        assert!(!GameOutcome::Check.is_terminal());
        assert!(GameOutcome::Checkmate { winner: Color::White }.is_terminal());
        assert!(GameOutcome::Stalemate.is_terminal());
        assert!(GameOutcome::Draw {
            reason: DrawReason::InsufficientMaterial
        }
        .is_terminal());
    }

    #[test]
    fn test_square_from_name() {
        assert_eq!(Square::from_name("a1"), Some(Square::new(0, 0)));
        assert_eq!(Square::from_name("e4"), Some(Square::new(4, 3)));
        assert_eq!(Square::from_name("h8"), Some(Square::new(7, 7)));
        assert_eq!(Square::from_name("i1"), None);
        assert_eq!(Square::from_name("a9"), None);
        assert_eq!(Square::from_name("a0"), None);
        assert_eq!(Square::from_name("e"), None);
    }

    #[test]
    fn test_square_names_total() {
        for idx in 0..64 {
            let sq = Square::from_index(idx);
            assert!(sq.is_valid());
            assert_eq!(sq.to_index(), idx);
            assert_eq!(Square::from_name(&sq.name()), Some(sq));
        }
    }

    #[test]
    fn test_square_color() {
        assert!(!Square::from_name("a1").unwrap().is_light());
        assert!(Square::from_name("h1").unwrap().is_light());
        assert!(Square::from_name("d1").unwrap().is_light());
    }

    #[test]
    fn test_move_from_uci_str() {
        let m = ChessMove::from_uci_str("e2e4").unwrap();
        assert_eq!(m.from, Square::new(4, 1));
        assert_eq!(m.to, Square::new(4, 3));
        assert!(m.promotion.is_none());

        let m = ChessMove::from_uci_str("a7a8n").unwrap();
        assert_eq!(m.promotion, Some(PieceType::Knight));
        assert_eq!(m.to_uci_str(), "a7a8n");

        assert!(ChessMove::from_uci_str("a7a8k").is_none());
        assert!(ChessMove::from_uci_str("e2").is_none());
    }

    #[test]
    fn test_castling_rights_fen() {
        assert_eq!(CastlingRights::from_fen_str("KQkq"), Some(CastlingRights::ALL));
        assert_eq!(CastlingRights::from_fen_str("-"), Some(CastlingRights::NONE));
        let r = CastlingRights::from_fen_str("Kq").unwrap();
        assert!(r.has(Color::White, true));
        assert!(!r.has(Color::White, false));
        assert!(r.has(Color::Black, false));
        assert_eq!(r.to_fen_str(), "Kq");
        assert!(CastlingRights::from_fen_str("KK").is_none());
        assert!(CastlingRights::from_fen_str("X").is_none());
    }

    #[test]
    fn test_piece_values() {
        assert_eq!(PieceType::Pawn.value(), 1);
        assert_eq!(PieceType::Queen.value(), 9);
        assert_eq!(PieceType::King.value(), 0);
        assert_eq!(Piece::from_fen_char('N'), Some(Piece::new(Color::White, PieceType::Knight)));
        assert_eq!(Piece::new(Color::Black, PieceType::Queen).to_fen_char(), 'q');
    }
}
