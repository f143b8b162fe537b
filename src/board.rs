//! 国际象棋棋盘
//!
//! 使用 64 格数组存储棋子。局面对外不可变：`apply` 返回新局面，
//! 搜索时每层复制一份局面而不是 make/undo。

use crate::error::{ChessError, ChessResult};
use crate::fen::{parse_fen, state_to_fen, FenPiece, FenState, STARTING_FEN};
use crate::types::{
    CastlingRights, ChessMove, Color, DrawReason, GameOutcome, Piece, PieceType, Square,
    PROMOTION_TYPES,
};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// 预计算每个格子的跳跃目标
fn step_targets(offsets: &[(i8, i8)]) -> Vec<Vec<Square>> {
    (0..64)
        .map(|idx| {
            let sq = Square::from_index(idx);
            offsets
                .iter()
                .map(|&(df, dr)| sq.offset(df, dr))
                .filter(|t| t.is_valid())
                .collect()
        })
        .collect()
}

// 马/王的走法表
lazy_static::lazy_static! {
    static ref KNIGHT_TARGETS: Vec<Vec<Square>> = step_targets(&KNIGHT_OFFSETS);
    static ref KING_TARGETS: Vec<Vec<Square>> = step_targets(&KING_OFFSETS);
}

/// 棋盘局面
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// 64 个格子 (rank * 8 + file)
    squares: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    /// 缓存双方王的位置 [白, 黑]
    kings: [Square; 2],
}

#[inline]
fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting_position()
    }
}

impl Board {
    /// 标准初始局面
    pub fn starting_position() -> Board {
        let state = parse_fen(STARTING_FEN).expect("starting FEN is well formed");
        Board::from_state(state).expect("starting position is valid")
    }

    /// 从 FEN 字符串创建棋盘
    pub fn from_fen(fen: &str) -> ChessResult<Board> {
        Board::from_state(parse_fen(fen)?)
    }

    /// 从解析状态创建棋盘，校验双方各一个王且非走子方不处于被将军状态
    pub fn from_state(state: FenState) -> ChessResult<Board> {
        let mut squares = [None; 64];
        let mut kings: [Option<Square>; 2] = [None, None];

        for fp in &state.pieces {
            if fp.piece.kind == PieceType::Pawn
                && (fp.square.rank == 0 || fp.square.rank == 7)
            {
                return Err(ChessError::malformed(format!(
                    "pawn on back rank at {}",
                    fp.square
                )));
            }
            if fp.piece.kind == PieceType::King {
                let slot = &mut kings[color_index(fp.piece.color)];
                if slot.is_some() {
                    return Err(ChessError::malformed(format!(
                        "more than one {} king",
                        fp.piece.color
                    )));
                }
                *slot = Some(fp.square);
            }
            squares[fp.square.to_index()] = Some(fp.piece);
        }

        let (white_king, black_king) = match (kings[0], kings[1]) {
            (Some(w), Some(b)) => (w, b),
            (None, _) => return Err(ChessError::malformed("missing White king")),
            (_, None) => return Err(ChessError::malformed("missing Black king")),
        };

        let board = Board {
            squares,
            side_to_move: state.turn,
            castling: state.castling,
            en_passant: state.en_passant,
            halfmove_clock: state.halfmove_clock,
            fullmove_number: state.fullmove_number,
            kings: [white_king, black_king],
        };

        // 不能轮到一方走时对方王正被将军
        if board.is_in_check(board.side_to_move.opposite()) {
            return Err(ChessError::malformed(format!(
                "{} is in check but it is {}'s turn",
                board.side_to_move.opposite(),
                board.side_to_move
            )));
        }

        Ok(board)
    }

    /// 导出 FEN 字符串
    pub fn to_fen(&self) -> String {
        let pieces = self
            .pieces()
            .map(|(square, piece)| FenPiece { square, piece })
            .collect();
        state_to_fen(&FenState {
            pieces,
            turn: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        })
    }

    /// 获取当前回合
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// 获取某格子的棋子
    #[inline]
    pub fn get_piece(&self, sq: Square) -> Option<Piece> {
        if !sq.is_valid() {
            return None;
        }
        self.squares[sq.to_index()]
    }

    /// 所有棋子（按 a1..h8 顺序）
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(idx, p)| p.map(|piece| (Square::from_index(idx), piece)))
    }

    /// 找到王的位置（使用缓存）
    #[inline]
    pub fn find_king(&self, color: Color) -> Square {
        self.kings[color_index(color)]
    }

    /// 检查是否被将军
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.find_king(color), color.opposite())
    }

    /// 走子方是否被将军
    #[inline]
    pub fn in_check(&self) -> bool {
        self.is_in_check(self.side_to_move)
    }

    /// 检测某格子是否被某方攻击（不生成完整走法列表）
    pub fn is_square_attacked(&self, target: Square, attacker: Color) -> bool {
        // 兵：从目标格反向找
        let back = -attacker.forward();
        for df in [-1, 1] {
            if self.get_piece(target.offset(df, back)) == Some(Piece::new(attacker, PieceType::Pawn)) {
                return true;
            }
        }

        // 马
        for &sq in &KNIGHT_TARGETS[target.to_index()] {
            if self.get_piece(sq) == Some(Piece::new(attacker, PieceType::Knight)) {
                return true;
            }
        }

        // 王
        for &sq in &KING_TARGETS[target.to_index()] {
            if self.get_piece(sq) == Some(Piece::new(attacker, PieceType::King)) {
                return true;
            }
        }

        // 车/后（直线）
        if self.ray_hits(target, &ROOK_DIRECTIONS, attacker, PieceType::Rook) {
            return true;
        }

        // 象/后（斜线）
        self.ray_hits(target, &BISHOP_DIRECTIONS, attacker, PieceType::Bishop)
    }

    /// 沿方向找到的第一个棋子是否为 attacker 的 slider 或后
    fn ray_hits(
        &self,
        target: Square,
        directions: &[(i8, i8)],
        attacker: Color,
        slider: PieceType,
    ) -> bool {
        for &(df, dr) in directions {
            let mut sq = target.offset(df, dr);
            while sq.is_valid() {
                if let Some(piece) = self.get_piece(sq) {
                    if piece.color == attacker
                        && (piece.kind == slider || piece.kind == PieceType::Queen)
                    {
                        return true;
                    }
                    break;
                }
                sq = sq.offset(df, dr);
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // 走法生成
    // ------------------------------------------------------------------

    /// 生成伪合法走法（可能让己方王处于被将军状态）
    pub fn pseudo_legal_moves(&self) -> Vec<ChessMove> {
        let mut moves = Vec::with_capacity(64);
        let color = self.side_to_move;

        for (from, piece) in self.pieces() {
            if piece.color != color {
                continue;
            }
            match piece.kind {
                PieceType::Pawn => self.gen_pawn_moves(from, color, &mut moves),
                PieceType::Knight => self.gen_step_moves(from, color, &KNIGHT_TARGETS, &mut moves),
                PieceType::Bishop => self.gen_slider_moves(from, color, &BISHOP_DIRECTIONS, &mut moves),
                PieceType::Rook => self.gen_slider_moves(from, color, &ROOK_DIRECTIONS, &mut moves),
                PieceType::Queen => {
                    self.gen_slider_moves(from, color, &ROOK_DIRECTIONS, &mut moves);
                    self.gen_slider_moves(from, color, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceType::King => {
                    self.gen_step_moves(from, color, &KING_TARGETS, &mut moves);
                    self.gen_castling_moves(from, color, &mut moves);
                }
            }
        }

        moves
    }

    #[inline]
    fn can_move_to(&self, sq: Square, color: Color) -> bool {
        match self.get_piece(sq) {
            None => true,
            Some(target) => target.color != color,
        }
    }

    fn gen_step_moves(
        &self,
        from: Square,
        color: Color,
        table: &[Vec<Square>],
        moves: &mut Vec<ChessMove>,
    ) {
        for &to in &table[from.to_index()] {
            if self.can_move_to(to, color) {
                moves.push(ChessMove::new(from, to));
            }
        }
    }

    fn gen_slider_moves(
        &self,
        from: Square,
        color: Color,
        directions: &[(i8, i8)],
        moves: &mut Vec<ChessMove>,
    ) {
        for &(df, dr) in directions {
            let mut to = from.offset(df, dr);
            while to.is_valid() {
                match self.get_piece(to) {
                    None => moves.push(ChessMove::new(from, to)),
                    Some(target) => {
                        if target.color != color {
                            moves.push(ChessMove::new(from, to));
                        }
                        break;
                    }
                }
                to = to.offset(df, dr);
            }
        }
    }

    /// 到达底线时展开四种升变
    fn push_pawn_move(from: Square, to: Square, color: Color, moves: &mut Vec<ChessMove>) {
        if to.rank == color.promotion_rank() {
            for pt in PROMOTION_TYPES {
                moves.push(ChessMove::with_promotion(from, to, pt));
            }
        } else {
            moves.push(ChessMove::new(from, to));
        }
    }

    fn gen_pawn_moves(&self, from: Square, color: Color, moves: &mut Vec<ChessMove>) {
        let forward = color.forward();

        // 向前一步 / 起始位置两步
        let one = from.offset(0, forward);
        if one.is_valid() && self.get_piece(one).is_none() {
            Self::push_pawn_move(from, one, color, moves);
            if from.rank == color.pawn_rank() {
                let two = one.offset(0, forward);
                if self.get_piece(two).is_none() {
                    moves.push(ChessMove::new(from, two));
                }
            }
        }

        // 斜吃 / 吃过路兵
        for df in [-1, 1] {
            let to = from.offset(df, forward);
            if !to.is_valid() {
                continue;
            }
            match self.get_piece(to) {
                Some(target) if target.color != color => {
                    Self::push_pawn_move(from, to, color, moves);
                }
                None if self.en_passant == Some(to) && self.has_passed_pawn(from, to, color) => {
                    moves.push(ChessMove::new(from, to));
                }
                _ => {}
            }
        }
    }

    /// 被越过的格子上必须是对方的兵
    #[inline]
    fn has_passed_pawn(&self, from: Square, to: Square, color: Color) -> bool {
        self.get_piece(Square::new(to.file, from.rank))
            == Some(Piece::new(color.opposite(), PieceType::Pawn))
    }

    /// 王车易位：权利仍在、王车在原位、中间无子、王不在将军中、不经过/不落在被攻击格
    fn gen_castling_moves(&self, from: Square, color: Color, moves: &mut Vec<ChessMove>) {
        let rank = color.back_rank();
        if from != Square::new(4, rank) {
            return;
        }
        let enemy = color.opposite();
        let rook = Some(Piece::new(color, PieceType::Rook));

        // (是否王翼, 车的 file, 需为空的 files, 王经过/到达的 files)
        let sides: [(bool, i8, &[i8], &[i8]); 2] = [
            (true, 7, &[5, 6], &[5, 6]),
            (false, 0, &[1, 2, 3], &[3, 2]),
        ];

        let mut checked_in_check = None;

        for (kingside, rook_file, empty_files, path_files) in sides {
            if !self.castling.has(color, kingside) {
                continue;
            }
            if self.get_piece(Square::new(rook_file, rank)) != rook {
                continue;
            }
            if empty_files
                .iter()
                .any(|&f| self.get_piece(Square::new(f, rank)).is_some())
            {
                continue;
            }
            let in_check =
                *checked_in_check.get_or_insert_with(|| self.is_square_attacked(from, enemy));
            if in_check {
                return;
            }
            if path_files
                .iter()
                .any(|&f| self.is_square_attacked(Square::new(f, rank), enemy))
            {
                continue;
            }
            let to_file = if kingside { 6 } else { 2 };
            moves.push(ChessMove::new(from, Square::new(to_file, rank)));
        }
    }

    /// 获取所有合法走法：伪合法走法中过滤掉走后己方王被将军的
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        let color = self.side_to_move;
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|mv| {
                let next = self.play_unchecked(mv);
                !next.is_in_check(color)
            })
            .collect()
    }

    /// 某个起始格的合法走法
    pub fn moves_from(&self, from: Square) -> Vec<ChessMove> {
        match self.get_piece(from) {
            Some(piece) if piece.color == self.side_to_move => self
                .legal_moves()
                .into_iter()
                .filter(|mv| mv.from == from)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// 获取所有合法走法（坐标记号）
    pub fn legal_moves_str(&self) -> Vec<String> {
        self.legal_moves().iter().map(|m| m.to_uci_str()).collect()
    }

    /// 走法是否合法
    pub fn is_legal(&self, mv: &ChessMove) -> bool {
        // 先做便宜的起点检查
        match self.get_piece(mv.from) {
            Some(piece) if piece.color == self.side_to_move => {}
            _ => return false,
        }
        self.legal_moves().contains(mv)
    }

    // ------------------------------------------------------------------
    // 走子
    // ------------------------------------------------------------------

    /// 执行走法，返回新局面；走法不合法时返回 IllegalMove
    pub fn apply(&self, mv: &ChessMove) -> ChessResult<Board> {
        if !self.is_legal(mv) {
            return Err(ChessError::illegal(mv.from, mv.to));
        }
        Ok(self.play_unchecked(mv))
    }

    /// 是否吃子（含吃过路兵）
    pub fn is_capture(&self, mv: &ChessMove) -> bool {
        self.get_piece(mv.to).is_some() || self.is_en_passant(mv)
    }

    /// 是否为吃过路兵
    pub fn is_en_passant(&self, mv: &ChessMove) -> bool {
        Some(mv.to) == self.en_passant
            && mv.from.file != mv.to.file
            && self.get_piece(mv.to).is_none()
            && matches!(self.get_piece(mv.from), Some(p) if p.kind == PieceType::Pawn)
            && self.has_passed_pawn(mv.from, mv.to, self.side_to_move)
    }

    /// 是否为王车易位
    pub fn is_castle(&self, mv: &ChessMove) -> bool {
        matches!(self.get_piece(mv.from), Some(p) if p.kind == PieceType::King)
            && (mv.to.file - mv.from.file).abs() == 2
    }

    /// 不检查合法性地执行走法（调用方保证是伪合法走法）
    pub(crate) fn play_unchecked(&self, mv: &ChessMove) -> Board {
        let mut next = self.clone();
        let color = self.side_to_move;
        let from_idx = mv.from.to_index();
        let to_idx = mv.to.to_index();

        let piece = match next.squares[from_idx].take() {
            Some(p) => p,
            None => return next,
        };

        let en_passant = self.is_en_passant(mv);
        let castle = self.is_castle(mv);
        let captured = next.squares[to_idx].take();

        // 吃过路兵：移除被越过的兵，而不是目标格
        if en_passant {
            let passed = Square::new(mv.to.file, mv.from.rank);
            next.squares[passed.to_index()] = None;
        }

        // 王车易位：同时移动车
        if castle {
            let rank = mv.from.rank;
            let (rook_from, rook_to) = if mv.to.file == 6 { (7, 5) } else { (0, 3) };
            let rook = next.squares[Square::new(rook_from, rank).to_index()].take();
            next.squares[Square::new(rook_to, rank).to_index()] = rook;
        }

        let placed = match mv.promotion {
            Some(pt) if piece.kind == PieceType::Pawn => Piece::new(color, pt),
            _ => piece,
        };
        next.squares[to_idx] = Some(placed);

        if piece.kind == PieceType::King {
            next.kings[color_index(color)] = mv.to;
            next.castling.clear(color);
        }
        next.castling.clear_rook_square(mv.from);
        next.castling.clear_rook_square(mv.to);

        // 过路兵格只在双步后设置
        next.en_passant = if piece.kind == PieceType::Pawn && (mv.to.rank - mv.from.rank).abs() == 2
        {
            Some(Square::new(mv.from.file, (mv.from.rank + mv.to.rank) / 2))
        } else {
            None
        };

        if piece.kind == PieceType::Pawn || captured.is_some() || en_passant {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        if color == Color::Black {
            next.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        next.side_to_move = color.opposite();
        next
    }

    // ------------------------------------------------------------------
    // 对局状态
    // ------------------------------------------------------------------

    /// 子力不足以将杀
    ///
    /// 任何一方有兵、车、后时不算；否则剩余轻子不超过一个，
    /// 或所有轻子都是同色格的象时判和。
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = 0;
        let mut knights = 0;
        let mut light_bishops = 0;
        let mut dark_bishops = 0;

        for (sq, piece) in self.pieces() {
            if piece.kind == PieceType::King {
                continue;
            }
            if !piece.kind.is_minor() {
                return false;
            }
            minors += 1;
            match piece.kind {
                PieceType::Knight => knights += 1,
                _ if sq.is_light() => light_bishops += 1,
                _ => dark_bishops += 1,
            }
        }

        if minors <= 1 {
            return true;
        }
        knights == 0 && (light_bishops == 0 || dark_bishops == 0)
    }

    /// 判断对局状态
    pub fn game_outcome(&self) -> GameOutcome {
        self.game_outcome_with(&self.legal_moves())
    }

    /// 用已生成的合法走法判断对局状态
    pub fn game_outcome_with(&self, legal_moves: &[ChessMove]) -> GameOutcome {
        let in_check = self.in_check();

        if legal_moves.is_empty() {
            return if in_check {
                GameOutcome::Checkmate {
                    winner: self.side_to_move.opposite(),
                }
            } else {
                GameOutcome::Stalemate
            };
        }

        if self.is_insufficient_material() {
            return GameOutcome::Draw {
                reason: DrawReason::InsufficientMaterial,
            };
        }

        if in_check {
            GameOutcome::Check
        } else {
            GameOutcome::Ongoing
        }
    }

    /// 统计指定深度的叶子节点数，用于校验走法生成
    pub fn perft(&self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .iter()
            .map(|mv| self.play_unchecked(mv).perft(depth - 1))
            .sum()
    }
}

/// 从 FEN 获取所有合法走法
pub fn get_legal_moves_from_fen(fen: &str) -> ChessResult<Vec<String>> {
    Ok(Board::from_fen(fen)?.legal_moves_str())
}
