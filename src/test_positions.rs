//! 国际象棋测试局面库
//!
//! 提供命名的 FEN 测试局面，方便测试和调试
//!
//! 命名规范:
//! - START: 初始局面
//! - PERFT_*: 走法生成校验局面（公开的 perft 参考值）
//! - CASTLING_*: 王车易位测试
//! - EN_PASSANT_*: 吃过路兵测试
//! - 终局/和棋: FOOLS_MATE, STALEMATE, KINGS_ONLY
//! - 非法局面: 用于校验解析错误

pub use crate::fen::STARTING_FEN as START;

// =============================================================================
// 走法生成校验
// =============================================================================

/// "Kiwipete"：易位、过路兵、升变都很密集
pub const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// 残局 perft 局面
pub const PERFT_ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

// =============================================================================
// 王车易位
// =============================================================================

/// 双方都可以两侧易位
pub const CASTLING_READY: &str = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

/// 王车在原位但没有易位权
pub const CASTLING_NO_RIGHTS: &str = "r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1";

/// 两侧都有子挡住
pub const CASTLING_BLOCKED: &str = "r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1";

/// 白王正被 e4 的车将军
pub const CASTLING_IN_CHECK: &str = "r3k2r/8/8/8/4r3/8/8/R3K2R w KQkq - 0 1";

/// f1 被 f4 的车控制
pub const CASTLING_THROUGH_CHECK: &str = "r3k2r/8/8/8/5r2/8/8/R3K2R w KQkq - 0 1";

/// 落点 g1 被 g3 的车控制
pub const CASTLING_INTO_CHECK: &str = "r3k2r/8/8/8/8/6r1/8/R3K2R w KQkq - 0 1";

/// b1 被 b3 的车控制，长易位王不经过 b1
pub const CASTLING_B1_ATTACKED: &str = "r3k2r/8/8/8/8/1r6/8/R3K2R w KQkq - 0 1";

/// 黑象可以吃掉 h1 的车
pub const ROOK_CAPTURE_CASTLING: &str = "4k3/1b6/8/8/8/8/8/R3K2R b KQ - 0 1";

// =============================================================================
// 吃过路兵 / 钉子 / 升变
// =============================================================================

/// 吃过路兵后 a5 的王会暴露给 h5 的车
pub const EN_PASSANT_PINNED: &str = "8/8/8/K2pP2r/8/8/8/7k w - d6 0 1";

/// e6 标为过路兵格，但 e5 上是白车而不是黑兵
pub const EN_PASSANT_NO_PAWN: &str = "k7/8/8/3PR3/8/8/8/4K3 w - e6 0 1";

/// e2 的马被 e8 的车钉住
pub const PINNED_KNIGHT: &str = "k3r3/8/8/8/8/8/4N3/4K3 w - - 0 1";

/// a7 兵即将升变
pub const PROMOTION: &str = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1";

/// 升变同时吃子并将军
pub const PROMOTION_CAPTURE: &str = "1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1";

// =============================================================================
// 对局状态
// =============================================================================

/// 愚人杀：白方被将死
pub const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

/// 黑方无子可动但未被将军
pub const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

/// 白王被车将军
pub const SIMPLE_CHECK: &str = "4k3/8/8/8/8/8/8/4K2r w - - 0 1";

/// 只剩双王
pub const KINGS_ONLY: &str = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";

/// 白方一步杀 (Qa8#)
pub const MATE_IN_ONE: &str = "6k1/5ppp/8/8/8/8/5PPP/Q5K1 w - - 0 1";

/// 白后可以白吃 d5 的车
pub const HANGING_ROOK: &str = "4k3/8/8/3r4/8/8/8/3QK3 w - - 0 1";

/// 黑后可以白吃 d4 的马
pub const BLACK_WINS_KNIGHT: &str = "3qk3/8/8/8/3N4/8/8/4K3 b - - 0 1";

// =============================================================================
// 非法局面
// =============================================================================

pub const NO_WHITE_KING: &str = "4k3/8/8/8/8/8/8/8 w - - 0 1";
pub const TWO_BLACK_KINGS: &str = "3kk3/8/8/8/8/8/8/4K3 w - - 0 1";
pub const PAWN_ON_BACK_RANK: &str = "4k2P/8/8/8/8/8/8/4K3 w - - 0 1";
/// 计数器在 u32 上限
pub const MAX_COUNTERS: &str = "4k3/8/8/8/8/8/8/4K2R b - - 4294967295 4294967295";

/// 轮到白方走但黑王正被将军
pub const OPPOSITE_IN_CHECK: &str = "4k3/8/8/8/8/8/8/4RK2 w - - 0 1";

/// 所有合法局面
pub const ALL_VALID: &[&str] = &[
    START,
    KIWIPETE,
    PERFT_ENDGAME,
    CASTLING_READY,
    CASTLING_NO_RIGHTS,
    CASTLING_BLOCKED,
    CASTLING_IN_CHECK,
    CASTLING_THROUGH_CHECK,
    CASTLING_INTO_CHECK,
    CASTLING_B1_ATTACKED,
    ROOK_CAPTURE_CASTLING,
    EN_PASSANT_PINNED,
    EN_PASSANT_NO_PAWN,
    PINNED_KNIGHT,
    PROMOTION,
    PROMOTION_CAPTURE,
    FOOLS_MATE,
    STALEMATE,
    SIMPLE_CHECK,
    KINGS_ONLY,
    MATE_IN_ONE,
    HANGING_ROOK,
    BLACK_WINS_KNIGHT,
];
