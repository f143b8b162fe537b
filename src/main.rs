//! Chess Backend CLI
//!
//! 命令行界面，用于测试规则引擎和 AI
//!
//! 支持三种模式：
//! 1. 单次命令模式：每次执行一个命令
//! 2. Server 模式：长驻进程，通过 stdin/stdout 通信（每行一个 JSON）
//! 3. HTTP 模式：提供 `/api/chess/*` 接口

use chess_backend::service::{parse_promotion, BackendStatus};
use chess_backend::{
    evaluate, evaluate_for, get_legal_moves_from_fen, http, AIConfig, AIEngine, Board,
    ChessResult, ChessService, Difficulty, EngineArgs, EngineStatus, MoveOutcome, ServiceConfig,
    STARTING_FEN,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "chess-backend")]
#[command(about = "Chess rules engine and move search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 获取合法走法
    Moves {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        /// 只列出该格棋子的目标格
        #[arg(long)]
        square: Option<String>,
    },

    /// 走一步棋，输出新局面和状态
    Play {
        /// FEN 字符串
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,

        /// 起始格
        #[arg(long)]
        from: String,

        /// 目标格
        #[arg(long)]
        to: String,

        /// 升变棋子 (q, r, b, n)，默认升后
        #[arg(long)]
        promotion: Option<String>,
    },

    /// 选择最佳走法
    Best {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        /// AI 策略 (random, greedy)
        #[arg(long, default_value = "greedy")]
        strategy: String,

        /// 返回的走法数量
        #[arg(long, default_value = "1")]
        n: usize,

        /// 随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 提示走法
    Hint {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// 评估局面分数
    Score {
        /// FEN 字符串
        #[arg(long)]
        fen: String,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 统计走法生成的叶子节点数
    Perft {
        /// FEN 字符串
        #[arg(long, default_value = STARTING_FEN)]
        fen: String,

        /// 深度
        #[arg(long, default_value = "3")]
        depth: u32,
    },

    /// 启动 server 模式（stdin/stdout 通信）
    Server {
        #[command(flatten)]
        engine: EngineArgs,
    },

    /// 启动 HTTP 服务
    Http {
        /// 监听地址
        #[arg(long, env = "CHESS_LISTEN_ADDR", default_value = "0.0.0.0:5000")]
        addr: SocketAddr,

        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Serialize, Deserialize)]
struct MoveResult {
    #[serde(rename = "move")]
    mv: String,
    score: f64,
}

#[derive(Serialize, Deserialize)]
struct MovesResponse {
    moves: Vec<MoveResult>,
    total: usize,
}

// Server 模式的请求和响应结构
#[derive(Serialize, Deserialize)]
struct ServerRequest {
    cmd: String,
    #[serde(default)]
    fen: String,
    #[serde(default)]
    square: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    promotion: Option<String>,
    #[serde(default)]
    difficulty: Option<u32>,
}

#[derive(Serialize, Default)]
struct ServerResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<String>>,
    #[serde(flatten)]
    outcome: Option<MoveOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    // eval 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    eval: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    // status 命令的字段
    #[serde(skip_serializing_if = "Option::is_none")]
    backend: Option<BackendStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    engine: Option<EngineStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServerResponse {
    fn success_moves(moves: Vec<String>) -> Self {
        Self {
            ok: true,
            moves: Some(moves),
            ..Default::default()
        }
    }

    fn success_outcome(outcome: MoveOutcome) -> Self {
        Self {
            ok: true,
            outcome: Some(outcome),
            ..Default::default()
        }
    }

    fn error(msg: &str) -> Self {
        Self {
            ok: false,
            error: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

fn calc_nps(nodes: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        nodes as f64 / elapsed_secs
    } else {
        0.0
    }
}

/// 打印错误并退出
fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(e),
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves { fen, square } => {
            let moves = match square {
                Some(sq) => ChessService::default().legal_destinations(&fen, &sq),
                None => get_legal_moves_from_fen(&fen),
            };
            match moves {
                Ok(moves) => {
                    println!("Legal moves ({}):", moves.len());
                    for mv in &moves {
                        println!("  {}", mv);
                    }
                }
                Err(e) => fail(e),
            }
        }

        Commands::Play {
            fen,
            from,
            to,
            promotion,
        } => {
            let promotion = parse_promotion(promotion.as_deref());
            match ChessService::default().apply_move(&fen, &from, &to, promotion) {
                Ok(outcome) => print_json(&outcome),
                Err(e) => fail(e),
            }
        }

        Commands::Best {
            fen,
            strategy,
            n,
            seed,
            json,
        } => {
            let config = AIConfig { seed };
            let ai = AIEngine::from_strategy(&strategy, &config).unwrap_or_else(|e| fail(e));

            let start = Instant::now();
            match ai.select_moves_fen(&fen, n) {
                Ok(moves) => {
                    let elapsed = start.elapsed().as_secs_f64();
                    if json {
                        let response = MovesResponse {
                            total: moves.len(),
                            moves: moves
                                .into_iter()
                                .map(|(mv, score)| MoveResult { mv, score })
                                .collect(),
                        };
                        print_json(&response);
                    } else {
                        println!("Best moves (strategy={}):", strategy);
                        for (mv, score) in moves {
                            println!("  {} (score: {:.2})", mv, score);
                        }
                        println!("\nTime: {:.3}s", elapsed);
                    }
                }
                Err(e) => fail(e),
            }
        }

        Commands::Hint { fen, engine } => {
            let service = ChessService::from_config(ServiceConfig::from(engine));
            match service.hint(&fen) {
                Ok(hint) => print_json(&hint),
                Err(e) => fail(e),
            }
        }

        Commands::Score { fen, json } => match Board::from_fen(&fen) {
            Ok(board) => {
                let color = board.side_to_move();
                let white = evaluate(&board);
                let own = evaluate_for(&board, color);

                if json {
                    print_json(&serde_json::json!({
                        "fen": fen,
                        "color": color,
                        "score": white,
                        "side_score": own,
                    }));
                } else {
                    println!("局面评估 (白方视角): {}", white);
                    println!("局面评估 ({} 视角): {}", color, own);
                }
            }
            Err(e) => fail(e),
        },

        Commands::Perft { fen, depth } => match Board::from_fen(&fen) {
            Ok(board) => {
                let start = Instant::now();
                let nodes = board.perft(depth);
                let elapsed = start.elapsed().as_secs_f64();
                println!("perft({}) = {}", depth, nodes);
                println!(
                    "time={:.3}s, nps={:.0}",
                    elapsed,
                    calc_nps(nodes, elapsed)
                );
            }
            Err(e) => fail(e),
        },

        Commands::Server { engine } => {
            let service = ChessService::from_config(ServiceConfig::from(engine));
            run_server(&service);
        }

        Commands::Http { addr, engine } => {
            let service = Arc::new(ChessService::from_config(ServiceConfig::from(engine)));
            let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(e));
            if let Err(e) = runtime.block_on(http::serve(service, addr)) {
                fail(e);
            }
        }
    }
}

/// Server 模式主循环
/// 从 stdin 读取 JSON 请求，返回 JSON 响应到 stdout
fn run_server(service: &ChessService) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        // 空行跳过
        if line.trim().is_empty() {
            continue;
        }

        // 解析请求
        let response = match serde_json::from_str::<ServerRequest>(&line) {
            Ok(request) => match request.cmd.as_str() {
                "quit" => break,
                _ => handle_request(service, &request),
            },
            Err(e) => ServerResponse::error(&format!("Invalid JSON: {}", e)),
        };

        // 返回响应
        match serde_json::to_string(&response) {
            Ok(s) => println!("{}", s),
            Err(e) => println!("{{\"ok\":false,\"error\":{:?}}}", e.to_string()),
        }
        let _ = stdout.flush();
    }
}

/// 分发命令
fn handle_request(service: &ChessService, request: &ServerRequest) -> ServerResponse {
    let result = match request.cmd.as_str() {
        "moves" => handle_moves_request(service, request),
        "move" => handle_move_request(service, request),
        "ai" => handle_ai_request(service, request),
        "hint" => handle_hint_request(service, request),
        "eval" => handle_eval_request(request),
        "status" => Ok(ServerResponse {
            ok: true,
            backend: Some(service.status()),
            engine: Some(service.engine_status()),
            ..Default::default()
        }),
        _ => return ServerResponse::error(&format!("Unknown command: {}", request.cmd)),
    };
    result.unwrap_or_else(|e| ServerResponse::error(&e.to_string()))
}

/// 处理 moves 命令
fn handle_moves_request(
    service: &ChessService,
    request: &ServerRequest,
) -> ChessResult<ServerResponse> {
    let moves = match &request.square {
        Some(sq) => service.legal_destinations(&request.fen, sq)?,
        None => get_legal_moves_from_fen(&request.fen)?,
    };
    Ok(ServerResponse::success_moves(moves))
}

/// 处理 move 命令
fn handle_move_request(
    service: &ChessService,
    request: &ServerRequest,
) -> ChessResult<ServerResponse> {
    let (from, to) = match (&request.from, &request.to) {
        (Some(from), Some(to)) => (from, to),
        _ => return Ok(ServerResponse::error("Missing from or to")),
    };
    let promotion = parse_promotion(request.promotion.as_deref());
    let outcome = service.apply_move(&request.fen, from, to, promotion)?;
    Ok(ServerResponse::success_outcome(outcome))
}

/// 处理 ai 命令
fn handle_ai_request(service: &ChessService, request: &ServerRequest) -> ChessResult<ServerResponse> {
    let difficulty = request.difficulty.map(Difficulty).unwrap_or_default();
    let result = service.engine_move(&request.fen, difficulty)?;
    Ok(ServerResponse {
        from: Some(result.from),
        to: Some(result.to),
        ..ServerResponse::success_outcome(result.result)
    })
}

/// 处理 hint 命令
fn handle_hint_request(
    service: &ChessService,
    request: &ServerRequest,
) -> ChessResult<ServerResponse> {
    let hint = service.hint(&request.fen)?;
    Ok(ServerResponse {
        ok: true,
        hint: Some(hint.hint),
        from: hint.from,
        to: hint.to,
        ..Default::default()
    })
}

/// 处理 eval 命令（静态评估，白方视角）
fn handle_eval_request(request: &ServerRequest) -> ChessResult<ServerResponse> {
    let board = Board::from_fen(&request.fen)?;
    Ok(ServerResponse {
        ok: true,
        eval: Some(evaluate(&board)),
        color: Some(board.side_to_move().to_string()),
        ..Default::default()
    })
}
