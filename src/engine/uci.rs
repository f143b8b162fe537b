//! UCI 引擎子进程
//!
//! 通过 stdin/stdout 与任意 UCI 引擎通信：
//! `uci` → `uciok`，`isready` → `readyok`，`position fen ..` + `go movetime ..` → `bestmove ..`

use super::{ExternalEngine, TIMEOUT_GRACE};
use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::types::ChessMove;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// 默认查找的引擎路径
pub const DEFAULT_ENGINE_PATHS: &[&str] = &[
    "stockfish",
    "/usr/local/bin/stockfish",
    "/usr/bin/stockfish",
    "engines/stockfish.exe",
    "engines/stockfish",
];

/// 握手超时
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(2);

/// 引擎子进程和它的输出行
struct UciProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
}

impl UciProcess {
    fn send(&mut self, cmd: &str) -> ChessResult<()> {
        writeln!(self.stdin, "{}", cmd)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| ChessError::EngineUnavailable(format!("write failed: {}", e)))
    }

    /// 读到以 prefix 开头的行为止，其余行交给 on_line
    fn wait_for(
        &self,
        prefix: &str,
        timeout: Duration,
        mut on_line: impl FnMut(&str),
    ) -> ChessResult<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) if line.starts_with(prefix) => return Ok(line),
                Ok(line) => on_line(&line),
                Err(RecvTimeoutError::Timeout) => return Err(ChessError::EngineTimeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ChessError::EngineUnavailable("engine exited".to_string()))
                }
            }
        }
    }

    /// 丢弃上一次超时后迟到的输出
    fn drain(&self) {
        while self.lines.try_recv().is_ok() {}
    }
}

impl Drop for UciProcess {
    fn drop(&mut self) {
        let _ = self.send("quit");
        match self.child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                thread::sleep(Duration::from_millis(50));
                if let Ok(None) = self.child.try_wait() {
                    let _ = self.child.kill();
                }
                let _ = self.child.wait();
            }
        }
    }
}

/// UCI 引擎；同一进程上的调用由互斥锁串行化
pub struct UciEngine {
    name: String,
    process: Mutex<UciProcess>,
}

impl UciEngine {
    /// 启动引擎并完成握手
    pub fn spawn(path: impl AsRef<Path>) -> ChessResult<UciEngine> {
        Self::spawn_with_args(path, &[])
    }

    /// 带命令行参数启动引擎
    pub fn spawn_with_args(path: impl AsRef<Path>, args: &[&str]) -> ChessResult<UciEngine> {
        let path = path.as_ref();
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ChessError::EngineUnavailable(format!("{}: {}", path.display(), e)))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let (stdin, stdout) = match (stdin, stdout) {
            (Some(i), Some(o)) => (i, o),
            _ => {
                let _ = child.kill();
                return Err(ChessError::EngineUnavailable("no stdio pipes".to_string()));
            }
        };

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("uci-reader".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    match line {
                        Ok(l) => {
                            if tx.send(l.trim().to_string()).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            })
            .map_err(|e| ChessError::EngineUnavailable(e.to_string()))?;

        let mut process = UciProcess {
            child,
            stdin,
            lines: rx,
        };

        let mut name = path.display().to_string();
        process.send("uci")?;
        process
            .wait_for("uciok", HANDSHAKE_TIMEOUT, |line| {
                if let Some(id) = line.strip_prefix("id name ") {
                    name = id.to_string();
                }
            })
            .map_err(handshake_error)?;
        process.send("isready")?;
        process
            .wait_for("readyok", HANDSHAKE_TIMEOUT, |_| {})
            .map_err(handshake_error)?;

        info!("Chess engine initialized: {} ({})", name, path.display());
        Ok(UciEngine {
            name,
            process: Mutex::new(process),
        })
    }
}

/// 握手阶段超时说明引擎不响应
fn handshake_error(e: ChessError) -> ChessError {
    match e {
        ChessError::EngineTimeout(_) => {
            ChessError::EngineUnavailable("engine not responding".to_string())
        }
        other => other,
    }
}

/// 解析 `bestmove e2e4 [ponder e7e5]`
fn parse_bestmove(line: &str) -> ChessResult<ChessMove> {
    let token = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ChessError::EngineUnavailable(format!("bad reply: {}", line)))?;
    if token == "(none)" || token == "0000" {
        return Err(ChessError::NoLegalMoves);
    }
    ChessMove::from_uci_str(token)
        .ok_or_else(|| ChessError::EngineUnavailable(format!("bad move in reply: {}", line)))
}

impl ExternalEngine for UciEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn best_move(&self, board: &Board, budget: Duration) -> ChessResult<ChessMove> {
        let mut process = self
            .process
            .lock()
            .map_err(|_| ChessError::EngineUnavailable("engine lock poisoned".to_string()))?;

        // readyok 之前的输出都属于上一次搜索
        process.drain();
        process.send("isready")?;
        process
            .wait_for("readyok", HANDSHAKE_TIMEOUT, |_| {})
            .map_err(handshake_error)?;
        process.send(&format!("position fen {}", board.to_fen()))?;
        process.send(&format!("go movetime {}", budget.as_millis().max(1)))?;

        match process.wait_for("bestmove", budget + TIMEOUT_GRACE, |_| {}) {
            Ok(line) => parse_bestmove(&line),
            Err(ChessError::EngineTimeout(_)) => {
                // stop 之后引擎仍会回一个 bestmove，读掉它
                if process.send("stop").is_ok() {
                    let _ = process.wait_for("bestmove", TIMEOUT_GRACE, |_| {});
                }
                Err(ChessError::EngineTimeout(budget))
            }
            Err(e) => Err(e),
        }
    }
}

/// 依次尝试候选路径，返回第一个能完成握手的引擎
pub fn discover<P: AsRef<Path>>(candidates: &[P]) -> Option<UciEngine> {
    for path in candidates {
        match UciEngine::spawn(path) {
            Ok(engine) => return Some(engine),
            Err(e) => debug!("engine candidate {} rejected: {}", path.as_ref().display(), e),
        }
    }
    warn!("No chess engine found, using basic AI");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove() {
        let mv = parse_bestmove("bestmove e2e4 ponder e7e5").unwrap();
        assert_eq!(mv.to_uci_str(), "e2e4");

        let mv = parse_bestmove("bestmove a7a8q").unwrap();
        assert_eq!(mv.to_uci_str(), "a7a8q");

        assert_eq!(parse_bestmove("bestmove (none)"), Err(ChessError::NoLegalMoves));
        assert!(matches!(
            parse_bestmove("bestmove"),
            Err(ChessError::EngineUnavailable(_))
        ));
        assert!(matches!(
            parse_bestmove("bestmove zz"),
            Err(ChessError::EngineUnavailable(_))
        ));
    }

    #[test]
    fn test_spawn_missing_binary() {
        let err = UciEngine::spawn("/nonexistent/engine-binary").err().unwrap();
        assert!(matches!(err, ChessError::EngineUnavailable(_)));
    }

    /// 第一次 go 不回答，stop 时立刻回 a2a3，之后的 go 回 g1f3
    #[cfg(unix)]
    const SCRIPTED_ENGINE: &str = r#"
n=0
while read -r line; do
  case "$line" in
    uci) echo "id name Scripted"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) n=$((n+1)); if [ "$n" -gt 1 ]; then echo "bestmove g1f3"; fi ;;
    stop) echo "bestmove a2a3" ;;
    quit) exit 0 ;;
  esac
done
"#;

    #[cfg(unix)]
    #[test]
    fn test_late_bestmove_not_reused() {
        let engine = UciEngine::spawn_with_args("/bin/sh", &["-c", SCRIPTED_ENGINE]).unwrap();
        assert_eq!(engine.name(), "Scripted");

        let board = Board::starting_position();
        let budget = Duration::from_millis(20);
        assert_eq!(
            engine.best_move(&board, budget),
            Err(ChessError::EngineTimeout(budget))
        );

        // 上一次 stop 的回复 a2a3 不能被当成这一次的结果
        let mv = engine.best_move(&board, budget).unwrap();
        assert_eq!(mv.to_uci_str(), "g1f3");
    }

    #[test]
    fn test_discover_none() {
        assert!(discover(&["/nonexistent/a", "/nonexistent/b"]).is_none());
    }
}
