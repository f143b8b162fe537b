//! 运行时配置
//!
//! 命令行参数和环境变量统一收敛到 `ServiceConfig`

use crate::ai::AIConfig;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// 提示走法的思考时间
pub const DEFAULT_HINT_BUDGET: Duration = Duration::from_millis(100);

/// 服务配置
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// 显式指定的引擎路径；为空时按默认路径查找
    pub engine_path: Option<PathBuf>,
    /// 是否查找外部引擎
    pub search_engine: bool,
    /// 提示走法的思考时间
    pub hint_budget: Duration,
    /// 随机策略的种子
    pub seed: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            engine_path: None,
            search_engine: true,
            hint_budget: DEFAULT_HINT_BUDGET,
            seed: None,
        }
    }
}

impl ServiceConfig {
    /// 不使用外部引擎的配置（测试和离线模式）
    pub fn basic() -> Self {
        ServiceConfig {
            search_engine: false,
            ..Default::default()
        }
    }

    /// 内置策略配置
    pub fn ai_config(&self) -> AIConfig {
        AIConfig { seed: self.seed }
    }
}

/// 引擎相关命令行参数
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// UCI 引擎路径
    #[arg(long, env = "CHESS_ENGINE_PATH")]
    pub engine_path: Option<PathBuf>,

    /// 不使用外部引擎，只用内置 AI
    #[arg(long)]
    pub no_engine: bool,

    /// 随机种子
    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<EngineArgs> for ServiceConfig {
    fn from(args: EngineArgs) -> Self {
        ServiceConfig {
            engine_path: args.engine_path,
            search_engine: !args.no_engine,
            seed: args.seed,
            ..Default::default()
        }
    }
}
