//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，并生成单次运行的上下文

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::FundFlowScope;

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "WATCHLIST_CONFIG";

/// 文件路径配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// 工作目录，其余相对路径都基于它
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// 关注列表备份目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// 日志目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 关注列表文件
    #[serde(default = "default_watchlist_file")]
    pub watchlist_file: PathBuf,
    /// 结算记录文件
    #[serde(default = "default_ledger_file")]
    pub ledger_file: PathBuf,
    /// 分析报告文件
    #[serde(default = "default_report_file")]
    pub report_file: PathBuf,
}

/// 数据获取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// 最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// 重试间隔（秒）
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 分页大小
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// 主力资金流向范围，如 all / 沪深A股 / 创业板
    #[serde(default = "default_scope")]
    pub fund_flow_scope: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 路径配置
    #[serde(default)]
    pub paths: PathsConfig,
    /// 数据获取配置
    #[serde(default)]
    pub fetch: FetchConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_base_dir() -> PathBuf { PathBuf::from(".") }
fn default_data_dir() -> PathBuf { PathBuf::from("data") }
fn default_log_dir() -> PathBuf { PathBuf::from("log") }
fn default_watchlist_file() -> PathBuf { PathBuf::from("care.json") }
fn default_ledger_file() -> PathBuf { PathBuf::from("result.json") }
fn default_report_file() -> PathBuf { PathBuf::from("result.md") }
fn default_max_attempts() -> u32 { 3 }
fn default_retry_delay() -> u64 { 25 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_page_size() -> u32 { 100 }
fn default_scope() -> String { "all".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
            watchlist_file: default_watchlist_file(),
            ledger_file: default_ledger_file(),
            report_file: default_report_file(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            page_size: default_page_size(),
            fund_flow_scope: default_scope(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// 解析资金流向范围，无法识别时退回全部股票
    pub fn scope(&self) -> FundFlowScope {
        FundFlowScope::parse(&self.fund_flow_scope).unwrap_or_else(|| {
            log::warn!("未知的资金流向范围 {}，使用全部股票", self.fund_flow_scope);
            FundFlowScope::All
        })
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件 {} 失败", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先环境变量指定的文件，其次默认位置，失败则使用默认值
    ///
    /// 此时日志系统尚未初始化，加载过程的信息随返回值一并交给调用方输出
    pub fn load() -> (Self, String) {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from("config.json"));
        candidates.push(PathBuf::from("config/config.json"));

        let mut notes = Vec::new();
        for path in candidates {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        notes.push(format!("从 {} 加载配置成功", path.display()));
                        return (config, notes.join("; "));
                    }
                    Err(e) => {
                        notes.push(format!("加载配置文件 {} 失败: {:#}", path.display(), e));
                    }
                }
            }
        }

        notes.push("使用默认配置".to_string());
        (Self::default(), notes.join("; "))
    }
}

/// 获取北京时间
pub fn beijing_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Shanghai)
}

/// 单次运行的上下文
///
/// 运行日期、时间戳和所有文件路径在启动时确定，之后只读
#[derive(Debug, Clone)]
pub struct RunContext {
    /// 今日日期（北京时间）
    pub today: NaiveDate,
    /// 本次运行时间，格式 YYYY-MM-DD HH:MM:SS
    pub run_time: String,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub watchlist_file: PathBuf,
    pub ledger_file: PathBuf,
    pub report_file: PathBuf,
}

impl RunContext {
    pub fn new(paths: &PathsConfig, now: DateTime<Tz>) -> Self {
        let base = &paths.base_dir;
        Self {
            today: now.date_naive(),
            run_time: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            data_dir: base.join(&paths.data_dir),
            log_dir: base.join(&paths.log_dir),
            watchlist_file: base.join(&paths.watchlist_file),
            ledger_file: base.join(&paths.ledger_file),
            report_file: base.join(&paths.report_file),
        }
    }

    /// 今日日期字符串（YYYY-MM-DD）
    pub fn today_str(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }

    /// 当日日志文件
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(format!("log_{}.txt", self.today_str()))
    }

    /// 当日关注列表备份文件
    pub fn watchlist_backup_file(&self) -> PathBuf {
        self.data_dir.join(format!("care_{}.json", self.today_str()))
    }

    /// 确保 data 和 log 目录存在
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dir in [&self.data_dir, &self.log_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("创建目录 {} 失败", dir.display()))?;
        }
        Ok(())
    }
}
