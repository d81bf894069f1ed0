//! A股关注列表分析工具
//!
//! 每个交易日运行一次：根据主力资金流向维护模拟关注列表，
//! 按规则结算持仓并生成报告
//! 数据来源：东方财富

mod config;     // 配置与运行上下文
mod logging;    // 日志初始化
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use crate::config::{beijing_now, AppConfig, RunContext};
use crate::services::eastmoney::EastmoneyService;
use crate::services::market_service::{MarketFetcher, RetryPolicy};
use crate::services::watchlist_engine::{RunOutcome, WatchlistEngine};

/// 应用程序入口
///
/// 无论是否完成分析，进程都正常退出
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let (config, config_note) = AppConfig::load();
    let ctx = RunContext::new(&config.paths, beijing_now());

    let dir_error = ctx.ensure_dirs().err();
    let (_logger, log_error) = logging::init(&config.log.level, &ctx.log_file());

    log::info!("股票分析程序启动 - {}", ctx.run_time);
    log::info!("{}", config_note);
    if let Some(e) = dir_error {
        log::error!("{:#}", e);
    }
    if let Some(e) = log_error {
        log::warn!("无法打开日志文件 {}，仅输出到控制台: {}", ctx.log_file().display(), e);
    }

    let source = match EastmoneyService::new(&config.fetch) {
        Ok(source) => source,
        Err(e) => {
            log::error!("创建 HTTP 客户端失败: {:#}", e);
            return;
        }
    };

    let fetcher = MarketFetcher::new(source, RetryPolicy::from(&config.fetch));
    let engine = WatchlistEngine::new(fetcher, ctx, config.fetch.scope());

    match engine.run().await {
        RunOutcome::NotTradingDay => log::info!("非交易日，未执行分析"),
        RunOutcome::Aborted { reason } => log::warn!("分析中止: {}", reason),
        RunOutcome::Completed(summary) => {
            if !summary.added.is_empty() {
                log::info!("本次新增关注: {:?}", summary.added);
            }
            for failure in &summary.write_failures {
                log::warn!("文件未能保存: {}", failure);
            }
        }
    }
}
