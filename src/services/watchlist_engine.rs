//! 关注列表分析流程
//!
//! 交易日判断 → 获取行情与资金流向 → 规则评估 → 保存关注列表、结算记录和报告。
//! 任何一步失败都只记录日志，不会使进程崩溃

use crate::config::RunContext;
use crate::models::FundFlowScope;
use crate::services::market_service::{MarketDataSource, MarketFetcher};
use crate::services::{report_service, rule_service, store_service};

/// 单次运行结果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// 非交易日，未做任何分析
    NotTradingDay,
    /// 上游数据获取失败，未修改任何文件
    Aborted { reason: String },
    /// 分析完成
    Completed(RunSummary),
}

/// 分析完成后的统计
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    /// 当前关注数量
    pub watched: usize,
    /// 本次结算数量
    pub settled: usize,
    /// 历史结算数量
    pub previously_settled: usize,
    /// 本次新增关注的代码
    pub added: Vec<String>,
    /// 写入失败的文件及原因
    pub write_failures: Vec<String>,
}

/// 关注列表分析引擎
pub struct WatchlistEngine<S> {
    fetcher: MarketFetcher<S>,
    ctx: RunContext,
    scope: FundFlowScope,
}

impl<S: MarketDataSource> WatchlistEngine<S> {
    pub fn new(fetcher: MarketFetcher<S>, ctx: RunContext, scope: FundFlowScope) -> Self {
        Self { fetcher, ctx, scope }
    }

    pub fn fetcher(&self) -> &MarketFetcher<S> {
        &self.fetcher
    }

    /// 执行一次完整的分析流程
    pub async fn run(&self) -> RunOutcome {
        let today = self.ctx.today_str();
        if !self.fetcher.is_trading_day(self.ctx.today).await {
            log::info!("今天({})不是交易日，程序结束", today);
            return RunOutcome::NotTradingDay;
        }
        log::info!("今天({})是交易日，开始股票分析", today);

        let watchlist = store_service::load_watchlist(&self.ctx);

        let Some(snapshot) = self.fetcher.stock_spot().await else {
            return abort("无法获取股票数据，程序结束");
        };
        let Some(ranking) = self.fetcher.main_fund_flow(self.scope).await else {
            return abort("无法获取主力净流入排名，程序结束");
        };

        let evaluation = rule_service::evaluate(watchlist, &snapshot, &ranking, &self.ctx.run_time);

        let previous = store_service::load_settlements(&self.ctx);
        let previously_settled = previous.len();
        let all_settled = store_service::merge_settlements(previous, &evaluation.settlements);

        // 三个文件相互独立，一个写失败不影响其余两个
        let mut write_failures = Vec::new();
        if let Err(e) = store_service::save_watchlist(&self.ctx, &evaluation.watchlist) {
            log::error!("保存关注列表失败: {:#}", e);
            write_failures.push(format!("{}: {:#}", self.ctx.watchlist_file.display(), e));
        }
        if let Err(e) = store_service::save_settlements(&self.ctx, &all_settled) {
            log::error!("保存结算记录失败: {:#}", e);
            write_failures.push(format!("{}: {:#}", self.ctx.ledger_file.display(), e));
        }
        if let Err(e) = report_service::save_report(&self.ctx, &evaluation.watchlist, &all_settled) {
            log::error!("保存分析报告失败: {:#}", e);
            write_failures.push(format!("{}: {:#}", self.ctx.report_file.display(), e));
        }

        let summary = RunSummary {
            watched: evaluation.watchlist.len(),
            settled: evaluation.settlements.len(),
            previously_settled,
            added: evaluation.added,
            write_failures,
        };
        log::info!(
            "股票分析完成，当前关注{}只股票，本次结算{}只股票，历史结算{}只股票",
            summary.watched,
            summary.settled,
            summary.previously_settled
        );
        RunOutcome::Completed(summary)
    }
}

fn abort(reason: &str) -> RunOutcome {
    log::error!("{}", reason);
    RunOutcome::Aborted {
        reason: reason.to_string(),
    }
}
