//! 分析报告
//!
//! 生成 result.md，每次整体重写

use anyhow::{Context, Result};
use std::fs;

use crate::config::RunContext;
use crate::models::{SettledRecord, WatchedInstrument};

const DEFAULT_REMARK: &str = "正常关注中";

/// 渲染 Markdown 报告
pub fn render_report(
    run_time: &str,
    watchlist: &[WatchedInstrument],
    settled: &[SettledRecord],
) -> String {
    let mut content = format!("# 股票分析结果（{}）\n\n", run_time);

    content.push_str("## 当前关注的股票\n\n");
    content.push_str("股票代码 | 股票名称 | 模拟买入价格 | 关注的起始时间 | 当前价格 | 今日排行榜-主力净占比 | 今日排行榜-今日涨跌 | 备注\n");
    content.push_str("--- | --- | --- | --- | --- | --- | --- | ---\n");

    if watchlist.is_empty() {
        content.push_str("暂无关注股票\n");
    }
    for stock in watchlist {
        content.push_str(&format!(
            "{} | {} | {:.2} | {} | {:.2} | {}% | {}% | {}\n",
            stock.code,
            display_name(&stock.name),
            stock.buy_price,
            stock.start_time,
            stock.current_price,
            stock.main_net_ratio,
            stock.today_change,
            stock.remark.as_deref().unwrap_or(DEFAULT_REMARK),
        ));
    }

    content.push('\n');

    content.push_str("## 已经结算的股票\n\n");
    content.push_str("股票代码 | 股票名称 | 模拟买入价格 | 关注的起始时间 | 当前价格 | 今日排行榜-主力净占比 | 今日排行榜-今日涨跌 | 盈亏 | 备注\n");
    content.push_str("--- | --- | --- | --- | --- | --- | --- | --- | ---\n");

    if settled.is_empty() {
        content.push_str("暂无结算股票\n");
    }
    for stock in settled {
        content.push_str(&format!(
            "{} | {} | {:.2} | {} | {:.2} | {}% | {}% | {:+.2} | {}\n",
            stock.code,
            display_name(&stock.name),
            stock.buy_price,
            stock.start_time,
            stock.current_price,
            stock.main_net_ratio,
            stock.today_change,
            stock.profit_loss,
            stock.remark,
        ));
    }

    content
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "N/A"
    } else {
        name
    }
}

/// 保存报告到 result.md
pub fn save_report(
    ctx: &RunContext,
    watchlist: &[WatchedInstrument],
    settled: &[SettledRecord],
) -> Result<()> {
    let content = render_report(&ctx.run_time, watchlist, settled);
    fs::write(&ctx.report_file, content)
        .with_context(|| format!("写入 {} 失败", ctx.report_file.display()))?;

    log::info!("{} 已保存", ctx.report_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> WatchedInstrument {
        WatchedInstrument {
            code: "600000".to_string(),
            name: "浦发银行".to_string(),
            buy_price: 10.351,
            start_time: "2024-03-04 15:30:00".to_string(),
            current_price: 10.4,
            main_net_ratio: 6.21,
            today_change: -0.5,
            remark: None,
        }
    }

    fn record(profit_loss: f64) -> SettledRecord {
        SettledRecord {
            code: "000001".to_string(),
            name: "平安银行".to_string(),
            buy_price: 10.0,
            start_time: "2024-03-01 15:30:00".to_string(),
            current_price: 9.1,
            main_net_ratio: -6.3,
            today_change: -2.1,
            profit_loss,
            remark: "主力净占比-6.3%小于-5%，触发卖出条件".to_string(),
        }
    }

    #[test]
    fn test_render_empty_report() {
        let report = render_report("2024-03-05 15:30:00", &[], &[]);

        assert!(report.starts_with("# 股票分析结果（2024-03-05 15:30:00）\n\n"));
        assert!(report.contains("暂无关注股票\n"));
        assert!(report.contains("暂无结算股票\n"));
    }

    #[test]
    fn test_render_rows() {
        let report = render_report("2024-03-05 15:30:00", &[stock()], &[record(-0.9), record(0.0)]);

        assert!(report.contains(
            "600000 | 浦发银行 | 10.35 | 2024-03-04 15:30:00 | 10.40 | 6.21% | -0.5% | 正常关注中\n"
        ));
        assert!(report.contains("| -0.90 | 主力净占比-6.3%小于-5%，触发卖出条件\n"));
        assert!(report.contains("| +0.00 |"));
        assert!(!report.contains("暂无"));
    }

    #[test]
    fn test_render_custom_remark() {
        let mut s = stock();
        s.remark = Some("手动添加".to_string());
        s.name = String::new();

        let report = render_report("2024-03-05 15:30:00", &[s], &[]);
        assert!(report.contains("600000 | N/A | 10.35"));
        assert!(report.contains("| 手动添加\n"));
    }
}
