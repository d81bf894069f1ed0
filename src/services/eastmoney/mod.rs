//! 东方财富数据源
//!
//! 参考 akshare 实现，提供本工具所需的三类数据：
//! - 交易日历（上证指数日K线日期 + 深交所当月月历）
//! - 沪深京A股实时行情
//! - 主力资金流向排名

mod calendar;
mod client;
mod common;
mod fund_flow;
mod spot;

pub use client::EastmoneyService;
