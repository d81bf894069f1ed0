//! 业务逻辑服务模块
//!
//! 封装数据获取、规则评估和结果保存

pub mod eastmoney;         // 东方财富数据源
pub mod market_service;    // 带重试的行情获取与交易日判断
pub mod report_service;    // Markdown 报告
pub mod rule_service;      // 结算与选股规则
pub mod store_service;     // 关注列表与结算记录存储
pub mod watchlist_engine;  // 完整分析流程
