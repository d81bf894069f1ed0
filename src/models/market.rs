//! 行情数据模型
//!
//! 单次运行内使用的临时数据，不落盘：
//! - 交易日历
//! - 全市场实时行情快照
//! - 主力资金流向排名

#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// 交易日历
///
/// 除交易日集合外，还记录日历覆盖到的最后一天，
/// 用于区分“非交易日”和“日历尚未更新到该日”
#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    days: BTreeSet<NaiveDate>,
    covered_until: Option<NaiveDate>,
}

impl TradingCalendar {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(days: I) -> Self {
        let days: BTreeSet<NaiveDate> = days.into_iter().collect();
        let covered_until = days.iter().next_back().copied();
        Self {
            days,
            covered_until,
        }
    }

    /// 声明日历覆盖到 until（含非交易日）
    pub fn covering(mut self, until: NaiveDate) -> Self {
        self.covered_until = self.covered_until.max(Some(until));
        self
    }

    /// 合并另一份日历
    pub fn merge(&mut self, other: TradingCalendar) {
        self.days.extend(other.days);
        self.covered_until = self.covered_until.max(other.covered_until);
    }

    /// 判断某日是否为交易日
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    /// 日历是否覆盖某日
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.covered_until.map_or(false, |until| date <= until)
    }

    pub fn covered_until(&self) -> Option<NaiveDate> {
        self.covered_until
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// A股实时行情
///
/// 对应 akshare 的 stock_zh_a_spot_em 中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct SpotQuote {
    /// 股票代码
    pub code: String,
    /// 股票名称
    pub name: String,
    /// 最新价（停牌时为空）
    pub latest_price: Option<f64>,
    /// 涨跌幅（百分比）
    pub change_percent: Option<f64>,
    /// 最高价
    pub high: Option<f64>,
    /// 最低价
    pub low: Option<f64>,
    /// 今开
    pub open: Option<f64>,
    /// 昨收
    pub prev_close: Option<f64>,
    /// 成交量（手）
    pub volume: Option<f64>,
    /// 成交额
    pub amount: Option<f64>,
}

/// 全市场行情快照
///
/// 同一代码出现多次时以第一条为准
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    quotes: Vec<SpotQuote>,
    index: HashMap<String, usize>,
}

impl MarketSnapshot {
    pub fn new(quotes: Vec<SpotQuote>) -> Self {
        let mut index = HashMap::with_capacity(quotes.len());
        for (i, quote) in quotes.iter().enumerate() {
            index.entry(quote.code.clone()).or_insert(i);
        }
        Self { quotes, index }
    }

    pub fn find(&self, code: &str) -> Option<&SpotQuote> {
        self.index.get(code).map(|&i| &self.quotes[i])
    }

    /// 当日最高价
    pub fn day_high(&self, code: &str) -> Option<f64> {
        self.find(code).and_then(|q| q.high)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// 主力资金流向排名中的一行
///
/// 对应 akshare 的 stock_main_fund_flow
#[derive(Debug, Clone, PartialEq)]
pub struct FundFlowRow {
    /// 股票代码
    pub code: String,
    /// 股票名称
    pub name: String,
    /// 最新价
    pub latest_price: Option<f64>,
    /// 今日排行榜-主力净占比（百分比）
    pub main_net_ratio: Option<f64>,
    /// 今日排行榜-今日涨跌（百分比）
    pub today_change: Option<f64>,
}

/// 主力资金流向排名
#[derive(Debug, Clone, Default)]
pub struct FundFlowRanking {
    rows: Vec<FundFlowRow>,
    index: HashMap<String, usize>,
}

impl FundFlowRanking {
    pub fn new(rows: Vec<FundFlowRow>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            index.entry(row.code.clone()).or_insert(i);
        }
        Self { rows, index }
    }

    pub fn rows(&self) -> &[FundFlowRow] {
        &self.rows
    }

    pub fn find(&self, code: &str) -> Option<&FundFlowRow> {
        self.index.get(code).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 主力资金流向的市场范围
///
/// 与 akshare stock_main_fund_flow 的 symbol 参数一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FundFlowScope {
    /// 全部股票
    #[default]
    All,
    /// 沪深A股
    HuShenA,
    /// 沪市A股
    ShanghaiA,
    /// 科创板
    Star,
    /// 深市A股
    ShenzhenA,
    /// 创业板
    ChiNext,
    /// 沪市B股
    ShanghaiB,
    /// 深市B股
    ShenzhenB,
}

impl FundFlowScope {
    /// 解析配置中的范围名称，同时接受中文名
    pub fn parse(name: &str) -> Option<Self> {
        let scope = match name.trim() {
            "all" | "全部股票" => Self::All,
            "hs_a" | "沪深A股" => Self::HuShenA,
            "sh_a" | "沪市A股" => Self::ShanghaiA,
            "star" | "科创板" => Self::Star,
            "sz_a" | "深市A股" => Self::ShenzhenA,
            "chinext" | "创业板" => Self::ChiNext,
            "sh_b" | "沪市B股" => Self::ShanghaiB,
            "sz_b" | "深市B股" => Self::ShenzhenB,
            _ => return None,
        };
        Some(scope)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "全部股票",
            Self::HuShenA => "沪深A股",
            Self::ShanghaiA => "沪市A股",
            Self::Star => "科创板",
            Self::ShenzhenA => "深市A股",
            Self::ChiNext => "创业板",
            Self::ShanghaiB => "沪市B股",
            Self::ShenzhenB => "深市B股",
        }
    }
}
