//! 关注规则服务
//!
//! 根据主力资金流向和实时行情：
//! 1. 选出候选股票（主力净占比 > 0、下跌、非 ST，按净占比倒序前 5 名）
//! 2. 对关注中的股票逐一判断卖出条件，命中即结算
//! 3. 把尚未关注的候选股票加入关注列表

use crate::models::{
    FundFlowRanking, FundFlowRow, MarketSnapshot, SettledRecord, WatchedInstrument,
};

/// 候选股票数量
pub const TOP_CANDIDATE_COUNT: usize = 5;
/// 风险警示股票名称标记
pub const ST_MARKER: &str = "ST";

/// 卖出规则，按声明顺序判断，先命中者生效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellRule {
    /// 主力净占比 < -5%
    MainFundOutflow,
    /// 今日涨幅 > 10%
    DailySurge,
    /// 今日上涨但主力净流出
    RiseOnOutflow,
}

impl SellRule {
    /// 依次判断卖出条件
    pub fn matching(main_net_ratio: f64, today_change: f64) -> Option<Self> {
        if main_net_ratio < -5.0 {
            Some(Self::MainFundOutflow)
        } else if today_change > 10.0 {
            Some(Self::DailySurge)
        } else if today_change > 0.0 && main_net_ratio < 0.0 {
            Some(Self::RiseOnOutflow)
        } else {
            None
        }
    }

    /// 是否按保本价卖出：最高价曾高于买入价时，假设在回落到买入价时卖出
    pub fn exits_at_break_even(&self) -> bool {
        matches!(self, Self::MainFundOutflow | Self::RiseOnOutflow)
    }

    /// 结算备注
    ///
    /// 涨幅类备注中沿用主力净占比的数值，与历史记录保持一致
    pub fn remark(&self, main_net_ratio: f64) -> String {
        let main_net_ratio = format_percent(main_net_ratio);
        match self {
            Self::MainFundOutflow => {
                format!("主力净占比{}%小于-5%，触发卖出条件", main_net_ratio)
            }
            Self::DailySurge => format!("今日涨幅{}%大于10%，触发卖出条件", main_net_ratio),
            Self::RiseOnOutflow => format!(
                "今日涨幅{}%大于0%，且主力净占比{}%小于0%，触发卖出条件",
                main_net_ratio, main_net_ratio
            ),
        }
    }

    /// 计算盈亏
    pub fn profit_loss(&self, buy_price: f64, current_price: f64, day_high: Option<f64>) -> f64 {
        let touched_above_cost = day_high.map_or(false, |high| high > buy_price);
        if self.exits_at_break_even() && touched_above_cost {
            0.0
        } else {
            current_price - buy_price
        }
    }
}

/// 备注中的百分比数值，整数值也保留一位小数（-6.0 而不是 -6）
fn format_percent(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// 单次评估结果
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// 更新后的关注列表
    pub watchlist: Vec<WatchedInstrument>,
    /// 本次结算记录，按关注列表顺序
    pub settlements: Vec<SettledRecord>,
    /// 本次新增关注的代码
    pub added: Vec<String>,
}

/// 筛选候选股票
///
/// 条件：最新价存在、主力净占比 > 0、名称不含 ST、今日涨跌 < 0，
/// 按主力净占比倒序
pub fn rank_candidates(ranking: &FundFlowRanking) -> Vec<&FundFlowRow> {
    let mut filtered: Vec<&FundFlowRow> = ranking
        .rows()
        .iter()
        .filter(|row| row.latest_price.is_some())
        .filter(|row| row.main_net_ratio.map_or(false, |r| r > 0.0))
        .filter(|row| !row.name.contains(ST_MARKER))
        .filter(|row| row.today_change.map_or(false, |c| c < 0.0))
        .collect();

    filtered.sort_by(|a, b| {
        let ra = a.main_net_ratio.unwrap_or_default();
        let rb = b.main_net_ratio.unwrap_or_default();
        rb.total_cmp(&ra)
    });
    filtered
}

/// 取前 5 名候选股票
///
/// 符合条件的股票不足 5 只时不选任何股票
pub fn top_candidates<'a>(ranked: &[&'a FundFlowRow]) -> Vec<&'a FundFlowRow> {
    if ranked.len() < TOP_CANDIDATE_COUNT {
        return Vec::new();
    }
    ranked[..TOP_CANDIDATE_COUNT].to_vec()
}

/// 评估关注列表
pub fn evaluate(
    watchlist: Vec<WatchedInstrument>,
    snapshot: &MarketSnapshot,
    ranking: &FundFlowRanking,
    run_time: &str,
) -> Evaluation {
    let ranked = rank_candidates(ranking);
    log::info!("筛选后符合条件的股票数量: {}", ranked.len());

    let candidates = top_candidates(&ranked);
    let candidate_codes: Vec<&str> = candidates.iter().map(|row| row.code.as_str()).collect();
    log::info!("筛选出前{}名股票: {:?}", TOP_CANDIDATE_COUNT, candidate_codes);

    let mut evaluation = Evaluation::default();

    for stock in watchlist {
        match review(stock, snapshot, ranking) {
            Review::Keep(stock) => evaluation.watchlist.push(stock),
            Review::Settle(record) => evaluation.settlements.push(record),
        }
    }

    for row in candidates {
        if evaluation.watchlist.iter().any(|s| s.code == row.code) {
            continue;
        }
        if let Some(stock) = open_position(row, snapshot, run_time) {
            evaluation.added.push(stock.code.clone());
            evaluation.watchlist.push(stock);
        }
    }

    evaluation
}

enum Review {
    Keep(WatchedInstrument),
    Settle(SettledRecord),
}

/// 对单只关注股票判断卖出条件
fn review(
    mut stock: WatchedInstrument,
    snapshot: &MarketSnapshot,
    ranking: &FundFlowRanking,
) -> Review {
    let Some(row) = ranking.find(&stock.code) else {
        return Review::Keep(stock);
    };

    // 资金流向数据不完整时按未找到处理，原样保留
    let (Some(current_price), Some(main_net_ratio), Some(today_change)) =
        (row.latest_price, row.main_net_ratio, row.today_change)
    else {
        log::warn!("股票{}({})资金流向数据不完整，继续关注", stock.code, row.name);
        return Review::Keep(stock);
    };

    let Some(rule) = SellRule::matching(main_net_ratio, today_change) else {
        stock.current_price = current_price;
        stock.main_net_ratio = main_net_ratio;
        stock.today_change = today_change;
        stock.name = row.name.clone();
        return Review::Keep(stock);
    };

    let day_high = snapshot.day_high(&stock.code);
    let profit_loss = rule.profit_loss(stock.buy_price, current_price, day_high);
    log::info!(
        "股票{}({})触发卖出条件，主力净占比{}%，盈亏{:.2}",
        stock.code,
        row.name,
        main_net_ratio,
        profit_loss
    );

    Review::Settle(SettledRecord {
        code: stock.code,
        name: row.name.clone(),
        buy_price: stock.buy_price,
        start_time: stock.start_time,
        current_price,
        main_net_ratio,
        today_change,
        profit_loss,
        remark: rule.remark(main_net_ratio),
    })
}

/// 以当前价格模拟买入候选股票
fn open_position(
    row: &FundFlowRow,
    snapshot: &MarketSnapshot,
    run_time: &str,
) -> Option<WatchedInstrument> {
    let quote = snapshot.find(&row.code)?;
    let Some(current_price) = quote.latest_price else {
        log::warn!("候选股票{}({})没有最新价，暂不关注", row.code, quote.name);
        return None;
    };

    log::info!(
        "新增关注股票{}({})，买入价格{:.2}",
        row.code,
        quote.name,
        current_price
    );

    Some(WatchedInstrument {
        code: row.code.clone(),
        name: quote.name.clone(),
        buy_price: current_price,
        start_time: run_time.to_string(),
        current_price,
        main_net_ratio: row.main_net_ratio.unwrap_or_default(),
        today_change: row.today_change.unwrap_or_default(),
        remark: None,
    })
}
