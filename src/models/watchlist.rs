//! 关注列表与结算记录模型
//!
//! 这两类数据是跨运行保存的唯一状态：
//! - care.json：当前关注的股票
//! - result.json：累计结算记录

use serde::{Deserialize, Deserializer, Serialize};

/// 数值字段为 null 时读为 NaN
///
/// 旧文件中的 NaN 在读取前被替换为 null，写出时 NaN 同样输出为 null
fn number_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// 关注中的股票
///
/// 同一关注列表中 code 唯一
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WatchedInstrument {
    /// 股票代码
    pub code: String,
    /// 股票名称
    #[serde(default)]
    pub name: String,
    /// 模拟买入价格
    #[serde(deserialize_with = "number_or_nan")]
    pub buy_price: f64,
    /// 关注的起始时间（YYYY-MM-DD HH:MM:SS）
    pub start_time: String,
    /// 当前价格
    #[serde(default, deserialize_with = "number_or_nan")]
    pub current_price: f64,
    /// 今日排行榜-主力净占比
    #[serde(default, deserialize_with = "number_or_nan")]
    pub main_net_ratio: f64,
    /// 今日排行榜-今日涨跌
    #[serde(default, deserialize_with = "number_or_nan")]
    pub today_change: f64,
    /// 备注
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// 已结算的股票
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SettledRecord {
    /// 股票代码
    pub code: String,
    /// 股票名称
    pub name: String,
    /// 模拟买入价格
    #[serde(deserialize_with = "number_or_nan")]
    pub buy_price: f64,
    /// 关注的起始时间
    pub start_time: String,
    /// 结算时价格
    #[serde(deserialize_with = "number_or_nan")]
    pub current_price: f64,
    /// 结算时主力净占比
    #[serde(deserialize_with = "number_or_nan")]
    pub main_net_ratio: f64,
    /// 结算时今日涨跌
    #[serde(deserialize_with = "number_or_nan")]
    pub today_change: f64,
    /// 盈亏
    #[serde(deserialize_with = "number_or_nan")]
    pub profit_loss: f64,
    /// 结算原因
    pub remark: String,
}

/// result.json 文件结构
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SettlementLedger {
    /// 最后更新时间
    #[serde(default)]
    pub last_update: String,
    /// 全部结算记录（旧记录在前）
    #[serde(default)]
    pub settled_stocks: Vec<SettledRecord>,
}
