//! 沪深京A股实时行情

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::client::EastmoneyService;
use super::common::{
    value_f64, value_string, EASTMONEY_SPOT_API, SPOT_FIELDS, SPOT_MARKET_FILTER, SPOT_UT,
};
use crate::models::{MarketSnapshot, SpotQuote};

impl EastmoneyService {
    /// 获取全市场实时行情
    /// 对应 akshare 的 stock_zh_a_spot_em() 函数
    pub async fn get_stock_spot(&self) -> Result<MarketSnapshot> {
        let query = [
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("ut", SPOT_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", "f12".to_string()),
            ("fs", SPOT_MARKET_FILTER.to_string()),
            ("fields", SPOT_FIELDS.to_string()),
        ];

        let rows = self.fetch_clist(EASTMONEY_SPOT_API, &query).await?;
        let quotes: Vec<SpotQuote> = rows.iter().filter_map(parse_spot_row).collect();

        if quotes.is_empty() {
            return Err(anyhow!("A股实时行情数据为空"));
        }
        Ok(MarketSnapshot::new(quotes))
    }
}

/// 解析单条行情，缺少代码时跳过
pub fn parse_spot_row(item: &Value) -> Option<SpotQuote> {
    let code = value_string(&item["f12"]);
    if code.is_empty() {
        return None;
    }

    Some(SpotQuote {
        code,
        name: value_string(&item["f14"]),
        latest_price: value_f64(&item["f2"]),
        change_percent: value_f64(&item["f3"]),
        high: value_f64(&item["f15"]),
        low: value_f64(&item["f16"]),
        open: value_f64(&item["f17"]),
        prev_close: value_f64(&item["f18"]),
        volume: value_f64(&item["f5"]),
        amount: value_f64(&item["f6"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// 测试解析行情数据
    #[test]
    fn test_parse_spot_row() {
        let mock = json!({
            "f2": 10.35, "f3": -1.24, "f5": 356812, "f6": 369845123.0,
            "f12": "600000", "f14": "浦发银行",
            "f15": 10.52, "f16": 10.30, "f17": 10.48, "f18": 10.48
        });

        let quote = parse_spot_row(&mock).unwrap();
        assert_eq!(quote.code, "600000");
        assert_eq!(quote.name, "浦发银行");
        assert_eq!(quote.latest_price, Some(10.35));
        assert_eq!(quote.high, Some(10.52));
        assert_eq!(quote.change_percent, Some(-1.24));
    }

    /// 停牌股票价格字段为 "-"
    #[test]
    fn test_parse_suspended_row() {
        let mock = json!({
            "f2": "-", "f3": "-", "f5": "-", "f6": "-",
            "f12": "000004", "f14": "国华网安",
            "f15": "-", "f16": "-", "f17": "-", "f18": 12.01
        });

        let quote = parse_spot_row(&mock).unwrap();
        assert_eq!(quote.latest_price, None);
        assert_eq!(quote.high, None);
        assert_eq!(quote.prev_close, Some(12.01));
    }

    #[test]
    fn test_parse_row_without_code() {
        assert!(parse_spot_row(&json!({"f14": "无代码"})).is_none());
    }
}
