//! 交易日历
//!
//! 历史部分取上证指数日K线的日期集合；
//! 当月部分取深交所月历，其中包含尚未开盘的交易日

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use super::client::EastmoneyService;
use super::common::{
    CALENDAR_SECID, EASTMONEY_KLINE_API, KLINE_UT, SZSE_CALENDAR_API, SZSE_REFERER,
};
use crate::models::TradingCalendar;

impl EastmoneyService {
    /// 获取交易日历，覆盖到 today 所在月份的最后一天
    /// 对应 akshare 的 tool_trade_date_hist_sina() 函数
    pub async fn get_trade_calendar(&self, today: NaiveDate) -> Result<TradingCalendar> {
        let mut calendar = self.get_kline_calendar().await?;
        calendar.merge(self.get_szse_month_calendar(today).await?);
        Ok(calendar)
    }

    /// 上证指数日K线日期
    async fn get_kline_calendar(&self) -> Result<TradingCalendar> {
        let query = [
            ("secid", CALENDAR_SECID.to_string()),
            ("ut", KLINE_UT.to_string()),
            ("fields1", "f1".to_string()),
            ("fields2", "f51".to_string()),
            ("klt", "101".to_string()),
            ("fqt", "0".to_string()),
            ("beg", "19900101".to_string()),
            ("end", "20500101".to_string()),
        ];

        let json = self.get_json(EASTMONEY_KLINE_API, &query).await?;
        parse_trade_calendar(&json)
    }

    /// 深交所月历
    async fn get_szse_month_calendar(&self, day: NaiveDate) -> Result<TradingCalendar> {
        let query = [("month", format!("{:04}-{:02}", day.year(), day.month()))];
        let json = self
            .get_json_with_referer(SZSE_CALENDAR_API, &query, SZSE_REFERER)
            .await?;
        parse_szse_month_calendar(&json)
    }
}

/// 解析K线响应中的日期
///
/// 格式: {"data": {"klines": ["1990-12-19", "1990-12-20,...", ...]}}
pub fn parse_trade_calendar(json: &Value) -> Result<TradingCalendar> {
    let klines = json
        .pointer("/data/klines")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("交易日历数据格式错误"))?;

    let days = klines
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|line| line.split(',').next())
        .filter_map(|day| NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok());

    let calendar = TradingCalendar::new(days);
    if calendar.is_empty() {
        return Err(anyhow!("交易日历为空"));
    }
    Ok(calendar)
}

/// 解析深交所月历
///
/// 格式: {"data": [{"jyrq": "2024-03-01", "jybz": "1"}, ...]}
/// jybz 为 1 表示交易日，月内每个自然日都有一条
pub fn parse_szse_month_calendar(json: &Value) -> Result<TradingCalendar> {
    let rows = json
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("深交所月历数据格式错误"))?;

    let mut last_day = None;
    let mut trading_days = Vec::new();
    for row in rows {
        let Some(day) = row
            .get("jyrq")
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        else {
            continue;
        };
        last_day = last_day.max(Some(day));

        let is_trading = match row.get("jybz") {
            Some(Value::String(flag)) => flag.trim() == "1",
            Some(Value::Number(flag)) => flag.as_i64() == Some(1),
            _ => false,
        };
        if is_trading {
            trading_days.push(day);
        }
    }

    let last_day = last_day.ok_or_else(|| anyhow!("深交所月历为空"))?;
    Ok(TradingCalendar::new(trading_days).covering(last_day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_parse_trade_calendar() {
        let mock = json!({
            "rc": 0,
            "data": {
                "code": "000001",
                "klines": ["2024-01-02", "2024-01-03,2962.28", "bad-line"]
            }
        });

        let calendar = parse_trade_calendar(&mock).unwrap();
        assert_eq!(calendar.len(), 2);
        assert!(calendar.contains(day(1, 3)));
        assert!(!calendar.contains(day(1, 1)));
    }

    #[test]
    fn test_parse_trade_calendar_missing_data() {
        assert!(parse_trade_calendar(&json!({"rc": 0, "data": null})).is_err());
        assert!(parse_trade_calendar(&json!({"data": {"klines": []}})).is_err());
    }

    #[test]
    fn test_parse_szse_month_includes_future_days() {
        let mock = json!({
            "nowdate": "2024-03-04",
            "data": [
                {"zrxh": 6, "jybz": "1", "jyrq": "2024-03-01"},
                {"zrxh": 7, "jybz": "0", "jyrq": "2024-03-02"},
                {"zrxh": 1, "jybz": "0", "jyrq": "2024-03-03"},
                {"zrxh": 2, "jybz": "1", "jyrq": "2024-03-04"},
                {"zrxh": 3, "jybz": 1, "jyrq": "2024-03-05"},
                {"zrxh": 1, "jybz": "0", "jyrq": "2024-03-31"}
            ]
        });

        let calendar = parse_szse_month_calendar(&mock).unwrap();
        assert_eq!(calendar.len(), 3);
        assert!(calendar.contains(day(3, 5)));
        assert!(!calendar.contains(day(3, 2)));
        assert!(calendar.covers(day(3, 31)));
        assert!(!calendar.covers(day(4, 1)));
    }

    #[test]
    fn test_parse_szse_month_missing_data() {
        assert!(parse_szse_month_calendar(&json!({"data": null})).is_err());
        assert!(parse_szse_month_calendar(&json!({"data": []})).is_err());
    }
}
