//! 公共常量和辅助函数

use serde_json::Value;

use crate::models::FundFlowScope;

// ==================== 东方财富 API 常量 ====================

/// 东方财富历史K线 API（用于推导交易日历）
pub const EASTMONEY_KLINE_API: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
/// 东方财富沪深京A股实时行情 API
pub const EASTMONEY_SPOT_API: &str = "https://82.push2.eastmoney.com/api/qt/clist/get";
/// 东方财富主力资金流向排名 API
pub const EASTMONEY_FUND_FLOW_API: &str = "https://push2.eastmoney.com/api/qt/clist/get";

/// 深交所交易日月历 API，包含当月尚未到来的交易日
pub const SZSE_CALENDAR_API: &str =
    "https://www.szse.cn/api/report/exchange/onepersistenthour/monthList";
pub const SZSE_REFERER: &str = "https://www.szse.cn/aboutus/calendar/";

/// 行情接口 ut 参数
pub const SPOT_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";
/// 资金流向接口 ut 参数
pub const FUND_FLOW_UT: &str = "b2884a393a59ad64002292a3e90d46a5";
/// K线接口 ut 参数
pub const KLINE_UT: &str = "7eea3edcaed734bea9cbfc24409ed989";

/// 沪深京A股市场过滤条件
pub const SPOT_MARKET_FILTER: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";
/// 上证指数，其日K线日期即为交易日
pub const CALENDAR_SECID: &str = "1.000001";

/// 行情字段: 最新价,涨跌幅,成交量,成交额,代码,名称,最高,最低,今开,昨收
pub const SPOT_FIELDS: &str = "f2,f3,f5,f6,f12,f14,f15,f16,f17,f18";
/// 资金流向字段: 代码,名称,最新价,今日涨跌,主力净额,主力净占比
pub const FUND_FLOW_FIELDS: &str = "f12,f14,f2,f3,f62,f184";

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const REFERER: &str = "https://quote.eastmoney.com/";

/// 分页上限，防止 total 异常时无限翻页
pub const MAX_PAGES: u32 = 500;

/// 资金流向范围对应的 fs 参数
pub fn fund_flow_filter(scope: FundFlowScope) -> &'static str {
    match scope {
        FundFlowScope::All => {
            "m:0+t:6+f:!2,m:0+t:13+f:!2,m:0+t:80+f:!2,m:1+t:2+f:!2,m:1+t:23+f:!2,m:0+t:7+f:!2,m:1+t:3+f:!2"
        }
        FundFlowScope::HuShenA => {
            "m:0+t:6+f:!2,m:0+t:13+f:!2,m:0+t:80+f:!2,m:1+t:2+f:!2,m:1+t:23+f:!2"
        }
        FundFlowScope::ShanghaiA => "m:1+t:2+f:!2,m:1+t:23+f:!2",
        FundFlowScope::Star => "m:1+t:23+f:!2",
        FundFlowScope::ShenzhenA => "m:0+t:6+f:!2,m:0+t:13+f:!2,m:0+t:80+f:!2",
        FundFlowScope::ChiNext => "m:0+t:80+f:!2",
        FundFlowScope::ShanghaiB => "m:1+t:3+f:!2",
        FundFlowScope::ShenzhenB => "m:0+t:7+f:!2",
    }
}

/// 解析数值字段
///
/// fltt=2 时缺失值以 "-" 表示，统一转为 None
pub fn value_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// 解析字符串字段，数字代码也转为字符串
pub fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_f64() {
        assert_eq!(value_f64(&json!(10.5)), Some(10.5));
        assert_eq!(value_f64(&json!("-3.2")), Some(-3.2));
        assert_eq!(value_f64(&json!("-")), None);
        assert_eq!(value_f64(&json!(null)), None);
    }

    #[test]
    fn test_value_string() {
        assert_eq!(value_string(&json!("600000")), "600000");
        assert_eq!(value_string(&json!(600000)), "600000");
        assert_eq!(value_string(&json!(null)), "");
    }
}
