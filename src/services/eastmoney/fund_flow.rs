//! 主力资金流向排名

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::client::EastmoneyService;
use super::common::{
    fund_flow_filter, value_f64, value_string, EASTMONEY_FUND_FLOW_API, FUND_FLOW_FIELDS,
    FUND_FLOW_UT,
};
use crate::models::{FundFlowRanking, FundFlowRow, FundFlowScope};

impl EastmoneyService {
    /// 获取主力净流入排名
    /// 对应 akshare 的 stock_main_fund_flow(symbol) 函数，按主力净占比倒序
    pub async fn get_main_fund_flow(&self, scope: FundFlowScope) -> Result<FundFlowRanking> {
        let query = [
            ("fid", "f184".to_string()),
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("ut", FUND_FLOW_UT.to_string()),
            ("fs", fund_flow_filter(scope).to_string()),
            ("fields", FUND_FLOW_FIELDS.to_string()),
        ];

        let rows = self.fetch_clist(EASTMONEY_FUND_FLOW_API, &query).await?;
        let rows: Vec<FundFlowRow> = rows.iter().filter_map(parse_fund_flow_row).collect();

        if rows.is_empty() {
            return Err(anyhow!("{}主力资金流向数据为空", scope.label()));
        }
        Ok(FundFlowRanking::new(rows))
    }
}

/// 解析单条资金流向数据
pub fn parse_fund_flow_row(item: &Value) -> Option<FundFlowRow> {
    let code = value_string(&item["f12"]);
    if code.is_empty() {
        return None;
    }

    Some(FundFlowRow {
        code,
        name: value_string(&item["f14"]),
        latest_price: value_f64(&item["f2"]),
        main_net_ratio: value_f64(&item["f184"]),
        today_change: value_f64(&item["f3"]),
    })
}
