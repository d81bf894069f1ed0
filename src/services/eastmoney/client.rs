//! 东方财富数据服务
//!
//! 封装 HTTP 客户端和 clist 列表接口的分页逻辑

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::common::{MAX_PAGES, REFERER, USER_AGENT};
use crate::config::FetchConfig;

/// 东方财富数据服务
///
/// 参考 akshare/stock 中 stock_zh_a_spot_em、stock_main_fund_flow 的实现
pub struct EastmoneyService {
    /// HTTP 客户端
    client: Client,
    /// 列表接口每页条数
    page_size: u32,
}

impl EastmoneyService {
    /// 创建新的数据服务实例
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            page_size: config.page_size.max(1),
        })
    }

    /// 发送 GET 请求并解析 JSON
    pub(super) async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        self.get_json_with_referer(url, query, REFERER).await
    }

    /// 以指定 Referer 发送 GET 请求并解析 JSON
    pub(super) async fn get_json_with_referer(
        &self,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
    ) -> Result<Value> {
        log::debug!("📡 请求 URL: {} 参数: {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .header("Referer", referer)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("请求 {} 失败: {}", url, response.status()));
        }

        let json: Value = response.json().await?;
        Ok(json)
    }

    /// 逐页读取 clist 接口，直到读满 total 条
    pub(super) async fn fetch_clist(
        &self,
        url: &str,
        base_query: &[(&str, String)],
    ) -> Result<Vec<Value>> {
        let mut rows = Vec::new();

        for page in 1..=MAX_PAGES {
            let mut query = base_query.to_vec();
            query.push(("pn", page.to_string()));
            query.push(("pz", self.page_size.to_string()));

            let json = self.get_json(url, &query).await?;
            let (total, items) = parse_clist_page(&json)?;
            if items.is_empty() {
                break;
            }

            rows.extend(items);
            if rows.len() >= total {
                break;
            }
        }

        Ok(rows)
    }
}

/// 解析 clist 单页响应，返回 (总条数, 当前页数据)
///
/// 超出末页时 data 为 null，视为空页
pub fn parse_clist_page(json: &Value) -> Result<(usize, Vec<Value>)> {
    if let Some(rc) = json.get("rc").and_then(Value::as_i64) {
        if rc != 0 {
            return Err(anyhow!("东方财富接口返回错误: rc={}", rc));
        }
    }

    let data = match json.get("data") {
        Some(Value::Null) | None => return Ok((0, Vec::new())),
        Some(data) => data,
    };

    let total = data.get("total").and_then(Value::as_u64).unwrap_or(0) as usize;
    let items = match data.get("diff") {
        Some(Value::Array(arr)) => arr.clone(),
        // np=0 时 diff 为 {"0": {...}, "1": {...}}
        Some(Value::Object(map)) => map.values().cloned().collect(),
        _ => Vec::new(),
    };

    Ok((total, items))
}
