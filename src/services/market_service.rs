//! 行情数据服务
//!
//! 统一的数据获取入口：
//! - DataRequest 枚举列出所有上游请求，每种请求对应一个处理函数
//! - fetch_with_retry 负责固定间隔重试
//! - MarketFetcher 提供交易日判断和各类数据的获取

use anyhow::Result;
use chrono::NaiveDate;
use std::future::Future;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::models::{FundFlowRanking, FundFlowScope, MarketSnapshot, TradingCalendar};
use crate::services::eastmoney::EastmoneyService;

/// 上游数据源
pub trait MarketDataSource {
    /// 交易日历，至少覆盖到 today
    async fn trade_calendar(&self, today: NaiveDate) -> Result<TradingCalendar>;
    /// 全市场实时行情
    async fn stock_spot(&self) -> Result<MarketSnapshot>;
    /// 主力资金流向排名
    async fn main_fund_flow(&self, scope: FundFlowScope) -> Result<FundFlowRanking>;
}

impl MarketDataSource for EastmoneyService {
    async fn trade_calendar(&self, today: NaiveDate) -> Result<TradingCalendar> {
        self.get_trade_calendar(today).await
    }

    async fn stock_spot(&self) -> Result<MarketSnapshot> {
        self.get_stock_spot().await
    }

    async fn main_fund_flow(&self, scope: FundFlowScope) -> Result<FundFlowRanking> {
        self.get_main_fund_flow(scope).await
    }
}

/// 上游数据请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRequest {
    TradeCalendar(NaiveDate),
    StockSpot,
    MainFundFlow(FundFlowScope),
}

impl DataRequest {
    pub fn label(&self) -> String {
        match self {
            Self::TradeCalendar(_) => "交易日历".to_string(),
            Self::StockSpot => "A股现货".to_string(),
            Self::MainFundFlow(scope) => format!("主力资金流向({})", scope.label()),
        }
    }
}

/// 上游数据
#[derive(Debug, Clone)]
pub enum MarketData {
    Calendar(TradingCalendar),
    Spot(MarketSnapshot),
    FundFlow(FundFlowRanking),
}

impl MarketData {
    pub fn len(&self) -> usize {
        match self {
            Self::Calendar(calendar) => calendar.len(),
            Self::Spot(snapshot) => snapshot.len(),
            Self::FundFlow(ranking) => ranking.len(),
        }
    }
}

/// 按请求类型分派到对应的处理函数
async fn dispatch<S: MarketDataSource>(source: &S, request: DataRequest) -> Result<MarketData> {
    match request {
        DataRequest::TradeCalendar(today) => {
            source.trade_calendar(today).await.map(MarketData::Calendar)
        }
        DataRequest::StockSpot => source.stock_spot().await.map(MarketData::Spot),
        DataRequest::MainFundFlow(scope) => {
            source.main_fund_flow(scope).await.map(MarketData::FundFlow)
        }
    }
}

/// 重试策略：固定间隔，无退避
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(25),
        }
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

/// 带重试的数据获取
///
/// 每次失败记录尝试次数和错误，等待固定间隔后重试；
/// 全部失败返回 None
pub async fn fetch_with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        log::info!("开始获取{}数据（第{}次尝试）", label, attempt);
        match op().await {
            Ok(data) => return Some(data),
            Err(e) => {
                log::error!("获取{}数据失败（第{}次尝试）: {:#}", label, attempt, e);
                if attempt < max_attempts {
                    log::info!("等待{}秒后重试...", policy.delay.as_secs());
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    log::error!("获取{}数据最终失败，已重试{}次", label, max_attempts);
    None
}

/// 行情获取器
pub struct MarketFetcher<S> {
    source: S,
    retry: RetryPolicy,
}

impl<S: MarketDataSource> MarketFetcher<S> {
    pub fn new(source: S, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 获取任意一种上游数据
    pub async fn fetch(&self, request: DataRequest) -> Option<MarketData> {
        let label = request.label();
        let source = &self.source;
        let data = fetch_with_retry(&self.retry, &label, move || dispatch(source, request)).await?;
        log::info!("成功获取{}数据，共{}条记录", label, data.len());
        Some(data)
    }

    /// 判断今天是否为交易日
    ///
    /// 交易日历获取失败时返回 false，不做分析；
    /// 日历未覆盖今天时同样返回 false，并单独告警
    pub async fn is_trading_day(&self, today: NaiveDate) -> bool {
        let calendar = match self.fetch(DataRequest::TradeCalendar(today)).await {
            Some(MarketData::Calendar(calendar)) => calendar,
            _ => {
                log::error!("无法获取交易日历，无法判断是否为交易日");
                return false;
            }
        };

        if !calendar.covers(today) {
            log::warn!(
                "交易日历只覆盖到{:?}，无法确认今天({})是否为交易日",
                calendar.covered_until(),
                today
            );
            return false;
        }

        let is_trading = calendar.contains(today);
        if is_trading {
            log::info!("今天({})是交易日", today);
        } else {
            log::info!("今天({})不是交易日", today);
        }
        is_trading
    }

    /// 获取全市场实时行情
    pub async fn stock_spot(&self) -> Option<MarketSnapshot> {
        match self.fetch(DataRequest::StockSpot).await? {
            MarketData::Spot(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// 获取主力资金流向排名
    pub async fn main_fund_flow(&self, scope: FundFlowScope) -> Option<FundFlowRanking> {
        match self.fetch(DataRequest::MainFundFlow(scope)).await? {
            MarketData::FundFlow(ranking) => Some(ranking),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{FundFlowRow, SpotQuote};
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 内存数据源，按配置返回数据或失败，并记录调用次数
    #[derive(Default)]
    pub(crate) struct MockSource {
        pub calendar: Option<Vec<NaiveDate>>,
        /// 日历覆盖到的最后一天，默认为最后一个交易日
        pub calendar_covered_until: Option<NaiveDate>,
        pub quotes: Option<Vec<SpotQuote>>,
        pub fund_flow: Option<Vec<FundFlowRow>>,
        /// 前 N 次调用失败
        pub fail_first: usize,
        pub calendar_calls: AtomicUsize,
        pub spot_calls: AtomicUsize,
        pub fund_flow_calls: AtomicUsize,
    }

    impl MockSource {
        fn respond<T>(&self, calls: &AtomicUsize, data: Option<T>) -> Result<T> {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(anyhow!("模拟网络错误"));
            }
            data.ok_or_else(|| anyhow!("模拟数据缺失"))
        }
    }

    impl MarketDataSource for MockSource {
        async fn trade_calendar(&self, _today: NaiveDate) -> Result<TradingCalendar> {
            let covered_until = self.calendar_covered_until;
            self.respond(&self.calendar_calls, self.calendar.clone())
                .map(|days| {
                    let calendar = TradingCalendar::new(days);
                    match covered_until {
                        Some(until) => calendar.covering(until),
                        None => calendar,
                    }
                })
        }

        async fn stock_spot(&self) -> Result<MarketSnapshot> {
            self.respond(&self.spot_calls, self.quotes.clone())
                .map(MarketSnapshot::new)
        }

        async fn main_fund_flow(&self, _scope: FundFlowScope) -> Result<FundFlowRanking> {
            self.respond(&self.fund_flow_calls, self.fund_flow.clone())
                .map(FundFlowRanking::new)
        }
    }

    pub(crate) fn no_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = fetch_with_retry(&no_delay(3), "测试", move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(anyhow!("失败"))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Some(2));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Option<()> = fetch_with_retry(&no_delay(3), "测试", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("失败"))
        })
        .await;

        assert_eq!(result, None);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_waits_between_attempts() {
        tokio::time::pause();
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_secs(25),
        };
        let start = tokio::time::Instant::now();

        let result: Option<()> =
            fetch_with_retry(&policy, "测试", || async { Err(anyhow!("失败")) }).await;

        assert_eq!(result, None);
        // 只在两次尝试之间等待一次
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(25));
        assert!(elapsed < Duration::from_secs(50));
    }

    #[tokio::test]
    async fn test_is_trading_day() {
        let source = MockSource {
            calendar: Some(vec![day(2024, 1, 2), day(2024, 1, 3)]),
            ..MockSource::default()
        };
        let fetcher = MarketFetcher::new(source, no_delay(3));

        assert!(fetcher.is_trading_day(day(2024, 1, 2)).await);
        assert!(!fetcher.is_trading_day(day(2024, 1, 6)).await);
    }

    #[tokio::test]
    async fn test_weekend_inside_calendar_is_not_trading_day() {
        let source = MockSource {
            calendar: Some(vec![day(2024, 3, 29)]),
            calendar_covered_until: Some(day(2024, 3, 31)),
            ..MockSource::default()
        };
        let fetcher = MarketFetcher::new(source, no_delay(1));

        assert!(!fetcher.is_trading_day(day(2024, 3, 30)).await);
        assert!(fetcher.is_trading_day(day(2024, 3, 29)).await);
    }

    #[tokio::test]
    async fn test_calendar_not_covering_today_fails_closed() {
        let source = MockSource {
            calendar: Some(vec![day(2024, 3, 1), day(2024, 3, 4)]),
            ..MockSource::default()
        };
        let fetcher = MarketFetcher::new(source, no_delay(1));

        assert!(!fetcher.is_trading_day(day(2024, 3, 5)).await);
        assert_eq!(fetcher.source().calendar_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_calendar_failure_fails_closed() {
        let source = MockSource {
            calendar: Some(vec![day(2024, 1, 2)]),
            fail_first: 3,
            ..MockSource::default()
        };
        let fetcher = MarketFetcher::new(source, no_delay(3));

        assert!(!fetcher.is_trading_day(day(2024, 1, 2)).await);
        assert_eq!(fetcher.source().calendar_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_dispatches_by_request() {
        let source = MockSource {
            fund_flow: Some(Vec::new()),
            ..MockSource::default()
        };
        let fetcher = MarketFetcher::new(source, no_delay(1));

        let ranking = fetcher.main_fund_flow(FundFlowScope::All).await;
        assert!(ranking.is_some());
        assert_eq!(fetcher.source().fund_flow_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.source().spot_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_request_label() {
        assert_eq!(DataRequest::StockSpot.label(), "A股现货");
        assert_eq!(
            DataRequest::MainFundFlow(FundFlowScope::All).label(),
            "主力资金流向(全部股票)"
        );
    }
}
