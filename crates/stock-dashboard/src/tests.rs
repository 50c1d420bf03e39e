use super::*;
use async_trait::async_trait;
use chrono::{Datelike, Weekday};
use dashboard_core::{ColumnLabel, RawPriceTable, StatementTable};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

struct FakePrices(Result<RawPriceTable, DashboardError>);

#[async_trait]
impl PriceDataProvider for FakePrices {
    async fn fetch_price_history(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<RawPriceTable, DashboardError> {
        self.0.clone()
    }
}

struct FakeFundamentals {
    tables: HashMap<StatementKind, Result<StatementTable, DashboardError>>,
    calls: AtomicUsize,
}

impl FakeFundamentals {
    fn new(tables: Vec<(StatementKind, Result<StatementTable, DashboardError>)>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FundamentalDataProvider for FakeFundamentals {
    async fn fetch_statement(
        &self,
        _ticker: &str,
        kind: StatementKind,
    ) -> Result<StatementTable, DashboardError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tables
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Err(DashboardError::ProviderFailure("not stubbed".to_string())))
    }
}

struct FakeNews(Result<Vec<NewsEntry>, DashboardError>);

#[async_trait]
impl NewsProvider for FakeNews {
    async fn fetch_news(&self, _ticker: &str) -> Result<Vec<NewsEntry>, DashboardError> {
        self.0.clone()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request() -> DashboardRequest {
    DashboardRequest {
        ticker: "AAPL".to_string(),
        start_date: date(2024, 3, 1),
        end_date: date(2024, 4, 1),
    }
}

/// Grouped columns the way the price vendor returns them.
fn price_table(closes: &[f64]) -> RawPriceTable {
    let columns = vec![
        ColumnLabel::compound("Open", "AAPL"),
        ColumnLabel::compound("Close", "AAPL"),
        ColumnLabel::compound("Volume", "AAPL"),
    ];
    let rows = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceRow::new(date(2024, 3, 1 + i as u32), vec![c - 1.0, c, 1_000_000.0]))
        .collect();
    RawPriceTable::new(columns, rows).unwrap()
}

fn statement(n: usize) -> StatementTable {
    let mut labels = vec!["fiscalDateEnding".to_string(), "reportedCurrency".to_string()];
    let mut rows = vec![
        vec!["2023-09-30".to_string(), "2022-09-24".to_string()],
        vec!["USD".to_string(), "USD".to_string()],
    ];
    for i in 0..n {
        labels.push(format!("item{}", i));
        rows.push(vec![format!("{}", i * 10), format!("{}", i * 9)]);
    }
    StatementTable::new(labels, rows).unwrap()
}

fn news_entry(i: usize) -> NewsEntry {
    NewsEntry {
        title: format!("Headline {}", i),
        published: None,
        summary: String::new(),
        title_sentiment: 0.0,
        summary_sentiment: 0.0,
        url: format!("https://example.com/{}", i),
        source: None,
    }
}

fn all_statements() -> FakeFundamentals {
    FakeFundamentals::new(vec![
        (StatementKind::BalanceSheet, Ok(statement(3))),
        (StatementKind::IncomeStatement, Ok(statement(2))),
        (StatementKind::CashFlow, Ok(statement(1))),
    ])
}

fn dashboard(
    prices: Result<RawPriceTable, DashboardError>,
    fundamentals: FakeFundamentals,
    news: Result<Vec<NewsEntry>, DashboardError>,
) -> Dashboard {
    Dashboard::new(
        Arc::new(FakePrices(prices)),
        Arc::new(fundamentals),
        Arc::new(FakeNews(news)),
    )
}

#[tokio::test]
async fn test_full_report() {
    let dash = dashboard(
        Ok(price_table(&[100.0, 110.0, 121.0])),
        all_statements(),
        Ok((0..3).map(news_entry).collect()),
    );

    let report = dash.build(&request()).await;
    assert_eq!(report.ticker, "AAPL");
    assert!(report.notices().is_empty());

    let prices = report.prices.ready().unwrap();
    assert_eq!(prices.row_count, 3);
    assert_eq!(prices.columns, vec!["Open AAPL", "Close AAPL", "Volume AAPL"]);
    assert_eq!(prices.close_column.as_deref(), Some("Close AAPL"));
    assert_eq!(prices.preview.len(), 3);

    let movements = report.movements.ready().unwrap();
    assert_eq!(movements.close_column, "Close AAPL");
    assert_eq!(movements.rows.len(), 2);
    assert_eq!(movements.rows[0].date, date(2024, 3, 2));
    assert_eq!(movements.rows[0].close, 110.0);
    assert_eq!(movements.statistics.risk_adjusted_return, None);
    assert_eq!(movements.metrics[0].value, "2520.00%");
    assert_eq!(movements.metrics[1].value, "0.00%");
    assert_eq!(movements.metrics[2].value, "N/A");

    let balance = report.balance_sheet.ready().unwrap();
    assert_eq!(balance.headers, vec!["2023-09-30", "2022-09-24"]);
    assert_eq!(balance.len(), 3);
    assert_eq!(report.statement(StatementKind::IncomeStatement).ready().unwrap().len(), 2);
    assert_eq!(report.cash_flow.ready().unwrap().row_labels, vec!["item0"]);

    assert_eq!(report.news.ready().unwrap().len(), 3);
}

#[tokio::test]
async fn test_statement_failure_does_not_block_siblings() {
    let fundamentals = FakeFundamentals::new(vec![
        (StatementKind::BalanceSheet, Ok(statement(2))),
        (
            StatementKind::IncomeStatement,
            Err(DashboardError::ProviderFailure("HTTP 503".to_string())),
        ),
        (StatementKind::CashFlow, Ok(statement(4))),
    ]);
    let dash = Dashboard::new(
        Arc::new(FakePrices(Ok(price_table(&[10.0, 11.0])))),
        Arc::new(fundamentals),
        Arc::new(FakeNews(Ok(vec![news_entry(0)]))),
    );

    let report = dash.build(&request()).await;
    assert!(report.balance_sheet.is_ready());
    assert!(report.cash_flow.is_ready());
    assert!(report.news.is_ready());

    let notice = report.income_statement.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.message, "Could not load income statement: Provider error: HTTP 503");
}

#[tokio::test]
async fn test_every_fundamental_call_is_attempted_once() {
    let fundamentals = Arc::new(FakeFundamentals::new(Vec::new()));
    let dash = Dashboard::new(
        Arc::new(FakePrices(Ok(RawPriceTable::empty()))),
        fundamentals.clone(),
        Arc::new(FakeNews(Ok(Vec::new()))),
    );

    let report = dash.build(&request()).await;
    assert_eq!(fundamentals.calls.load(Ordering::SeqCst), 3);
    for kind in StatementKind::ALL {
        let notice = report.statement(kind).notice().unwrap();
        assert!(notice.message.starts_with(&format!("Could not load {}", kind.label())));
    }
}

#[tokio::test]
async fn test_empty_price_history_is_informational() {
    let dash = dashboard(Ok(RawPriceTable::empty()), all_statements(), Ok(Vec::new()));
    let report = dash.build(&request()).await;

    assert_eq!(
        report.prices.notice(),
        Some(&Notice::info("No pricing data available for this ticker/date range."))
    );
    assert_eq!(
        report.movements.notice(),
        Some(&Notice::info("No pricing data to display here."))
    );
    assert!(report.balance_sheet.is_ready());
}

#[tokio::test]
async fn test_price_provider_failure_is_a_warning() {
    let dash = dashboard(
        Err(DashboardError::ProviderFailure("timed out".to_string())),
        all_statements(),
        Ok(Vec::new()),
    );
    let report = dash.build(&request()).await;

    let notice = report.prices.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert!(notice.message.contains("timed out"));
    assert_eq!(report.movements.notice().unwrap().level, NoticeLevel::Info);
    assert!(report.news.is_ready());
}

#[tokio::test]
async fn test_missing_close_column_warns() {
    let raw = RawPriceTable::new(
        vec![ColumnLabel::flat("Open"), ColumnLabel::flat("High")],
        vec![
            PriceRow::new(date(2024, 3, 1), vec![1.0, 2.0]),
            PriceRow::new(date(2024, 3, 4), vec![1.5, 2.5]),
        ],
    )
    .unwrap();
    let dash = dashboard(Ok(raw), all_statements(), Ok(Vec::new()));
    let report = dash.build(&request()).await;

    let prices = report.prices.ready().unwrap();
    assert_eq!(prices.close_column, None);
    assert_eq!(
        report.movements.notice(),
        Some(&Notice::warning("No Close price column found for plotting."))
    );
}

#[tokio::test]
async fn test_single_row_reports_insufficient_data() {
    let dash = dashboard(Ok(price_table(&[100.0])), all_statements(), Ok(Vec::new()));
    let report = dash.build(&request()).await;

    assert!(report.prices.is_ready());
    let notice = report.movements.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(notice.message.contains("Not enough price history"));
}

#[tokio::test]
async fn test_news_is_capped_at_ten() {
    let dash = dashboard(
        Ok(price_table(&[1.0, 2.0])),
        all_statements(),
        Ok((0..25).map(news_entry).collect()),
    );
    let report = dash.build(&request()).await;

    let news = report.news.ready().unwrap();
    assert_eq!(news.len(), NEWS_LIMIT);
    assert_eq!(news[0].title, "Headline 0");
    assert_eq!(news[9].title, "Headline 9");
}

#[tokio::test]
async fn test_news_failure_warns() {
    let dash = dashboard(
        Ok(price_table(&[1.0, 2.0])),
        all_statements(),
        Err(DashboardError::ProviderFailure("API_KEY is not configured".to_string())),
    );
    let report = dash.build(&request()).await;

    assert_eq!(
        report.news.notice().unwrap().message,
        "Could not load news: Provider error: API_KEY is not configured"
    );
    assert!(report.movements.is_ready());
}

#[tokio::test]
async fn test_custom_trading_days() {
    let dash = dashboard(
        Ok(price_table(&[100.0, 110.0, 121.0])),
        all_statements(),
        Ok(Vec::new()),
    )
    .with_trading_days(365);
    let report = dash.build(&request()).await;

    let stats = &report.movements.ready().unwrap().statistics;
    assert_eq!(stats.trading_days_per_year, 365);
    assert!((stats.annual_return - 3650.0).abs() < 1e-6);
}

#[test]
fn test_price_movements_skip_missing_closes_in_date_order() {
    // Weekday closes across March with flat days on either side of a +5% day.
    let dates: Vec<NaiveDate> = (1..=31)
        .map(|d| date(2024, 3, d))
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();
    let mut closes: Vec<f64> = (0..dates.len()).map(|i| 170.0 + i as f64).collect();
    closes[8] = closes[7];
    closes[9] = closes[8] * 1.05;
    closes[10] = closes[9];
    closes[15] = f64::NAN;

    let rows = dates
        .iter()
        .zip(&closes)
        .map(|(&d, &c)| PriceRow::new(d, vec![c]))
        .collect();
    let table = PriceTable::new(vec!["Adj Close".to_string()], rows).unwrap();

    let movements = price_movements(&table, &ReturnStatisticsEngine::new()).unwrap();
    // 20 changes, two of them touch the missing close.
    assert_eq!(movements.rows.len(), 18);
    assert_eq!(movements.statistics.observations, 18);
    assert!(movements.rows.windows(2).all(|w| w[0].date < w[1].date));

    let flat_before = &movements.rows[7];
    assert_eq!(flat_before.date, dates[8]);
    assert_eq!(flat_before.pct_change, 0.0);
    assert!((movements.rows[8].pct_change - 0.05).abs() < 1e-9);
    assert_eq!(movements.rows[9].pct_change, 0.0);
    assert!(movements.rows.iter().all(|r| r.date != dates[15] && r.date != dates[16]));
}

#[test]
fn test_metric_cards_format() {
    let stats = SummaryStatistics {
        annual_return: 12.3456,
        volatility: 20.0,
        risk_adjusted_return: Some(0.61728),
        observations: 10,
        trading_days_per_year: 252,
    };
    let cards = metric_cards(&stats);
    assert_eq!(cards[0].label, "Annual Return");
    assert_eq!(cards[0].value, "12.35%");
    assert_eq!(cards[1].value, "20.00%");
    assert_eq!(cards[2].label, "Risk-Adjusted Return");
    assert_eq!(cards[2].value, "0.62");
}

#[test]
fn test_report_serializes_sections() {
    let section: Section<Vec<NewsEntry>> = Section::Unavailable(Notice::warning("Could not load news: x"));
    let json = serde_json::to_value(&section).unwrap();
    assert_eq!(json["unavailable"]["level"], "warning");
    assert_eq!(json["unavailable"]["message"], "Could not load news: x");

    let ready: Section<Vec<u32>> = Section::Ready(vec![1, 2]);
    assert_eq!(serde_json::to_value(&ready).unwrap()["ready"][1], 2);
}
