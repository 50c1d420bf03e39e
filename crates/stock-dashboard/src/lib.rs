//! Assembles the dashboard report for one ticker and date range.
//!
//! Every section is fetched and computed independently: a failing provider
//! call turns into a notice on its own section and never blocks the rest.

use chrono::NaiveDate;
use dashboard_core::{
    DashboardError, DashboardResult, FundamentalDataProvider, NewsEntry, NewsProvider,
    PriceDataProvider, PriceRow, PriceTable, ReshapedTable, StatementKind, SummaryStatistics,
};
use market_data::{AlphaVantageClient, YahooFinanceClient};
use return_analysis::{percent_changes, ReturnStatisticsEngine};
use serde::Serialize;
use std::sync::Arc;

pub mod config;
pub use config::{usage, CliArgs, DashboardConfig};

#[cfg(test)]
mod tests;

/// Maximum number of news entries surfaced.
pub const NEWS_LIMIT: usize = 10;

/// Rows shown in the raw-data preview.
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// User-facing message replacing a section that could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    Unavailable(Notice),
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Unavailable(_) => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Section::Ready(_) => None,
            Section::Unavailable(notice) => Some(notice),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }
}

/// Normalized price table as fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceOverview {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub close_column: Option<String>,
    pub preview: Vec<PriceRow>,
    pub table: PriceTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementRow {
    pub date: NaiveDate,
    pub close: f64,
    pub pct_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
}

/// Daily moves of the close column with their annualized summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceMovements {
    pub close_column: String,
    pub rows: Vec<MovementRow>,
    pub statistics: SummaryStatistics,
    pub metrics: Vec<MetricCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub prices: Section<PriceOverview>,
    pub movements: Section<PriceMovements>,
    pub balance_sheet: Section<ReshapedTable>,
    pub income_statement: Section<ReshapedTable>,
    pub cash_flow: Section<ReshapedTable>,
    pub news: Section<Vec<NewsEntry>>,
}

impl DashboardReport {
    pub fn statement(&self, kind: StatementKind) -> &Section<ReshapedTable> {
        match kind {
            StatementKind::BalanceSheet => &self.balance_sheet,
            StatementKind::IncomeStatement => &self.income_statement,
            StatementKind::CashFlow => &self.cash_flow,
        }
    }

    pub fn notices(&self) -> Vec<&Notice> {
        [
            self.prices.notice(),
            self.movements.notice(),
            self.balance_sheet.notice(),
            self.income_statement.notice(),
            self.cash_flow.notice(),
            self.news.notice(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Format the three summary figures the way the dashboard displays them.
pub fn metric_cards(stats: &SummaryStatistics) -> Vec<MetricCard> {
    vec![
        MetricCard {
            label: "Annual Return",
            value: format!("{:.2}%", stats.annual_return),
        },
        MetricCard {
            label: "Volatility",
            value: format!("{:.2}%", stats.volatility),
        },
        MetricCard {
            label: "Risk-Adjusted Return",
            value: stats
                .risk_adjusted_return
                .map(|r| format!("{:.2}", r))
                .unwrap_or_else(|| "N/A".to_string()),
        },
    ]
}

/// Percent-change rows and statistics for the table's close-like column.
pub fn price_movements(
    table: &PriceTable,
    engine: &ReturnStatisticsEngine,
) -> DashboardResult<PriceMovements> {
    if table.is_empty() {
        return Err(DashboardError::EmptyInput("price table has no rows".to_string()));
    }

    let close_column = table
        .close_column()
        .ok_or_else(|| DashboardError::MissingColumn(table.columns().to_vec()))?
        .to_string();
    let closes = table.column(&close_column).unwrap_or_default();

    let rows: Vec<MovementRow> = table
        .dates()
        .into_iter()
        .zip(closes.iter().copied())
        .skip(1)
        .zip(percent_changes(&closes))
        .filter(|(_, pct)| pct.is_finite())
        .map(|((date, close), pct_change)| MovementRow {
            date,
            close,
            pct_change,
        })
        .collect();

    let statistics = engine.compute(&closes)?;
    let metrics = metric_cards(&statistics);

    Ok(PriceMovements {
        close_column,
        rows,
        statistics,
        metrics,
    })
}

fn movement_notice(err: &DashboardError) -> Notice {
    match err {
        DashboardError::MissingColumn(_) => Notice::warning("No Close price column found for plotting."),
        DashboardError::InsufficientData(_) => {
            Notice::info("Not enough price history to compute return statistics.")
        }
        _ => Notice::info("No pricing data to display here."),
    }
}

pub struct Dashboard {
    prices: Arc<dyn PriceDataProvider>,
    fundamentals: Arc<dyn FundamentalDataProvider>,
    news: Arc<dyn NewsProvider>,
    statistics: ReturnStatisticsEngine,
}

impl Dashboard {
    pub fn new(
        prices: Arc<dyn PriceDataProvider>,
        fundamentals: Arc<dyn FundamentalDataProvider>,
        news: Arc<dyn NewsProvider>,
    ) -> Self {
        Self {
            prices,
            fundamentals,
            news,
            statistics: ReturnStatisticsEngine::new(),
        }
    }

    pub fn with_trading_days(mut self, trading_days_per_year: u32) -> Self {
        self.statistics = ReturnStatisticsEngine::with_trading_days(trading_days_per_year);
        self
    }

    /// Wire the Yahoo Finance and Alpha Vantage adapters from configuration.
    pub fn from_config(config: &DashboardConfig) -> DashboardResult<Self> {
        let timeout = config.http_timeout();
        let yahoo = Arc::new(YahooFinanceClient::new(timeout)?);
        let alpha_vantage = Arc::new(AlphaVantageClient::new(config.api_key.clone(), timeout)?);

        if config.api_key.is_none() {
            tracing::warn!("API_KEY not set; fundamental data and news will be unavailable");
        }

        Ok(Self::new(yahoo, alpha_vantage.clone(), alpha_vantage)
            .with_trading_days(config.trading_days_per_year))
    }

    /// Fetch every section in turn; each call is attempted exactly once.
    pub async fn build(&self, request: &DashboardRequest) -> DashboardReport {
        tracing::info!(
            "Building dashboard for {} ({} to {})",
            request.ticker,
            request.start_date,
            request.end_date
        );

        let (prices, movements) = self.price_sections(request).await;
        let balance_sheet = self
            .statement_section(&request.ticker, StatementKind::BalanceSheet)
            .await;
        let income_statement = self
            .statement_section(&request.ticker, StatementKind::IncomeStatement)
            .await;
        let cash_flow = self
            .statement_section(&request.ticker, StatementKind::CashFlow)
            .await;
        let news = self.news_section(&request.ticker).await;

        let report = DashboardReport {
            ticker: request.ticker.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            prices,
            movements,
            balance_sheet,
            income_statement,
            cash_flow,
            news,
        };

        for notice in report.notices() {
            match notice.level {
                NoticeLevel::Info => tracing::info!("{}", notice.message),
                NoticeLevel::Warning => tracing::warn!("{}", notice.message),
            }
        }

        report
    }

    async fn price_sections(
        &self,
        request: &DashboardRequest,
    ) -> (Section<PriceOverview>, Section<PriceMovements>) {
        let raw = match self
            .prices
            .fetch_price_history(&request.ticker, request.start_date, request.end_date)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                return (
                    Section::Unavailable(Notice::warning(format!("Could not load price history: {}", e))),
                    Section::Unavailable(Notice::info("No pricing data to display here.")),
                );
            }
        };

        let table = raw.normalize();
        tracing::info!(
            "Rows: {}, Columns: {:?}",
            table.len(),
            table.columns()
        );

        if table.is_empty() {
            return (
                Section::Unavailable(Notice::info(
                    "No pricing data available for this ticker/date range.",
                )),
                Section::Unavailable(Notice::info("No pricing data to display here.")),
            );
        }

        let movements = match price_movements(&table, &self.statistics) {
            Ok(movements) => Section::Ready(movements),
            Err(e) => Section::Unavailable(movement_notice(&e)),
        };

        let overview = PriceOverview {
            row_count: table.len(),
            columns: table.columns().to_vec(),
            close_column: table.close_column().map(str::to_string),
            preview: table.head(PREVIEW_ROWS).to_vec(),
            table,
        };

        (Section::Ready(overview), movements)
    }

    async fn statement_section(&self, ticker: &str, kind: StatementKind) -> Section<ReshapedTable> {
        let fetched = match kind {
            StatementKind::BalanceSheet => self.fundamentals.fetch_balance_sheet(ticker).await,
            StatementKind::IncomeStatement => self.fundamentals.fetch_income_statement(ticker).await,
            StatementKind::CashFlow => self.fundamentals.fetch_cash_flow(ticker).await,
        };

        match fetched {
            Ok(table) => Section::Ready(dashboard_core::reshape(&table)),
            Err(e) => Section::Unavailable(Notice::warning(format!(
                "Could not load {}: {}",
                kind.label(),
                e
            ))),
        }
    }

    async fn news_section(&self, ticker: &str) -> Section<Vec<NewsEntry>> {
        match self.news.fetch_news(ticker).await {
            Ok(mut entries) => {
                entries.truncate(NEWS_LIMIT);
                Section::Ready(entries)
            }
            Err(e) => Section::Unavailable(Notice::warning(format!("Could not load news: {}", e))),
        }
    }
}
