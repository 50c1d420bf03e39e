use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use dashboard_core::{
    DashboardError, FundamentalDataProvider, NewsEntry, NewsProvider, StatementKind,
    StatementTable,
};
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::{build_http_client, provider_error, SentimentScorer};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// How many feed items to request; the dashboard shows at most ten of them.
const NEWS_FEED_LIMIT: &str = "50";

/// Annual statements and news sentiment from Alpha Vantage.
pub struct AlphaVantageClient {
    api_key: Option<String>,
    client: Client,
    scorer: SentimentScorer,
}

impl AlphaVantageClient {
    /// A client without a key still constructs; every call then fails with
    /// `ProviderFailure` before touching the network.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, DashboardError> {
        Ok(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client: build_http_client(timeout)?,
            scorer: SentimentScorer::new(),
        })
    }

    /// Single GET against the query endpoint, vendor error payloads included.
    async fn query(&self, function: &str, params: &[(&str, &str)]) -> Result<Value, DashboardError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DashboardError::ProviderFailure("API_KEY is not configured".to_string())
        })?;

        tracing::debug!("Alpha Vantage request: function={} {:?}", function, params);

        let response = self
            .client
            .get(BASE_URL)
            .query(&[("function", function), ("apikey", api_key)])
            .query(params)
            .send()
            .await
            .map_err(provider_error)?;

        if !response.status().is_success() {
            return Err(DashboardError::ProviderFailure(format!(
                "Alpha Vantage HTTP {}",
                response.status()
            )));
        }

        let json: Value = response.json().await.map_err(provider_error)?;
        check_vendor_error(&json)?;
        Ok(json)
    }

    /// Get the annual reports of one statement, transposed to one row per field.
    pub async fn get_statement(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<StatementTable, DashboardError> {
        let json = self
            .query(statement_function(kind), &[("symbol", ticker)])
            .await?;
        let table = parse_statement(&json)?;
        tracing::info!("Alpha Vantage {} for {}: {} line items", kind.label(), ticker, table.len());
        Ok(table)
    }

    /// Get the latest news feed for a ticker, newest first.
    pub async fn get_news(&self, ticker: &str) -> Result<Vec<NewsEntry>, DashboardError> {
        let json = self
            .query(
                "NEWS_SENTIMENT",
                &[("tickers", ticker), ("sort", "LATEST"), ("limit", NEWS_FEED_LIMIT)],
            )
            .await?;
        parse_news(&json, &self.scorer)
    }
}

#[async_trait]
impl FundamentalDataProvider for AlphaVantageClient {
    async fn fetch_statement(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<StatementTable, DashboardError> {
        self.get_statement(ticker, kind).await
    }
}

#[async_trait]
impl NewsProvider for AlphaVantageClient {
    async fn fetch_news(&self, ticker: &str) -> Result<Vec<NewsEntry>, DashboardError> {
        self.get_news(ticker).await
    }
}

fn statement_function(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::BalanceSheet => "BALANCE_SHEET",
        StatementKind::IncomeStatement => "INCOME_STATEMENT",
        StatementKind::CashFlow => "CASH_FLOW",
    }
}

/// Alpha Vantage answers 200 with an explanatory object on bad symbols,
/// exhausted quotas and premium-only endpoints.
fn check_vendor_error(json: &Value) -> Result<(), DashboardError> {
    if let Some(error) = json.get("Error Message") {
        return Err(DashboardError::ProviderFailure(format!(
            "Alpha Vantage error: {}",
            value_text(error)
        )));
    }
    if let Some(note) = json.get("Note") {
        return Err(DashboardError::ProviderFailure(format!(
            "Alpha Vantage rate limit: {}",
            value_text(note)
        )));
    }
    if let Some(info) = json.get("Information") {
        return Err(DashboardError::ProviderFailure(format!(
            "Alpha Vantage: {}",
            value_text(info)
        )));
    }
    Ok(())
}

fn value_text(value: &Value) -> String {
    value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}

fn parse_statement(json: &Value) -> Result<StatementTable, DashboardError> {
    let reports: Vec<Map<String, Value>> = json
        .get("annualReports")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|r| r.as_object().cloned()).collect())
        .unwrap_or_default();

    if reports.is_empty() {
        return Err(DashboardError::EmptyInput("no annual reports".to_string()));
    }

    Ok(StatementTable::from_records(&reports))
}

fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| dt.and_utc())
}

fn parse_news(json: &Value, scorer: &SentimentScorer) -> Result<Vec<NewsEntry>, DashboardError> {
    let feed = json
        .get("feed")
        .and_then(|v| v.as_array())
        .ok_or_else(|| DashboardError::InvalidData("news response has no feed".to_string()))?;

    Ok(feed
        .iter()
        .filter_map(|item| {
            let title = item.get("title")?.as_str()?.to_string();
            let summary = item
                .get("summary")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            Some(NewsEntry {
                title_sentiment: scorer.score(&title),
                summary_sentiment: scorer.score(&summary),
                published: item
                    .get("time_published")
                    .and_then(|v| v.as_str())
                    .and_then(parse_published),
                url: item
                    .get("url")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                source: item.get("source").and_then(|v| v.as_str()).map(str::to_string),
                title,
                summary,
            })
        })
        .collect())
}
