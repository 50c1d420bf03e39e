use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use dashboard_core::{ColumnLabel, DashboardError, PriceDataProvider, PriceRow, RawPriceTable};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{build_http_client, provider_error};

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Daily price history from the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Result<Self, DashboardError> {
        Ok(Self {
            client: build_http_client(timeout)?,
        })
    }

    /// Get daily bars between `start` (inclusive) and `end` (exclusive).
    ///
    /// Columns are grouped per ticker, e.g. `("Close", "AAPL")`.
    pub async fn get_chart(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawPriceTable, DashboardError> {
        let url = format!("{}/{}", CHART_URL, ticker);
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        tracing::debug!("Yahoo chart request: {} {}..{}", ticker, start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await
            .map_err(provider_error)?;

        let status = response.status();
        let body = response.text().await.map_err(provider_error)?;

        // Unknown tickers answer 404 with an error payload worth surfacing.
        let chart: ChartResponse = match serde_json::from_str(&body) {
            Ok(chart) => chart,
            Err(e) if status.is_success() => {
                return Err(DashboardError::ProviderFailure(format!(
                    "Yahoo chart decode failed: {}",
                    e
                )))
            }
            Err(_) => {
                return Err(DashboardError::ProviderFailure(format!("Yahoo HTTP {}", status)))
            }
        };

        parse_chart(ticker, chart)
    }
}

#[async_trait]
impl PriceDataProvider for YahooFinanceClient {
    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawPriceTable, DashboardError> {
        self.get_chart(ticker, start, end).await
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
    #[serde(default)]
    adjclose: Vec<AdjCloseSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseSeries {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn value_at(series: &[Option<f64>], i: usize) -> f64 {
    series.get(i).copied().flatten().unwrap_or(f64::NAN)
}

fn parse_chart(ticker: &str, response: ChartResponse) -> Result<RawPriceTable, DashboardError> {
    if let Some(err) = response.chart.error {
        return Err(DashboardError::ProviderFailure(format!(
            "Yahoo {}: {}",
            err.code, err.description
        )));
    }

    let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(RawPriceTable::empty());
    };
    if data.timestamp.is_empty() {
        return Ok(RawPriceTable::empty());
    }

    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = data.indicators.adjclose.into_iter().next().map(|a| a.adjclose);

    let sub_field = ticker.to_uppercase();
    let mut columns = vec![
        ColumnLabel::compound("Open", sub_field.as_str()),
        ColumnLabel::compound("High", sub_field.as_str()),
        ColumnLabel::compound("Low", sub_field.as_str()),
        ColumnLabel::compound("Close", sub_field.as_str()),
    ];
    if adjclose.is_some() {
        columns.push(ColumnLabel::compound("Adj Close", sub_field.as_str()));
    }
    columns.push(ColumnLabel::compound("Volume", sub_field.as_str()));

    let mut rows: Vec<PriceRow> = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| DashboardError::InvalidData(format!("invalid timestamp {}", ts)))?
            .date_naive();

        // The live session can repeat the last daily bar.
        if rows.last().is_some_and(|last| date <= last.date) {
            tracing::debug!("Skipping out-of-order Yahoo row for {} on {}", ticker, date);
            continue;
        }

        let mut values = vec![
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ];
        if let Some(adj) = &adjclose {
            values.push(value_at(adj, i));
        }
        values.push(value_at(&quote.volume, i));

        rows.push(PriceRow::new(date, values));
    }

    tracing::info!("Yahoo returned {} daily rows for {}", rows.len(), ticker);
    RawPriceTable::new(columns, rows)
}
