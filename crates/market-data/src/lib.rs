//! HTTP adapters for the price, fundamentals and news vendors.
//!
//! Every call issues exactly one request. Failures surface as
//! `DashboardError::ProviderFailure` and are never retried.

pub mod alpha_vantage;
pub mod sentiment;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use sentiment::SentimentScorer;
pub use yahoo::YahooFinanceClient;

use dashboard_core::DashboardError;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

fn build_http_client(timeout: Duration) -> Result<Client, DashboardError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| DashboardError::ProviderFailure(e.to_string()))
}

/// Transport errors carry the request URL, which may include a credential.
fn provider_error(e: reqwest::Error) -> DashboardError {
    DashboardError::ProviderFailure(e.without_url().to_string())
}
