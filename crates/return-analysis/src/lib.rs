use dashboard_core::{DashboardError, DashboardResult, SummaryStatistics};
use statrs::statistics::Statistics;

/// Conventional number of trading sessions in a year.
pub const DEFAULT_TRADING_DAYS: u32 = 252;

pub struct ReturnStatisticsEngine {
    trading_days_per_year: u32,
}

impl ReturnStatisticsEngine {
    pub fn new() -> Self {
        Self::with_trading_days(DEFAULT_TRADING_DAYS)
    }

    pub fn with_trading_days(trading_days_per_year: u32) -> Self {
        Self {
            trading_days_per_year,
        }
    }

    pub fn trading_days_per_year(&self) -> u32 {
        self.trading_days_per_year
    }

    /// Annualized return, volatility and their ratio for a closing-price series.
    pub fn compute(&self, closes: &[f64]) -> DashboardResult<SummaryStatistics> {
        compute_statistics(closes, self.trading_days_per_year)
    }
}

impl Default for ReturnStatisticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Period-over-period change: `(p[i] - p[i-1]) / p[i-1]`.
///
/// One element shorter than the input. Entries may be non-finite when a
/// price is zero or missing.
pub fn percent_changes(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Percent changes with non-finite entries removed, order preserved.
pub fn finite_percent_changes(prices: &[f64]) -> Vec<f64> {
    percent_changes(prices)
        .into_iter()
        .filter(|c| c.is_finite())
        .collect()
}

/// Compute summary statistics over the finite percent changes of `closes`.
///
/// Volatility uses the population standard deviation (divide by n).
/// Returns `InsufficientData` when no finite change can be formed; zero
/// volatility is a valid result with `risk_adjusted_return == None`.
pub fn compute_statistics(
    closes: &[f64],
    trading_days_per_year: u32,
) -> DashboardResult<SummaryStatistics> {
    if closes.len() < 2 {
        return Err(DashboardError::InsufficientData(format!(
            "need at least 2 prices, got {}",
            closes.len()
        )));
    }

    let changes = finite_percent_changes(closes);
    let dropped = closes.len() - 1 - changes.len();
    if dropped > 0 {
        tracing::debug!("Dropped {} non-finite percent changes", dropped);
    }
    if changes.is_empty() {
        return Err(DashboardError::InsufficientData(
            "no finite percent changes in price series".to_string(),
        ));
    }

    let days = trading_days_per_year as f64;
    let annual_return = changes.iter().mean() * days * 100.0;
    let volatility = changes.iter().population_std_dev() * days.sqrt() * 100.0;

    let risk_adjusted_return = if volatility > 0.0 {
        Some(annual_return / volatility)
    } else {
        None
    };

    Ok(SummaryStatistics {
        annual_return,
        volatility,
        risk_adjusted_return,
        observations: changes.len(),
        trading_days_per_year,
    })
}
