//! Dashboard configuration: environment defaults overridden by CLI flags.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, NaiveDate};

use crate::DashboardRequest;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
pub const DEFAULT_TRADING_DAYS: u32 = return_analysis::DEFAULT_TRADING_DAYS;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Credential for the fundamentals/news vendor.
    pub api_key: Option<String>,
    pub trading_days_per_year: u32,
    pub http_timeout_secs: u64,
}

impl DashboardConfig {
    /// Defaults relative to `today`: the last 30 days ending yesterday.
    pub fn defaults_for(today: NaiveDate) -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            start_date: today - Duration::days(DEFAULT_LOOKBACK_DAYS),
            end_date: today - Duration::days(1),
            api_key: None,
            trading_days_per_year: DEFAULT_TRADING_DAYS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Read `API_KEY`, `DASHBOARD_TICKER`, `TRADING_DAYS_PER_YEAR` and
    /// `HTTP_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Result<Self> {
        let today = chrono::Local::now().date_naive();
        Self::from_lookup(today, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(today: NaiveDate, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::defaults_for(today);

        config.api_key = lookup("API_KEY").filter(|k| !k.trim().is_empty());

        if let Some(ticker) = lookup("DASHBOARD_TICKER") {
            config.ticker = ticker;
        }
        if let Some(days) = lookup("TRADING_DAYS_PER_YEAR") {
            config.trading_days_per_year = days
                .trim()
                .parse()
                .with_context(|| format!("TRADING_DAYS_PER_YEAR is not a number: {}", days))?;
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {}", secs))?;
        }

        Ok(config)
    }

    pub fn apply_args(&mut self, args: &CliArgs) {
        if let Some(ticker) = &args.ticker {
            self.ticker = ticker.clone();
        }
        if let Some(start) = args.start_date {
            self.start_date = start;
        }
        if let Some(end) = args.end_date {
            self.end_date = end;
        }
        if let Some(days) = args.trading_days_per_year {
            self.trading_days_per_year = days;
        }
    }

    /// Trim and uppercase the ticker, then check the ranges.
    pub fn validate(&mut self) -> Result<()> {
        self.ticker = self.ticker.trim().to_uppercase();
        if self.ticker.is_empty() {
            bail!("ticker must not be empty");
        }
        if self.start_date >= self.end_date {
            bail!(
                "start date {} must be before end date {}",
                self.start_date,
                self.end_date
            );
        }
        if self.trading_days_per_year == 0 {
            bail!("trading days per year must be positive");
        }
        if self.http_timeout_secs == 0 {
            bail!("HTTP timeout must be positive");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }

    pub fn request(&self) -> DashboardRequest {
        DashboardRequest {
            ticker: self.ticker.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Command-line flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub ticker: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trading_days_per_year: Option<u32>,
    pub compact: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parse flags, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let known = ["--ticker", "--start", "--end", "--trading-days", "--compact", "--help", "-h"];
        if let Some(unknown) = args
            .iter()
            .find(|a| a.starts_with('-') && !known.contains(&a.as_str()))
        {
            bail!("unknown flag: {}", unknown);
        }

        let trading_days_per_year = flag_value(args, "--trading-days")?
            .map(|v| {
                v.parse::<u32>()
                    .with_context(|| format!("--trading-days expects a number, got {}", v))
            })
            .transpose()?;

        Ok(Self {
            ticker: flag_value(args, "--ticker")?.cloned(),
            start_date: flag_date(args, "--start")?,
            end_date: flag_date(args, "--end")?,
            trading_days_per_year,
            compact: args.iter().any(|a| a == "--compact"),
            help: args.iter().any(|a| a == "--help" || a == "-h"),
        })
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a String>> {
    match args.iter().position(|a| a == flag) {
        None => Ok(None),
        Some(i) => args
            .get(i + 1)
            .filter(|v| !v.starts_with("--"))
            .map(Some)
            .ok_or_else(|| anyhow!("{} requires a value", flag)),
    }
}

fn flag_date(args: &[String], flag: &str) -> Result<Option<NaiveDate>> {
    flag_value(args, flag)?
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .with_context(|| format!("{} expects YYYY-MM-DD, got {}", flag, v))
        })
        .transpose()
}

pub fn usage() -> String {
    [
        "Usage:",
        "  stock-dashboard [--ticker SYMBOL] [--start YYYY-MM-DD] [--end YYYY-MM-DD]",
        "",
        "Options:",
        "  --ticker SYMBOL       Ticker to load (default: AAPL or $DASHBOARD_TICKER)",
        "  --start DATE          First day of price history (default: 30 days ago)",
        "  --end DATE            Day after the last price row (default: yesterday)",
        "  --trading-days N      Trading days per year for annualizing (default: 252)",
        "  --compact             Print the report as single-line JSON",
        "",
        "Environment:",
        "  API_KEY               Alpha Vantage key for statements and news",
        "  HTTP_TIMEOUT_SECS     Per-request timeout (default: 30)",
    ]
    .join("\n")
}
