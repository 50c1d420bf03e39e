use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{DashboardError, NewsEntry, RawPriceTable, StatementKind, StatementTable};

/// Source of daily price history
#[async_trait]
pub trait PriceDataProvider: Send + Sync {
    /// Daily rows from `start` (inclusive) to `end` (exclusive). An unknown
    /// ticker or an empty range may produce an empty table.
    async fn fetch_price_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawPriceTable, DashboardError>;
}

/// Source of annual fundamental statements
#[async_trait]
pub trait FundamentalDataProvider: Send + Sync {
    async fn fetch_statement(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<StatementTable, DashboardError>;

    async fn fetch_balance_sheet(&self, ticker: &str) -> Result<StatementTable, DashboardError> {
        self.fetch_statement(ticker, StatementKind::BalanceSheet).await
    }

    async fn fetch_income_statement(&self, ticker: &str) -> Result<StatementTable, DashboardError> {
        self.fetch_statement(ticker, StatementKind::IncomeStatement).await
    }

    async fn fetch_cash_flow(&self, ticker: &str) -> Result<StatementTable, DashboardError> {
        self.fetch_statement(ticker, StatementKind::CashFlow).await
    }
}

/// Source of ticker news with sentiment scores
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, ticker: &str) -> Result<Vec<NewsEntry>, DashboardError>;
}
