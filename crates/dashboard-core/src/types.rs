use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DashboardError, DashboardResult};

/// Column label as delivered by a price provider.
///
/// Providers that group columns per ticker hand back `(field, sub-field)`
/// pairs such as `("Close", "AAPL")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLabel {
    Flat(String),
    Compound(String, String),
}

impl ColumnLabel {
    pub fn flat(name: impl Into<String>) -> Self {
        ColumnLabel::Flat(name.into())
    }

    pub fn compound(field: impl Into<String>, sub_field: impl Into<String>) -> Self {
        ColumnLabel::Compound(field.into(), sub_field.into())
    }
}

/// One dated record of a price table. Missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

impl PriceRow {
    pub fn new(date: NaiveDate, values: Vec<f64>) -> Self {
        Self { date, values }
    }
}

fn validate_rows(width: usize, rows: &[PriceRow]) -> DashboardResult<()> {
    for (i, row) in rows.iter().enumerate() {
        if row.values.len() != width {
            return Err(DashboardError::InvalidData(format!(
                "row {} ({}) has {} values, expected {}",
                i,
                row.date,
                row.values.len(),
                width
            )));
        }
        if i > 0 && row.date <= rows[i - 1].date {
            return Err(DashboardError::InvalidData(format!(
                "dates must be strictly increasing: {} follows {}",
                row.date,
                rows[i - 1].date
            )));
        }
    }
    Ok(())
}

/// Price history exactly as the provider returned it, labels possibly compound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPriceTable {
    columns: Vec<ColumnLabel>,
    rows: Vec<PriceRow>,
}

impl RawPriceTable {
    pub fn new(columns: Vec<ColumnLabel>, rows: Vec<PriceRow>) -> DashboardResult<Self> {
        validate_rows(columns.len(), &rows)?;
        Ok(Self { columns, rows })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<ColumnLabel>, Vec<PriceRow>) {
        (self.columns, self.rows)
    }
}

/// Price history with flat string column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    columns: Vec<String>,
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new(columns: Vec<String>, rows: Vec<PriceRow>) -> DashboardResult<Self> {
        validate_rows(columns.len(), &rows)?;
        Ok(Self { columns, rows })
    }

    pub(crate) fn from_validated(columns: Vec<String>, rows: Vec<PriceRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column in date order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// First `n` rows, for previews.
    pub fn head(&self, n: usize) -> &[PriceRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Annualized summary of a percent-change series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Mean daily change scaled to a year, in percent.
    pub annual_return: f64,
    /// Population standard deviation scaled by sqrt(trading days), in percent.
    pub volatility: f64,
    /// `annual_return / volatility`; `None` when volatility is zero.
    pub risk_adjusted_return: Option<f64>,
    /// Number of finite percent changes the figures were computed from.
    pub observations: usize,
    pub trading_days_per_year: u32,
}

/// Which fundamental statement to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl StatementKind {
    pub const ALL: [StatementKind; 3] = [
        StatementKind::BalanceSheet,
        StatementKind::IncomeStatement,
        StatementKind::CashFlow,
    ];

    /// Lower-case name used in user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            StatementKind::BalanceSheet => "balance sheet",
            StatementKind::IncomeStatement => "income statement",
            StatementKind::CashFlow => "cash flow",
        }
    }
}

/// A vendor statement after transposition: one row per line item, one
/// column per reporting period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementTable {
    row_labels: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StatementTable {
    pub fn new(row_labels: Vec<String>, rows: Vec<Vec<String>>) -> DashboardResult<Self> {
        if row_labels.len() != rows.len() {
            return Err(DashboardError::InvalidData(format!(
                "{} row labels for {} rows",
                row_labels.len(),
                rows.len()
            )));
        }
        Ok(Self { row_labels, rows })
    }

    /// Transpose a list of per-period records into one row per field.
    ///
    /// Field order follows first appearance across the records. A record
    /// lacking a field contributes an empty cell.
    pub fn from_records(records: &[Map<String, Value>]) -> Self {
        let mut row_labels: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !row_labels.iter().any(|l| l == key) {
                    row_labels.push(key.clone());
                }
            }
        }

        let rows = row_labels
            .iter()
            .map(|label| {
                records
                    .iter()
                    .map(|record| record.get(label).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { row_labels, rows }
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Statement ready for display: periods as headers, line items as rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReshapedTable {
    pub headers: Vec<String>,
    pub row_labels: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReshapedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// News headline with lexicon sentiment for title and summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEntry {
    pub title: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
    pub title_sentiment: f64,
    pub summary_sentiment: f64,
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
}
