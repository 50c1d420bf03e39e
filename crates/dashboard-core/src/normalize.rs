//! Column-label flattening and close-column detection for price tables.

use crate::{ColumnLabel, PriceTable, RawPriceTable};

/// Substring that marks a closing-price column ("Close", "Adj Close", ...).
pub const CLOSE_MARKER: &str = "Close";

/// Flatten column labels: `(field, sub)` becomes `"field sub"`, plain names
/// pass through unchanged.
pub fn normalize_columns(columns: &[ColumnLabel]) -> Vec<String> {
    columns
        .iter()
        .map(|label| match label {
            ColumnLabel::Flat(name) => name.clone(),
            ColumnLabel::Compound(field, sub_field) => format!("{} {}", field, sub_field),
        })
        .collect()
}

/// First column whose name contains "Close", scanning left to right.
pub fn find_close_column(columns: &[String]) -> Option<&str> {
    columns
        .iter()
        .find(|c| c.contains(CLOSE_MARKER))
        .map(String::as_str)
}

impl RawPriceTable {
    /// Flatten the labels, keeping rows as they are.
    pub fn normalize(self) -> PriceTable {
        let (columns, rows) = self.into_parts();
        PriceTable::from_validated(normalize_columns(&columns), rows)
    }
}

impl PriceTable {
    pub fn close_column(&self) -> Option<&str> {
        find_close_column(self.columns())
    }
}
