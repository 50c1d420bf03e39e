use crate::{ReshapedTable, StatementTable};

/// Rows at the top of a transposed statement that carry metadata rather than
/// figures: the period labels and the reporting currency.
pub const METADATA_ROWS: usize = 2;

/// Promote row 0 to column headers and keep rows from index 2 onward.
///
/// A table with fewer than two rows yields no data rows.
pub fn reshape(table: &StatementTable) -> ReshapedTable {
    let headers = table.rows().first().cloned().unwrap_or_default();
    let skip = METADATA_ROWS.min(table.len());

    ReshapedTable {
        headers,
        row_labels: table.row_labels()[skip..].to_vec(),
        rows: table.rows()[skip..].to_vec(),
    }
}
