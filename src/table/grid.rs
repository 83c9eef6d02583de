use crate::model::{Amount, Columns, ProceedsRecord, Rows};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One computed row of the table: its category tag and a value for every
/// column.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GridRow {
    overall_category: String,
    values: BTreeMap<String, Amount>,
}

impl GridRow {
    pub fn overall_category(&self) -> &str {
        &self.overall_category
    }

    pub fn values(&self) -> &BTreeMap<String, Amount> {
        &self.values
    }
}

/// The formatted table: every registered row crossed with every registered
/// column, with missing cells defaulted to zero.
///
/// A `Grid` is derived from the persisted records and is rebuilt whenever
/// rows, columns, or records change; it is never stored.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Grid {
    rows: BTreeMap<String, GridRow>,
}

impl Grid {
    /// Formats persisted records into a grid.
    ///
    /// Every registered row gets a slot for every registered column,
    /// initialized to zero and tagged with the row's overall category. Each
    /// record then writes its value into its cell; a record carrying an
    /// overall category re-tags its row (later records win). Records naming
    /// an unregistered row or column are dropped. Records with no column
    /// name at all are legacy data and land in the first column.
    ///
    /// Pure function of its inputs.
    pub fn build(records: &[ProceedsRecord], rows: &Rows, columns: &Columns) -> Self {
        let mut grid_rows: BTreeMap<String, GridRow> = BTreeMap::new();
        for row in rows.data() {
            let values = columns
                .data()
                .iter()
                .map(|c| (c.column_name().to_string(), Amount::ZERO))
                .collect();
            grid_rows.insert(
                row.row_name().to_string(),
                GridRow {
                    overall_category: row.overall_category().to_string(),
                    values,
                },
            );
        }

        for record in records {
            let Some(grid_row) = grid_rows.get_mut(record.row_name()) else {
                continue;
            };
            if !record.overall_category().is_empty() {
                grid_row.overall_category = record.overall_category().to_string();
            }
            let column_name = match record.column_name() {
                Some(name) if columns.find_by_name(name).is_some() => Some(name),
                Some(_) => None,
                None => columns.first_column_name(),
            };
            if let Some(name) = column_name {
                grid_row.values.insert(name.to_string(), record.value());
            }
        }

        Self { rows: grid_rows }
    }

    /// The committed value at `row` × `column`, zero when the cell is absent.
    pub fn value(&self, row: &str, column: &str) -> Amount {
        self.rows
            .get(row)
            .and_then(|r| r.values().get(column))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// The category tag for `row`, empty when the row is unknown.
    pub fn overall_category(&self, row: &str) -> &str {
        self.rows
            .get(row)
            .map(GridRow::overall_category)
            .unwrap_or("")
    }

    pub fn rows(&self) -> &BTreeMap<String, GridRow> {
        &self.rows
    }
}
