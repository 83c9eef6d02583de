use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the synthetic aggregate row. It is always the last row, is never
/// deletable, and its displayed values are computed column totals rather than
/// stored cells.
pub const TOTAL_ROW: &str = "TOTAL";

/// The default spending-category taxonomy for a new project, as
/// `(overall_category, row_name)` pairs. The TOTAL row is appended separately.
const DEFAULT_ROWS: &[(&str, &str)] = &[
    ("Real Estate", "Land & Building Acquisition"),
    ("Real Estate", "Construction & Improvements"),
    ("Equipment", "Machinery & Equipment"),
    ("Equipment", "Furniture & Fixtures"),
    ("Working Capital", "Working Capital"),
    ("Working Capital", "Inventory"),
    ("Soft Costs", "Professional Fees"),
    ("Soft Costs", "Closing Costs"),
];

/// Represents one spending-category row of a proceeds table.
///
/// `row_name` is the user-facing label. Row names are not required to be
/// unique; identity is the generated `row_id`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Row {
    row_id: String,
    row_name: String,
    overall_category: String,
}

impl Row {
    /// Creates a row with a freshly generated id.
    pub fn new(overall_category: impl Into<String>, row_name: impl Into<String>) -> Self {
        Self {
            row_id: Uuid::new_v4().to_string(),
            row_name: row_name.into(),
            overall_category: overall_category.into(),
        }
    }

    pub fn row_id(&self) -> &str {
        &self.row_id
    }

    pub fn row_name(&self) -> &str {
        &self.row_name
    }

    pub fn overall_category(&self) -> &str {
        &self.overall_category
    }

    pub fn is_total(&self) -> bool {
        self.row_name == TOTAL_ROW
    }
}

/// The ordered row registry. Once constructed, the TOTAL row is present and
/// last; every mutation preserves that.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rows {
    data: Vec<Row>,
}

impl Rows {
    /// Creates the default taxonomy followed by the TOTAL row.
    pub fn seed() -> Self {
        let mut data: Vec<Row> = DEFAULT_ROWS
            .iter()
            .map(|(overall, name)| Row::new(*overall, *name))
            .collect();
        data.push(Row::new("", TOTAL_ROW));
        Self { data }
    }

    /// Builds a registry from persisted rows, restoring the TOTAL-last
    /// invariant: a TOTAL row found anywhere is moved to the end, and one is
    /// appended if the data has none.
    pub fn from_data(data: Vec<Row>) -> Self {
        let mut regular: Vec<Row> = Vec::with_capacity(data.len());
        let mut total: Option<Row> = None;
        for row in data {
            if row.is_total() && total.is_none() {
                total = Some(row);
            } else if !row.is_total() {
                regular.push(row);
            }
        }
        regular.push(total.unwrap_or_else(|| Row::new("", TOTAL_ROW)));
        Self { data: regular }
    }

    pub fn data(&self) -> &[Row] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All rows except the TOTAL row, in order.
    pub fn non_total(&self) -> impl Iterator<Item = &Row> {
        self.data.iter().filter(|r| !r.is_total())
    }

    /// First row with the given name. Duplicate names are allowed, so callers
    /// that need exact identity should hold on to the `row_id`.
    pub fn find_by_name(&self, row_name: &str) -> Option<&Row> {
        self.data.iter().find(|r| r.row_name() == row_name)
    }

    pub fn find_by_id(&self, row_id: &str) -> Option<&Row> {
        self.data.iter().find(|r| r.row_id() == row_id)
    }

    /// Inserts a new row immediately before the TOTAL row and returns it.
    /// Blank names are refused with a `None`; duplicate names are allowed.
    pub fn add(&mut self, overall_category: &str, row_name: &str) -> Option<&Row> {
        if row_name.trim().is_empty() {
            return None;
        }
        let row = Row::new(overall_category, row_name);
        let position = self
            .data
            .iter()
            .position(Row::is_total)
            .unwrap_or(self.data.len());
        self.data.insert(position, row);
        Some(&self.data[position])
    }

    /// Removes the row with the given id. Deleting the TOTAL row is refused
    /// as a no-op; an unknown id is also a no-op.
    pub fn delete(&mut self, row_id: &str) {
        let Some(position) = self.data.iter().position(|r| r.row_id() == row_id) else {
            return;
        };
        if self.data[position].is_total() {
            tracing::warn!("refusing to delete the {TOTAL_ROW} row");
            return;
        }
        self.data.remove(position);
    }
}
