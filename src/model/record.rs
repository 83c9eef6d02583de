use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// Represents a single persisted use-of-proceeds cell: the dollar amount a
/// project allocates from one funding source (column) to one spending
/// category (row).
///
/// A record is identified by `(project_id, row_name, column_name)`. Records
/// from older data sets may lack a `column_name`; the table formatter routes
/// those into the first column.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProceedsRecord {
    pub(crate) project_id: String,
    pub(crate) row_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) column_name: Option<String>,
    pub(crate) value: Amount,
    #[serde(default)]
    pub(crate) overall_category: String,
}

impl ProceedsRecord {
    pub fn new(
        project_id: impl Into<String>,
        row_name: impl Into<String>,
        column_name: Option<String>,
        value: Amount,
        overall_category: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            row_name: row_name.into(),
            column_name,
            value,
            overall_category: overall_category.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn row_name(&self) -> &str {
        &self.row_name
    }

    pub fn column_name(&self) -> Option<&str> {
        self.column_name.as_deref()
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn overall_category(&self) -> &str {
        &self.overall_category
    }

    /// True if this record stores the cell at `row_name` × `column_name`.
    /// A record without a column name never matches; editing the cell it is
    /// displayed in creates a new record with an explicit column instead.
    pub fn matches(&self, row_name: &str, column_name: &str) -> bool {
        self.row_name == row_name && self.column_name.as_deref() == Some(column_name)
    }

    pub(crate) fn set_value(&mut self, value: Amount) {
        self.value = value;
    }

    pub(crate) fn set_overall_category(&mut self, overall_category: impl Into<String>) {
        self.overall_category = overall_category.into();
    }
}
