use crate::model::{normalize_loans, Column, Loan, LoanSpec, ProceedsRecord, Row};
use serde::{Deserialize, Serialize};

/// Represents everything persisted for one loan project: its loans, the row
/// and column definitions, and the proceeds records.
///
/// Older project files may carry loans under `loan_types` (or as bare
/// strings) and may lack `rows`/`columns` entirely; the table orchestrator
/// seeds defaults in that case and the file is written back in the modern
/// shape on the next save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectData {
    pub(crate) project_id: String,
    #[serde(default)]
    pub(crate) project_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) loans: Vec<LoanSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) loan_types: Vec<LoanSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) columns: Vec<Column>,
    #[serde(default)]
    pub(crate) records: Vec<ProceedsRecord>,
}

impl ProjectData {
    pub fn new(
        project_id: impl Into<String>,
        project_name: impl Into<String>,
        loans: Vec<LoanSpec>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            project_name: project_name.into(),
            loans,
            ..Self::default()
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[ProceedsRecord] {
        &self.records
    }

    /// Normalizes the project's loan data into the canonical shape, whichever
    /// field it was stored under. `loans` wins when both are present.
    pub fn normalized_loans(&self) -> Vec<Loan> {
        if self.loans.is_empty() {
            normalize_loans(&self.loan_types)
        } else {
            normalize_loans(&self.loans)
        }
    }
}
