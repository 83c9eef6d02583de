//! The proceeds table engine: grid formatting, edit sessions, derived
//! totals, and loan payment math, composed behind [`ProceedsTable`].

mod cell;
mod grid;
pub mod payment;
mod session;

pub use cell::CellKey;
pub use grid::{Grid, GridRow};
pub use session::{EditSession, TableMode};

use crate::model::{
    Amount, Columns, Loan, LoanSpec, NewColumn, ProceedsRecord, ProjectData, Rows,
};
use crate::store::ProjectStore;
use crate::Result;
use anyhow::{bail, Context};
use std::sync::Arc;
use tracing::{debug, info};

/// Composes the row and column registries, the formatted grid, and the edit
/// session for one project's Use of Proceeds table, and mediates saves to
/// the project store.
///
/// Construction normalizes the project's loan data, derives one loan column
/// per loan after the two fixed default columns, and seeds the default row
/// taxonomy. A project file that already carries rows/columns wins over the
/// seeds. All state lives on the instance; collaborators receive it by
/// reference.
pub struct ProceedsTable {
    project_id: String,
    project_name: String,
    loans: Vec<Loan>,
    rows: Rows,
    columns: Columns,
    records: Vec<ProceedsRecord>,
    grid: Grid,
    session: EditSession,
    saving: bool,
    store: Option<Arc<dyn ProjectStore>>,
    add_row_open: bool,
    add_column_open: bool,
}

impl ProceedsTable {
    pub fn new(project: &ProjectData) -> Self {
        let loans = project.normalized_loans();
        let rows = if project.rows().is_empty() {
            Rows::seed()
        } else {
            Rows::from_data(project.rows().to_vec())
        };
        let columns = if project.columns().is_empty() {
            Columns::with_loans(&loans)
        } else {
            Columns::from_data(project.columns().to_vec())
        };
        let records = project.records().to_vec();
        let grid = Grid::build(&records, &rows, &columns);

        let mut table = Self {
            project_id: project.project_id().to_string(),
            project_name: project.project_name().to_string(),
            loans,
            rows,
            columns,
            records,
            grid,
            session: EditSession::default(),
            saving: false,
            store: None,
            // The add dialogs must start closed; opening is an explicit act.
            add_row_open: false,
            add_column_open: false,
        };
        table.columns.recompute_loan_payments(&table.grid, &table.rows);
        table
    }

    /// Attaches the store that saves will go through.
    pub fn with_store(mut self, store: Arc<dyn ProjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn rows(&self) -> &Rows {
        &self.rows
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn records(&self) -> &[ProceedsRecord] {
        &self.records
    }

    pub fn mode(&self) -> TableMode {
        self.session.mode()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_editing()
    }

    /// Enters edit mode.
    pub fn edit(&mut self) {
        self.session.begin();
    }

    /// Stages a raw cell edit through the session.
    pub fn set_cell(&mut self, row: &str, column: &str, raw: &str) {
        self.session.stage(row, column, raw);
    }

    /// The displayed value of a cell: staged edits first, committed data
    /// otherwise.
    pub fn cell(&self, row: &str, column: &str) -> Amount {
        self.session.cell_value(&self.grid, row, column)
    }

    pub fn column_total(&self, column: &str) -> Amount {
        self.session.column_total(&self.grid, &self.rows, column)
    }

    pub fn row_total(&self, row: &str) -> Amount {
        self.session.row_total(&self.grid, &self.columns, row)
    }

    pub fn row_percentage(&self, row: &str, column: &str) -> f64 {
        self.session
            .row_percentage(&self.grid, &self.rows, row, column)
    }

    pub fn category_total(&self, category: &str, column: &str) -> Amount {
        self.session.category_total(&self.grid, category, column)
    }

    /// The distinct overall categories of the non-TOTAL rows, in row order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in self.rows.non_total() {
            let category = row.overall_category();
            if !category.is_empty() && !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// Adds a row ahead of the TOTAL row and rebuilds the grid. Blank names
    /// are refused. Returns the new row's id.
    pub fn add_row(&mut self, overall_category: &str, row_name: &str) -> Option<String> {
        let row_id = self
            .rows
            .add(overall_category, row_name)
            .map(|row| row.row_id().to_string());
        if row_id.is_some() {
            self.refresh();
        }
        row_id
    }

    /// Deletes a row by id; the TOTAL row and unknown ids are no-ops.
    pub fn delete_row(&mut self, row_id: &str) {
        self.rows.delete(row_id);
        self.refresh();
    }

    /// Appends a column and rebuilds the grid. Returns the new column's id.
    pub fn add_column(&mut self, new: NewColumn) -> String {
        let column_id = self.columns.add(new).column_id().to_string();
        self.refresh();
        column_id
    }

    /// Deletes a column by id, unconditionally.
    pub fn delete_column(&mut self, column_id: &str) {
        self.columns.delete(column_id);
        self.refresh();
    }

    /// Leaves edit mode, discarding staged edits. No external call is made.
    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Reconciles staged edits into the record list and saves the project
    /// through the configured store.
    ///
    /// A save already in flight makes this a no-op returning zero. A missing
    /// store or a store failure is an error; the session stays in edit mode
    /// with the buffer intact so the edits can be retried. On success the
    /// records are committed, the buffer cleared, the grid rebuilt, and the
    /// number of reconciled edits returned.
    pub async fn save(&mut self) -> Result<usize> {
        if self.saving {
            debug!("save already in progress; ignoring");
            return Ok(0);
        }
        let Some(store) = self.store.clone() else {
            bail!("no project store is configured; cannot save")
        };

        self.saving = true;
        let updated = self
            .session
            .reconcile(&self.records, &self.rows, &self.project_id);
        let pending = self.session.pending();
        let project = self.snapshot(updated.clone());
        let result = store.save(&project).await;
        self.saving = false;

        result.context("failed to save proceeds data")?;
        self.records = updated;
        self.session.complete_save();
        self.refresh();
        info!("saved {pending} cell edit(s) for project {}", self.project_id);
        Ok(pending)
    }

    /// The current state as a persistable project file.
    pub fn to_project_data(&self) -> ProjectData {
        self.snapshot(self.records.clone())
    }

    pub fn add_row_open(&self) -> bool {
        self.add_row_open
    }

    pub fn set_add_row_open(&mut self, open: bool) {
        self.add_row_open = open;
    }

    pub fn add_column_open(&self) -> bool {
        self.add_column_open
    }

    pub fn set_add_column_open(&mut self, open: bool) {
        self.add_column_open = open;
    }

    fn snapshot(&self, records: Vec<ProceedsRecord>) -> ProjectData {
        ProjectData {
            project_id: self.project_id.clone(),
            project_name: self.project_name.clone(),
            loans: self.loans.iter().map(LoanSpec::from).collect(),
            loan_types: Vec::new(),
            rows: self.rows.data().to_vec(),
            columns: self.columns.data().to_vec(),
            records,
        }
    }

    /// Rebuilds the derived grid and loan payments after any change to
    /// records, rows, or columns.
    fn refresh(&mut self) {
        self.grid = Grid::build(&self.records, &self.rows, &self.columns);
        self.columns.recompute_loan_payments(&self.grid, &self.rows);
    }
}
