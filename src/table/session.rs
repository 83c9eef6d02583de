use crate::model::{Amount, Columns, ProceedsRecord, Rows, TOTAL_ROW};
use crate::table::{CellKey, Grid};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Whether the table is being viewed or edited.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    #[default]
    View,
    Edit,
}

serde_plain::derive_display_from_serialize!(TableMode);
serde_plain::derive_fromstr_from_deserialize!(TableMode);

/// The transient edit state of a proceeds table.
///
/// While editing, staged cell values live in a buffer keyed by row and
/// column and are overlaid on the committed grid for every read; the grid
/// itself is untouched until a save reconciles the buffer into the record
/// list. Cancelling discards the buffer. All totals are computed through the
/// overlay, so they track in-flight edits.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    mode: TableMode,
    buffer: BTreeMap<CellKey, Amount>,
}

impl EditSession {
    pub fn mode(&self) -> TableMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == TableMode::Edit
    }

    /// Number of staged cell edits.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Enters edit mode. The buffer starts empty; nothing is copied from the
    /// grid. Already editing is a no-op.
    pub fn begin(&mut self) {
        if self.mode == TableMode::View {
            self.mode = TableMode::Edit;
        }
    }

    /// Stages a raw cell edit, normalized through [`Amount::lenient`].
    ///
    /// Ignored outside edit mode, and refused for the TOTAL row, whose
    /// values are always computed.
    pub fn stage(&mut self, row: &str, column: &str, raw: &str) {
        if !self.is_editing() {
            debug!("ignoring cell edit outside edit mode");
            return;
        }
        if row == TOTAL_ROW {
            warn!("refusing to edit the {TOTAL_ROW} row");
            return;
        }
        let value = Amount::lenient(raw);
        let key = CellKey::new(row, column);
        debug!("staged {key} = {value}");
        self.buffer.insert(key, value);
    }

    /// The overlay read path: the staged value when one exists, else the
    /// committed grid value, else zero.
    pub fn cell_value(&self, grid: &Grid, row: &str, column: &str) -> Amount {
        self.buffer
            .get(&CellKey::new(row, column))
            .copied()
            .unwrap_or_else(|| grid.value(row, column))
    }

    /// Leaves edit mode, discarding all staged edits.
    pub fn cancel(&mut self) {
        self.buffer.clear();
        self.mode = TableMode::View;
    }

    /// Sum of a column over all non-TOTAL rows, through the overlay.
    pub fn column_total(&self, grid: &Grid, rows: &Rows, column: &str) -> Amount {
        rows.non_total()
            .map(|row| self.cell_value(grid, row.row_name(), column))
            .sum()
    }

    /// Sum of a row across all registered columns, through the overlay.
    pub fn row_total(&self, grid: &Grid, columns: &Columns, row: &str) -> Amount {
        columns
            .data()
            .iter()
            .map(|column| self.cell_value(grid, row, column.column_name()))
            .sum()
    }

    /// The cell's share of its column total, in percent. Zero when the
    /// column total is zero.
    pub fn row_percentage(&self, grid: &Grid, rows: &Rows, row: &str, column: &str) -> f64 {
        let total = self.column_total(grid, rows, column);
        if total.is_zero() {
            return 0.0;
        }
        let cell = self.cell_value(grid, row, column);
        (cell.value() / total.value() * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or_default()
    }

    /// Sum of a column over the rows tagged with `category`, through the
    /// overlay. The TOTAL row never contributes.
    pub fn category_total(&self, grid: &Grid, category: &str, column: &str) -> Amount {
        grid.rows()
            .iter()
            .filter(|(name, row)| {
                name.as_str() != TOTAL_ROW && row.overall_category() == category
            })
            .map(|(name, _)| self.cell_value(grid, name, column))
            .sum()
    }

    /// Reconciles the buffer into an updated record list: each staged edit
    /// replaces the value (and refreshes the category tag from the row
    /// registry) of the record for its cell, or appends a new record when
    /// the cell had none. The buffer is left intact; the caller clears it
    /// once the save succeeds.
    pub fn reconcile(
        &self,
        records: &[ProceedsRecord],
        rows: &Rows,
        project_id: &str,
    ) -> Vec<ProceedsRecord> {
        let mut updated = records.to_vec();
        for (key, value) in &self.buffer {
            let overall_category = rows
                .find_by_name(key.row())
                .map(|row| row.overall_category().to_string())
                .unwrap_or_default();
            match updated.iter_mut().find(|r| r.matches(key.row(), key.column())) {
                Some(record) => {
                    record.set_value(*value);
                    record.set_overall_category(overall_category);
                }
                None => updated.push(ProceedsRecord::new(
                    project_id,
                    key.row(),
                    Some(key.column().to_string()),
                    *value,
                    overall_category,
                )),
            }
        }
        updated
    }

    /// Clears the buffer and returns to view mode after a successful save.
    pub(crate) fn complete_save(&mut self) {
        self.buffer.clear();
        self.mode = TableMode::View;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;

    fn fixture() -> (Grid, Rows, Columns) {
        let rows = Rows::seed();
        let columns = Columns::defaults();
        let records = vec![
            ProceedsRecord::new(
                "proj-1",
                "Working Capital",
                Some("Borrower Equity".to_string()),
                Amount::lenient("30000"),
                "Working Capital",
            ),
            ProceedsRecord::new(
                "proj-1",
                "Inventory",
                Some("Borrower Equity".to_string()),
                Amount::lenient("20000"),
                "Working Capital",
            ),
        ];
        let grid = Grid::build(&records, &rows, &columns);
        (grid, rows, columns)
    }

    #[test]
    fn test_overlay_prefers_staged_value() {
        let (grid, _, _) = fixture();
        let mut session = EditSession::default();
        session.begin();
        session.stage("Working Capital", "Borrower Equity", "55000");
        assert_eq!(
            session.cell_value(&grid, "Working Capital", "Borrower Equity"),
            Amount::lenient("55000")
        );
        // Untouched cells read through to the grid.
        assert_eq!(
            session.cell_value(&grid, "Inventory", "Borrower Equity"),
            Amount::lenient("20000")
        );
        // Unknown cells are zero.
        assert!(session
            .cell_value(&grid, "Professional Fees", "Borrower Contribution")
            .is_zero());
    }

    #[test]
    fn test_stage_outside_edit_mode_is_ignored() {
        let (grid, _, _) = fixture();
        let mut session = EditSession::default();
        session.stage("Working Capital", "Borrower Equity", "55000");
        assert_eq!(session.pending(), 0);
        assert_eq!(
            session.cell_value(&grid, "Working Capital", "Borrower Equity"),
            Amount::lenient("30000")
        );
    }

    #[test]
    fn test_stage_total_row_is_refused() {
        let mut session = EditSession::default();
        session.begin();
        session.stage(TOTAL_ROW, "Borrower Equity", "99999");
        assert_eq!(session.pending(), 0);
    }

    #[test]
    fn test_stage_normalizes_raw_input() {
        let (grid, _, _) = fixture();
        let mut session = EditSession::default();
        session.begin();
        session.stage("Working Capital", "Borrower Equity", "$12,500.75");
        assert_eq!(
            session.cell_value(&grid, "Working Capital", "Borrower Equity"),
            Amount::lenient("12500.75")
        );
        session.stage("Working Capital", "Borrower Equity", "garbage");
        assert!(session
            .cell_value(&grid, "Working Capital", "Borrower Equity")
            .is_zero());
    }

    #[test]
    fn test_cancel_reverts_every_cell() {
        let (grid, rows, columns) = fixture();
        let mut session = EditSession::default();

        let before: Vec<Amount> = rows
            .data()
            .iter()
            .flat_map(|r| {
                columns
                    .data()
                    .iter()
                    .map(|c| session.cell_value(&grid, r.row_name(), c.column_name()))
                    .collect::<Vec<_>>()
            })
            .collect();

        session.begin();
        session.stage("Working Capital", "Borrower Equity", "1");
        session.stage("Inventory", "Borrower Contribution", "2");
        session.stage("Closing Costs", "Borrower Equity", "3");
        session.cancel();

        let after: Vec<Amount> = rows
            .data()
            .iter()
            .flat_map(|r| {
                columns
                    .data()
                    .iter()
                    .map(|c| session.cell_value(&grid, r.row_name(), c.column_name()))
                    .collect::<Vec<_>>()
            })
            .collect();
        assert_eq!(before, after);
        assert!(!session.is_editing());
    }

    #[test]
    fn test_column_total_tracks_overlay() {
        let (grid, rows, _) = fixture();
        let mut session = EditSession::default();
        assert_eq!(
            session.column_total(&grid, &rows, "Borrower Equity"),
            Amount::lenient("50000")
        );
        session.begin();
        session.stage("Working Capital", "Borrower Equity", "40000");
        assert_eq!(
            session.column_total(&grid, &rows, "Borrower Equity"),
            Amount::lenient("60000")
        );
    }

    #[test]
    fn test_column_total_excludes_total_row() {
        let (_, rows, columns) = fixture();
        // Build a grid from a record list that sneaks a value into TOTAL.
        let records = vec![ProceedsRecord::new(
            "proj-1",
            TOTAL_ROW,
            Some("Borrower Equity".to_string()),
            Amount::lenient("777"),
            "",
        )];
        let grid = Grid::build(&records, &rows, &columns);
        let session = EditSession::default();
        assert!(session.column_total(&grid, &rows, "Borrower Equity").is_zero());
    }

    #[test]
    fn test_row_total() {
        let (grid, _, columns) = fixture();
        let mut session = EditSession::default();
        session.begin();
        session.stage("Working Capital", "Borrower Contribution", "5000");
        assert_eq!(
            session.row_total(&grid, &columns, "Working Capital"),
            Amount::lenient("35000")
        );
    }

    #[test]
    fn test_row_percentage() {
        let (grid, rows, _) = fixture();
        let session = EditSession::default();
        let pct = session.row_percentage(&grid, &rows, "Working Capital", "Borrower Equity");
        assert!((pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_row_percentage_zero_total() {
        let (grid, rows, _) = fixture();
        let session = EditSession::default();
        let pct =
            session.row_percentage(&grid, &rows, "Working Capital", "Borrower Contribution");
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn test_category_total() {
        let (grid, _, _) = fixture();
        let mut session = EditSession::default();
        assert_eq!(
            session.category_total(&grid, "Working Capital", "Borrower Equity"),
            Amount::lenient("50000")
        );
        session.begin();
        session.stage("Inventory", "Borrower Equity", "25000");
        assert_eq!(
            session.category_total(&grid, "Working Capital", "Borrower Equity"),
            Amount::lenient("55000")
        );
        assert!(session
            .category_total(&grid, "Real Estate", "Borrower Equity")
            .is_zero());
    }

    #[test]
    fn test_reconcile_replaces_and_appends() {
        let (_, rows, _) = fixture();
        let records = vec![ProceedsRecord::new(
            "proj-1",
            "Working Capital",
            Some("Borrower Equity".to_string()),
            Amount::lenient("30000"),
            "",
        )];
        let mut session = EditSession::default();
        session.begin();
        session.stage("Working Capital", "Borrower Equity", "45000");
        session.stage("Professional Fees", "Borrower Equity", "8000");

        let updated = session.reconcile(&records, &rows, "proj-1");
        assert_eq!(updated.len(), 2);

        let replaced = updated
            .iter()
            .find(|r| r.matches("Working Capital", "Borrower Equity"))
            .unwrap();
        assert_eq!(replaced.value(), Amount::lenient("45000"));
        // Category refreshed from the row registry.
        assert_eq!(replaced.overall_category(), "Working Capital");

        let appended = updated
            .iter()
            .find(|r| r.matches("Professional Fees", "Borrower Equity"))
            .unwrap();
        assert_eq!(appended.value(), Amount::lenient("8000"));
        assert_eq!(appended.overall_category(), "Soft Costs");
        assert_eq!(appended.project_id(), "proj-1");
    }

    #[test]
    fn test_reconcile_without_edits_is_identity() {
        let rows = Rows::from_data(vec![Row::new("Working Capital", "Working Capital")]);
        let records = vec![ProceedsRecord::new(
            "proj-1",
            "Working Capital",
            Some("Borrower Equity".to_string()),
            Amount::lenient("30000"),
            "Working Capital",
        )];
        let session = EditSession::default();
        assert_eq!(session.reconcile(&records, &rows, "proj-1"), records);
    }
}
