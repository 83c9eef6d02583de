use crate::model::{Amount, Loan, Rows};
use crate::table::{payment, Grid};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The first default funding-source column, present in every table.
pub const BORROWER_EQUITY: &str = "Borrower Equity";

/// The second default funding-source column.
pub const BORROWER_CONTRIBUTION: &str = "Borrower Contribution";

/// Name given to manually added columns when none is specified.
const NEW_COLUMN: &str = "New Column";

/// Represents one funding-source column of a proceeds table.
///
/// Loan columns carry the loan's rate and term. `monthly_payment` and
/// `annual_payment` are derived from the dollars allocated to the column and
/// are recomputed whenever the table data changes; they are never inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Column {
    column_id: String,
    column_name: String,
    #[serde(default)]
    is_loan: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    term_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amortization_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    monthly_payment: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annual_payment: Option<Amount>,
}

impl Column {
    fn named(column_name: impl Into<String>) -> Self {
        Self {
            column_id: Uuid::new_v4().to_string(),
            column_name: column_name.into(),
            ..Self::default()
        }
    }

    /// Derives a loan column from a canonical loan, defaulting the
    /// amortization period to monthly payments over the term.
    pub fn from_loan(loan: &Loan) -> Self {
        Self {
            column_id: Uuid::new_v4().to_string(),
            column_name: loan.loan_type().to_string(),
            is_loan: true,
            interest_rate: loan.rate(),
            term_years: loan.term_years(),
            amortization_months: loan.term_years().map(|years| years * 12),
            monthly_payment: None,
            annual_payment: None,
        }
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn is_loan(&self) -> bool {
        self.is_loan
    }

    pub fn interest_rate(&self) -> Option<f64> {
        self.interest_rate
    }

    pub fn term_years(&self) -> Option<u32> {
        self.term_years
    }

    pub fn amortization_months(&self) -> Option<u32> {
        self.amortization_months
    }

    pub fn monthly_payment(&self) -> Option<Amount> {
        self.monthly_payment
    }

    pub fn annual_payment(&self) -> Option<Amount> {
        self.annual_payment
    }
}

/// Fields for a manually added column. Unspecified fields fall back to a
/// non-loan column named "New Column".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewColumn {
    pub column_name: Option<String>,
    pub is_loan: bool,
    pub interest_rate: Option<f64>,
    pub term_years: Option<u32>,
    pub amortization_months: Option<u32>,
}

/// The ordered column registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Columns {
    data: Vec<Column>,
}

impl Columns {
    /// The two fixed default columns every table starts with.
    pub fn defaults() -> Self {
        Self {
            data: vec![
                Column::named(BORROWER_EQUITY),
                Column::named(BORROWER_CONTRIBUTION),
            ],
        }
    }

    /// Default columns followed by one loan column per project loan.
    pub fn with_loans(loans: &[Loan]) -> Self {
        let mut columns = Self::defaults();
        columns.data.extend(loans.iter().map(Column::from_loan));
        columns
    }

    pub fn from_data(data: Vec<Column>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &[Column] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The column that records missing a column name are routed into.
    pub fn first_column_name(&self) -> Option<&str> {
        self.data.first().map(Column::column_name)
    }

    pub fn find_by_name(&self, column_name: &str) -> Option<&Column> {
        self.data.iter().find(|c| c.column_name() == column_name)
    }

    pub fn find_by_id(&self, column_id: &str) -> Option<&Column> {
        self.data.iter().find(|c| c.column_id() == column_id)
    }

    /// Appends a column built from `new`, generating an id and defaulting
    /// the name and loan flag, and returns it.
    pub fn add(&mut self, new: NewColumn) -> &Column {
        let column = Column {
            column_id: Uuid::new_v4().to_string(),
            column_name: new.column_name.unwrap_or_else(|| NEW_COLUMN.to_string()),
            is_loan: new.is_loan,
            interest_rate: new.interest_rate,
            term_years: new.term_years,
            amortization_months: new.amortization_months,
            monthly_payment: None,
            annual_payment: None,
        };
        let index = self.data.len();
        self.data.push(column);
        &self.data[index]
    }

    /// Removes the column with the given id, unconditionally. Protecting the
    /// default columns is presentation-layer policy, not enforced here.
    pub fn delete(&mut self, column_id: &str) {
        self.data.retain(|c| c.column_id() != column_id);
    }

    /// Recomputes derived loan payments from the dollars currently allocated
    /// to each loan column.
    ///
    /// For every loan column with a rate, term, and a positive amortization
    /// period, the column's principal is the sum of its non-TOTAL cells in
    /// `grid`; the stored payments are replaced only when the newly computed
    /// figures differ. Calling this again with unchanged inputs changes
    /// nothing, so it is safe to run after every table mutation.
    ///
    /// Returns true if any column was updated.
    pub fn recompute_loan_payments(&mut self, grid: &Grid, rows: &Rows) -> bool {
        let mut changed = false;
        for column in &mut self.data {
            if !column.is_loan {
                continue;
            }
            let (Some(rate), Some(_), Some(months)) = (
                column.interest_rate,
                column.term_years,
                column.amortization_months,
            ) else {
                continue;
            };
            if months == 0 {
                // A zero-month term would divide by zero downstream.
                continue;
            }

            let principal: Amount = rows
                .non_total()
                .map(|row| grid.value(row.row_name(), &column.column_name))
                .sum();
            let schedule = match payment::amortized(principal.to_f64(), rate, months) {
                Ok(schedule) => schedule,
                Err(_) => continue,
            };

            let monthly = Amount::from_f64(schedule.monthly_payment).round_cents();
            let annual = Amount::from_f64(schedule.monthly_payment * 12.0).round_cents();
            if column.monthly_payment != Some(monthly) || column.annual_payment != Some(annual) {
                column.monthly_payment = Some(monthly);
                column.annual_payment = Some(annual);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProceedsRecord, TOTAL_ROW};

    fn loan_table() -> (Columns, Rows, Grid) {
        let loan = Loan::new("SBA 7(a)", Amount::lenient("500000"), Some(6.0), Some(10));
        let columns = Columns::with_loans(&[loan]);
        let rows = Rows::seed();
        let records = vec![ProceedsRecord::new(
            "proj-1",
            "Working Capital",
            Some("SBA 7(a)".to_string()),
            Amount::lenient("100000"),
            "Working Capital",
        )];
        let grid = Grid::build(&records, &rows, &columns);
        (columns, rows, grid)
    }

    #[test]
    fn test_defaults() {
        let columns = Columns::defaults();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns.first_column_name(), Some(BORROWER_EQUITY));
        assert!(!columns.data()[0].is_loan());
    }

    #[test]
    fn test_with_loans_appends_after_defaults() {
        let loan = Loan::new("SBA 504", Amount::lenient("900000"), Some(5.75), Some(25));
        let columns = Columns::with_loans(&[loan]);
        assert_eq!(columns.len(), 3);
        let derived = &columns.data()[2];
        assert_eq!(derived.column_name(), "SBA 504");
        assert!(derived.is_loan());
        assert_eq!(derived.amortization_months(), Some(300));
        assert_eq!(derived.monthly_payment(), None);
    }

    #[test]
    fn test_add_defaults_name_and_flag() {
        let mut columns = Columns::defaults();
        let added = columns.add(NewColumn::default());
        assert_eq!(added.column_name(), "New Column");
        assert!(!added.is_loan());
        assert_eq!(columns.len(), 3);
    }

    #[test]
    fn test_delete_is_unconditional() {
        let mut columns = Columns::defaults();
        let first = columns.data()[0].column_id().to_string();
        columns.delete(&first);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.first_column_name(), Some(BORROWER_CONTRIBUTION));
    }

    #[test]
    fn test_recompute_sets_payments() {
        let (mut columns, rows, grid) = loan_table();
        assert!(columns.recompute_loan_payments(&grid, &rows));
        let loan_column = columns.find_by_name("SBA 7(a)").unwrap();
        // 100,000 at 6% over 120 months.
        assert_eq!(loan_column.monthly_payment(), Some(Amount::lenient("1110.21")));
        assert_eq!(loan_column.annual_payment(), Some(Amount::lenient("13322.46")));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let (mut columns, rows, grid) = loan_table();
        assert!(columns.recompute_loan_payments(&grid, &rows));
        let after_first = columns.clone();
        assert!(!columns.recompute_loan_payments(&grid, &rows));
        assert_eq!(columns, after_first);
    }

    #[test]
    fn test_recompute_skips_incomplete_loan_columns() {
        let mut columns = Columns::defaults();
        columns.add(NewColumn {
            column_name: Some("Mystery Loan".to_string()),
            is_loan: true,
            interest_rate: Some(6.0),
            term_years: None,
            amortization_months: None,
        });
        let rows = Rows::seed();
        let grid = Grid::build(&[], &rows, &columns);
        assert!(!columns.recompute_loan_payments(&grid, &rows));
        assert_eq!(
            columns.find_by_name("Mystery Loan").unwrap().monthly_payment(),
            None
        );
    }

    #[test]
    fn test_recompute_skips_zero_month_term() {
        let mut columns = Columns::defaults();
        columns.add(NewColumn {
            column_name: Some("Degenerate".to_string()),
            is_loan: true,
            interest_rate: Some(6.0),
            term_years: Some(0),
            amortization_months: Some(0),
        });
        let rows = Rows::seed();
        let grid = Grid::build(&[], &rows, &columns);
        assert!(!columns.recompute_loan_payments(&grid, &rows));
    }

    #[test]
    fn test_recompute_ignores_total_row_values() {
        let (mut columns, rows, _) = loan_table();
        // A stray record against the TOTAL row must not inflate the principal.
        let records = vec![
            ProceedsRecord::new(
                "proj-1",
                "Working Capital",
                Some("SBA 7(a)".to_string()),
                Amount::lenient("100000"),
                "Working Capital",
            ),
            ProceedsRecord::new(
                "proj-1",
                TOTAL_ROW,
                Some("SBA 7(a)".to_string()),
                Amount::lenient("999999"),
                "",
            ),
        ];
        let grid = Grid::build(&records, &rows, &columns);
        columns.recompute_loan_payments(&grid, &rows);
        let loan_column = columns.find_by_name("SBA 7(a)").unwrap();
        assert_eq!(loan_column.monthly_payment(), Some(Amount::lenient("1110.21")));
    }
}
