//! Types that represent the core data model, such as `ProceedsRecord`,
//! `Row`, `Column` and `Loan`.

mod amount;
mod column;
mod loan;
mod project;
mod record;
mod row;

pub use amount::Amount;
pub use column::{Column, Columns, NewColumn, BORROWER_CONTRIBUTION, BORROWER_EQUITY};
pub use loan::{normalize_loans, Loan, LoanSpec};
pub use project::ProjectData;
pub use record::ProceedsRecord;
pub use row::{Row, Rows, TOTAL_ROW};
