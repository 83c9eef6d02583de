use crate::model::Amount;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The canonical loan shape consumed by the column registry: one funding
/// source with an optional rate and term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Loan {
    loan_id: String,
    loan_type: String,
    amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    term_years: Option<u32>,
}

impl Loan {
    pub fn new(
        loan_type: impl Into<String>,
        amount: Amount,
        rate: Option<f64>,
        term_years: Option<u32>,
    ) -> Self {
        Self {
            loan_id: Uuid::new_v4().to_string(),
            loan_type: loan_type.into(),
            amount,
            rate,
            term_years,
        }
    }

    pub fn loan_id(&self) -> &str {
        &self.loan_id
    }

    pub fn loan_type(&self) -> &str {
        &self.loan_type
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    pub fn term_years(&self) -> Option<u32> {
        self.term_years
    }
}

/// The shapes loan data arrives in. Modern project files carry a `loans`
/// array with ids; older files carry `loan_types` entries without ids, and
/// the oldest carry bare type names. All of them normalize into [`Loan`]
/// once, at table construction, so nothing downstream sees the difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoanSpec {
    Modern {
        loan_id: String,
        loan_type: String,
        amount: Amount,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        term: Option<u32>,
    },
    Legacy {
        #[serde(rename = "type")]
        loan_type: String,
        amount: Amount,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        term: Option<u32>,
        /// Stored payment figures are ignored; payments are derived.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payment: Option<Amount>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Name(String),
}

impl LoanSpec {
    /// Converts any spec shape into the canonical `Loan`, assigning a
    /// synthetic id where the source had none.
    pub fn normalize(&self) -> Loan {
        match self {
            LoanSpec::Modern {
                loan_id,
                loan_type,
                amount,
                rate,
                term,
            } => Loan {
                loan_id: loan_id.clone(),
                loan_type: loan_type.clone(),
                amount: *amount,
                rate: *rate,
                term_years: *term,
            },
            LoanSpec::Legacy {
                loan_type,
                amount,
                rate,
                term,
                ..
            } => Loan::new(loan_type.clone(), *amount, *rate, *term),
            LoanSpec::Name(name) => Loan::new(name.clone(), Amount::ZERO, None, None),
        }
    }
}

impl From<&Loan> for LoanSpec {
    fn from(loan: &Loan) -> Self {
        LoanSpec::Modern {
            loan_id: loan.loan_id.clone(),
            loan_type: loan.loan_type.clone(),
            amount: loan.amount,
            rate: loan.rate,
            term: loan.term_years,
        }
    }
}

/// Normalizes a whole spec list.
pub fn normalize_loans(specs: &[LoanSpec]) -> Vec<Loan> {
    specs.iter().map(LoanSpec::normalize).collect()
}
