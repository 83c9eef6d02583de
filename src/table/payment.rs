//! Fixed-rate loan amortization.

use crate::Result;
use anyhow::ensure;

/// The payments implied by amortizing a principal over a fixed term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSchedule {
    /// The level monthly payment.
    pub monthly_payment: f64,
    /// Sum of all payments over the term.
    pub total_paid: f64,
    /// `total_paid` less the principal.
    pub total_interest: f64,
}

/// Computes the level monthly payment for `principal` dollars at
/// `annual_rate_percent` (e.g. `6.5` for 6.5%) over `amortization_months`.
///
/// A zero rate degenerates to straight-line repayment. A zero-month term is
/// an error; callers deriving payments from column data skip such columns
/// instead of calling this.
pub fn amortized(
    principal: f64,
    annual_rate_percent: f64,
    amortization_months: u32,
) -> Result<PaymentSchedule> {
    ensure!(
        amortization_months > 0,
        "amortization term must be at least one month"
    );

    let months = f64::from(amortization_months);
    let monthly_payment = if annual_rate_percent == 0.0 {
        principal / months
    } else {
        let monthly_rate = annual_rate_percent / 100.0 / 12.0;
        let factor = (1.0 + monthly_rate).powi(amortization_months as i32);
        principal * monthly_rate * factor / (factor - 1.0)
    };

    let total_paid = monthly_payment * months;
    Ok(PaymentSchedule {
        monthly_payment,
        total_paid,
        total_interest: total_paid - principal,
    })
}
