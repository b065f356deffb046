use chrono::{Duration, NaiveDate};

use super::domain::{Installment, InstallmentStatus, RepaymentPlan};

/// Number of biweekly installments in the standard schedule.
const INSTALLMENT_COUNT: i64 = 4;

/// Error raised when a plan is requested for a non-positive amount.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("repayment plan total must be positive, got {0} cents")]
    NonPositiveTotal(i64),
}

/// Build the standard 4-installment biweekly repayment schedule.
///
/// Installments 1-3 carry `total / 4` (floor); the final installment absorbs
/// the remainder so the amounts sum to `total_cents` exactly. Due dates fall
/// 2, 4, 6, and 8 weeks after `start_date`.
pub fn build_plan(total_cents: i64, start_date: NaiveDate) -> Result<RepaymentPlan, PlanError> {
    if total_cents <= 0 {
        return Err(PlanError::NonPositiveTotal(total_cents));
    }

    let base = total_cents / INSTALLMENT_COUNT;
    let remainder = total_cents % INSTALLMENT_COUNT;

    let installments = (1..=INSTALLMENT_COUNT)
        .map(|n| {
            let amount = if n == INSTALLMENT_COUNT {
                base + remainder
            } else {
                base
            };
            Installment {
                due_date: start_date + Duration::weeks(2 * n),
                amount_cents: amount,
                status: InstallmentStatus::Scheduled,
            }
        })
        .collect();

    Ok(RepaymentPlan {
        total_cents,
        installments,
    })
}
