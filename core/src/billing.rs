//! Payment attempts: one recurring billing attempt per active donor
//! per month.
//!
//! Donors are billed in sorted id order so the draw sequence does not
//! depend on set iteration order. Per donor: day-of-month draw, then
//! the success Bernoulli at the donor's effectiveness. A failed
//! attempt is a recorded outcome (amount 0), not an error, and is
//! never retried.

use crate::donor::{DonorStatus, TransactionRecord};
use crate::error::{SimError, SimResult};
use crate::rng::SimRng;
use crate::state::SimulationState;
use crate::calendar::date_in_month;
use chrono::NaiveDate;

/// Bill every active donor once for the given month. Returns the
/// number of attempts recorded.
pub fn bill_active(
    state: &mut SimulationState,
    month: NaiveDate,
    rng: &mut SimRng,
) -> SimResult<usize> {
    let active = state.sorted_active();

    for id in &active {
        let profile = state
            .profile(id)
            .cloned()
            .ok_or_else(|| SimError::DataIntegrity(format!("active donor {id} has no profile")))?;

        let payment_date = date_in_month(month, rng.day_of_month());
        let succeeded = rng.chance(profile.effectiveness);

        let amount = if succeeded {
            state.mark_paid(id);
            profile.fixed_amount
        } else {
            0
        };

        state.append_record(
            id,
            TransactionRecord {
                donor_id: id.clone(),
                payment_method: profile.payment_method,
                strategy: profile.strategy,
                creation_date: profile.creation_date,
                payment_date: Some(payment_date),
                amount: Some(amount),
                status: DonorStatus::Active,
                churn_date: None,
            },
        );
    }

    Ok(active.len())
}
