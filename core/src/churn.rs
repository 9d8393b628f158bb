//! Churn selection and the two amendment policies.
//!
//! Runs after billing within the same month, on the post-billing
//! active set. The selection is a single sample without replacement
//! over the sorted active-id list; when churn_count is zero no draw
//! happens at all, so quiet months leave the stream untouched.
//!
//! Policy is keyed off the donor's actual accumulated records, not
//! the cached ever_paid flag:
//!   - never paid: every record amount becomes the null sentinel,
//!     status Churned, churn date set;
//!   - paid at least once: every record becomes Churned with the
//!     churn date, and the current month's record is forced to
//!     amount 0 with payment date = churn date, superseding that
//!     month's billing outcome.

use crate::calendar::date_in_month;
use crate::donor::DonorStatus;
use crate::error::{SimError, SimResult};
use crate::rng::SimRng;
use crate::state::SimulationState;
use crate::types::DonorId;
use chrono::NaiveDate;

/// Select and apply churn for the given month. Returns the churned
/// donor ids in draw order.
pub fn apply_churn(
    state: &mut SimulationState,
    churn_rate: f64,
    month: NaiveDate,
    rng: &mut SimRng,
) -> SimResult<Vec<DonorId>> {
    let active = state.sorted_active();
    let churn_count = (active.len() as f64 * churn_rate).floor() as usize;
    if churn_count == 0 {
        return Ok(Vec::new());
    }

    let picks = rng.sample_indices(active.len(), churn_count);
    let mut churned = Vec::with_capacity(churn_count);

    for idx in picks {
        let id = active[idx].clone();
        if state.timeline(&id).is_empty() {
            return Err(SimError::DataIntegrity(format!(
                "churn selected donor {id} with no billing history"
            )));
        }

        let churn_date = date_in_month(month, rng.day_of_month());
        let has_paid = state.has_paid_in_timeline(&id);

        if has_paid {
            state.amend_timeline(&id, |record| {
                record.status = DonorStatus::Churned;
                record.churn_date = Some(churn_date);
            });
            // Churn supersedes this month's billing result.
            state.amend_last(&id, |record| {
                record.amount = Some(0);
                record.payment_date = Some(churn_date);
            });
        } else {
            state.amend_timeline(&id, |record| {
                record.amount = None;
                record.status = DonorStatus::Churned;
                record.churn_date = Some(churn_date);
            });
        }

        state.retire(&id, churn_date);
        churned.push(id);
    }

    Ok(churned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::bill_active;
    use crate::cohort::enroll_cohort;
    use crate::config::SimConfig;

    fn one_billed_month(cohort_size: usize, seed: u64) -> (SimulationState, SimRng, SimConfig) {
        let config = SimConfig {
            cohort_size,
            ..SimConfig::default_test()
        }
        .validated()
        .unwrap();
        let mut state = SimulationState::new();
        let mut rng = SimRng::new(seed);
        let month = config.start_date;
        enroll_cohort(&mut state, &config, month, &mut rng);
        bill_active(&mut state, month, &mut rng).unwrap();
        (state, rng, config)
    }

    #[test]
    fn churn_count_is_floor_of_rate() {
        let (mut state, mut rng, config) = one_billed_month(150, 4);
        let churned =
            apply_churn(&mut state, config.churn_rate, config.start_date, &mut rng).unwrap();
        // floor(150 * 0.02) = 3
        assert_eq!(churned.len(), 3);
        assert_eq!(state.active_count(), 147);
    }

    #[test]
    fn small_active_set_churns_nobody() {
        let (mut state, mut rng, config) = one_billed_month(49, 4);
        let before = state.sorted_active();
        let churned =
            apply_churn(&mut state, config.churn_rate, config.start_date, &mut rng).unwrap();
        assert!(churned.is_empty());
        assert_eq!(state.sorted_active(), before);
    }

    #[test]
    fn empty_active_set_is_not_an_error() {
        let config = SimConfig::default_test().validated().unwrap();
        let mut state = SimulationState::new();
        let mut rng = SimRng::new(1);
        let churned =
            apply_churn(&mut state, config.churn_rate, config.start_date, &mut rng).unwrap();
        assert!(churned.is_empty());
    }

    #[test]
    fn quiet_month_consumes_no_randomness() {
        let (mut state, mut rng, config) = one_billed_month(49, 8);
        apply_churn(&mut state, config.churn_rate, config.start_date, &mut rng).unwrap();

        // A second RNG fast-forwarded through the same cohort and
        // billing draws must now be in lockstep with the first.
        let mut replay = SimRng::new(8);
        let mut shadow = SimulationState::new();
        enroll_cohort(&mut shadow, &config, config.start_date, &mut replay);
        bill_active(&mut shadow, config.start_date, &mut replay).unwrap();
        assert_eq!(rng.next_f64().to_bits(), replay.next_f64().to_bits());
    }

    #[test]
    fn churned_donors_leave_the_pool_permanently() {
        let (mut state, mut rng, config) = one_billed_month(200, 5);
        let churned =
            apply_churn(&mut state, config.churn_rate, config.start_date, &mut rng).unwrap();
        assert!(!churned.is_empty());
        for id in &churned {
            assert!(!state.is_active(id));
        }

        // Next month: no new records for churned donors.
        let month2 = crate::calendar::first_of_next_month(config.start_date);
        bill_active(&mut state, month2, &mut rng).unwrap();
        for id in &churned {
            assert_eq!(state.timeline(id).len(), 1);
        }
    }
}
