//! Cohort generation: one fixed-size batch of new donors per month.
//!
//! DRAW ORDER per donor (fixed, never reordered):
//!   1. amount tier
//!   2. payment method
//!   3. strategy
//! Reordering these changes every later draw in the run.

use crate::config::SimConfig;
use crate::donor::DonorProfile;
use crate::rng::SimRng;
use crate::state::SimulationState;
use crate::types::{Amount, DonorId};
use chrono::NaiveDate;

/// Admit `config.cohort_size` new donors for the given month.
/// Ids continue the global creation sequence. Returns the new ids.
pub fn enroll_cohort(
    state: &mut SimulationState,
    config: &SimConfig,
    month: NaiveDate,
    rng: &mut SimRng,
) -> Vec<DonorId> {
    let mut admitted = Vec::with_capacity(config.cohort_size);

    for _ in 0..config.cohort_size {
        let id = state.next_donor_id();

        let fixed_amount = draw_fixed_amount(config, rng);

        let method_weights: Vec<f64> = config
            .payment_methods
            .iter()
            .map(|m| m.probability)
            .collect();
        let method = &config.payment_methods[rng.pick_index(&method_weights)];

        let strategy_weights: Vec<f64> =
            config.strategies.iter().map(|s| s.probability).collect();
        let strategy = &config.strategies[rng.pick_index(&strategy_weights)];

        state.admit(DonorProfile {
            id: id.clone(),
            creation_date: month,
            payment_method: method.name.clone(),
            strategy: strategy.name.clone(),
            effectiveness: method.effectiveness,
            fixed_amount,
        });
        admitted.push(id);
    }

    admitted
}

fn draw_fixed_amount(config: &SimConfig, rng: &mut SimRng) -> Amount {
    let tiers = &config.amount_tiers;
    if rng.chance(tiers.base_probability) {
        tiers.base_amounts[rng.uniform_index(tiers.base_amounts.len())]
    } else {
        tiers.upper_min + tiers.upper_step * rng.uniform_index(tiers.upper_count()) as Amount
    }
}
