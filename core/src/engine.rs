//! The simulation engine — single owner of the month loop.
//!
//! EXECUTION ORDER per month (fixed, documented, never reordered):
//!   1. Cohort entry   — admit the month's new donors
//!   2. Billing        — one attempt per active donor, sorted by id
//!   3. Churn          — select, amend, retire
//!
//! RULES:
//!   - Months execute strictly in calendar order.
//!   - All randomness flows through the engine's single SimRng.
//!   - State is mutated only here; the step functions receive it
//!     explicitly, so a single month transition is unit-testable.

use crate::billing::bill_active;
use crate::calendar::{month_span, period_label};
use crate::churn::apply_churn;
use crate::cohort::enroll_cohort;
use crate::config::SimConfig;
use crate::dataset::{consolidate, Dataset};
use crate::error::SimResult;
use crate::rng::SimRng;
use crate::state::SimulationState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-month counters, logged as the run progresses and kept for the
/// end-of-run report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthStats {
    pub month: NaiveDate,
    pub enrolled: usize,
    pub billed: usize,
    pub churned: usize,
    pub active_end: usize,
}

pub struct SimEngine {
    config: SimConfig,
    rng: SimRng,
    pub state: SimulationState,
    pub monthly: Vec<MonthStats>,
}

impl SimEngine {
    /// Validate the config and seed the run. The RNG is seeded
    /// exactly once here; every stochastic decision downstream draws
    /// from it in a fixed order.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        let config = config.validated()?;
        let rng = SimRng::new(config.seed);
        Ok(Self {
            config,
            rng,
            state: SimulationState::new(),
            monthly: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Execute one month: cohort entry, billing, churn.
    pub fn step_month(&mut self, month: NaiveDate) -> SimResult<MonthStats> {
        let enrolled = enroll_cohort(&mut self.state, &self.config, month, &mut self.rng).len();
        let billed = bill_active(&mut self.state, month, &mut self.rng)?;
        let churned =
            apply_churn(&mut self.state, self.config.churn_rate, month, &mut self.rng)?.len();

        let stats = MonthStats {
            month,
            enrolled,
            billed,
            churned,
            active_end: self.state.active_count(),
        };
        log::info!(
            "month={} enrolled={} billed={} churned={} active={}",
            period_label(month),
            stats.enrolled,
            stats.billed,
            stats.churned,
            stats.active_end,
        );
        self.monthly.push(stats.clone());
        Ok(stats)
    }

    /// Run the full month range and consolidate. Any failure aborts
    /// the run without producing a partial dataset.
    pub fn run(&mut self) -> SimResult<Dataset> {
        for month in month_span(self.config.start_date, self.config.end_date) {
            self.step_month(month)?;
        }
        consolidate(&self.state)
    }
}
