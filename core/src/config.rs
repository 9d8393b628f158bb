//! Run configuration: cohort size, churn rate, date range, payment
//! method and strategy tables, amount tiers, and the master seed.
//!
//! All validation happens at construction time. A SimEngine never
//! holds an unvalidated config.

use crate::error::{SimError, SimResult};
use crate::types::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodConfig {
    pub name: String,
    /// Cohort-draw weight. The method weights sum to 1.
    pub probability: f64,
    /// Per-attempt success probability for billing.
    pub effectiveness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub probability: f64,
}

/// Two-tier fixed-amount distribution drawn once per donor:
/// with `base_probability`, a uniform pick among `base_amounts`;
/// otherwise a uniform multiple of `upper_step` in
/// [`upper_min`, `upper_max`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountTiers {
    pub base_probability: f64,
    pub base_amounts: Vec<Amount>,
    pub upper_min: Amount,
    pub upper_max: Amount,
    pub upper_step: Amount,
}

impl AmountTiers {
    /// Number of values in the upper tier.
    pub fn upper_count(&self) -> usize {
        ((self.upper_max - self.upper_min) / self.upper_step) as usize + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub seed: u64,
    /// New donors admitted each simulated month.
    pub cohort_size: usize,
    /// Fraction of the post-billing active set churned per month.
    pub churn_rate: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payment_methods: Vec<PaymentMethodConfig>,
    pub strategies: Vec<StrategyConfig>,
    pub amount_tiers: AmountTiers,
}

impl SimConfig {
    /// Validate and return the config, or a Configuration error.
    pub fn validated(self) -> SimResult<Self> {
        if self.cohort_size == 0 {
            return Err(SimError::Configuration(
                "cohort_size must be positive".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.churn_rate) {
            return Err(SimError::Configuration(format!(
                "churn_rate {} outside [0, 1)",
                self.churn_rate
            )));
        }
        if self.start_date > self.end_date {
            return Err(SimError::Configuration(format!(
                "start_date {} after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.payment_methods.is_empty() {
            return Err(SimError::Configuration(
                "payment_methods table is empty".into(),
            ));
        }
        if self.strategies.is_empty() {
            return Err(SimError::Configuration("strategies table is empty".into()));
        }
        for m in &self.payment_methods {
            if m.probability <= 0.0 || !(0.0..=1.0).contains(&m.effectiveness) {
                return Err(SimError::Configuration(format!(
                    "payment method '{}' has invalid probability/effectiveness",
                    m.name
                )));
            }
        }
        for s in &self.strategies {
            if s.probability <= 0.0 {
                return Err(SimError::Configuration(format!(
                    "strategy '{}' has non-positive probability",
                    s.name
                )));
            }
        }
        let method_sum: f64 = self.payment_methods.iter().map(|m| m.probability).sum();
        if (method_sum - 1.0).abs() > 1e-6 {
            return Err(SimError::Configuration(format!(
                "payment method probabilities sum to {method_sum}, expected 1"
            )));
        }
        let strategy_sum: f64 = self.strategies.iter().map(|s| s.probability).sum();
        if (strategy_sum - 1.0).abs() > 1e-6 {
            return Err(SimError::Configuration(format!(
                "strategy probabilities sum to {strategy_sum}, expected 1"
            )));
        }
        let tiers = &self.amount_tiers;
        if !(0.0..=1.0).contains(&tiers.base_probability)
            || tiers.base_amounts.is_empty()
            || tiers.upper_step <= 0
            || tiers.upper_min > tiers.upper_max
            || (tiers.upper_max - tiers.upper_min) % tiers.upper_step != 0
        {
            return Err(SimError::Configuration("invalid amount tiers".into()));
        }
        Ok(self)
    }

    /// Probability-weighted mean billing effectiveness across the
    /// payment method table.
    pub fn weighted_effectiveness(&self) -> f64 {
        self.payment_methods
            .iter()
            .map(|m| m.probability * m.effectiveness)
            .sum()
    }

    /// The reference production run: seed 42, 1000 donors/month,
    /// 2% monthly churn, June 2023 through May 2025.
    pub fn reference() -> Self {
        Self {
            seed: 42,
            cohort_size: 1000,
            churn_rate: 0.02,
            start_date: NaiveDate::from_ymd_opt(2023, 6, 30).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 30).expect("valid date"),
            payment_methods: vec![
                PaymentMethodConfig {
                    name: "Cuenta Corriente".into(),
                    probability: 0.12,
                    effectiveness: 0.97,
                },
                PaymentMethodConfig {
                    name: "Tarjeta Crédito".into(),
                    probability: 0.10,
                    effectiveness: 0.93,
                },
                PaymentMethodConfig {
                    name: "Cuenta Vista".into(),
                    probability: 0.18,
                    effectiveness: 0.85,
                },
                PaymentMethodConfig {
                    name: "Cuenta Rut".into(),
                    probability: 0.60,
                    effectiveness: 0.70,
                },
            ],
            strategies: vec![
                StrategyConfig {
                    name: "Face to Face".into(),
                    probability: 0.80,
                },
                StrategyConfig {
                    name: "Telemarketing".into(),
                    probability: 0.20,
                },
            ],
            amount_tiers: AmountTiers {
                base_probability: 0.85,
                base_amounts: vec![8000, 9000, 10000],
                upper_min: 10000,
                upper_max: 25000,
                upper_step: 1000,
            },
        }
    }

    /// Small, fast config for unit tests: same tables as the
    /// reference run, 200 donors/month over six months.
    pub fn default_test() -> Self {
        Self {
            seed: 7,
            cohort_size: 200,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date"),
            ..Self::reference()
        }
    }
}
