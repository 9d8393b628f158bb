//! donorsim-core: deterministic donor-cohort and churn simulator.
//!
//! Generates the canonical monthly event log of recurring-payment
//! attempts for a growing, attriting donor population. Each simulated
//! month admits a fixed-size cohort, bills every active donor once,
//! then churns a fixed fraction of the post-billing active set under
//! one of two amendment policies. The consolidated dataset feeds the
//! external Bronze/Silver/Gold reporting layers.
//!
//! Re-running with the same seed and configuration produces a
//! byte-identical dataset. See `core/tests/determinism.rs`.

pub mod billing;
pub mod calendar;
pub mod churn;
pub mod cohort;
pub mod config;
pub mod dataset;
pub mod donor;
pub mod engine;
pub mod error;
pub mod rng;
pub mod state;
pub mod types;

pub use config::SimConfig;
pub use dataset::{ConsolidatedRecord, Dataset, DatasetSummary};
pub use donor::{DonorProfile, DonorStatus, TransactionRecord};
pub use engine::{MonthStats, SimEngine};
pub use error::{SimError, SimResult};
