//! Donor data model: the immutable profile created at cohort entry
//! and the monthly transaction records accumulated per donor.

use crate::types::{Amount, DonorId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Created once at cohort entry; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonorProfile {
    pub id: DonorId,
    /// The calendar month the donor entered.
    pub creation_date: NaiveDate,
    pub payment_method: String,
    pub strategy: String,
    /// Per-attempt billing success probability, copied from the
    /// donor's payment method at creation.
    pub effectiveness: f64,
    /// Drawn once from the two-tier amount distribution; every
    /// successful billing attempt charges exactly this amount.
    pub fixed_amount: Amount,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DonorStatus {
    Active,
    Churned,
}

impl std::fmt::Display for DonorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Churned => f.write_str("Churned"),
        }
    }
}

/// One row of the canonical event stream: a billing attempt, or the
/// amended terminal form of one after churn.
///
/// `amount` is `None` only for donors churned having never paid —
/// a sentinel meaning "no attempt ever converted", strictly distinct
/// from `Some(0)` (billed and failed).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub donor_id: DonorId,
    pub payment_method: String,
    pub strategy: String,
    pub creation_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub amount: Option<Amount>,
    pub status: DonorStatus,
    pub churn_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_to_wire_labels() {
        assert_eq!(
            serde_json::to_string(&DonorStatus::Active).unwrap(),
            "\"Active\""
        );
        assert_eq!(
            serde_json::to_string(&DonorStatus::Churned).unwrap(),
            "\"Churned\""
        );
    }

    #[test]
    fn null_amount_survives_serialization_distinct_from_zero() {
        let record = TransactionRecord {
            donor_id: "D000001".into(),
            payment_method: "Cuenta Rut".into(),
            strategy: "Face to Face".into(),
            creation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            payment_date: Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            amount: None,
            status: DonorStatus::Churned,
            churn_date: Some(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"amount\":null"));
        let back: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount, None);
        assert_ne!(back.amount, Some(0));
    }
}
