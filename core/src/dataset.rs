//! Record consolidation: merge all per-donor timelines into the
//! final ordered dataset with derived period labels and summary
//! aggregates.
//!
//! Integrity failures here are fatal DataIntegrity errors, never
//! silent coercions — the null-vs-zero amount invariant must survive
//! all the way to the downstream layers. A failed consolidation
//! yields no partial dataset.

use crate::calendar::period_label;
use crate::donor::{DonorStatus, TransactionRecord};
use crate::error::{SimError, SimResult};
use crate::state::SimulationState;
use crate::types::Amount;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A transaction record enriched with the derived year-month labels
/// the downstream layers key on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsolidatedRecord {
    #[serde(flatten)]
    pub record: TransactionRecord,
    /// Always present: every record carries its donor's entry month.
    pub creation_period: String,
    /// Absent when the record has no payment date.
    pub payment_period: Option<String>,
    pub churn_period: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub total_donors: usize,
    /// Attempts with amount > 0.
    pub succeeded_attempts: usize,
    pub total_amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub records: Vec<ConsolidatedRecord>,
    pub summary: DatasetSummary,
}

impl Dataset {
    /// Serialize the records as JSON lines, one record per line, in
    /// dataset order. This is the wire form handed to the external
    /// Bronze sink.
    pub fn to_json_lines(&self) -> SimResult<String> {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&serde_json::to_string(record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Build the final dataset from the run state: concatenate timelines
/// in donor-creation order, derive period labels, validate, and sort
/// by (payment date, donor id).
///
/// SENTINEL SORT POLICY: records with no payment date sort after all
/// dated records, stable by donor id.
pub fn consolidate(state: &SimulationState) -> SimResult<Dataset> {
    let mut records = Vec::new();
    for record in state.all_records() {
        validate(record)?;
        records.push(ConsolidatedRecord {
            record: record.clone(),
            creation_period: period_label(record.creation_date),
            payment_period: record.payment_date.map(period_label),
            churn_period: record.churn_date.map(period_label),
        });
    }

    records.sort_by(compare_records);

    let summary = summarize(&records);
    Ok(Dataset { records, summary })
}

fn validate(record: &TransactionRecord) -> SimResult<()> {
    match record.status {
        DonorStatus::Churned if record.churn_date.is_none() => {
            return Err(SimError::DataIntegrity(format!(
                "churned record for {} has no churn date",
                record.donor_id
            )));
        }
        DonorStatus::Active if record.payment_date.is_none() => {
            return Err(SimError::DataIntegrity(format!(
                "active record for {} has no payment date",
                record.donor_id
            )));
        }
        _ => {}
    }
    if record.amount.is_some_and(|a| a < 0) {
        return Err(SimError::DataIntegrity(format!(
            "negative amount on record for {}",
            record.donor_id
        )));
    }
    Ok(())
}

/// Total order: (payment date, donor id), undated records last.
fn compare_records(a: &ConsolidatedRecord, b: &ConsolidatedRecord) -> Ordering {
    let by_date = match (a.record.payment_date, b.record.payment_date) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.record.donor_id.cmp(&b.record.donor_id))
}

fn summarize(records: &[ConsolidatedRecord]) -> DatasetSummary {
    let donors: BTreeSet<&str> = records.iter().map(|r| r.record.donor_id.as_str()).collect();
    DatasetSummary {
        total_records: records.len(),
        total_donors: donors.len(),
        succeeded_attempts: records
            .iter()
            .filter(|r| r.record.amount.is_some_and(|a| a > 0))
            .count(),
        total_amount: records
            .iter()
            .filter_map(|r| r.record.amount)
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(id: &str, day: u32, amount: Option<Amount>) -> TransactionRecord {
        TransactionRecord {
            donor_id: id.into(),
            payment_method: "Cuenta Rut".into(),
            strategy: "Face to Face".into(),
            creation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            payment_date: Some(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
            amount,
            status: DonorStatus::Active,
            churn_date: None,
        }
    }

    fn consolidated(record: TransactionRecord) -> ConsolidatedRecord {
        ConsolidatedRecord {
            creation_period: period_label(record.creation_date),
            payment_period: record.payment_date.map(period_label),
            churn_period: record.churn_date.map(period_label),
            record,
        }
    }

    #[test]
    fn order_is_payment_date_then_donor_id() {
        let mut records = vec![
            consolidated(raw("D000002", 5, Some(0))),
            consolidated(raw("D000001", 5, Some(8000))),
            consolidated(raw("D000003", 2, Some(9000))),
        ];
        records.sort_by(compare_records);
        let ids: Vec<&str> = records.iter().map(|r| r.record.donor_id.as_str()).collect();
        assert_eq!(ids, ["D000003", "D000001", "D000002"]);
    }

    #[test]
    fn undated_records_sort_last() {
        let mut undated = raw("D000001", 3, None);
        undated.payment_date = None;
        undated.status = DonorStatus::Churned;
        undated.churn_date = Some(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());

        let mut records = vec![consolidated(undated), consolidated(raw("D000002", 28, Some(0)))];
        records.sort_by(compare_records);
        assert_eq!(records[0].record.donor_id, "D000002");
        assert_eq!(records[1].record.payment_date, None);
        assert_eq!(records[1].payment_period, None);
    }

    #[test]
    fn summary_separates_null_zero_and_paid() {
        let records = vec![
            consolidated(raw("D000001", 1, Some(8000))),
            consolidated(raw("D000001", 2, Some(0))),
            consolidated(raw("D000002", 3, None)),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.total_donors, 2);
        assert_eq!(summary.succeeded_attempts, 1);
        assert_eq!(summary.total_amount, 8000);
    }

    #[test]
    fn json_lines_emit_one_parseable_row_per_record() {
        let records = vec![
            consolidated(raw("D000001", 1, Some(8000))),
            consolidated(raw("D000002", 3, None)),
        ];
        let summary = summarize(&records);
        let dataset = Dataset { records, summary };

        let lines = dataset.to_json_lines().unwrap();
        let parsed: Vec<ConsolidatedRecord> = lines
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(parsed, dataset.records);
    }

    #[test]
    fn churned_record_without_churn_date_is_fatal() {
        let mut bad = raw("D000001", 1, Some(0));
        bad.status = DonorStatus::Churned;
        assert!(matches!(validate(&bad), Err(SimError::DataIntegrity(_))));
    }

    #[test]
    fn negative_amount_is_fatal() {
        let bad = raw("D000001", 1, Some(-1));
        assert!(matches!(validate(&bad), Err(SimError::DataIntegrity(_))));
    }
}
