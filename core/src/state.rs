//! SimulationState — the single shared mutable resource of a run.
//!
//! Owned exclusively by the SimEngine loop. BTree collections keyed
//! by donor id give stable sorted iteration, which the billing and
//! churn steps rely on for reproducibility. Donor ids are zero-padded
//! and assigned in creation order, so id order equals creation order.
//!
//! Timelines are append-only: billing appends, churn amends through
//! the explicit rewrite helpers below, nothing deletes.

use crate::donor::{DonorProfile, TransactionRecord};
use crate::types::DonorId;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct SimulationState {
    next_seq: u64,
    active: BTreeSet<DonorId>,
    profiles: BTreeMap<DonorId, DonorProfile>,
    /// Cached "has ever paid" flags. Informational only: the churn
    /// policy decision scans the actual timeline instead.
    ever_paid: BTreeSet<DonorId>,
    timelines: BTreeMap<DonorId, Vec<TransactionRecord>>,
    churned: BTreeMap<DonorId, NaiveDate>,
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            ..Self::default()
        }
    }

    /// Allocate the next donor id in the global creation sequence.
    pub fn next_donor_id(&mut self) -> DonorId {
        let id = format!("D{:06}", self.next_seq);
        self.next_seq += 1;
        id
    }

    /// Admit a new donor: active, empty timeline.
    pub fn admit(&mut self, profile: DonorProfile) {
        let id = profile.id.clone();
        self.active.insert(id.clone());
        self.timelines.insert(id.clone(), Vec::new());
        self.profiles.insert(id, profile);
    }

    /// Snapshot of the active set in sorted id order.
    pub fn sorted_active(&self) -> Vec<DonorId> {
        self.active.iter().cloned().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn total_donors(&self) -> usize {
        self.profiles.len()
    }

    pub fn churned_count(&self) -> usize {
        self.churned.len()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    pub fn profile(&self, id: &str) -> Option<&DonorProfile> {
        self.profiles.get(id)
    }

    /// All profiles in creation order.
    pub fn profiles(&self) -> impl Iterator<Item = &DonorProfile> {
        self.profiles.values()
    }

    /// Churned donors with their churn dates, in id order.
    pub fn churned(&self) -> impl Iterator<Item = (&DonorId, &NaiveDate)> {
        self.churned.iter()
    }

    pub fn mark_paid(&mut self, id: &str) {
        self.ever_paid.insert(id.to_string());
    }

    pub fn ever_paid(&self, id: &str) -> bool {
        self.ever_paid.contains(id)
    }

    /// Whether the donor's accumulated records contain a converted
    /// attempt (amount > 0). The churn policy keys off this, not the
    /// cached flag, so an amended history can never go stale.
    pub fn has_paid_in_timeline(&self, id: &str) -> bool {
        self.timelines
            .get(id)
            .map(|records| records.iter().any(|r| r.amount.is_some_and(|a| a > 0)))
            .unwrap_or(false)
    }

    pub fn append_record(&mut self, id: &str, record: TransactionRecord) {
        self.timelines.entry(id.to_string()).or_default().push(record);
    }

    pub fn timeline(&self, id: &str) -> &[TransactionRecord] {
        self.timelines.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply a rewrite rule to every record in a donor's timeline.
    pub fn amend_timeline(&mut self, id: &str, mut rewrite: impl FnMut(&mut TransactionRecord)) {
        if let Some(records) = self.timelines.get_mut(id) {
            for record in records.iter_mut() {
                rewrite(record);
            }
        }
    }

    /// Apply a rewrite rule to the donor's most recent record only.
    pub fn amend_last(&mut self, id: &str, rewrite: impl FnOnce(&mut TransactionRecord)) {
        if let Some(record) = self.timelines.get_mut(id).and_then(|r| r.last_mut()) {
            rewrite(record);
        }
    }

    /// Remove the donor from the active pool permanently. It will
    /// receive no further billing attempts or records.
    pub fn retire(&mut self, id: &str, churn_date: NaiveDate) {
        self.active.remove(id);
        self.churned.insert(id.to_string(), churn_date);
    }

    /// All records across all donors, in donor-creation order.
    pub fn all_records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.timelines.values().flatten()
    }
}
