//! Shared primitive types used across the entire simulation.

/// A stable donor identifier, assigned in strictly increasing
/// creation order ("D000001", "D000002", ...).
pub type DonorId = String;

/// A monetary amount in whole pesos.
pub type Amount = i64;
