//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Operations with
//! best-effort staff side effects also carry `recovered_failures`.

use serde::Serialize;
use turnero_core::booking::{BestEffort, StaffTransitionFailure};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "recovered_failures": [...] }` for operations whose
/// primary write succeeded while some staff transitions did not.
#[derive(Debug, Serialize)]
pub struct BestEffortResponse<T: Serialize> {
    pub data: T,
    pub recovered_failures: Vec<StaffTransitionFailure>,
}

impl<T: Serialize> From<BestEffort<T>> for BestEffortResponse<T> {
    fn from(result: BestEffort<T>) -> Self {
        Self {
            data: result.data,
            recovered_failures: result.recovered_failures,
        }
    }
}
