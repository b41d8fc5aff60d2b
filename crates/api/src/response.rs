//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Result of a bulk acknowledge.
#[derive(Debug, Serialize)]
pub struct AcknowledgedCount {
    pub acknowledged: u64,
}

/// Result of a bulk delete.
#[derive(Debug, Serialize)]
pub struct DeletedCount {
    pub deleted: u64,
}
