//! Store error type.
//!
//! Only structurally invalid input is an error. Misses, expiry and values that
//! fail coercion are reported through result records instead.

use thiserror::Error;

/// Hard failures of a single store operation. None of them are retryable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The engine was handed an empty key.
    #[error("key must not be empty")]
    InvalidKey,

    /// A facade call was made without its identifier (session ID or key).
    #[error("No {field} provided")]
    MissingIdentifier { field: &'static str },

    /// `store_session` was called without a chat ID.
    #[error("No chat ID provided for storing session")]
    MissingChatId,

    /// A lifetime in minutes that is NaN or infinite.
    #[error("invalid duration: {0} minutes")]
    InvalidDuration(f64),
}
