//! Result records returned by the store facades.
//!
//! Expected outcomes (miss, expiry, dropped value) are data, not errors.
//! All records serialize with camelCase keys, the shape workflow nodes emit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::StoredValue;

// ─────────────────────────────────────────────
// Operation tag
// ─────────────────────────────────────────────

/// What a facade call ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Stored,
    /// The value coerced to nothing; any existing entry was deleted.
    Dropped,
    Retrieved,
    Expired,
    NotFound,
    Deleted,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Stored => "stored",
            Operation::Dropped => "dropped",
            Operation::Retrieved => "retrieved",
            Operation::Expired => "expired",
            Operation::NotFound => "not_found",
            Operation::Deleted => "deleted",
        }
    }
}

// ─────────────────────────────────────────────
// Session records
// ─────────────────────────────────────────────

/// Result of `store_session`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStored {
    pub operation: Operation,
    pub chat_id: String,
}

/// Result of `get_session`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLookup {
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    pub valid: bool,
}

impl SessionLookup {
    pub(crate) fn miss(operation: Operation) -> Self {
        Self {
            operation,
            chat_id: None,
            last_used: None,
            valid: false,
        }
    }
}

// ─────────────────────────────────────────────
// Value records
// ─────────────────────────────────────────────

/// Result of `store_value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueStored {
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<StoredValue>,
}

/// Result of `get_value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueLookup {
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<StoredValue>,
    pub exists: bool,
}

// ─────────────────────────────────────────────
// Shared
// ─────────────────────────────────────────────

/// Result of `delete_session` / `delete_value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deletion {
    pub operation: Operation,
    pub existed: bool,
}

impl Deletion {
    pub(crate) fn new(existed: bool) -> Self {
        Self {
            operation: Operation::Deleted,
            existed,
        }
    }
}
