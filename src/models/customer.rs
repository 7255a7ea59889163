// src/models/customer.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer identity synthesized from a call. Recomputed on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub key: String,
    pub display_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    /// Whether `display_name` came from `metadata.customer_name`.
    pub explicit_name: bool,
}

/// One row of the unique-customer listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub total_calls: u64,
    pub total_minutes: Decimal,
    pub total_cost: Decimal,
    pub last_call_at: Option<DateTime<Utc>>,
}
