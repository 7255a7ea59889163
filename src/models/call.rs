// src/models/call.rs
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AnalyticsError, AnalyticsResult};

/// One call as returned by `GET /call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: String,
    #[serde(default)]
    pub status: CallStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub customer: Option<CallCustomer>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallCustomer {
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum CallStatus {
    Queued,
    Ringing,
    InProgress,
    Forwarding,
    Ended,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CallStatus::Queued => "queued",
            CallStatus::Ringing => "ringing",
            CallStatus::InProgress => "in-progress",
            CallStatus::Forwarding => "forwarding",
            CallStatus::Ended => "ended",
            CallStatus::Unknown => "unknown",
        }
    }
}

/// Typed view of the customer keys a call's free-form metadata may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerMetadata {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub user_id: Option<String>,
}

impl CallRecord {
    /// Cost with missing or negative values treated as zero.
    pub fn billable_cost(&self) -> Decimal {
        match self.cost {
            Some(cost) if cost.is_sign_positive() => cost,
            _ => Decimal::ZERO,
        }
    }

    /// Talk time; only defined when both ends are known and ordered.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }

    /// Time between creation and the call actually starting.
    pub fn setup_latency(&self) -> Option<Duration> {
        match (self.created_at, self.started_at) {
            (Some(created), Some(start)) if start >= created => Some(start - created),
            _ => None,
        }
    }

    pub fn caller_number(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.number.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }

    pub fn assistant(&self) -> Option<&str> {
        self.assistant_id
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }

    pub fn is_successful(&self) -> bool {
        self.status == CallStatus::Ended
    }

    /// Extracts the customer keys from `metadata`.
    ///
    /// Fails when metadata is present but is not an object, or when a known
    /// key holds something other than a string or a number.
    pub fn customer_metadata(&self) -> AnalyticsResult<CustomerMetadata> {
        let map = match &self.metadata {
            None | Some(Value::Null) => return Ok(CustomerMetadata::default()),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(AnalyticsError::MalformedRecord(format!(
                    "call {}: metadata is not an object",
                    self.id
                )))
            }
        };

        Ok(CustomerMetadata {
            customer_id: self.scalar_field(map, "customer_id")?,
            customer_name: self.scalar_field(map, "customer_name")?,
            customer_email: self.scalar_field(map, "customer_email")?,
            user_id: self.scalar_field(map, "user_id")?,
        })
    }

    fn scalar_field(&self, map: &Map<String, Value>, key: &str) -> AnalyticsResult<Option<String>> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(AnalyticsError::MalformedRecord(format!(
                "call {}: metadata.{} must be a string",
                self.id, key
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<Value>,
    #[serde(default)]
    pub voice: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberRecord {
    pub id: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /assistant`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}
