// src/models/analytics.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

/// System-wide snapshot. Money and averages are rounded to two decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemAnalytics {
    pub total_cost: Decimal,
    pub total_calls: u64,
    pub total_customers: u64,
    pub total_minutes: Decimal,
    /// Seconds, over calls with both start and end timestamps.
    pub average_call_duration: Decimal,
    pub total_assistants: u64,
    pub total_phone_numbers: u64,
    pub total_campaigns: u64,
    pub calls_last_7_days: u64,
    pub cost_last_7_days: Decimal,
    pub calls_last_30_days: u64,
    pub cost_last_30_days: Decimal,
    /// Ascending by date.
    pub trend: Vec<TrendPoint>,
    pub success_rate: Decimal,
    pub failure_rate: Decimal,
    /// Seconds between creation and start.
    pub average_setup_time: Decimal,
    pub calls_by_status: BTreeMap<String, u64>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub calls: u64,
    pub cost: Decimal,
    pub minutes: Decimal,
}

/// Usage of one customer over a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerUsageAnalytics {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub total_calls: u64,
    pub total_minutes: Decimal,
    pub total_cost: Decimal,
    pub assistant_breakdown: Vec<AssistantUsage>,
    pub period: PeriodRange,
    pub first_call_at: Option<DateTime<Utc>>,
    pub last_call_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantUsage {
    pub assistant_id: String,
    pub assistant_name: Option<String>,
    pub calls: u64,
    pub minutes: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodRange {
    pub label: String,
    pub start: Option<DateTime<Utc>>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsagePeriod {
    #[serde(rename = "7d")]
    Last7Days,
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "all")]
    AllTime,
}

impl UsagePeriod {
    pub fn as_str(&self) -> &str {
        match self {
            UsagePeriod::Last7Days => "7d",
            UsagePeriod::Last30Days => "30d",
            UsagePeriod::Last90Days => "90d",
            UsagePeriod::AllTime => "all",
        }
    }

    pub fn days(&self) -> Option<i64> {
        match self {
            UsagePeriod::Last7Days => Some(7),
            UsagePeriod::Last30Days => Some(30),
            UsagePeriod::Last90Days => Some(90),
            UsagePeriod::AllTime => None,
        }
    }

    /// Inclusive lower bound on call creation time, if any.
    pub fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|d| now - Duration::days(d))
    }

    pub fn range(&self, now: DateTime<Utc>) -> PeriodRange {
        PeriodRange {
            label: self.as_str().to_string(),
            start: self.start(now),
            end: now,
        }
    }
}

impl fmt::Display for UsagePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsagePeriod {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "7d" => Ok(UsagePeriod::Last7Days),
            "30d" => Ok(UsagePeriod::Last30Days),
            "90d" => Ok(UsagePeriod::Last90Days),
            "all" => Ok(UsagePeriod::AllTime),
            other => Err(AnalyticsError::InvalidRequest(format!(
                "unknown period '{}', expected 7d, 30d, 90d or all",
                other
            ))),
        }
    }
}

/// Presentation rounding for money and averages.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Milliseconds to minutes, rounded for presentation.
pub fn millis_to_minutes(millis: i64) -> Decimal {
    round2(Decimal::from(millis) / Decimal::from(60_000))
}

/// Mean of a millisecond total in seconds, rounded; zero when `count` is zero.
pub fn mean_seconds(total_millis: i64, count: u64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    round2(Decimal::from(total_millis) / Decimal::from(1_000) / Decimal::from(count))
}
