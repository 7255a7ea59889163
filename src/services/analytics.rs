// src/services/analytics.rs
//! System-wide and per-customer usage metrics.
//!
//! Everything is recomputed from the full call history on each request.
//! Window membership uses call creation time with an inclusive cutoff:
//! a call created exactly `N` days before `now` belongs to the N-day window.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::analytics::{mean_seconds, millis_to_minutes, round2};
use crate::models::{
    CallRecord, CustomerIdentity, CustomerUsageAnalytics, SystemAnalytics, TrendPoint, UsagePeriod,
};
use crate::platform::Paginator;
use crate::services::customer_aggregator::{merge_identity, resolve_record, UsageAccumulator};
use crate::services::identity::IdentityResolver;

const SHORT_WINDOW_DAYS: i64 = 7;
const LONG_WINDOW_DAYS: i64 = 30;

/// Sizes of the resource lists that feed the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceCounts {
    pub assistants: u64,
    pub phone_numbers: u64,
    pub campaigns: u64,
}

pub struct AnalyticsEngine {
    paginator: Arc<Paginator>,
    resolver: IdentityResolver,
}

impl AnalyticsEngine {
    pub fn new(paginator: Arc<Paginator>) -> Self {
        Self {
            paginator,
            resolver: IdentityResolver::default(),
        }
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_system_analytics(
        &self,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<SystemAnalytics> {
        let calls = self.paginator.fetch_all_calls(cancel).await?;
        let assistants = self.paginator.fetch_all_assistants(cancel).await?;
        let phone_numbers = self.paginator.fetch_all_phone_numbers(cancel).await?;
        let campaigns = self.paginator.fetch_all_campaigns(cancel).await?;

        let resources = ResourceCounts {
            assistants: assistants.len() as u64,
            phone_numbers: phone_numbers.len() as u64,
            campaigns: campaigns.len() as u64,
        };

        let snapshot = compute_system_analytics(&self.resolver, &calls, resources, Utc::now());

        info!(
            "System analytics: calls={}, customers={}, cost={}",
            snapshot.total_calls, snapshot.total_customers, snapshot.total_cost
        );

        Ok(snapshot)
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_customer_usage_analytics(
        &self,
        customer_id: &str,
        period: UsagePeriod,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<CustomerUsageAnalytics> {
        let customer_id = customer_id.trim();
        if customer_id.is_empty() {
            return Err(AnalyticsError::InvalidRequest(
                "customer id must not be empty".to_string(),
            ));
        }

        let calls = self.paginator.fetch_all_calls(cancel).await?;
        let assistants = self.paginator.fetch_all_assistants(cancel).await?;

        let assistant_names: HashMap<String, String> = assistants
            .into_iter()
            .filter_map(|a| a.name.map(|name| (a.id, name)))
            .collect();

        Ok(compute_customer_usage(
            &self.resolver,
            &calls,
            customer_id,
            period,
            &assistant_names,
            Utc::now(),
        ))
    }
}

#[derive(Debug, Default)]
struct DayBucket {
    calls: u64,
    cost: Decimal,
    duration_ms: i64,
}

/// Single pass over `calls`; rounding happens only when building the result.
pub fn compute_system_analytics(
    resolver: &IdentityResolver,
    calls: &[CallRecord],
    resources: ResourceCounts,
    now: DateTime<Utc>,
) -> SystemAnalytics {
    let short_cutoff = now - Duration::days(SHORT_WINDOW_DAYS);
    let long_cutoff = now - Duration::days(LONG_WINDOW_DAYS);

    let mut total_cost = Decimal::ZERO;
    let mut duration_ms: i64 = 0;
    let mut timed_calls: u64 = 0;
    let mut successful: u64 = 0;
    let mut setup_ms: i64 = 0;
    let mut setup_samples: u64 = 0;
    let mut short_calls: u64 = 0;
    let mut short_cost = Decimal::ZERO;
    let mut long_calls: u64 = 0;
    let mut long_cost = Decimal::ZERO;
    let mut trend: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    let mut calls_by_status: BTreeMap<String, u64> = BTreeMap::new();
    let mut customers: HashSet<String> = HashSet::new();

    for call in calls {
        let cost = call.billable_cost();
        let call_ms = call.duration().map(|d| d.num_milliseconds());

        total_cost += cost;
        if let Some(ms) = call_ms {
            duration_ms += ms;
            timed_calls += 1;
        }
        if call.is_successful() {
            successful += 1;
        }
        if let Some(latency) = call.setup_latency() {
            setup_ms += latency.num_milliseconds();
            setup_samples += 1;
        }
        *calls_by_status
            .entry(call.status.as_str().to_string())
            .or_insert(0) += 1;

        if let Some(created) = call.created_at {
            if created >= short_cutoff {
                short_calls += 1;
                short_cost += cost;
            }
            if created >= long_cutoff {
                long_calls += 1;
                long_cost += cost;

                let bucket = trend.entry(created.date_naive()).or_default();
                bucket.calls += 1;
                bucket.cost += cost;
                bucket.duration_ms += call_ms.unwrap_or(0);
            }
        }

        if let Some(identity) = resolve_record(resolver, call) {
            customers.insert(identity.key);
        }
    }

    let total_calls = calls.len() as u64;
    let (success_rate, failure_rate) = if total_calls == 0 {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let success =
            round2(Decimal::from(successful) * Decimal::ONE_HUNDRED / Decimal::from(total_calls));
        (success, Decimal::ONE_HUNDRED - success)
    };

    SystemAnalytics {
        total_cost: round2(total_cost),
        total_calls,
        total_customers: customers.len() as u64,
        total_minutes: millis_to_minutes(duration_ms),
        average_call_duration: mean_seconds(duration_ms, timed_calls),
        total_assistants: resources.assistants,
        total_phone_numbers: resources.phone_numbers,
        total_campaigns: resources.campaigns,
        calls_last_7_days: short_calls,
        cost_last_7_days: round2(short_cost),
        calls_last_30_days: long_calls,
        cost_last_30_days: round2(long_cost),
        trend: trend
            .into_iter()
            .map(|(date, bucket)| TrendPoint {
                date,
                calls: bucket.calls,
                cost: round2(bucket.cost),
                minutes: millis_to_minutes(bucket.duration_ms),
            })
            .collect(),
        success_rate,
        failure_rate,
        average_setup_time: mean_seconds(setup_ms, setup_samples),
        calls_by_status,
        generated_at: now,
    }
}

/// Usage of the customer whose resolved key is `customer_id`, restricted to
/// calls created inside `period`. Unknown customers yield a zeroed snapshot.
pub fn compute_customer_usage(
    resolver: &IdentityResolver,
    calls: &[CallRecord],
    customer_id: &str,
    period: UsagePeriod,
    assistant_names: &HashMap<String, String>,
    now: DateTime<Utc>,
) -> CustomerUsageAnalytics {
    let start = period.start(now);
    let mut usage = UsageAccumulator::default();
    let mut identity = None;

    for call in calls {
        let in_period = match (start, call.created_at) {
            (None, _) => true,
            (Some(start), Some(created)) => created >= start,
            (Some(_), None) => false,
        };
        if !in_period {
            continue;
        }

        let Some(resolved) = resolve_record(resolver, call) else {
            continue;
        };
        if resolved.key != customer_id {
            continue;
        }

        usage.add(call);
        match identity.as_mut() {
            Some(existing) => merge_identity(existing, resolved),
            None => identity = Some(resolved),
        }
    }

    let identity = identity.unwrap_or_else(|| CustomerIdentity {
        key: customer_id.to_string(),
        display_name: format!("Customer {}", customer_id.chars().take(8).collect::<String>()),
        email: String::new(),
        phone_number: None,
        explicit_name: false,
    });

    usage.into_usage(&identity, period.range(now), assistant_names)
}
