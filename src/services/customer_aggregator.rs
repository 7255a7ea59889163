// src/services/customer_aggregator.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::AnalyticsResult;
use crate::models::analytics::{millis_to_minutes, round2};
use crate::models::{
    AssistantUsage, CallRecord, CustomerIdentity, CustomerSummary, CustomerUsageAnalytics,
    PeriodRange,
};
use crate::platform::Paginator;
use crate::services::identity::IdentityResolver;

const UNASSIGNED_ASSISTANT: &str = "unassigned";

pub struct CustomerAggregator {
    paginator: Arc<Paginator>,
    resolver: IdentityResolver,
}

impl CustomerAggregator {
    pub fn new(paginator: Arc<Paginator>) -> Self {
        Self {
            paginator,
            resolver: IdentityResolver::default(),
        }
    }

    pub fn with_resolver(paginator: Arc<Paginator>, resolver: IdentityResolver) -> Self {
        Self { paginator, resolver }
    }

    /// Every resolvable customer, busiest first.
    #[instrument(skip(self, cancel))]
    pub async fn list_unique_customers(
        &self,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<Vec<CustomerSummary>> {
        let calls = self.paginator.fetch_all_calls(cancel).await?;
        let customers = summarize_customers(&self.resolver, &calls);

        info!(
            "Aggregated {} calls into {} customers",
            calls.len(),
            customers.len()
        );

        Ok(customers)
    }

    /// Usage of the customer whose id, email or phone number equals `query`
    /// (case-insensitive). `None` when nothing matches.
    #[instrument(skip(self, cancel))]
    pub async fn find_customer_by_query(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<Option<CustomerUsageAnalytics>> {
        let calls = self.paginator.fetch_all_calls(cancel).await?;
        Ok(find_customer(&self.resolver, &calls, query, Utc::now()))
    }
}

/// Metadata extraction is the one per-record step that can fail; such records
/// are logged and left out instead of aborting the pass.
pub(crate) fn resolve_record(
    resolver: &IdentityResolver,
    call: &CallRecord,
) -> Option<CustomerIdentity> {
    let metadata = match call.customer_metadata() {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Skipping call {} during aggregation: {}", call.id, e);
            return None;
        }
    };

    let identity = resolver.resolve_with(call, &metadata);
    if identity.is_none() {
        debug!("Call {} has no customer identifier", call.id);
    }
    identity
}

/// Folds calls into per-customer totals in a single pass.
pub fn summarize_customers(
    resolver: &IdentityResolver,
    calls: &[CallRecord],
) -> Vec<CustomerSummary> {
    let mut by_key: HashMap<String, (CustomerIdentity, UsageAccumulator)> = HashMap::new();

    for call in calls {
        let Some(identity) = resolve_record(resolver, call) else {
            continue;
        };

        match by_key.get_mut(&identity.key) {
            Some((existing, usage)) => {
                merge_identity(existing, identity);
                usage.add(call);
            }
            None => {
                let mut usage = UsageAccumulator::default();
                usage.add(call);
                by_key.insert(identity.key.clone(), (identity, usage));
            }
        }
    }

    let mut customers: Vec<CustomerSummary> = by_key
        .into_values()
        .map(|(identity, usage)| CustomerSummary {
            id: identity.key,
            name: identity.display_name,
            email: identity.email,
            phone_number: identity.phone_number,
            total_calls: usage.calls,
            total_minutes: millis_to_minutes(usage.duration_ms),
            total_cost: round2(usage.cost),
            last_call_at: usage.last_call_at,
        })
        .collect();

    customers.sort_by(|a, b| b.total_calls.cmp(&a.total_calls).then_with(|| a.id.cmp(&b.id)));
    customers
}

/// Per-key evidence gathered while resolving a search query.
#[derive(Debug, Default)]
struct QueryMatch {
    calls: u64,
    id_hit: bool,
    email_hit: bool,
    phone_hit: bool,
}

/// Resolves `query` to a single customer, then reports all of that
/// customer's calls. An id match wins over an email match, which wins over
/// a caller number match; within a tier the customer with most calls wins,
/// then the lowest key.
pub fn find_customer(
    resolver: &IdentityResolver,
    calls: &[CallRecord],
    query: &str,
    now: DateTime<Utc>,
) -> Option<CustomerUsageAnalytics> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let resolved: Vec<Option<CustomerIdentity>> = calls
        .iter()
        .map(|call| resolve_record(resolver, call))
        .collect();

    let mut candidates: HashMap<&str, QueryMatch> = HashMap::new();
    for (call, identity) in calls.iter().zip(&resolved) {
        let Some(identity) = identity else {
            continue;
        };

        let entry = candidates.entry(identity.key.as_str()).or_default();
        entry.calls += 1;
        entry.id_hit |= identity.key.to_lowercase() == needle;
        entry.email_hit |= !identity.email.is_empty() && identity.email.to_lowercase() == needle;
        entry.phone_hit |= call
            .caller_number()
            .map_or(false, |n| n.to_lowercase() == needle);
    }

    let key = best_match(&candidates, |m| m.id_hit)
        .or_else(|| best_match(&candidates, |m| m.email_hit))
        .or_else(|| best_match(&candidates, |m| m.phone_hit))?
        .to_string();

    let mut matched: Option<CustomerIdentity> = None;
    let mut usage = UsageAccumulator::default();

    for (call, identity) in calls.iter().zip(resolved) {
        let Some(identity) = identity else {
            continue;
        };
        if identity.key != key {
            continue;
        }

        usage.add(call);
        match matched.as_mut() {
            Some(existing) => merge_identity(existing, identity),
            None => matched = Some(identity),
        }
    }

    let identity = matched?;
    let period = PeriodRange {
        label: "all".to_string(),
        start: usage.first_call_at,
        end: now,
    };

    Some(usage.into_usage(&identity, period, &HashMap::new()))
}

fn best_match<'a>(
    candidates: &HashMap<&'a str, QueryMatch>,
    hit: impl Fn(&QueryMatch) -> bool,
) -> Option<&'a str> {
    candidates
        .iter()
        .filter(|(_, m)| hit(m))
        .max_by(|(key_a, a), (key_b, b)| a.calls.cmp(&b.calls).then_with(|| key_b.cmp(key_a)))
        .map(|(key, _)| *key)
}

/// Keeps the most recent identity but upgrades derived labels and fills
/// missing contact details from other calls of the same customer.
pub(crate) fn merge_identity(existing: &mut CustomerIdentity, incoming: CustomerIdentity) {
    if !existing.explicit_name && incoming.explicit_name {
        existing.display_name = incoming.display_name;
        existing.explicit_name = true;
    }
    if existing.email.is_empty() && !incoming.email.is_empty() {
        existing.email = incoming.email;
    }
    if existing.phone_number.is_none() {
        existing.phone_number = incoming.phone_number;
    }
}

#[derive(Debug, Default, Clone)]
struct AssistantTotals {
    calls: u64,
    cost: Decimal,
    duration_ms: i64,
}

/// Full-precision running totals for a set of calls.
#[derive(Debug, Default, Clone)]
pub struct UsageAccumulator {
    pub calls: u64,
    pub cost: Decimal,
    pub duration_ms: i64,
    pub first_call_at: Option<DateTime<Utc>>,
    pub last_call_at: Option<DateTime<Utc>>,
    per_assistant: HashMap<String, AssistantTotals>,
}

impl UsageAccumulator {
    pub fn add(&mut self, call: &CallRecord) {
        let cost = call.billable_cost();
        let duration_ms = call.duration().map(|d| d.num_milliseconds()).unwrap_or(0);

        self.calls += 1;
        self.cost += cost;
        self.duration_ms += duration_ms;

        for ts in [call.created_at, call.started_at, call.ended_at].into_iter().flatten() {
            if self.first_call_at.map_or(true, |first| ts < first) {
                self.first_call_at = Some(ts);
            }
            if self.last_call_at.map_or(true, |last| ts > last) {
                self.last_call_at = Some(ts);
            }
        }

        let assistant = call.assistant().unwrap_or(UNASSIGNED_ASSISTANT).to_string();
        let totals = self.per_assistant.entry(assistant).or_default();
        totals.calls += 1;
        totals.cost += cost;
        totals.duration_ms += duration_ms;
    }

    pub fn into_usage(
        self,
        identity: &CustomerIdentity,
        period: PeriodRange,
        assistant_names: &HashMap<String, String>,
    ) -> CustomerUsageAnalytics {
        let mut assistant_breakdown: Vec<AssistantUsage> = self
            .per_assistant
            .into_iter()
            .map(|(assistant_id, totals)| AssistantUsage {
                assistant_name: assistant_names.get(&assistant_id).cloned(),
                assistant_id,
                calls: totals.calls,
                minutes: millis_to_minutes(totals.duration_ms),
                cost: round2(totals.cost),
            })
            .collect();

        assistant_breakdown.sort_by(|a, b| {
            b.calls
                .cmp(&a.calls)
                .then_with(|| a.assistant_id.cmp(&b.assistant_id))
        });

        CustomerUsageAnalytics {
            customer_id: identity.key.clone(),
            name: identity.display_name.clone(),
            email: identity.email.clone(),
            phone_number: identity.phone_number.clone(),
            total_calls: self.calls,
            total_minutes: millis_to_minutes(self.duration_ms),
            total_cost: round2(self.cost),
            assistant_breakdown,
            period,
            first_call_at: self.first_call_at,
            last_call_at: self.last_call_at,
        }
    }
}
