//! Full-history retrieval over the platform's descending-time cursor.
//!
//! The platform returns records newest first. Each page after the first is
//! bounded by `createdAtLt` taken verbatim from the last record of the page
//! before it, so the walk is strictly sequential.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::client::{PlatformClient, RequestOptions};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{AssistantRecord, CallRecord, CampaignRecord, PhoneNumberRecord};

pub const DEFAULT_PAGE_SIZE: usize = 1000;

const CURSOR_PARAM: &str = "createdAtLt";
const CREATED_AT_FIELD: &str = "createdAt";

/// Records that can be de-duplicated across pages.
pub trait PlatformRecord: DeserializeOwned {
    fn record_id(&self) -> &str;
}

impl PlatformRecord for CallRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl PlatformRecord for AssistantRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl PlatformRecord for PhoneNumberRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl PlatformRecord for CampaignRecord {
    fn record_id(&self) -> &str {
        &self.id
    }
}

pub struct Paginator {
    client: Arc<PlatformClient>,
    page_size: usize,
}

impl Paginator {
    pub fn new(client: Arc<PlatformClient>, page_size: usize) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    pub fn client(&self) -> &Arc<PlatformClient> {
        &self.client
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Complete call history, most recent first.
    pub async fn fetch_all_calls(
        &self,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<Vec<CallRecord>> {
        self.fetch_all("/call", cancel).await
    }

    pub async fn fetch_all_assistants(
        &self,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<Vec<AssistantRecord>> {
        self.fetch_all("/assistant", cancel).await
    }

    pub async fn fetch_all_phone_numbers(
        &self,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<Vec<PhoneNumberRecord>> {
        self.fetch_all("/phone-number", cancel).await
    }

    pub async fn fetch_all_campaigns(
        &self,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<Vec<CampaignRecord>> {
        self.fetch_all("/campaign", cancel).await
    }

    #[instrument(skip(self, cancel))]
    async fn fetch_all<T: PlatformRecord>(
        &self,
        endpoint: &str,
        cancel: &CancellationToken,
    ) -> AnalyticsResult<Vec<T>> {
        let mut records: Vec<T> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(AnalyticsError::Cancelled);
            }

            let mut options = RequestOptions::get().with_query("limit", self.page_size.to_string());
            if let Some(c) = &cursor {
                options = options.with_query(CURSOR_PARAM, c.clone());
            }

            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AnalyticsError::Cancelled),
                result = self.client.request(endpoint, options) => result?,
            };

            let page = page_items(endpoint, body)?;
            pages += 1;
            let page_len = page.len();

            debug!(
                "Fetched page {} of {}: {} records (cursor={:?})",
                pages, endpoint, page_len, cursor
            );

            let next_cursor = page
                .last()
                .and_then(|r| r.get(CREATED_AT_FIELD))
                .and_then(Value::as_str)
                .map(str::to_string);

            if page_len >= self.page_size && page_len >= 2 {
                let previous = page[page_len - 2].get(CREATED_AT_FIELD).and_then(Value::as_str);
                if previous.is_some() && previous == next_cursor.as_deref() {
                    warn!(
                        "Page {} of {} ends on a repeated createdAt {:?}; \
                         records sharing it beyond the page may be missed",
                        pages, endpoint, next_cursor
                    );
                }
            }

            for raw in page {
                match serde_json::from_value::<T>(raw) {
                    Ok(record) => {
                        if seen.insert(record.record_id().to_string()) {
                            records.push(record);
                        } else {
                            debug!("Dropping duplicate {} record {}", endpoint, record.record_id());
                        }
                    }
                    Err(e) => warn!("Skipping undecodable {} record: {}", endpoint, e),
                }
            }

            if page_len < self.page_size {
                break;
            }

            match next_cursor {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    warn!("Cursor for {} did not advance past {}; stopping", endpoint, next);
                    break;
                }
                Some(next) => cursor = Some(next),
                None => {
                    warn!(
                        "Last record of page {} of {} has no {}; stopping",
                        pages, endpoint, CREATED_AT_FIELD
                    );
                    break;
                }
            }
        }

        info!(
            "Retrieved {} {} records in {} pages",
            records.len(),
            endpoint,
            pages
        );

        Ok(records)
    }
}

/// Pages are bare arrays; `{"results": [...]}` envelopes are tolerated.
fn page_items(endpoint: &str, body: Value) -> AnalyticsResult<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(not_a_list(endpoint)),
            None if map.is_empty() => Ok(Vec::new()),
            None => Err(not_a_list(endpoint)),
        },
        _ => Err(not_a_list(endpoint)),
    }
}

fn not_a_list(endpoint: &str) -> AnalyticsError {
    AnalyticsError::Decode(format!("{} did not return a list", endpoint))
}
