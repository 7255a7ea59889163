// tests/common/mod.rs
//! In-memory stand-in for the voice platform REST API.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use apolo_call_analytics::config::PlatformSettings;
use apolo_call_analytics::platform::{
    ApiRequest, ApiResponse, NoBackoff, Paginator, PlatformClient, Transport, TransportError,
};

/// Serves list endpoints newest first, honouring `limit` and `createdAtLt`.
#[derive(Default)]
pub struct FakePlatform {
    collections: HashMap<String, Vec<Value>>,
    scripted: Mutex<HashMap<String, VecDeque<Vec<Value>>>>,
    failures: Mutex<HashMap<usize, u16>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, path: &str, mut records: Vec<Value>) -> Self {
        records.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
        self.collections.insert(path.to_string(), records);
        self
    }

    /// Serves `pages` in order regardless of the query, then empty pages.
    pub fn with_pages(self, path: &str, pages: Vec<Vec<Value>>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(path.to_string(), pages.into_iter().collect());
        self
    }

    /// Makes the `n`-th request (1-based) answer with `status`.
    pub fn fail_request(&self, n: usize, status: u16) {
        self.failures.lock().unwrap().insert(n, status);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `createdAtLt` of every request to `path`, in order.
    pub fn cursors(&self, path: &str) -> Vec<Option<String>> {
        self.requests()
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.query_param("createdAtLt").map(str::to_string))
            .collect()
    }

    fn list(&self, request: &ApiRequest) -> ApiResponse {
        if let Some(pages) = self.scripted.lock().unwrap().get_mut(&request.path) {
            let page = pages.pop_front().unwrap_or_default();
            return ApiResponse::new(200, Value::Array(page).to_string());
        }

        let Some(records) = self.collections.get(&request.path) else {
            return ApiResponse::new(404, r#"{"message":"Not Found"}"#);
        };

        let limit = request
            .query_param("limit")
            .and_then(|l| l.parse::<usize>().ok())
            .unwrap_or(100);
        let cursor = request.query_param("createdAtLt").map(parse_ts);

        let page: Vec<Value> = records
            .iter()
            .filter(|r| match (cursor, created_at(r)) {
                (Some(bound), Some(created)) => created < bound,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .take(limit)
            .cloned()
            .collect();

        ApiResponse::new(200, Value::Array(page).to_string())
    }
}

#[async_trait]
impl Transport for FakePlatform {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(status) = self.failures.lock().unwrap().remove(&n) {
            return Ok(ApiResponse::new(status, r#"{"message":"scripted failure"}"#));
        }

        Ok(self.list(request))
    }
}

pub fn settings() -> PlatformSettings {
    PlatformSettings {
        api_key: "test-key".to_string(),
        ..PlatformSettings::default()
    }
}

pub fn client(platform: Arc<FakePlatform>) -> Arc<PlatformClient> {
    Arc::new(PlatformClient::with_transport(&settings(), platform, Arc::new(NoBackoff)).unwrap())
}

pub fn paginator(platform: Arc<FakePlatform>, page_size: usize) -> Arc<Paginator> {
    Arc::new(Paginator::new(client(platform), page_size))
}

/// Platform timestamp format: RFC 3339 with milliseconds and a `Z` suffix.
pub fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

/// `now` truncated to whole milliseconds so it survives a round trip.
pub fn now_millis() -> DateTime<Utc> {
    parse_ts(&ts(Utc::now()))
}

fn created_at(record: &Value) -> Option<DateTime<Utc>> {
    record.get("createdAt").and_then(Value::as_str).map(parse_ts)
}
