//! REST client for the voice platform with bounded retry.

use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use super::backoff::{BackoffPolicy, LinearBackoff};
use super::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::config::PlatformSettings;
use crate::error::{AnalyticsError, AnalyticsResult};

/// Method, query string and body of a single platform call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }
}

/// Client for the voice platform REST API.
///
/// Every request carries the bearer credential. Network failures and 5xx
/// responses are retried up to `max_attempts` in total; any other non-2xx
/// status fails on the spot.
pub struct PlatformClient {
    transport: Arc<dyn Transport>,
    backoff: Arc<dyn BackoffPolicy>,
    api_key: String,
    max_attempts: u32,
}

impl PlatformClient {
    /// Builds the production client (reqwest transport, linear backoff).
    pub fn new(settings: &PlatformSettings) -> AnalyticsResult<Self> {
        Self::ensure_credential(settings)?;

        let transport = ReqwestTransport::new(&settings.base_url, settings.timeout_ms)?;
        let backoff = LinearBackoff::from_millis(settings.retry_base_ms);

        Self::with_transport(settings, Arc::new(transport), Arc::new(backoff))
    }

    pub fn with_transport(
        settings: &PlatformSettings,
        transport: Arc<dyn Transport>,
        backoff: Arc<dyn BackoffPolicy>,
    ) -> AnalyticsResult<Self> {
        Self::ensure_credential(settings)?;

        Ok(Self {
            transport,
            backoff,
            api_key: settings.api_key.trim().to_string(),
            max_attempts: settings.max_attempts.max(1),
        })
    }

    fn ensure_credential(settings: &PlatformSettings) -> AnalyticsResult<()> {
        if settings.api_key.trim().is_empty() {
            return Err(AnalyticsError::Config(
                "voice platform API key is not configured".to_string(),
            ));
        }
        Ok(())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Issues `options.method endpoint` and returns the parsed JSON body.
    #[instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> AnalyticsResult<Value> {
        let request = ApiRequest {
            method: options.method,
            path: endpoint.to_string(),
            query: options.query,
            bearer_token: self.api_key.clone(),
            body: options.body,
        };

        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let failure = match self.transport.send(&request).await {
                Ok(response) if (200..300).contains(&response.status) => {
                    debug!(
                        "Voice platform response: status={}, attempt={}",
                        response.status, attempt
                    );
                    return Self::parse_body(endpoint, response);
                }
                Ok(response) => {
                    let status = response.status;
                    let err = AnalyticsError::Api {
                        status,
                        body: response.body,
                    };
                    if status < 500 {
                        warn!("Voice platform rejected {}: status={}", endpoint, status);
                        return Err(err);
                    }
                    err
                }
                Err(e) => AnalyticsError::Network(e.0),
            };

            if attempt >= self.max_attempts {
                error!(
                    "Voice platform request to {} failed after {} attempts: {}",
                    endpoint, attempt, failure
                );
                return Err(failure);
            }

            let delay = self.backoff.delay(attempt);
            warn!(
                "Transient failure on {} (attempt {}/{}): {} - retrying in {:?}",
                endpoint, attempt, self.max_attempts, failure, delay
            );

            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }

    fn parse_body(endpoint: &str, response: ApiResponse) -> AnalyticsResult<Value> {
        if response.status == 204 || response.body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            AnalyticsError::Decode(format!("{} returned invalid JSON: {}", endpoint, e))
        })
    }
}
