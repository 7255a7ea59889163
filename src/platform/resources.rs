//! Assistant lifecycle calls sharing the analytics client.

use serde_json::Value;
use tracing::{info, instrument};

use super::client::{PlatformClient, RequestOptions};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{AssistantRecord, CreateAssistantRequest};

impl PlatformClient {
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_assistant(
        &self,
        request: &CreateAssistantRequest,
    ) -> AnalyticsResult<AssistantRecord> {
        let body = serde_json::to_value(request)?;
        let reply = self.request("/assistant", RequestOptions::post(body)).await?;
        let assistant: AssistantRecord = serde_json::from_value(reply)?;

        info!("Assistant created: id={}", assistant.id);

        Ok(assistant)
    }

    /// `None` when the platform no longer knows the assistant.
    #[instrument(skip(self))]
    pub async fn get_assistant(
        &self,
        assistant_id: &str,
    ) -> AnalyticsResult<Option<AssistantRecord>> {
        let path = format!("/assistant/{}", assistant_id);

        match self.request(&path, RequestOptions::get()).await {
            Ok(Value::Object(map)) if map.is_empty() => Ok(None),
            Ok(reply) => Ok(Some(serde_json::from_value(reply)?)),
            Err(AnalyticsError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns `false` when there was nothing to delete.
    #[instrument(skip(self))]
    pub async fn delete_assistant(&self, assistant_id: &str) -> AnalyticsResult<bool> {
        let path = format!("/assistant/{}", assistant_id);

        match self.request(&path, RequestOptions::delete()).await {
            Ok(_) => {
                info!("Assistant deleted: id={}", assistant_id);
                Ok(true)
            }
            Err(AnalyticsError::Api { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
