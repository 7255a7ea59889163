// src/models/mod.rs
pub mod analytics;
pub mod call;
pub mod customer;

pub use analytics::{
    AssistantUsage, CustomerUsageAnalytics, PeriodRange, SystemAnalytics, TrendPoint, UsagePeriod,
};
pub use call::{
    AssistantRecord, CallCustomer, CallRecord, CallStatus, CampaignRecord, CreateAssistantRequest,
    CustomerMetadata, PhoneNumberRecord,
};
pub use customer::{CustomerIdentity, CustomerSummary};

use serde::{Deserialize, Serialize};

// ==================== API DTOs ====================

#[derive(Debug, Deserialize)]
pub struct CustomerSearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerUsageQuery {
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerSearchResponse {
    pub customer: Option<CustomerUsageAnalytics>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
