// src/api/handlers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::AnalyticsError;
use crate::models::{
    CustomerSearchQuery, CustomerSearchResponse, CustomerUsageQuery, HealthResponse, UsagePeriod,
};
use crate::services::{AnalyticsEngine, CustomerAggregator};

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "apolo-call-analytics".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/v1/analytics/system
pub async fn system_analytics(
    engine: web::Data<Arc<AnalyticsEngine>>,
) -> Result<HttpResponse, AnalyticsError> {
    let cancel = CancellationToken::new();
    let snapshot = engine.get_system_analytics(&cancel).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// GET /api/v1/analytics/customers
pub async fn list_customers(
    aggregator: web::Data<Arc<CustomerAggregator>>,
) -> Result<HttpResponse, AnalyticsError> {
    let cancel = CancellationToken::new();
    let customers = aggregator.list_unique_customers(&cancel).await?;
    Ok(HttpResponse::Ok().json(customers))
}

/// GET /api/v1/analytics/customers/search?q=
pub async fn search_customer(
    query: web::Query<CustomerSearchQuery>,
    aggregator: web::Data<Arc<CustomerAggregator>>,
) -> Result<HttpResponse, AnalyticsError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(AnalyticsError::InvalidRequest(
            "query parameter 'q' must not be empty".to_string(),
        ));
    }

    let cancel = CancellationToken::new();
    let customer = aggregator.find_customer_by_query(term, &cancel).await?;

    let message = match &customer {
        Some(found) => format!("Found {} calls for {}", found.total_calls, found.name),
        None => format!("No customer matches '{}'", term),
    };

    Ok(HttpResponse::Ok().json(CustomerSearchResponse { customer, message }))
}

/// GET /api/v1/analytics/customers/{customer_id}?period=30d
pub async fn customer_usage(
    path: web::Path<String>,
    query: web::Query<CustomerUsageQuery>,
    engine: web::Data<Arc<AnalyticsEngine>>,
) -> Result<HttpResponse, AnalyticsError> {
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<UsagePeriod>()?,
        None => UsagePeriod::default(),
    };

    let cancel = CancellationToken::new();
    let usage = engine
        .get_customer_usage_analytics(&path.into_inner(), period, &cancel)
        .await?;

    Ok(HttpResponse::Ok().json(usage))
}

/// Fallback for unknown paths under /api/v1.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AnalyticsError> {
    Err(AnalyticsError::NotFound(format!("no route for {}", req.path())))
}
