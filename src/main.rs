// src/main.rs
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use apolo_call_analytics::api;
use apolo_call_analytics::config::Config;
use apolo_call_analytics::platform::{Paginator, PlatformClient};
use apolo_call_analytics::services::{AnalyticsEngine, CustomerAggregator};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    info!("🚀 Starting Apolo Call Analytics");

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Environment: {}", config.environment);

    let client = Arc::new(
        PlatformClient::new(&config.platform).context("Failed to create platform client")?,
    );
    let paginator = Arc::new(Paginator::new(client, config.platform.page_size));

    info!(
        "✅ Platform client ready: {} (page size {}, {} attempts)",
        config.platform.base_url,
        paginator.page_size(),
        paginator.client().max_attempts()
    );

    let engine = Arc::new(AnalyticsEngine::new(paginator.clone()));
    let aggregator = Arc::new(CustomerAggregator::new(paginator));

    let bind_address = config.bind_address();
    info!("🌐 Starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(web::Data::new(engine.clone()))
            .app_data(web::Data::new(aggregator.clone()))
            .configure(api::routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}
