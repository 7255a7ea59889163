// src/services/mod.rs
pub mod analytics;
pub mod customer_aggregator;
pub mod identity;

pub use analytics::{AnalyticsEngine, ResourceCounts};
pub use customer_aggregator::{CustomerAggregator, UsageAccumulator};
pub use identity::{IdentityResolver, KeyStrategy, DEFAULT_KEY_STRATEGIES};
