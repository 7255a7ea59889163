//! Call history aggregation and usage analytics for the voice platform admin.
//!
//! The platform REST API is walked page by page to obtain complete call,
//! assistant, phone number and campaign lists. Calls are grouped into
//! customers by an ordered set of identity strategies, and system or
//! per-customer usage snapshots are computed from the full history.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod services;

pub use error::{AnalyticsError, AnalyticsResult};
