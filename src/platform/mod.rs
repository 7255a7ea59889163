//! Voice platform integration
//!
//! Everything that talks to the external voice-calling platform:
//! - `client`: authenticated requests with bounded, linear-backoff retry
//! - `paginator`: full-history retrieval over the `createdAtLt` cursor
//! - `resources`: assistant lifecycle calls
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = Arc::new(PlatformClient::new(&config.platform)?);
//! let paginator = Paginator::new(client, config.platform.page_size);
//!
//! let calls = paginator.fetch_all_calls(&CancellationToken::new()).await?;
//! ```

mod backoff;
mod client;
mod paginator;
mod resources;
mod transport;

pub use backoff::{BackoffPolicy, LinearBackoff, NoBackoff};
pub use client::{PlatformClient, RequestOptions};
pub use paginator::{Paginator, PlatformRecord, DEFAULT_PAGE_SIZE};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};
