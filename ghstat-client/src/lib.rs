//! ghstat Greenhouse client
//!
//! The remote data source used to gather role statistics, together with the
//! session persistence it relies on.
//!
//! The engine only depends on the [`RemoteDataSource`] capability; this crate
//! provides the Greenhouse implementation ([`GreenhouseClient`]) and an
//! in-memory one ([`fake::FakeDataSource`]) for tests.
//!
//! # Example
//!
//! ```no_run
//! use ghstat_client::{ClientConfig, GreenhouseClient, RemoteDataSource};
//! use ghstat_client::session::FileSessionStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileSessionStore::default_location()?);
//!     let client = GreenhouseClient::new(ClientConfig::default(), store)?;
//!
//!     client.login().await?;
//!     println!("{}", client.fetch_title(1234567).await?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fake;
mod greenhouse;
pub mod page;
pub mod session;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use greenhouse::{ClientConfig, DEFAULT_BASE_URL, GreenhouseClient, SESSION_ENV};

use async_trait::async_trait;
use ghstat_core::query::QuerySpec;

/// Capability for reading role statistics from a remote system
///
/// Implementations are shared between concurrent workers and must be safe to
/// call from several tasks at once.
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    /// Establishes an authenticated session
    ///
    /// Calling it again on a valid session is a no-op.
    async fn login(&self) -> Result<()>;

    /// Fetches the title of a role
    async fn fetch_title(&self, role_id: u64) -> Result<String>;

    /// Counts the candidates of a role matched by `query`
    async fn fetch_count(&self, role_id: u64, query: &QuerySpec) -> Result<u64>;
}
