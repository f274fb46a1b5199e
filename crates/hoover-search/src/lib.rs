//! Document-search backends for Hoover.
//!
//! The turn handler only sees the [`SearchBackend`] trait. Two
//! implementations are provided: [`CognitiveSearchClient`] for the hosted
//! search service and [`LocalIndex`], an SQLite FTS5 index used for offline
//! deployments and tests.

pub mod cognitive;
pub mod error;
pub mod local;

use async_trait::async_trait;

use hoover_core::SearchHit;

pub use cognitive::CognitiveSearchClient;
pub use error::SearchError;
pub use local::{sanitize_fts5_query, LocalIndex};

/// A document-search service returning enriched hits.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Run a full-text query and return at most `top` hits, best first.
    ///
    /// An empty or whitespace-only query returns no hits.
    async fn search(&self, query: &str, top: usize) -> Result<Vec<SearchHit>, SearchError>;
}
