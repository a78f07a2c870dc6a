//! # Search-Engine Client
//!
//! The boundary to the search engine. A client accepts serialized documents
//! and answers accepted or rejected. Transport (HTTP, bulk batching, retries)
//! lives behind the trait.
//!
//! | Client | Module | Description |
//! |--------|--------|-------------|
//! | `MemorySearchClient` | `memory` | Records calls, for tests and dry runs |

pub mod memory;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::document::SerializedDocument;
use crate::{Error, Result};

pub use memory::MemorySearchClient;

// ============================================================================
// Calls and outcomes
// ============================================================================

/// One document handed to the search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCall {
    pub index: String,
    /// Engine-side document type.
    pub type_name: String,
    pub id: String,
    /// Secondary processing pipeline (attachment extraction, say).
    pub pipeline: Option<String>,
    pub document: SerializedDocument,
}

/// What the engine said about an indexed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    Accepted,
    Rejected { reason: String },
}

impl IndexOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IndexOutcome::Accepted)
    }
}

// ============================================================================
// SearchClient Trait
// ============================================================================

/// The search-engine contract.
///
/// `Err` means the call could not be made at all (transport, protocol). A
/// document the engine refused is an `Ok(IndexOutcome::Rejected)`.
#[async_trait]
pub trait SearchClient: Send + Sync + 'static {
    /// Index (create or replace) one document and its siblings.
    async fn index(&self, call: IndexCall) -> Result<IndexOutcome>;

    /// Run a raw search request body against `index`.
    ///
    /// Default: not supported.
    async fn search(&self, index: &str, _body: &JsonValue) -> Result<JsonValue> {
        Err(Error::ClientError(format!("search against '{index}' not supported by this client")))
    }
}
