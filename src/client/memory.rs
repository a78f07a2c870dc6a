//! In-memory search client.
//!
//! Keeps every accepted call in order. Rejects documents whose bodies are
//! not JSON objects, plus any id registered with [`MemorySearchClient::reject_id`].

use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashSet;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::{IndexCall, IndexOutcome, SearchClient};
use crate::Result;

#[derive(Clone, Default)]
pub struct MemorySearchClient {
    inner: Arc<MemoryClientInner>,
}

#[derive(Default)]
struct MemoryClientInner {
    calls: RwLock<Vec<IndexCall>>,
    rejected_ids: RwLock<HashSet<String>>,
    search_response: RwLock<Option<JsonValue>>,
}

impl MemorySearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the engine refuse documents with this id.
    pub fn reject_id(&self, id: impl Into<String>) {
        self.inner.rejected_ids.write().insert(id.into());
    }

    /// Response returned by every subsequent `search` call.
    pub fn set_search_response(&self, response: JsonValue) {
        *self.inner.search_response.write() = Some(response);
    }

    /// Accepted calls, in arrival order.
    pub fn calls(&self) -> Vec<IndexCall> {
        self.inner.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.read().len()
    }

    /// The latest accepted call for `id`.
    pub fn document(&self, id: &str) -> Option<IndexCall> {
        self.inner.calls.read().iter().rev().find(|c| c.id == id).cloned()
    }
}

fn invalid_payload(call: &IndexCall) -> Option<String> {
    let payloads = std::iter::once(&call.document.body).chain(&call.document.siblings);
    for (position, payload) in payloads.enumerate() {
        match serde_json::from_slice::<JsonValue>(payload) {
            Ok(JsonValue::Object(_)) => {}
            Ok(_) => return Some(format!("payload {position} is not a JSON object")),
            Err(e) => return Some(format!("payload {position} failed to parse: {e}")),
        }
    }
    None
}

#[async_trait]
impl SearchClient for MemorySearchClient {
    async fn index(&self, call: IndexCall) -> Result<IndexOutcome> {
        if self.inner.rejected_ids.read().contains(&call.id) {
            warn!(id = call.id.as_str(), "Document rejected");
            return Ok(IndexOutcome::Rejected { reason: format!("document {} refused", call.id) });
        }
        if let Some(reason) = invalid_payload(&call) {
            warn!(id = call.id.as_str(), reason = reason.as_str(), "Malformed document rejected");
            return Ok(IndexOutcome::Rejected { reason });
        }

        debug!(index = call.index.as_str(), id = call.id.as_str(), bytes = call.document.body.len(), "Indexed");
        self.inner.calls.write().push(call);
        Ok(IndexOutcome::Accepted)
    }

    async fn search(&self, _index: &str, _body: &JsonValue) -> Result<JsonValue> {
        Ok(self
            .inner
            .search_response
            .read()
            .clone()
            .unwrap_or_else(|| serde_json::json!({"hits": {"total": 0, "hits": []}})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SerializedDocument;
    use bytes::Bytes;

    fn call(id: &str, body: &'static [u8]) -> IndexCall {
        IndexCall {
            index: "content".into(),
            type_name: "StandardPage".into(),
            id: id.into(),
            pipeline: None,
            document: SerializedDocument::new(Bytes::from_static(body)),
        }
    }

    #[tokio::test]
    async fn test_accepts_and_records() {
        let client = MemorySearchClient::new();
        let outcome = client.index(call("1", br#"{"a":1}"#)).await.unwrap();

        assert!(outcome.is_accepted());
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.document("1").unwrap().type_name, "StandardPage");
    }

    #[tokio::test]
    async fn test_rejects_malformed_payloads() {
        let client = MemorySearchClient::new();
        for body in [&b"{\"a\":1"[..], &b"[]"[..], &b""[..]] {
            let mut c = call("1", b"{}");
            c.document.body = Bytes::copy_from_slice(body);
            assert!(!client.index(c).await.unwrap().is_accepted());
        }

        let mut c = call("2", b"{}");
        c.document.siblings.push(Bytes::from_static(b"nope"));
        assert!(!client.index(c).await.unwrap().is_accepted());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_registered_ids() {
        let client = MemorySearchClient::new();
        client.reject_id("9");
        let outcome = client.index(call("9", b"{}")).await.unwrap();
        assert!(matches!(outcome, IndexOutcome::Rejected { .. }));
        assert!(client.document("9").is_none());
    }

    #[tokio::test]
    async fn test_search_response() {
        let client = MemorySearchClient::new();
        let empty = client.search("content", &serde_json::json!({})).await.unwrap();
        assert_eq!(empty["hits"]["total"], 0);

        client.set_search_response(serde_json::json!({"hits": {"total": 1, "hits": []}}));
        let response = client.search("content", &serde_json::json!({})).await.unwrap();
        assert_eq!(response["hits"]["total"], 1);
    }
}
