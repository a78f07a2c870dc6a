//! # Indexing Modifiers
//!
//! Pluggable units that contribute extra data to an outgoing search document.
//! A modifier sees the content object (and the secondary-processing pipeline
//! id, if the request named one) and may contribute:
//!
//! - **fields** spliced into the primary document, and/or
//! - **sibling documents** sent alongside it.
//!
//! Modifiers run in registration order, each against the original content.
//! None of them can read or remove what another contributed.

pub mod builtin;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::model::ContentObject;
use crate::{Error, Result};

pub use builtin::{AncestorsModifier, MediaContentsModifier, SearchDescriptionModifier};

/// A JSON object fragment.
pub type Fragment = Map<String, JsonValue>;

// ============================================================================
// ModifierArgs
// ============================================================================

/// Per-document arguments handed to every modifier in turn.
///
/// Contributions are append-only and write-only from a modifier's point of
/// view.
pub struct ModifierArgs<'a> {
    content: &'a ContentObject,
    pipeline_id: Option<&'a str>,
    contributions: Contributions,
}

impl<'a> ModifierArgs<'a> {
    pub fn new(content: &'a ContentObject, pipeline_id: Option<&'a str>) -> Self {
        Self { content, pipeline_id, contributions: Contributions::default() }
    }

    pub fn content(&self) -> &'a ContentObject {
        self.content
    }

    /// Secondary-processing pipeline requested for this document.
    pub fn pipeline_id(&self) -> Option<&'a str> {
        self.pipeline_id
    }

    /// Contribute fields to the primary document.
    pub fn add_fields(&mut self, fields: Fragment) {
        self.contributions.fields.push(fields);
    }

    /// Contribute a single field to the primary document.
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let mut fragment = Fragment::new();
        fragment.insert(key.into(), serde_json::to_value(value)?);
        self.add_fields(fragment);
        Ok(())
    }

    /// Contribute a separate document sent after the primary one.
    pub fn add_sibling(&mut self, document: Fragment) {
        self.contributions.siblings.push(document);
    }

    fn into_contributions(self) -> Contributions {
        self.contributions
    }
}

/// Everything the pipeline contributed for one document, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contributions {
    pub fields: Vec<Fragment>,
    pub siblings: Vec<Fragment>,
}

impl Contributions {
    /// True when no modifier contributed any field or sibling.
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(Map::is_empty) && self.siblings.is_empty()
    }
}

// ============================================================================
// IndexingModifier
// ============================================================================

/// A unit that augments outgoing search documents.
pub trait IndexingModifier: Send + Sync {
    /// Identity used in error reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Inspect `args.content()` and contribute through `args`.
    fn process(&self, args: &mut ModifierArgs<'_>) -> Result<()>;
}

// ============================================================================
// ModifierPipeline
// ============================================================================

/// Fixed, ordered list of modifiers assembled by the host.
#[derive(Clone, Default)]
pub struct ModifierPipeline {
    modifiers: Vec<Arc<dyn IndexingModifier>>,
}

impl ModifierPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier; it runs after every modifier added before it.
    pub fn with(mut self, modifier: impl IndexingModifier + 'static) -> Self {
        self.modifiers.push(Arc::new(modifier));
        self
    }

    pub fn with_shared(mut self, modifier: Arc<dyn IndexingModifier>) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modifiers.iter().map(|m| m.name())
    }

    /// Run every modifier against `content`.
    ///
    /// The first failing modifier aborts the run; its error is wrapped with the
    /// modifier's name and the content's identity. Nothing contributed before
    /// the failure is returned. A panicking modifier fails the same way.
    pub fn run(&self, content: &ContentObject, pipeline_id: Option<&str>) -> Result<Contributions> {
        let mut args = ModifierArgs::new(content, pipeline_id);

        for modifier in &self.modifiers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| modifier.process(&mut args)))
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    warn!(modifier = modifier.name(), content = %content.content_ref, message, "Modifier panicked");
                    Err(Error::ExecutionError(format!("panicked: {message}")))
                });
            outcome.map_err(|source| Error::ModifierError {
                modifier: modifier.name().to_string(),
                content_id: content.content_ref.clone(),
                content_name: content.name.clone(),
                source: Box::new(source),
            })?;
        }

        let contributions = args.into_contributions();
        debug!(
            content = %content.content_ref,
            modifiers = self.modifiers.len(),
            fields = contributions.fields.len(),
            siblings = contributions.siblings.len(),
            "Ran modifier pipeline"
        );
        Ok(contributions)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl std::fmt::Debug for ModifierPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
