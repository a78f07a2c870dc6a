//! The document augmentor: base serialization plus modifier contributions.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{IndexingConfig, SpliceStrategy};
use crate::filter::{ExclusionRules, PropertyFilter};
use crate::model::ContentObject;
use crate::modifier::ModifierPipeline;
use crate::Result;
use super::splice::{splice, structured_merge};
use super::{BaseSerializer, SerializedDocument};

/// Serializes content into search documents.
///
/// Holds only immutable configuration, so one augmentor is shared by every
/// concurrent indexing task.
#[derive(Debug, Clone)]
pub struct DocumentAugmentor {
    serializer: BaseSerializer,
    pipeline: Option<ModifierPipeline>,
    strategy: SpliceStrategy,
}

impl DocumentAugmentor {
    pub fn new(serializer: BaseSerializer, pipeline: Option<ModifierPipeline>) -> Self {
        Self { serializer, pipeline, strategy: SpliceStrategy::default() }
    }

    /// Build the serializer, exclusion rules and splice strategy from `config`.
    pub fn from_config(config: &IndexingConfig, pipeline: Option<ModifierPipeline>) -> Self {
        let filter = Arc::new(PropertyFilter::new(ExclusionRules::from_config(config)));
        Self {
            serializer: BaseSerializer::new(filter, config.formatting),
            pipeline,
            strategy: config.splice_strategy,
        }
    }

    pub fn with_strategy(mut self, strategy: SpliceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn serializer(&self) -> &BaseSerializer {
        &self.serializer
    }

    pub fn pipeline(&self) -> Option<&ModifierPipeline> {
        self.pipeline.as_ref()
    }

    pub fn strategy(&self) -> SpliceStrategy {
        self.strategy
    }

    /// Serialize a value that is not content. Modifiers never run; the bytes
    /// are exactly what the base serializer produces.
    pub fn serialize_plain<T: Serialize + ?Sized>(&self, value: &T) -> Result<SerializedDocument> {
        Ok(SerializedDocument::new(self.serializer.to_vec(value)?))
    }

    /// Serialize `content` and splice in whatever the modifier pipeline
    /// contributes.
    ///
    /// A failing modifier fails the whole call; no partial document is
    /// returned. With no pipeline, or when nothing is contributed, the body is
    /// byte-identical to the base serializer's output.
    pub fn serialize_content(
        &self,
        content: &ContentObject,
        pipeline_id: Option<&str>,
    ) -> Result<SerializedDocument> {
        let base = self.serializer.serialize_content(content)?;

        let Some(pipeline) = self.pipeline.as_ref().filter(|p| !p.is_empty()) else {
            trace!(content = %content.content_ref, "No modifiers configured");
            return Ok(SerializedDocument::new(base));
        };

        let contributions = pipeline.run(content, pipeline_id)?;
        if contributions.is_empty() {
            return Ok(SerializedDocument::new(base));
        }

        let mut body = Vec::with_capacity(base.len() + 64);
        match self.strategy {
            SpliceStrategy::ByteSplice => {
                splice(&base, &contributions.fields, self.serializer.formatting(), &mut body)?
            }
            SpliceStrategy::StructuredMerge => {
                structured_merge(&base, &contributions.fields, self.serializer.formatting(), &mut body)?
            }
        }

        let siblings = contributions
            .siblings
            .iter()
            .map(|sibling| self.serializer.to_vec(sibling).map(Bytes::from))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            content = %content.content_ref,
            base_len = base.len(),
            body_len = body.len(),
            siblings = siblings.len(),
            "Augmented document"
        );
        Ok(SerializedDocument { body: Bytes::from(body), siblings })
    }
}
