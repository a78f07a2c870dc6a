//! # Content Model
//!
//! Clean DTOs for indexable content and the relations between content nodes.
//! These types cross every boundary: storage ↔ resolver ↔ serializer ↔ client.
//!
//! Design rule: this module is pure data. No I/O, no state, no async.

pub mod content;
pub mod relation;
pub mod schema;
pub mod value;
pub mod property_map;

pub use content::{ContentKind, ContentObject, ContentRef, ParseContentRefError};
pub use relation::{RelationEdge, RelationKind};
pub use schema::{ContentType, Marker, PropertyDescriptor, TypeDescriptor};
pub use value::{Blob, Value};
pub use property_map::{map_of, PropertyMap};
