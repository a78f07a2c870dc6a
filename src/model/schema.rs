//! Declared content schemas: content types, their properties, and the
//! declared types of those properties.
//!
//! The indexer never inspects live instances to decide what to write; it
//! classifies the *declared* members of a content type once and reuses the
//! answer for every instance of that type.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Declared type of a property.
///
/// Generic types keep their family name in `name` and their type arguments in
/// `generic_args`, so `Deferred<Page>` is `{ name: "Deferred", generic_args: [Page] }`.
/// `base` links a declared type to the type it derives from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_args: Vec<TypeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    pub fn simple(name: impl Into<String>) -> Self {
        Self { name: name.into(), generic_args: Vec::new(), base: None }
    }

    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            generic_args: args.into_iter().collect(),
            base: None,
        }
    }

    pub fn with_base(mut self, base: TypeDescriptor) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_args.is_empty()
    }

    /// Exact type identity: same name and same type arguments.
    /// The base chain is not part of a type's identity.
    pub fn same_type(&self, other: &TypeDescriptor) -> bool {
        self.name == other.name
            && self.generic_args.len() == other.generic_args.len()
            && self
                .generic_args
                .iter()
                .zip(&other.generic_args)
                .all(|(a, b)| a.same_type(b))
    }

    /// Whether this type, or any type in its base chain, is an instantiation
    /// of the generic family `family`, whatever its type arguments.
    pub fn in_generic_family(&self, family: &str) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.is_generic() && ty.name == family {
                return true;
            }
            current = ty.base.as_deref();
        }
        false
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_generic() {
            write!(f, "<")?;
            for (i, arg) in self.generic_args.iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Annotation attached to a declared property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    /// Never write this property into a search document.
    IndexIgnore,
    Custom(String),
}

/// A property as declared on a content type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub declared_type: TypeDescriptor,
    #[serde(default)]
    pub markers: SmallVec<[Marker; 2]>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, declared_type: TypeDescriptor) -> Self {
        Self { name: name.into(), declared_type, markers: SmallVec::new() }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn has_marker(&self, marker: &Marker) -> bool {
        self.markers.contains(marker)
    }
}

/// A content type: its name and declared properties.
///
/// A runtime proxy (a generated subtype that wraps a declared type) sets
/// `proxy_of`; its own property list is not authoritative and carries no
/// markers. Classification always goes through [`ContentType::declared`].
#[derive(Debug, Clone)]
pub struct ContentType {
    pub name: String,
    pub properties: Vec<PropertyDescriptor>,
    pub proxy_of: Option<Arc<ContentType>>,
}

impl ContentType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), properties: Vec::new(), proxy_of: None }
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// A runtime-generated subtype wrapping `declared`.
    ///
    /// The proxy re-declares the same property names without their markers,
    /// the way generated subclasses override members.
    pub fn proxy(name: impl Into<String>, declared: Arc<ContentType>) -> Self {
        let properties = declared
            .properties
            .iter()
            .map(|p| PropertyDescriptor::new(p.name.clone(), p.declared_type.clone()))
            .collect();
        Self { name: name.into(), properties, proxy_of: Some(declared) }
    }

    /// The declared (non-proxy) type at the bottom of the proxy chain.
    pub fn declared(&self) -> &ContentType {
        let mut current = self;
        while let Some(inner) = current.proxy_of.as_deref() {
            current = inner;
        }
        current
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.declared().name == other.declared().name && self.name == other.name
    }
}
