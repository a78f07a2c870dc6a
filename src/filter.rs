//! Property exclusion policy.
//!
//! Decides, per declared property, whether it may ever be written into a
//! search document. Classification runs against the *declared* content type
//! (never a runtime proxy of it) and is cached per declared type, so the
//! policy is evaluated once per type rather than once per instance. A cache
//! entry is keyed by the type's name together with its property list.

use std::sync::Arc;

use hashbrown::{Equivalent, HashMap};
use parking_lot::RwLock;
use tracing::trace;

use crate::config::IndexingConfig;
use crate::model::{ContentType, Marker, PropertyDescriptor, TypeDescriptor};

/// Separator that marks a flattened/nested property name.
pub const PATH_SEPARATOR: char = '.';

/// Reserved property names, compared case-insensitively.
pub const RESERVED_NAMES: &[&str] = &["DisplayName", "DefaultController"];

/// Generic families whose instantiations are deferred/injected values.
pub const DEFERRED_FAMILIES: &[&str] = &["Deferred", "Injected"];

/// Declared types that are never indexed: rich content blobs, culture
/// metadata, typed collections of structured content.
pub fn default_excluded_types() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::simple("PropertyCollection"),
        TypeDescriptor::simple("ContentArea"),
        TypeDescriptor::simple("Culture"),
        TypeDescriptor::generic("Enumerable", [TypeDescriptor::simple("Culture")]),
        TypeDescriptor::simple("ContentTypeDefinition"),
        TypeDescriptor::simple("Blob"),
    ]
}

// ============================================================================
// ExclusionRules
// ============================================================================

/// The static exclusion configuration. All rules are OR'd.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    reserved_names: Vec<String>,
    excluded_types: Vec<TypeDescriptor>,
    deferred_families: Vec<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            reserved_names: RESERVED_NAMES.iter().map(|s| s.to_string()).collect(),
            excluded_types: default_excluded_types(),
            deferred_families: DEFERRED_FAMILIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExclusionRules {
    /// Defaults extended with the host's configured names and types.
    pub fn from_config(config: &IndexingConfig) -> Self {
        let mut rules = Self::default();
        for name in &config.excluded_property_names {
            rules = rules.with_reserved_name(name.clone());
        }
        for ty in &config.excluded_type_names {
            rules = rules.with_excluded_type(TypeDescriptor::simple(ty.clone()));
        }
        for family in &config.deferred_wrapper_families {
            rules = rules.with_deferred_family(family.clone());
        }
        rules
    }

    pub fn with_reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved_names.push(name.into());
        self
    }

    pub fn with_excluded_type(mut self, ty: TypeDescriptor) -> Self {
        self.excluded_types.push(ty);
        self
    }

    pub fn with_deferred_family(mut self, family: impl Into<String>) -> Self {
        self.deferred_families.push(family.into());
        self
    }

    /// Whether `property` must never be serialized.
    pub fn should_exclude(&self, property: &PropertyDescriptor) -> bool {
        property.has_marker(&Marker::IndexIgnore)
            || self.is_reserved_name(&property.name)
            || property.name.contains(PATH_SEPARATOR)
            || self.is_excluded_type(&property.declared_type)
    }

    fn is_reserved_name(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|r| r.eq_ignore_ascii_case(name))
    }

    fn is_excluded_type(&self, ty: &TypeDescriptor) -> bool {
        self.excluded_types.iter().any(|excluded| excluded.same_type(ty))
            || self.deferred_families.iter().any(|family| ty.in_generic_family(family))
    }
}

// ============================================================================
// PropertyFilter
// ============================================================================

/// Positions (in the declared type's property list) of the properties that
/// may be indexed.
pub type IncludedProperties = Arc<[usize]>;

/// Owned cache key: two declared types share verdicts only if both their
/// names and their property lists are equal.
#[derive(Debug, PartialEq, Eq, Hash)]
struct TypeKey {
    name: String,
    properties: Vec<PropertyDescriptor>,
}

/// Borrowed lookup form of [`TypeKey`]. Hashes identically.
#[derive(Hash)]
struct TypeKeyRef<'a> {
    name: &'a str,
    properties: &'a [PropertyDescriptor],
}

impl<'a> TypeKeyRef<'a> {
    fn of(declared: &'a ContentType) -> Self {
        Self { name: &declared.name, properties: &declared.properties }
    }

    fn to_key(&self) -> TypeKey {
        TypeKey { name: self.name.to_string(), properties: self.properties.to_vec() }
    }
}

impl Equivalent<TypeKey> for TypeKeyRef<'_> {
    fn equivalent(&self, key: &TypeKey) -> bool {
        self.name == key.name && self.properties == key.properties.as_slice()
    }
}

/// Exclusion rules plus a per-type cache of their verdicts.
///
/// Safe to share across threads; the cache only ever grows.
#[derive(Debug, Default)]
pub struct PropertyFilter {
    rules: ExclusionRules,
    cache: RwLock<HashMap<TypeKey, IncludedProperties>>,
}

impl PropertyFilter {
    pub fn new(rules: ExclusionRules) -> Self {
        Self { rules, cache: RwLock::new(HashMap::new()) }
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    /// Indexable properties of `content_type`, resolved through any proxy
    /// to the declared type. Positions refer to `content_type.declared()`.
    pub fn included(&self, content_type: &ContentType) -> IncludedProperties {
        let declared = content_type.declared();
        let key = TypeKeyRef::of(declared);

        if let Some(hit) = self.cache.read().get(&key) {
            return hit.clone();
        }

        let included: IncludedProperties = declared
            .properties
            .iter()
            .enumerate()
            .filter(|(_, p)| !self.rules.should_exclude(p))
            .map(|(i, _)| i)
            .collect();

        trace!(
            content_type = declared.name.as_str(),
            declared = declared.properties.len(),
            included = included.len(),
            "Classified property mapping"
        );

        self.cache
            .write()
            .entry(key.to_key())
            .or_insert(included)
            .clone()
    }
}
