//! PropertyMap: the key-value store on content objects.

use std::collections::BTreeMap;
use super::Value;

/// A map of property names to values.
///
/// Ordered so that nested maps serialize identically on every run.
pub type PropertyMap = BTreeMap<String, Value>;

/// Build a map value from (key, value) pairs.
pub fn map_of<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Value
where
    K: Into<String>,
    V: Into<Value>,
{
    Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
}
