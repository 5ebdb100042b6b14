use crate::registry::Registry;
use crate::value::Value;
use std::collections::BTreeMap;

/// Where placeholders look up their keys
pub trait Scope {
    fn lookup(&self, key: &str) -> Option<&Value>;
}

/// Data owned by a binding root.
///
/// `values` holds the keys the bound tree references; `other` is the side
/// table for everything else, readable but never observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    values: BTreeMap<String, Value>,
    other: BTreeMap<String, Value>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store from a JSON object; anything else yields an empty store
    pub fn from_json(json: serde_json::Value) -> Self {
        match Value::from(json) {
            Value::Object(map) => Self {
                values: map,
                other: BTreeMap::new(),
            },
            _ => Self::default(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Tracked value first, then the side table
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).or_else(|| self.other.get(key))
    }

    pub fn tracked(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn untracked(&self, key: &str) -> Option<&Value> {
        self.other.get(key)
    }

    pub(crate) fn tracked_slot(&mut self, key: &str) -> &mut Value {
        self.values.entry(key.to_string()).or_default()
    }

    pub(crate) fn untracked_slot(&mut self, key: &str) -> &mut Value {
        self.other.entry(key.to_string()).or_default()
    }

    /// Move values the registry does not know about into the side table,
    /// then give every registered key without a value its initial one
    pub(crate) fn adopt(&mut self, registry: &Registry) {
        let values = std::mem::take(&mut self.values);
        for (key, value) in values {
            if registry.contains(&key) {
                self.values.insert(key, value);
            } else {
                self.other.insert(key, value);
            }
        }
        for key in registry.keys() {
            if !self.values.contains_key(&key) {
                let initial = registry.initial_value(&key);
                self.values.insert(key, initial);
            }
        }
    }

    /// Everything in the store as a JSON object (undefined values omitted)
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .chain(self.other.iter())
                .filter_map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                .collect(),
        )
    }
}

impl Scope for Store {
    fn lookup(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// A list item binds its own fields; non-object items expose nothing
impl Scope for Value {
    fn lookup(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Store
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            other: BTreeMap::new(),
        }
    }
}
