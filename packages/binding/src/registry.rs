use crate::value::Value;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use weft_parser::{PlaceholderToken, TokenKind};

/// How a data key is observed by the bound tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Scalar,
    Object,
    Repeater,
}

/// Keys referenced under one binding root (or one repeater's item template)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    scalar_keys: BTreeSet<String>,
    /// Object key → dotted paths read below it
    object_keys: BTreeMap<String, BTreeSet<String>>,
    repeater_keys: BTreeSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_token(&mut self, token: &PlaceholderToken) {
        match token.kind {
            TokenKind::Scalar => {
                if self.scalar_keys.insert(token.key.clone()) {
                    debug!(key = %token.key, "Registered scalar key");
                }
            }
            TokenKind::Path => {
                let path = token.dotted_path();
                let paths = self.object_keys.entry(token.key.clone()).or_default();
                if paths.insert(path) {
                    debug!(key = %token.key, path = %token.dotted_path(), "Registered object path");
                }
            }
        }
    }

    pub fn register_repeater(&mut self, key: &str) {
        if self.repeater_keys.insert(key.to_string()) {
            debug!(key, "Registered repeater key");
        }
    }

    /// Kind of `key`; a key used in several ways resolves to the broadest
    /// (repeater, then object, then scalar)
    pub fn kind_of(&self, key: &str) -> Option<KeyKind> {
        if self.repeater_keys.contains(key) {
            Some(KeyKind::Repeater)
        } else if self.object_keys.contains_key(key) {
            Some(KeyKind::Object)
        } else if self.scalar_keys.contains(key) {
            Some(KeyKind::Scalar)
        } else {
            None
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.kind_of(key).is_some()
    }

    pub fn scalar_keys(&self) -> &BTreeSet<String> {
        &self.scalar_keys
    }

    pub fn object_keys(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.object_keys
    }

    pub fn repeater_keys(&self) -> &BTreeSet<String> {
        &self.repeater_keys
    }

    /// Every registered key, once
    pub fn keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.scalar_keys.clone();
        keys.extend(self.object_keys.keys().cloned());
        keys.extend(self.repeater_keys.iter().cloned());
        keys.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.scalar_keys.is_empty() && self.object_keys.is_empty() && self.repeater_keys.is_empty()
    }

    /// Value a key starts with when the data store has none: undefined for
    /// scalars, an empty list for repeaters, and for objects an object that
    /// already holds the intermediate objects of every referenced path
    pub fn initial_value(&self, key: &str) -> Value {
        match self.kind_of(key) {
            Some(KeyKind::Repeater) => Value::List(Vec::new()),
            Some(KeyKind::Object) => {
                let mut value = Value::object();
                for path in self.object_keys.get(key).into_iter().flatten() {
                    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
                    let Some((_, parents)) = segments.split_last() else {
                        continue;
                    };
                    if let Some(slot) = value.entry(parents) {
                        if slot.is_undefined() {
                            *slot = Value::object();
                        }
                    }
                }
                value
            }
            Some(KeyKind::Scalar) | None => Value::Undefined,
        }
    }
}
