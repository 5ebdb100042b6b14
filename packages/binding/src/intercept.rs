//! Per-key write interception.
//!
//! Every data key is served by one [`Intercept`] implementation, chosen once
//! at bind time from the registry. The implementation decides where the
//! value lives, how "changed" is judged, and which propagation a write
//! triggers.

use crate::propagate::Change;
use crate::registry::{KeyKind, Registry};
use crate::snapshot::Snapshot;
use crate::store::Store;
use crate::value::Value;
use std::collections::HashMap;

pub trait Intercept {
    /// Registry kind served, `None` for untracked keys
    fn kind(&self) -> Option<KeyKind>;

    fn get<'s>(&self, store: &'s Store, key: &str) -> Option<&'s Value>;

    /// Storage for `key`, created undefined when missing
    fn slot<'s>(&self, store: &'s mut Store, key: &str) -> &'s mut Value;

    /// Fingerprint compared before and after an in-place update
    fn fingerprint(&self, value: &Value) -> Snapshot;

    /// Propagation owed after `key` was written
    fn notify(&self, key: &str) -> Option<Change>;

    /// Write `value` at `path` below `key`; false when the path is blocked
    /// by a primitive or an out-of-range index
    fn set(&self, store: &mut Store, key: &str, path: &[String], value: Value) -> bool {
        self.slot(store, key).set_path(path, value)
    }
}

pub struct ScalarInterceptor;

impl Intercept for ScalarInterceptor {
    fn kind(&self) -> Option<KeyKind> {
        Some(KeyKind::Scalar)
    }

    fn get<'s>(&self, store: &'s Store, key: &str) -> Option<&'s Value> {
        store.tracked(key)
    }

    fn slot<'s>(&self, store: &'s mut Store, key: &str) -> &'s mut Value {
        store.tracked_slot(key)
    }

    // Scalars render lists too, so item identity counts
    fn fingerprint(&self, value: &Value) -> Snapshot {
        Snapshot::with_identity(Some(value))
    }

    fn notify(&self, key: &str) -> Option<Change> {
        Some(Change::Key(key.to_string()))
    }
}

/// Object keys compare structurally, whole object at a time
pub struct ObjectInterceptor;

impl Intercept for ObjectInterceptor {
    fn kind(&self) -> Option<KeyKind> {
        Some(KeyKind::Object)
    }

    fn get<'s>(&self, store: &'s Store, key: &str) -> Option<&'s Value> {
        store.tracked(key)
    }

    fn slot<'s>(&self, store: &'s mut Store, key: &str) -> &'s mut Value {
        store.tracked_slot(key)
    }

    fn fingerprint(&self, value: &Value) -> Snapshot {
        Snapshot::of(Some(value))
    }

    fn notify(&self, key: &str) -> Option<Change> {
        Some(Change::Key(key.to_string()))
    }
}

pub struct RepeaterInterceptor;

impl Intercept for RepeaterInterceptor {
    fn kind(&self) -> Option<KeyKind> {
        Some(KeyKind::Repeater)
    }

    fn get<'s>(&self, store: &'s Store, key: &str) -> Option<&'s Value> {
        store.tracked(key)
    }

    fn slot<'s>(&self, store: &'s mut Store, key: &str) -> &'s mut Value {
        store.tracked_slot(key)
    }

    fn fingerprint(&self, value: &Value) -> Snapshot {
        Snapshot::with_identity(Some(value))
    }

    fn notify(&self, key: &str) -> Option<Change> {
        Some(Change::Key(key.to_string()))
    }
}

/// Keys no placeholder reads: kept in the side table, never propagated
pub struct UntrackedInterceptor;

impl Intercept for UntrackedInterceptor {
    fn kind(&self) -> Option<KeyKind> {
        None
    }

    fn get<'s>(&self, store: &'s Store, key: &str) -> Option<&'s Value> {
        store.untracked(key)
    }

    fn slot<'s>(&self, store: &'s mut Store, key: &str) -> &'s mut Value {
        store.untracked_slot(key)
    }

    fn fingerprint(&self, value: &Value) -> Snapshot {
        Snapshot::of(Some(value))
    }

    fn notify(&self, _key: &str) -> Option<Change> {
        None
    }
}

static SCALAR: ScalarInterceptor = ScalarInterceptor;
static OBJECT: ObjectInterceptor = ObjectInterceptor;
static REPEATER: RepeaterInterceptor = RepeaterInterceptor;
static UNTRACKED: UntrackedInterceptor = UntrackedInterceptor;

fn interceptor_for(kind: KeyKind) -> &'static dyn Intercept {
    match kind {
        KeyKind::Scalar => &SCALAR,
        KeyKind::Object => &OBJECT,
        KeyKind::Repeater => &REPEATER,
    }
}

/// Key → interceptor lookup, fixed once the tree is bound
#[derive(Default)]
pub struct InterceptorTable {
    entries: HashMap<String, &'static dyn Intercept>,
}

impl InterceptorTable {
    pub fn from_registry(registry: &Registry) -> Self {
        let entries = registry
            .keys()
            .into_iter()
            .filter_map(|key| {
                let kind = registry.kind_of(&key)?;
                Some((key, interceptor_for(kind)))
            })
            .collect();
        Self { entries }
    }

    /// Interceptor for `key`; unknown keys are untracked
    pub fn resolve(&self, key: &str) -> &'static dyn Intercept {
        self.entries.get(key).copied().unwrap_or(&UNTRACKED)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for InterceptorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, entry)| (key, entry.kind())))
            .finish()
    }
}
