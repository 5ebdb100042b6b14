use crate::batch::BatchState;
use crate::builder::Builder;
use crate::error::{BindError, BindResult};
use crate::intercept::InterceptorTable;
use crate::options::BindOptions;
use crate::propagate::{Change, Propagator};
use crate::registry::Registry;
use crate::store::Store;
use crate::tree::{BindingNode, RepeaterBinding};
use crate::value::{Item, ItemId, Value};
use tracing::{debug, info, instrument};
use weft_dom::HostTree;

/// A bound region: the host tree, the data it mirrors, and everything needed
/// to keep the two in step.
#[derive(Debug)]
pub struct Binding<H: HostTree> {
    host: H,
    root: BindingNode<H::Node>,
    store: Store,
    registry: Registry,
    interceptors: InterceptorTable,
    options: BindOptions,
    pub(crate) batch: BatchState,
}

impl<H: HostTree> Binding<H> {
    pub fn bind(host: H, root: H::Node, store: Store) -> BindResult<Self> {
        Self::bind_with_options(host, root, store, BindOptions::default())
    }

    /// Build the binding tree under `root`, initialize every registered key
    /// the store lacks, and render once
    #[instrument(skip(host, store, options))]
    pub fn bind_with_options(
        mut host: H,
        root: H::Node,
        mut store: Store,
        options: BindOptions,
    ) -> BindResult<Self> {
        info!("Starting bind");

        let mut registry = Registry::new();
        let mut tree = Builder::new(&mut host, &options, &mut registry).build(root)?;
        store.adopt(&registry);
        let interceptors = InterceptorTable::from_registry(&registry);
        let rewritten = Propagator::new(&mut host, &options).render(&mut tree, &store, &Change::All)?;

        info!(
            keys = interceptors.len(),
            bindings = tree.binding_count(),
            rewritten,
            "Bind complete"
        );
        Ok(Self {
            host,
            root: tree,
            store,
            registry,
            interceptors,
            options,
            batch: BatchState::default(),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access. Edits to the bound region made here are not seen
    /// by the binding.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn root(&self) -> &BindingNode<H::Node> {
        &self.root
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// Current value of `key`, tracked or not
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.interceptors.resolve(key).get(&self.store, key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> BindResult<()> {
        self.write(key, &[], value.into()).map(|_| ())
    }

    /// Write at a dotted path such as `user.address.city`. Returns false when
    /// the path runs into a primitive and nothing was written.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> BindResult<bool> {
        let mut segments = path.split('.').map(str::to_string);
        let key = segments.next().unwrap_or_default();
        let rest: Vec<String> = segments.collect();
        self.write(&key, &rest, value.into())
    }

    /// Mutate the stored value of `key` in place. Propagates only when the
    /// value's fingerprint moved.
    pub fn update<R>(&mut self, key: &str, f: impl FnOnce(&mut Value) -> R) -> BindResult<R> {
        let interceptor = self.interceptors.resolve(key);
        let slot = interceptor.slot(&mut self.store, key);
        let before = interceptor.fingerprint(slot);
        let result = f(slot);
        let changed = interceptor.fingerprint(slot) != before;

        if changed {
            if let Some(change) = interceptor.notify(key) {
                self.propagate(change)?;
            }
        }
        Ok(result)
    }

    pub fn object(&mut self, key: &str) -> ObjectHandle<'_, H> {
        ObjectHandle {
            binding: self,
            key: key.to_string(),
            path: Vec::new(),
        }
    }

    pub fn list(&mut self, key: &str) -> ListHandle<'_, H> {
        ListHandle {
            binding: self,
            key: key.to_string(),
        }
    }

    /// Top-level repeater bound to `key`
    pub fn repeater(&self, key: &str) -> Option<&RepeaterBinding<H::Node>> {
        self.root.find_repeater(key)
    }

    /// Full pass over every binding
    pub fn render(&mut self) -> BindResult<usize> {
        self.propagate(Change::All)
    }

    pub(crate) fn write(&mut self, key: &str, path: &[String], value: Value) -> BindResult<bool> {
        let interceptor = self.interceptors.resolve(key);
        if !interceptor.set(&mut self.store, key, path, value) {
            debug!(key, "Write blocked by a non-object value");
            return Ok(false);
        }
        if let Some(change) = interceptor.notify(key) {
            self.propagate(change)?;
        }
        Ok(true)
    }

    /// Run `f` on one list item, propagating only that item's clone when
    /// its fingerprint moved
    pub(crate) fn modify_item<R>(
        &mut self,
        key: &str,
        id: ItemId,
        f: impl FnOnce(&mut Value) -> R,
    ) -> BindResult<R> {
        let interceptor = self.interceptors.resolve(key);
        let item = interceptor
            .slot(&mut self.store, key)
            .as_list_mut()
            .and_then(|items| items.iter_mut().find(|item| item.id() == id))
            .ok_or_else(|| BindError::UnknownItem {
                key: key.to_string(),
                id,
            })?;

        let before = interceptor.fingerprint(item.value());
        let result = f(item.value_mut());
        let changed = interceptor.fingerprint(item.value()) != before;

        if changed && interceptor.notify(key).is_some() {
            self.propagate(Change::Item {
                key: key.to_string(),
                id,
            })?;
        }
        Ok(result)
    }

    pub(crate) fn propagate(&mut self, change: Change) -> BindResult<usize> {
        if self.batch.is_open() {
            self.batch.defer(change);
            return Ok(0);
        }
        self.apply(&change)
    }

    pub(crate) fn apply(&mut self, change: &Change) -> BindResult<usize> {
        let rewritten = Propagator::new(&mut self.host, &self.options).render(
            &mut self.root,
            &self.store,
            change,
        )?;
        debug!(change = ?change, rewritten, "Propagated");
        Ok(rewritten)
    }
}

/// Read/write view of an object key, or of an object nested inside one
pub struct ObjectHandle<'b, H: HostTree> {
    binding: &'b mut Binding<H>,
    key: String,
    path: Vec<String>,
}

impl<'b, H: HostTree> ObjectHandle<'b, H> {
    /// Value at this handle's path, `None` when it does not resolve
    pub fn value(&self) -> Option<&Value> {
        self.binding
            .get(&self.key)
            .and_then(|value| value.resolve(&self.path))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.value().and_then(|value| value.get(field))
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> BindResult<bool> {
        let mut path = self.path.clone();
        path.push(field.to_string());
        self.binding.write(&self.key, &path, value.into())
    }

    /// Handle one level further down
    pub fn field(mut self, name: &str) -> ObjectHandle<'b, H> {
        self.path.push(name.to_string());
        self
    }

    /// Replace the value at this handle's path
    pub fn replace(&mut self, value: impl Into<Value>) -> BindResult<bool> {
        self.binding.write(&self.key, &self.path, value.into())
    }

    /// Mutate the value at this handle's path in place; `None` when the path
    /// does not resolve
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Value) -> R) -> BindResult<Option<R>> {
        let path = &self.path;
        self.binding
            .update(&self.key, |root| root.resolve_mut(path).map(f))
    }
}

/// Ordered, identity-aware view of a list key
pub struct ListHandle<'b, H: HostTree> {
    binding: &'b mut Binding<H>,
    key: String,
}

impl<'b, H: HostTree> ListHandle<'b, H> {
    pub fn items(&self) -> &[Item] {
        self.binding
            .get(&self.key)
            .and_then(Value::as_list)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items().iter().map(Item::value)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items().iter().map(Item::id).collect()
    }

    pub fn get(&self, id: ItemId) -> Option<&Value> {
        self.items()
            .iter()
            .find(|item| item.id() == id)
            .map(Item::value)
    }

    /// Append a new item and return its identity
    pub fn push(&mut self, value: impl Into<Value>) -> BindResult<ItemId> {
        let item = Item::new(value);
        let id = item.id();
        self.binding
            .update(&self.key, |list| list.list_mut().push(item))?;
        Ok(id)
    }

    /// Insert a new item at `index`, clamped to the list length. The clone
    /// is still created at the end of the rendered region.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> BindResult<ItemId> {
        let item = Item::new(value);
        let id = item.id();
        self.binding.update(&self.key, |list| {
            let items = list.list_mut();
            let index = index.min(items.len());
            items.insert(index, item);
        })?;
        Ok(id)
    }

    /// Remove the item with identity `id`, returning its value
    pub fn remove(&mut self, id: ItemId) -> BindResult<Option<Value>> {
        self.binding.update(&self.key, |list| {
            let items = list.as_list_mut()?;
            let index = items.iter().position(|item| item.id() == id)?;
            Some(items.remove(index).into_value())
        })
    }

    pub fn clear(&mut self) -> BindResult<()> {
        self.binding
            .update(&self.key, |list| list.list_mut().clear())
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Value) -> bool) -> BindResult<()> {
        self.binding.update(&self.key, |list| {
            if let Some(items) = list.as_list_mut() {
                items.retain(|item| keep(item.value()));
            }
        })
    }

    pub fn item(self, id: ItemId) -> ItemHandle<'b, H> {
        ItemHandle {
            binding: self.binding,
            key: self.key,
            id,
        }
    }
}

/// View of one list element, addressed by identity
pub struct ItemHandle<'b, H: HostTree> {
    binding: &'b mut Binding<H>,
    key: String,
    id: ItemId,
}

impl<'b, H: HostTree> ItemHandle<'b, H> {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn value(&self) -> Option<&Value> {
        self.binding
            .get(&self.key)
            .and_then(Value::as_list)
            .and_then(|items| items.iter().find(|item| item.id() == self.id))
            .map(Item::value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.value().and_then(|value| value.get(field))
    }

    /// Write one field of the item. Fails with `UnknownItem` once the item
    /// has left the list.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> BindResult<bool> {
        let path = [field.to_string()];
        let value = value.into();
        self.binding
            .modify_item(&self.key, self.id, |item| item.set_path(&path, value))
    }

    pub fn update<R>(&mut self, f: impl FnOnce(&mut Value) -> R) -> BindResult<R> {
        self.binding.modify_item(&self.key, self.id, f)
    }
}
