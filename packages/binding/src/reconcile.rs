//! Identity-keyed reconciliation of repeater clones.
//!
//! Each list item owns at most one clone, found by its [`ItemId`]. Items
//! seen for the first time get a clone inserted before the anchor; known
//! items are re-rendered in place; clones whose item left the list are
//! detached. Existing clones never move, so reordering a list does not
//! reorder the host tree.

use crate::builder::Builder;
use crate::error::{BindError, BindResult};
use crate::propagate::{Change, Propagator};
use crate::store::Scope;
use crate::tree::{BindingNode, ClonedSubtree, RepeaterBinding};
use crate::value::{Item, ItemId, Value};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};
use weft_dom::HostTree;

impl<'a, H: HostTree> Propagator<'a, H> {
    /// Bring the clones of `repeater` in line with `scope[key]`
    #[instrument(skip(self, repeater, scope), fields(key = %repeater.key))]
    pub fn reconcile(
        &mut self,
        repeater: &mut RepeaterBinding<H::Node>,
        scope: &dyn Scope,
    ) -> BindResult<usize> {
        let items: &[Item] = match scope.lookup(&repeater.key) {
            Some(Value::List(items)) => items.as_slice(),
            None | Some(Value::Undefined) => &[],
            Some(other) => {
                warn!(value = %other, "Repeater bound to a non-list value, rendering no items");
                &[]
            }
        };

        let mut rewritten = 0;
        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id()) {
                debug!(id = %item.id(), "Item listed twice, keeping its first clone");
                continue;
            }
            rewritten += match repeater.instances.get_mut(&item.id()) {
                Some(clone) => self.render(&mut clone.binding, item.value(), &Change::All)?,
                None => self.instantiate(repeater, item.id(), item.value())?,
            };
        }

        let stale: Vec<ItemId> = repeater
            .instances
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        for id in stale {
            if let Some(clone) = repeater.instances.remove(&id) {
                self.discard(&clone)?;
                debug!(id = %id, "Clone removed");
            }
        }

        Ok(rewritten)
    }

    /// Re-render the clone of one item. Falls back to a full reconcile when
    /// the item has no clone yet or is gone from the list.
    pub fn refresh_item(
        &mut self,
        repeater: &mut RepeaterBinding<H::Node>,
        scope: &dyn Scope,
        id: ItemId,
    ) -> BindResult<usize> {
        let item = scope
            .lookup(&repeater.key)
            .and_then(Value::as_list)
            .and_then(|items| items.iter().find(|item| item.id() == id));

        if let Some(item) = item {
            if let Some(clone) = repeater.instances.get_mut(&id) {
                return self.render(&mut clone.binding, item.value(), &Change::All);
            }
        }
        self.reconcile(repeater, scope)
    }

    fn instantiate(
        &mut self,
        repeater: &mut RepeaterBinding<H::Node>,
        id: ItemId,
        item: &Value,
    ) -> BindResult<usize> {
        let parent = self
            .host
            .parent(repeater.anchor)
            .ok_or_else(|| BindError::DetachedAnchor {
                key: repeater.key.clone(),
            })?;

        let shell = self.host.deep_clone(repeater.template)?;
        let built = Builder::new(&mut *self.host, self.options, &mut repeater.registry)
            .build_fragment(shell);
        let mut clone = match built {
            Ok(binding) => ClonedSubtree {
                nodes: self.host.children(shell),
                binding,
            },
            Err(err) => {
                self.release_quietly(shell);
                return Err(err);
            }
        };
        clone.binding.host = parent;

        match self.attach(&mut clone, parent, repeater.anchor, item) {
            Ok(rewritten) => {
                self.release_quietly(shell);
                debug!(id = %id, nodes = clone.nodes.len(), "Clone created");
                repeater.instances.insert(id, clone);
                Ok(rewritten)
            }
            Err(err) => {
                // Nothing of a half-built clone may stay in the tree
                if let Err(cleanup) = self.discard(&clone) {
                    warn!(id = %id, error = %cleanup, "Failed to remove partial clone");
                }
                self.release_quietly(shell);
                Err(err)
            }
        }
    }

    /// Move the clone's nodes before the anchor, then render them. Nodes
    /// move first so nested repeaters find a live parent.
    fn attach(
        &mut self,
        clone: &mut ClonedSubtree<H::Node>,
        parent: H::Node,
        anchor: H::Node,
        item: &Value,
    ) -> BindResult<usize> {
        for node in &clone.nodes {
            self.host.insert_before(parent, *node, Some(anchor))?;
        }
        self.render(&mut clone.binding, item, &Change::All)
    }

    /// Detach and release a clone's nodes. Clones nested at its top level sit
    /// beside them rather than inside, so they go first.
    fn discard(&mut self, clone: &ClonedSubtree<H::Node>) -> BindResult<()> {
        for repeater in &clone.binding.repeaters {
            for nested in repeater.instances.values() {
                self.discard(nested)?;
            }
        }
        for node in &clone.nodes {
            if self.host.parent(*node).is_some() {
                self.host.remove(*node)?;
            }
            self.host.release(*node)?;
        }
        self.release_templates(&clone.binding, true)
    }

    /// Release the detached templates of every repeater under `binding`.
    /// Clones of deeper repeaters live inside released nodes already, while
    /// those of `top` level repeaters were discarded on their own.
    fn release_templates(
        &mut self,
        binding: &BindingNode<H::Node>,
        top: bool,
    ) -> BindResult<()> {
        for repeater in &binding.repeaters {
            self.host.release(repeater.template)?;
            if !top {
                for nested in repeater.instances.values() {
                    self.release_templates(&nested.binding, false)?;
                }
            }
        }
        for child in &binding.children {
            self.release_templates(child, false)?;
        }
        Ok(())
    }

    fn release_quietly(&mut self, node: H::Node) {
        if let Err(err) = self.host.release(node) {
            warn!(error = %err, "Failed to release clone shell");
        }
    }
}
