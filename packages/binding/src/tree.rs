//! The binding tree: a structure parallel to the host subtree that records
//! which host nodes depend on which data keys.

use crate::error::BindResult;
use crate::registry::Registry;
use crate::snapshot::Snapshot;
use crate::store::Scope;
use crate::value::{display, ItemId, Value};
use std::collections::HashMap;
use tracing::trace;
use weft_dom::HostTree;
use weft_parser::{PlaceholderToken, Template, TokenKind};

/// Host location a template renders into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<N> {
    Text(N),
    Attribute { node: N, name: String },
}

/// What a token saw the last time its binding was written
#[derive(Debug, Clone)]
enum Observed {
    Value(Value),
    /// Whole-object fingerprint, so any change inside the object counts
    Object(Snapshot),
}

impl PartialEq for Observed {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Observed::Value(a), Observed::Value(b)) => a.same(b),
            (Observed::Object(a), Observed::Object(b)) => a == b,
            _ => false,
        }
    }
}

fn observe(token: &PlaceholderToken, scope: &dyn Scope) -> Observed {
    match token.kind {
        TokenKind::Scalar => Observed::Value(scope.lookup(&token.key).cloned().unwrap_or_default()),
        TokenKind::Path => Observed::Object(Snapshot::of(scope.lookup(&token.key))),
    }
}

fn resolve<'s>(token: &PlaceholderToken, scope: &'s dyn Scope) -> Option<&'s Value> {
    scope
        .lookup(&token.key)
        .and_then(|value| value.resolve(&token.path))
}

/// One bound text node or attribute
#[derive(Debug, Clone)]
pub struct TextBinding<N> {
    target: Target<N>,
    template: Template,
    last: Option<Vec<Observed>>,
}

impl<N: Copy> TextBinding<N> {
    pub fn new(target: Target<N>, template: Template) -> Self {
        Self {
            target,
            template,
            last: None,
        }
    }

    pub fn target(&self) -> &Target<N> {
        &self.target
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn reads(&self, key: &str) -> bool {
        self.template.tokens().iter().any(|token| token.key == key)
    }

    /// Rewrite the target if any token observes something new since the
    /// last write. Returns whether the host was written.
    pub fn refresh<H>(&mut self, host: &mut H, scope: &dyn Scope) -> BindResult<bool>
    where
        H: HostTree<Node = N>,
    {
        let observed: Vec<Observed> = self
            .template
            .tokens()
            .iter()
            .map(|token| observe(token, scope))
            .collect();
        if self.last.as_ref() == Some(&observed) {
            return Ok(false);
        }

        let text = self
            .template
            .render(|token| display(resolve(token, scope)));
        match &self.target {
            Target::Text(node) => host.set_text(*node, &text)?,
            Target::Attribute { node, name } => host.set_attribute(*node, name, &text)?,
        }
        trace!(template = %self.template.source(), text = %text, "Binding rewritten");
        self.last = Some(observed);
        Ok(true)
    }
}

/// Binding state of one host element
#[derive(Debug, Clone)]
pub struct BindingNode<N> {
    pub(crate) host: N,
    pub(crate) texts: Vec<TextBinding<N>>,
    pub(crate) repeaters: Vec<RepeaterBinding<N>>,
    pub(crate) children: Vec<BindingNode<N>>,
}

impl<N: Copy + Eq> BindingNode<N> {
    pub fn new(host: N) -> Self {
        Self {
            host,
            texts: Vec::new(),
            repeaters: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn host(&self) -> N {
        self.host
    }

    pub fn texts(&self) -> &[TextBinding<N>] {
        &self.texts
    }

    pub fn repeaters(&self) -> &[RepeaterBinding<N>] {
        &self.repeaters
    }

    pub fn children(&self) -> &[BindingNode<N>] {
        &self.children
    }

    /// First repeater bound to `key` in this tree, not looking inside clones
    pub fn find_repeater(&self, key: &str) -> Option<&RepeaterBinding<N>> {
        self.repeaters
            .iter()
            .find(|repeater| repeater.key == key)
            .or_else(|| {
                self.children
                    .iter()
                    .find_map(|child| child.find_repeater(key))
            })
    }

    /// Number of text bindings in this tree, clones included
    pub fn binding_count(&self) -> usize {
        self.texts.len()
            + self
                .repeaters
                .iter()
                .flat_map(|repeater| repeater.instances.values())
                .map(|clone| clone.binding.binding_count())
                .sum::<usize>()
            + self
                .children
                .iter()
                .map(BindingNode::binding_count)
                .sum::<usize>()
    }
}

/// A list-bound template region
#[derive(Debug, Clone)]
pub struct RepeaterBinding<N> {
    pub(crate) key: String,
    /// Detached marker element whose content is cloned per item
    pub(crate) template: N,
    /// Clones are inserted right before this node
    pub(crate) anchor: N,
    /// Keys read by the item template, filled as clones are scanned
    pub(crate) registry: Registry,
    pub(crate) instances: HashMap<ItemId, ClonedSubtree<N>>,
}

impl<N: Copy> RepeaterBinding<N> {
    pub fn new(key: impl Into<String>, template: N, anchor: N) -> Self {
        Self {
            key: key.into(),
            template,
            anchor,
            registry: Registry::new(),
            instances: HashMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn template(&self) -> N {
        self.template
    }

    pub fn anchor(&self) -> N {
        self.anchor
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn instance(&self, id: ItemId) -> Option<&ClonedSubtree<N>> {
        self.instances.get(&id)
    }

    /// Ids with a live clone, sorted
    pub fn instance_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.instances.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// One instantiation of a repeater template
#[derive(Debug, Clone)]
pub struct ClonedSubtree<N> {
    /// Top-level nodes, attached before the repeater anchor
    pub(crate) nodes: Vec<N>,
    pub(crate) binding: BindingNode<N>,
}

impl<N: Copy> ClonedSubtree<N> {
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn binding(&self) -> &BindingNode<N> {
        &self.binding
    }
}
