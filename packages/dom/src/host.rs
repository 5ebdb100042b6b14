use crate::error::DomResult;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Classification of a host node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

/// The document operations the binding engine relies on.
///
/// Implementations own their nodes; the engine only holds `Node` handles.
/// Reads of an unknown handle return `None`/empty, writes fail.
pub trait HostTree {
    type Node: Copy + Eq + Hash + Debug;

    fn node_kind(&self, node: Self::Node) -> Option<NodeKind>;

    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Tag name of an element, `None` for any other node
    fn tag_name(&self, node: Self::Node) -> Option<String>;

    /// Attributes of an element in document order
    fn attributes(&self, node: Self::Node) -> Vec<(String, String)>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String> {
        self.attributes(node)
            .into_iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value)
    }

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str) -> DomResult<()>;

    /// Content of a text or comment node
    fn text(&self, node: Self::Node) -> Option<String>;

    fn set_text(&mut self, node: Self::Node, text: &str) -> DomResult<()>;

    /// New detached, empty text node used to mark a position
    fn create_marker(&mut self) -> Self::Node;

    /// Detached deep copy of `node` and its descendants
    fn deep_clone(&mut self, node: Self::Node) -> DomResult<Self::Node>;

    /// Insert `node` under `parent` before `reference` (append when `None`).
    /// An attached `node` is moved.
    fn insert_before(
        &mut self,
        parent: Self::Node,
        node: Self::Node,
        reference: Option<Self::Node>,
    ) -> DomResult<()>;

    /// Detach `node` from its parent
    fn remove(&mut self, node: Self::Node) -> DomResult<()>;

    /// Drop a detached `node` and its descendants; handles into the subtree
    /// become unknown. Releasing an already unknown handle does nothing.
    fn release(&mut self, node: Self::Node) -> DomResult<()>;
}
