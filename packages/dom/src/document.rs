use crate::error::{DomError, DomResult, MarkupResult};
use crate::host::{HostTree, NodeKind};
use crate::markup;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Handle of a node inside a [`Document`].
///
/// The generation tells apart successive nodes stored in the same slot, so a
/// handle to a released node never reaches the node that reused its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text {
        content: String,
    },
    Comment {
        content: String,
    },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Comment { .. } => NodeKind::Comment,
        }
    }
}

/// Counters of mutations applied through [`HostTree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteStats {
    pub text_writes: usize,
    pub attribute_writes: usize,
    pub insertions: usize,
    pub removals: usize,
}

impl WriteStats {
    pub fn total(&self) -> usize {
        self.text_writes + self.attribute_writes + self.insertions + self.removals
    }
}

#[derive(Debug, Clone)]
struct NodeSlot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    node: Option<NodeSlot>,
}

/// Arena-backed document tree.
///
/// Removed nodes stay addressable but detached until they are released,
/// after which their slots are reused.
#[derive(Debug, Clone)]
pub struct Document {
    entries: Vec<Entry>,
    free: Vec<usize>,
    root: NodeId,
    stats: WriteStats,
}

pub const ROOT_TAG: &str = "#document";

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            entries: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            stats: WriteStats::default(),
        };
        doc.root = doc.alloc(NodeData::Element {
            tag: ROOT_TAG.to_string(),
            attributes: Vec::new(),
        });
        doc
    }

    /// Read markup into a new document whose root holds the top-level nodes
    pub fn parse(source: &str) -> MarkupResult<Self> {
        markup::parse(source)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.live(node).map(|slot| &slot.data)
    }

    /// Number of live nodes, the root included
    pub fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Slots in the arena, live or waiting for reuse
    pub fn allocated(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> WriteStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = WriteStats::default();
    }

    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.into(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text {
            content: content.into(),
        })
    }

    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment {
            content: content.into(),
        })
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    pub fn child_nodes(&self, node: NodeId) -> &[NodeId] {
        self.live(node)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.get(node) {
            Some(NodeData::Text { content }) => out.push_str(content),
            Some(NodeData::Element { .. }) => {
                for child in self.child_nodes(node) {
                    self.collect_text(*child, out);
                }
            }
            _ => {}
        }
    }

    /// Descendant elements with the given tag, in document order
    pub fn elements_by_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_elements(node, tag, &mut found);
        found
    }

    fn collect_elements(&self, node: NodeId, tag: &str, found: &mut Vec<NodeId>) {
        for child in self.child_nodes(node) {
            if let Some(NodeData::Element { tag: child_tag, .. }) = self.get(*child) {
                if child_tag == tag {
                    found.push(*child);
                }
                self.collect_elements(*child, tag, found);
            }
        }
    }

    pub fn first_element(&self, tag: &str) -> Option<NodeId> {
        self.elements_by_tag(self.root, tag).into_iter().next()
    }

    /// Markup of the node's children
    pub fn inner_markup(&self, node: NodeId) -> String {
        markup::serialize_children(self, node)
    }

    /// Markup of the node itself
    pub fn outer_markup(&self, node: NodeId) -> String {
        markup::serialize(self, node)
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.live(id).and_then(|slot| slot.parent);
        }
        false
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let slot = NodeSlot {
            data,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            if let Some(entry) = self.entries.get_mut(index) {
                entry.node = Some(slot);
                return NodeId {
                    index,
                    generation: entry.generation,
                };
            }
        }
        self.entries.push(Entry {
            generation: 0,
            node: Some(slot),
        });
        NodeId {
            index: self.entries.len() - 1,
            generation: 0,
        }
    }

    fn live(&self, node: NodeId) -> Option<&NodeSlot> {
        self.entries
            .get(node.index)
            .filter(|entry| entry.generation == node.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    fn slot(&self, node: NodeId) -> DomResult<&NodeSlot> {
        self.live(node).ok_or(DomError::UnknownNode(node))
    }

    fn slot_mut(&mut self, node: NodeId) -> DomResult<&mut NodeSlot> {
        self.entries
            .get_mut(node.index)
            .filter(|entry| entry.generation == node.generation)
            .and_then(|entry| entry.node.as_mut())
            .ok_or(DomError::UnknownNode(node))
    }

    /// Free `node` and its descendants, returning how many slots were freed
    fn free_subtree(&mut self, node: NodeId) -> usize {
        let mut freed = 0;
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            let Some(entry) = self
                .entries
                .get_mut(id.index)
                .filter(|entry| entry.generation == id.generation)
            else {
                continue;
            };
            if let Some(slot) = entry.node.take() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(id.index);
                pending.extend(slot.children);
                freed += 1;
            }
        }
        freed
    }

    fn detach(&mut self, node: NodeId) -> DomResult<bool> {
        let Some(parent) = self.slot(node)?.parent else {
            return Ok(false);
        };
        let siblings = &mut self.slot_mut(parent)?.children;
        siblings.retain(|child| *child != node);
        self.slot_mut(node)?.parent = None;
        Ok(true)
    }

    fn clone_subtree(&mut self, node: NodeId) -> DomResult<NodeId> {
        let data = self.slot(node)?.data.clone();
        let children = self.slot(node)?.children.clone();
        let copy = self.alloc(data);
        for child in children {
            let child_copy = self.clone_subtree(child)?;
            self.slot_mut(child_copy)?.parent = Some(copy);
            self.slot_mut(copy)?.children.push(child_copy);
        }
        Ok(copy)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTree for Document {
    type Node = NodeId;

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.get(node).map(NodeData::kind)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.child_nodes(node).to_vec()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.live(node).and_then(|slot| slot.parent)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match self.get(node) {
            Some(NodeData::Element { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match self.get(node) {
            Some(NodeData::Element { attributes, .. }) => attributes.clone(),
            _ => Vec::new(),
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        match &mut self.slot_mut(node)?.data {
            NodeData::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(attr, _)| attr == name) {
                    Some((_, existing)) => *existing = value.to_string(),
                    None => attributes.push((name.to_string(), value.to_string())),
                }
            }
            _ => return Err(DomError::NotAnElement(node)),
        }
        self.stats.attribute_writes += 1;
        trace!(node = node.index, attribute = name, "Attribute written");
        Ok(())
    }

    fn text(&self, node: NodeId) -> Option<String> {
        match self.get(node) {
            Some(NodeData::Text { content }) | Some(NodeData::Comment { content }) => {
                Some(content.clone())
            }
            _ => None,
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        match &mut self.slot_mut(node)?.data {
            NodeData::Text { content } | NodeData::Comment { content } => {
                *content = text.to_string();
            }
            NodeData::Element { .. } => return Err(DomError::NotText(node)),
        }
        self.stats.text_writes += 1;
        trace!(node = node.index, "Text written");
        Ok(())
    }

    fn create_marker(&mut self) -> NodeId {
        self.create_text("")
    }

    fn deep_clone(&mut self, node: NodeId) -> DomResult<NodeId> {
        self.clone_subtree(node)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.slot(node)?;
        if !matches!(self.slot(parent)?.data, NodeData::Element { .. }) {
            return Err(DomError::NotAnElement(parent));
        }
        if self.contains(node, parent) {
            return Err(DomError::HierarchyRequest { node, parent });
        }
        if let Some(reference) = reference {
            if self.slot(reference)?.parent != Some(parent) {
                return Err(DomError::NotAChild {
                    node: reference,
                    parent,
                });
            }
        }

        self.detach(node)?;
        let children = &mut self.slot_mut(parent)?.children;
        let index = reference
            .and_then(|reference| children.iter().position(|child| *child == reference))
            .unwrap_or(children.len());
        children.insert(index, node);
        self.slot_mut(node)?.parent = Some(parent);
        self.stats.insertions += 1;
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> DomResult<()> {
        if !self.detach(node)? {
            return Err(DomError::Detached(node));
        }
        self.stats.removals += 1;
        Ok(())
    }

    fn release(&mut self, node: NodeId) -> DomResult<()> {
        let Some(slot) = self.live(node) else {
            return Ok(());
        };
        if slot.parent.is_some() || node == self.root {
            return Err(DomError::Attached(node));
        }
        let freed = self.free_subtree(node);
        trace!(node = node.index, freed, "Subtree released");
        Ok(())
    }
}
