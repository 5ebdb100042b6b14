/// Host wrapper for tests that need collaborator failures: it refuses
/// insertions once its budget runs out
use weft_dom::{Document, DomError, DomResult, HostTree, NodeId, NodeKind};

pub(crate) struct LimitedHost {
    pub doc: Document,
    /// Insertions still allowed, unlimited when `None`
    pub insertions_left: Option<usize>,
}

impl LimitedHost {
    pub fn new(source: &str) -> Self {
        Self {
            doc: Document::parse(source).expect("Failed to parse markup"),
            insertions_left: None,
        }
    }
}

impl HostTree for LimitedHost {
    type Node = NodeId;

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.doc.node_kind(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.doc.children(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.doc.parent(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.doc.tag_name(node)
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.doc.attributes(node)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.doc.set_attribute(node, name, value)
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.doc.text(node)
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        self.doc.set_text(node, text)
    }

    fn create_marker(&mut self) -> NodeId {
        self.doc.create_marker()
    }

    fn deep_clone(&mut self, node: NodeId) -> DomResult<NodeId> {
        self.doc.deep_clone(node)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        match self.insertions_left {
            Some(0) => return Err(DomError::HierarchyRequest { node, parent }),
            Some(left) => self.insertions_left = Some(left - 1),
            None => {}
        }
        self.doc.insert_before(parent, node, reference)
    }

    fn remove(&mut self, node: NodeId) -> DomResult<()> {
        self.doc.remove(node)
    }

    fn release(&mut self, node: NodeId) -> DomResult<()> {
        self.doc.release(node)
    }
}
