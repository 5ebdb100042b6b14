use crate::error::{BindError, BindResult};
use crate::options::BindOptions;
use crate::registry::Registry;
use crate::tree::{BindingNode, RepeaterBinding, Target, TextBinding};
use tracing::debug;
use weft_dom::{HostTree, NodeKind};
use weft_parser::Template;

/// Single depth-first walk that turns a host subtree into a binding tree,
/// registering every key it meets.
pub struct Builder<'a, H: HostTree> {
    host: &'a mut H,
    options: &'a BindOptions,
    registry: &'a mut Registry,
}

impl<'a, H: HostTree> Builder<'a, H> {
    pub fn new(host: &'a mut H, options: &'a BindOptions, registry: &'a mut Registry) -> Self {
        Self {
            host,
            options,
            registry,
        }
    }

    /// Bind `node`, its attributes, and everything below it
    pub fn build(&mut self, node: H::Node) -> BindResult<BindingNode<H::Node>> {
        let mut binding = BindingNode::new(node);
        self.bind_attributes(node, &mut binding);
        self.bind_children(node, &mut binding)?;
        Ok(binding)
    }

    /// Bind the content of a repeater clone. The shell element itself is
    /// never attached, so only its children are scanned.
    pub fn build_fragment(&mut self, shell: H::Node) -> BindResult<BindingNode<H::Node>> {
        let mut binding = BindingNode::new(shell);
        self.bind_children(shell, &mut binding)?;
        Ok(binding)
    }

    fn bind_attributes(&mut self, node: H::Node, binding: &mut BindingNode<H::Node>) {
        for (name, value) in self.host.attributes(node) {
            if let Some(template) = self.parse(&value) {
                binding
                    .texts
                    .push(TextBinding::new(Target::Attribute { node, name }, template));
            }
        }
    }

    fn bind_children(
        &mut self,
        node: H::Node,
        binding: &mut BindingNode<H::Node>,
    ) -> BindResult<()> {
        for child in self.host.children(node) {
            match self.host.node_kind(child) {
                Some(NodeKind::Text) => {
                    let text = self.host.text(child).unwrap_or_default();
                    if let Some(template) = self.parse(&text) {
                        binding
                            .texts
                            .push(TextBinding::new(Target::Text(child), template));
                    }
                }
                Some(NodeKind::Element) if self.is_repeater_marker(child) => {
                    let repeater = self.bind_repeater(node, child)?;
                    binding.repeaters.push(repeater);
                }
                Some(NodeKind::Element) => {
                    let child_binding = self.build(child)?;
                    binding.children.push(child_binding);
                }
                Some(NodeKind::Comment) | None => {}
            }
        }
        Ok(())
    }

    /// Template for `text` when it holds placeholders, registering its tokens
    fn parse(&mut self, text: &str) -> Option<Template> {
        let template = Template::parse(text);
        if !template.has_placeholders() {
            return None;
        }
        for token in template.tokens() {
            self.registry.register_token(token);
        }
        Some(template)
    }

    fn is_repeater_marker(&self, node: H::Node) -> bool {
        self.host
            .tag_name(node)
            .is_some_and(|tag| tag == self.options.repeater_tag)
    }

    /// Swap the marker for an anchor and keep it detached as the template
    fn bind_repeater(
        &mut self,
        parent: H::Node,
        marker: H::Node,
    ) -> BindResult<RepeaterBinding<H::Node>> {
        let key = self.marker_key(marker)?;
        self.check_template(marker)?;

        let anchor = self.host.create_marker();
        self.host.insert_before(parent, anchor, Some(marker))?;
        self.host.remove(marker)?;
        self.registry.register_repeater(&key);
        debug!(key = %key, "Repeater marker replaced by anchor");

        Ok(RepeaterBinding::new(key, marker, anchor))
    }

    fn marker_key(&self, marker: H::Node) -> BindResult<String> {
        self.host
            .attribute(marker, &self.options.key_attribute)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BindError::MissingRepeaterKey {
                tag: self.options.repeater_tag.clone(),
                attribute: self.options.key_attribute.clone(),
            })
    }

    /// Template content is only bound once an item is cloned, so nested
    /// markers have their keys checked here
    fn check_template(&self, node: H::Node) -> BindResult<()> {
        for child in self.host.children(node) {
            if self.host.node_kind(child) != Some(NodeKind::Element) {
                continue;
            }
            if self.is_repeater_marker(child) {
                self.marker_key(child)?;
            }
            self.check_template(child)?;
        }
        Ok(())
    }
}
