use crate::error::BindResult;
use crate::options::BindOptions;
use crate::store::Scope;
use crate::tree::BindingNode;
use crate::value::ItemId;
use weft_dom::HostTree;

/// What a propagation pass has to look at
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Change {
    /// Every binding, e.g. the first render
    All,
    /// Bindings reading the key and repeaters bound to it
    Key(String),
    /// One element of a list; only its clone is refreshed
    Item { key: String, id: ItemId },
}

impl Change {
    pub fn key(&self) -> Option<&str> {
        match self {
            Change::All => None,
            Change::Key(key) | Change::Item { key, .. } => Some(key),
        }
    }

    /// Whether a pass for `self` already covers `other`
    pub fn covers(&self, other: &Change) -> bool {
        match (self, other) {
            (Change::All, _) => true,
            (Change::Key(key), Change::Item { key: item_key, .. }) => key == item_key,
            _ => self == other,
        }
    }
}

/// Walks a binding tree and writes back the bindings whose observed values
/// moved.
pub struct Propagator<'a, H: HostTree> {
    pub(crate) host: &'a mut H,
    pub(crate) options: &'a BindOptions,
}

impl<'a, H: HostTree> Propagator<'a, H> {
    pub fn new(host: &'a mut H, options: &'a BindOptions) -> Self {
        Self { host, options }
    }

    /// Local text bindings first, then repeaters, then child nodes. Returns
    /// the number of bindings rewritten, clones included.
    pub fn render(
        &mut self,
        node: &mut BindingNode<H::Node>,
        scope: &dyn Scope,
        change: &Change,
    ) -> BindResult<usize> {
        let mut rewritten = 0;

        for text in &mut node.texts {
            let affected = match change.key() {
                None => true,
                Some(key) => text.reads(key),
            };
            if affected && text.refresh(&mut *self.host, scope)? {
                rewritten += 1;
            }
        }

        for repeater in &mut node.repeaters {
            rewritten += match change {
                Change::All => self.reconcile(repeater, scope)?,
                Change::Key(key) if *key == repeater.key => self.reconcile(repeater, scope)?,
                Change::Item { key, id } if *key == repeater.key => {
                    self.refresh_item(repeater, scope, *id)?
                }
                _ => 0,
            };
        }

        for child in &mut node.children {
            rewritten += self.render(child, scope, change)?;
        }

        Ok(rewritten)
    }
}
