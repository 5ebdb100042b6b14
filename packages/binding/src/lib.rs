//! # Weft Binding
//!
//! Keeps a region of a host tree in step with a data store. The region is
//! walked once to find `{{key}}` / `{{key.path}}` placeholders and repeater
//! markers; afterwards every write made through a [`Binding`] rewrites only
//! the text and attribute nodes whose observed values changed, and repeater
//! clones are created or removed by list item identity.
//!
//! ```ignore
//! let doc = Document::parse("<p>{{greeting}}, {{user.name}}</p>")?;
//! let root = doc.root();
//! let mut binding = Binding::bind(doc, root, Store::new())?;
//! binding.set("greeting", "Hello")?;
//! binding.object("user").set("name", "Ada")?;
//! ```

pub mod batch;
pub mod binding;
pub mod builder;
pub mod error;
pub mod intercept;
pub mod options;
pub mod propagate;
pub mod reconcile;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod tree;
pub mod value;

#[cfg(test)]
mod tests_binding;

#[cfg(test)]
mod tests_host;

#[cfg(test)]
mod tests_repeater;

pub use batch::Batch;
pub use binding::{Binding, ItemHandle, ListHandle, ObjectHandle};
pub use builder::Builder;
pub use error::{BindError, BindResult};
pub use intercept::{Intercept, InterceptorTable};
pub use options::BindOptions;
pub use propagate::{Change, Propagator};
pub use registry::{KeyKind, Registry};
pub use snapshot::Snapshot;
pub use store::{Scope, Store};
pub use tree::{BindingNode, ClonedSubtree, RepeaterBinding, Target, TextBinding};
pub use value::{display, Item, ItemId, Value};
