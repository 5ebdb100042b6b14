//! # Weft DOM
//!
//! The host tree side of weft: the [`HostTree`] trait the binding engine
//! talks to, and [`Document`], an arena implementation with a markup
//! reader/writer and mutation counters.

pub mod document;
pub mod error;
pub mod host;
pub mod lexer;
pub mod markup;

pub use document::{Document, NodeData, NodeId, WriteStats};
pub use error::{DomError, DomResult, MarkupError, MarkupResult};
pub use host::{HostTree, NodeKind};
