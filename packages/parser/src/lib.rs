//! # Weft Parser
//!
//! Scans `{{key}}` and `{{key.path}}` placeholders out of text and attribute
//! content.
//!
//! Identifiers are ASCII lowercase letters and digits. Anything that does not
//! form a complete placeholder is kept as literal text.

pub mod placeholder;
pub mod template;
pub mod tokenizer;

pub use placeholder::{PlaceholderToken, TokenKind};
pub use template::{scan, Segment, Template};
pub use tokenizer::{tokenize, Token};
