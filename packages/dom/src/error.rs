use crate::document::NodeId;
use thiserror::Error;

pub type DomResult<T> = Result<T, DomError>;

pub type MarkupResult<T> = Result<T, MarkupError>;

/// Failures of host tree operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("Node {0:?} is not attached to a parent")]
    Detached(NodeId),

    #[error("Node {0:?} is still part of the tree and cannot be released")]
    Attached(NodeId),

    #[error("Node {node:?} is not a child of {parent:?}")]
    NotAChild { node: NodeId, parent: NodeId },

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} has no text content")]
    NotText(NodeId),

    #[error("Inserting {node:?} into {parent:?} would create a cycle")]
    HierarchyRequest { node: NodeId, parent: NodeId },
}

/// Errors raised while reading markup into a [`Document`](crate::Document)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unexpected end of input at {pos}: {message}")]
    UnexpectedEof { pos: usize, message: String },

    #[error("Closing tag </{found}> at {pos} does not match <{expected}>")]
    MismatchedClosingTag {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Closing tag </{tag}> at {pos} has no opening tag")]
    UnexpectedClosingTag { pos: usize, tag: String },

    #[error("Element <{tag}> opened at {pos} is never closed")]
    UnclosedElement { pos: usize, tag: String },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },
}

impl MarkupError {
    pub fn unexpected_eof(pos: usize, message: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            message: message.into(),
        }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }
}
