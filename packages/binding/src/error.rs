use crate::value::ItemId;
use thiserror::Error;
use weft_dom::DomError;

pub type BindResult<T> = Result<T, BindError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Repeater <{tag}> is missing its '{attribute}' attribute")]
    MissingRepeaterKey { tag: String, attribute: String },

    #[error("Anchor of repeater '{key}' is no longer attached")]
    DetachedAnchor { key: String },

    #[error("Item {id} is not in list '{key}'")]
    UnknownItem { key: String, id: ItemId },

    #[error("Host tree error: {0}")]
    Dom(#[from] DomError),
}
