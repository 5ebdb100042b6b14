use serde::{Deserialize, Serialize};

pub const DEFAULT_REPEATER_TAG: &str = "template";
pub const DEFAULT_KEY_ATTRIBUTE: &str = "for";

/// How repeater markers are recognized in the host tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindOptions {
    /// Tag of the inert element whose content is the per-item template
    #[serde(default = "default_repeater_tag")]
    pub repeater_tag: String,

    /// Attribute on the marker naming the list key
    #[serde(default = "default_key_attribute")]
    pub key_attribute: String,
}

fn default_repeater_tag() -> String {
    DEFAULT_REPEATER_TAG.to_string()
}

fn default_key_attribute() -> String {
    DEFAULT_KEY_ATTRIBUTE.to_string()
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            repeater_tag: default_repeater_tag(),
            key_attribute: default_key_attribute(),
        }
    }
}
