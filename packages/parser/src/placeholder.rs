use serde::{Deserialize, Serialize};
use std::fmt;

/// How a placeholder reads its value from the data store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// `{{name}}` reads `data[name]`
    Scalar,
    /// `{{name.a.b}}` reads `data[name].a.b`
    Path,
}

/// A parsed `{{...}}` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaceholderToken {
    pub kind: TokenKind,
    /// First segment, the data key the token depends on
    pub key: String,
    /// Remaining segments, empty for scalar tokens
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl PlaceholderToken {
    /// Build a token from the text between the braces (`user.name`)
    pub fn from_body(body: &str) -> Self {
        let mut segments = body.split('.').map(str::to_string);
        let key = segments.next().unwrap_or_default();
        let path: Vec<String> = segments.collect();
        let kind = if path.is_empty() {
            TokenKind::Scalar
        } else {
            TokenKind::Path
        };

        Self { kind, key, path }
    }

    /// Path below the key joined with `.` (`a.b` for `{{key.a.b}}`)
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{{}", self.key)?;
        for segment in &self.path {
            write!(f, ".{}", segment)?;
        }
        write!(f, "}}}}")
    }
}
