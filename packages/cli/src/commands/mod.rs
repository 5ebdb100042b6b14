pub mod keys;
pub mod render;

pub use keys::{keys, KeysArgs};
pub use render::{render, RenderArgs};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use weft_binding::{Store, Value};
use weft_dom::Document;

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Expected PATH=VALUE, got '{0}'")]
    InvalidAssignment(String),

    #[error("Data file {0} must hold a JSON object")]
    DataNotAnObject(String),
}

/// One `--set` write
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: String,
    pub value: Value,
}

impl Assignment {
    /// Parse `path=json`. A value that is not valid JSON is taken as a plain
    /// string, so `name=Ada` works without quoting.
    pub fn parse(source: &str) -> Result<Self, CommandError> {
        let (path, raw) = source
            .split_once('=')
            .ok_or_else(|| CommandError::InvalidAssignment(source.to_string()))?;
        let path = path.trim();
        if path.is_empty() {
            return Err(CommandError::InvalidAssignment(source.to_string()));
        }

        let value = serde_json::from_str::<serde_json::Value>(raw)
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(raw));
        Ok(Self {
            path: path.to_string(),
            value,
        })
    }
}

pub(crate) fn resolve_path(path: &Path, cwd: &str) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(cwd).join(path)
    }
}

pub(crate) fn load_template(path: &Path, cwd: &str) -> Result<Document> {
    let path = resolve_path(path, cwd);
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    let doc = Document::parse(&source)
        .with_context(|| format!("Failed to parse template {}", path.display()))?;
    Ok(doc)
}

pub(crate) fn load_store(path: Option<&Path>, cwd: &str) -> Result<Store> {
    let Some(path) = path else {
        return Ok(Store::new());
    };
    let path = resolve_path(path, cwd);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse data file {}", path.display()))?;
    if !json.is_object() {
        return Err(CommandError::DataNotAnObject(path.display().to_string()).into());
    }
    Ok(Store::from_json(json))
}
