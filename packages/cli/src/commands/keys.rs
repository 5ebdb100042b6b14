use super::load_template;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use weft_binding::{Binding, Store};

#[derive(Debug, Args)]
pub struct KeysArgs {
    /// Template markup file
    pub template: PathBuf,
}

/// Print the keys the template binds, grouped by kind
pub fn keys(args: KeysArgs, cwd: &str, out: &mut impl Write) -> Result<()> {
    let config = Config::load(cwd)?;
    let doc = load_template(&args.template, cwd)?;
    let root = doc.root();
    let binding = Binding::bind_with_options(doc, root, Store::new(), config.bind)?;

    writeln!(out, "{}", serde_json::to_string_pretty(binding.registry())?)?;
    Ok(())
}
