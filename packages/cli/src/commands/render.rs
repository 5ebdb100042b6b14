use super::{load_store, load_template, Assignment};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;
use weft_binding::Binding;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template markup file
    pub template: PathBuf,

    /// JSON data file (overrides the config's dataFile)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Write applied after binding, in order (e.g. --set user.name='"Ada"')
    #[arg(short, long = "set", value_name = "PATH=JSON")]
    pub set: Vec<String>,

    /// Print host write statistics as JSON after the markup
    #[arg(long)]
    pub stats: bool,
}

/// Bind, apply the assignments, and write the markup (and stats) to `out`
pub fn render(args: RenderArgs, cwd: &str, out: &mut impl Write) -> Result<()> {
    let config = Config::load(cwd)?;
    let assignments = args
        .set
        .iter()
        .map(|source| Assignment::parse(source))
        .collect::<Result<Vec<_>, _>>()?;

    let doc = load_template(&args.template, cwd)?;
    let data_path = args.data.or_else(|| config.data_path(cwd));
    let store = load_store(data_path.as_deref(), cwd)?;

    let root = doc.root();
    let mut binding = Binding::bind_with_options(doc, root, store, config.bind.clone())?;

    for assignment in assignments {
        debug!(path = %assignment.path, "Applying assignment");
        if !binding.set_path(&assignment.path, assignment.value)? {
            eprintln!(
                "{} {} runs through a non-object value and was not written",
                "warning:".yellow().bold(),
                assignment.path
            );
        }
    }

    writeln!(out, "{}", binding.host().inner_markup(root))?;
    if args.stats {
        writeln!(out, "{}", serde_json::to_string_pretty(&binding.host().stats())?)?;
    }
    Ok(())
}
