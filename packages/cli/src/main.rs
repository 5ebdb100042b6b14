mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{keys, render, KeysArgs, RenderArgs};
use tracing_subscriber::EnvFilter;

/// Weft CLI - bind markup placeholders to JSON data
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log binding activity (debug level) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bind a template to data and print the resulting markup
    Render(RenderArgs),

    /// List the keys a template binds
    Keys(KeysArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            let mut out = std::io::stdout().lock();
            match cli.command {
                Command::Render(args) => render(args, &cwd, &mut out),
                Command::Keys(args) => keys(args, &cwd, &mut out),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
