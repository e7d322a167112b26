//! `tplview` command-line entry point.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use console::Term;
use tplview::{run_session, Cli, Preview};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TPLVIEW_LOG";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("Unable to read the current directory")?;
    let preview = Preview::new(cli.into_config(&cwd)).context("Unable to start preview")?;

    let term = Term::stdout();
    run_session(&preview, || term.read_key().map(|_| ())).context("Unable to read a key")?;
    Ok(())
}
