//! slnpack CLI - Package a Visual Studio solution into a single archive

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use slnpack::util::diagnostic::{self, Diagnostic};
use slnpack::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = cli.shell();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("slnpack=debug")
    } else if cli.quiet {
        EnvFilter::new("slnpack=error")
    } else {
        EnvFilter::new("slnpack=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    if let Err(e) = run(cli, &shell) {
        diagnostic::emit(&Diagnostic::from_error(&e), shell.use_color());
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    match cli.command {
        Commands::Pack(args) => commands::pack::execute(args, shell),
        Commands::List(args) => commands::list::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
