//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use slnpack::ops::ArchiveFormat;
use slnpack::util::{ColorChoice, Shell};

/// slnpack - Package a Visual Studio solution and every file it references
#[derive(Parser)]
#[command(name = "slnpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Build the output shell for this invocation.
    pub fn shell(&self) -> Shell {
        let json = matches!(&self.command, Commands::List(args) if args.json);
        Shell::from_flags(self.quiet, self.verbose, self.color, json)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the solution and all referenced files into an archive
    Pack(PackArgs),

    /// Print the archive paths a solution resolves to
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct PackArgs {
    /// Path to the .sln file
    pub solution: PathBuf,

    /// Output archive (defaults to <solution dir>/<solution name>.tar.gz)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Archive format: tar or tar.gz
    #[arg(long)]
    pub format: Option<ArchiveFormat>,

    /// Gzip compression level (0-9)
    #[arg(long)]
    pub compression: Option<u32>,

    /// Leave a file out of the archive (repeatable)
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Number of parallel jobs used to resolve projects
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Resolve and report without writing the archive
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Path to the .sln file
    pub solution: PathBuf,

    /// Leave a file out of the listing (repeatable)
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// Number of parallel jobs used to resolve projects
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the full manifest as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
