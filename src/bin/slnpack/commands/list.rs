//! `slnpack list` command

use anyhow::Result;

use super::SolutionTarget;
use crate::cli::ListArgs;
use slnpack::ops::{resolve_manifest, ResolveOptions};
use slnpack::util::{GlobalContext, Shell, Status};

pub fn execute(args: ListArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let target = SolutionTarget::load(&ctx, &args.solution)?;

    let manifest = resolve_manifest(
        &target.solution,
        &ResolveOptions {
            exclude: target.exclusions(&ctx, &args.exclude),
            jobs: args.jobs.or(target.config.resolve.jobs),
        },
    )?;

    if shell.is_json() {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    for entry in &manifest.entries {
        println!("{}", entry.archive_path.display());
    }

    for skipped in &manifest.skipped {
        shell.verbose(
            Status::Skipped,
            format!(
                "{} (duplicate of an earlier entry)",
                skipped.absolute_path.display()
            ),
        );
    }
    shell.verbose(
        Status::Info,
        format!(
            "{} files, {} duplicates skipped",
            manifest.len(),
            manifest.skipped.len()
        ),
    );

    Ok(())
}
