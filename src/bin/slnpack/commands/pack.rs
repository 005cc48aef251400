//! `slnpack pack` command

use std::time::Instant;

use anyhow::Result;

use super::SolutionTarget;
use crate::cli::PackArgs;
use slnpack::ops::{pack, resolve_manifest, PackOptions, ResolveOptions};
use slnpack::util::shell::format_duration;
use slnpack::util::{path, GlobalContext, Shell, Status};

pub fn execute(args: PackArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let target = SolutionTarget::load(&ctx, &args.solution)?;
    let start = Instant::now();

    // Format: CLI > config > inferred from the output name
    let format = args.format.or_else(|| target.config.format());

    // Output: CLI > config output_dir > solution dir
    let output = match &args.output {
        Some(output) => ctx.resolve(output),
        None => {
            let dir = match &target.config.package.output_dir {
                Some(dir) => path::resolve_path(&target.dir, dir),
                None => target.dir.clone(),
            };
            dir.join(format!(
                "{}.{}",
                target.stem(),
                format.unwrap_or_default().extension()
            ))
        }
    };

    // A previous archive must never end up inside the new one
    let mut exclude = target.exclusions(&ctx, &args.exclude);
    exclude.push(output.clone());

    shell.status(Status::Resolving, target.solution.display());
    let manifest = resolve_manifest(
        &target.solution,
        &ResolveOptions {
            exclude,
            jobs: args.jobs.or(target.config.resolve.jobs),
        },
    )?;

    for skipped in &manifest.skipped {
        shell.verbose(
            Status::Skipped,
            format!("{} (duplicate)", skipped.archive_path.display()),
        );
    }

    let opts = PackOptions {
        output: Some(output),
        format,
        compression: args.compression.or(target.config.package.compression),
        dry_run: args.dry_run,
    };

    shell.status(
        Status::Packing,
        format!("{} files from {}", manifest.len(), target.stem()),
    );
    let result = pack(&manifest, &opts, shell)?;

    if result.dry_run {
        shell.note(format!(
            "dry run: {} files ({} bytes) would be written to {}",
            result.entries,
            result.bytes,
            result.output.display()
        ));
        return Ok(());
    }

    shell.status(
        Status::Finished,
        format!(
            "{} ({} files, {} bytes) in {}",
            result.output.display(),
            result.entries,
            result.bytes,
            format_duration(start.elapsed())
        ),
    );
    if let Some(sha256) = &result.sha256 {
        shell.verbose(Status::Info, format!("sha256 {}", sha256));
    }

    Ok(())
}
