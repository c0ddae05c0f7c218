//! Batch processing command
//!
//! Files are processed in parallel, one independent session per file.

use anyhow::{Result, bail};
use rasterkit_ops::BorderStrategy;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
#[allow(unused_imports)]
use tracing::{debug, info, trace, warn};

use super::recipe::{Recipe, Step};
use crate::BatchArgs;

pub fn run(args: BatchArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    trace!(pattern = %args.input, "batch::run");

    let (steps, border) = match (&args.recipe, &args.op) {
        (Some(path), _) => {
            let recipe = Recipe::load(path)?;
            (recipe.steps, recipe.border.unwrap_or(border))
        }
        (None, Some(op)) => (vec![Step::from_op_args(op, &args.args)?], border),
        (None, None) => bail!("Either --recipe or --op is required"),
    };
    if steps.is_empty() {
        bail!("Nothing to do: no steps");
    }
    for step in &steps {
        step.validate()?;
    }

    let files: Vec<PathBuf> = glob::glob(&args.input)?.filter_map(|r| r.ok()).collect();
    if files.is_empty() {
        bail!("No files match pattern: {}", args.input);
    }

    info!(files = files.len(), pattern = %args.input, steps = steps.len(), "Starting batch processing");
    if verbose > 0 {
        println!("Found {} files matching '{}'", files.len(), args.input);
    }

    std::fs::create_dir_all(&args.output_dir)?;

    let results: Vec<(PathBuf, Result<()>)> = files
        .par_iter()
        .map(|input| {
            let r = process_file(input, &args.output_dir, &steps, border, args.format.as_deref(), verbose);
            (input.clone(), r)
        })
        .collect();

    let mut success = 0;
    let mut failed = 0;
    for (input, r) in results {
        match r {
            Ok(()) => success += 1,
            Err(e) => {
                failed += 1;
                warn!(input = %input.display(), "batch item failed");
                eprintln!("Error: {}: {:#}", input.display(), e);
            }
        }
    }

    info!(success, failed, "Batch processing complete");
    println!("Processed: {} success, {} failed", success, failed);

    if failed > 0 {
        bail!("{} files failed", failed);
    }
    Ok(())
}

/// Output path: `output_dir/<stem>.<format or input extension>`.
fn output_path(input: &Path, output_dir: &Path, format: Option<&str>) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let ext = format.unwrap_or_else(|| input.extension().and_then(|s| s.to_str()).unwrap_or("png"));
    output_dir.join(format!("{}.{}", stem, ext.trim_start_matches('.')))
}

fn process_file(
    input: &Path,
    output_dir: &Path,
    steps: &[Step],
    border: BorderStrategy,
    format: Option<&str>,
    verbose: u8,
) -> Result<()> {
    let output = output_path(input, output_dir, format);
    if verbose > 0 {
        println!("Processing {} -> {}", input.display(), output.display());
    }
    let image = super::load_image(input)?;
    let result = super::apply_steps(image, steps, border)?;
    super::save_image(&output, &result)
}
