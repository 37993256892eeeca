use anyhow::{Context, Result, bail};

use soap_prep::pipeline::{NORM_FILE, TRAINING_SUBDIR};
use soap_prep::{Soap, list_sample_dirs, normalize_descriptors, process_sample};

use crate::cli::DatasetArgs;
use crate::commands::build_parameters;
use crate::display::{Context as DisplayContext, Progress};

const TOTAL_PHASES: u8 = 3;

pub fn run_training(args: &DatasetArgs, ctx: DisplayContext) -> Result<()> {
    if !args.root.is_dir() {
        bail!("Dataset root '{}' is not a directory", args.root.display());
    }

    let params = build_parameters(args);
    let engine = Soap::new(params).context("Invalid descriptor parameters")?;

    let set_dir = args.root.join(TRAINING_SUBDIR);
    let mut progress = Progress::new(ctx.interactive, TOTAL_PHASES);

    progress.phase("Scanning training samples");
    let samples = list_sample_dirs(&set_dir)
        .with_context(|| format!("Failed to scan '{}'", set_dir.display()))?;
    let scan_note = format!("{} sample directories", samples.len());
    progress.complete_phase("Scanning training samples", &[scan_note.as_str()]);

    progress.counted_phase("Computing descriptors", samples.len() as u64);
    for sample in &samples {
        process_sample(sample, &engine)
            .with_context(|| format!("Sample '{}' failed", sample.display()))?;
        progress.tick();
    }
    let desc_note = format!("{} features per atom", engine.parameters().n_features());
    progress.complete_phase("Computing descriptors", &[desc_note.as_str()]);

    progress.phase("Aggregating statistics");
    let outfile = set_dir.join(NORM_FILE);
    let stats = normalize_descriptors(&samples, &outfile)
        .context("Normalization over the training set failed")?;
    let stats_note = format!("mean {:.6e}, std {:.6e}", stats.mean, stats.std);
    let file_note = format!("wrote {}", outfile.display());
    progress.complete_phase(
        "Aggregating statistics",
        &[stats_note.as_str(), file_note.as_str()],
    );

    progress.finish();

    Ok(())
}
