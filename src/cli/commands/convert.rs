//! `convert` command handler.

use crate::cli::args::ConvertArgs;
use crate::error::SitesmithError;
use crate::pipeline::{self, ConvertOptions, Include};

/// Unresolved references shown before the summary truncates.
const MISSING_SAMPLE_LIMIT: usize = 25;

/// Run a conversion and print a human summary to stderr.
///
/// # Errors
///
/// Returns an error when the pipeline fails.
pub fn run(args: &ConvertArgs) -> Result<(), SitesmithError> {
    let opts = ConvertOptions {
        input: args.input.clone(),
        out: args.out.clone(),
        images_root: args.images.clone(),
        include: args.include,
        major_dir: args.major_dir.clone(),
        minor_dir: args.minor_dir.clone(),
        concepts_dir: args.concepts_dir.clone(),
        influences_dir: args.influences_dir.clone(),
    };

    let report = pipeline::run_convert(&opts)?;

    eprintln!("people written:     {}", report.people_written);
    if args.include == Include::All {
        eprintln!("concepts written:   {}", report.concepts_written);
        eprintln!("influences written: {}", report.influences_written);
    }
    if report.records_skipped > 0 {
        eprintln!("records skipped:    {}", report.records_skipped);
    }
    if report.sources_skipped > 0 {
        eprintln!("sources skipped:    {}", report.sources_skipped);
    }

    if !report.missing_refs.is_empty() {
        let unique = report.missing_unique();
        eprintln!(
            "WARNING: {} analysis references in JSON had no matching block ({} distinct)",
            report.missing_refs.len(),
            unique.len()
        );
        for miss in unique.iter().take(MISSING_SAMPLE_LIMIT) {
            eprintln!("  {miss}");
        }
        if unique.len() > MISSING_SAMPLE_LIMIT {
            eprintln!("  ... and {} more", unique.len() - MISSING_SAMPLE_LIMIT);
        }
    }

    Ok(())
}
