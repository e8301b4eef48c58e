//! `fix` command handler.

use crate::cli::args::FixArgs;
use crate::error::SitesmithError;
use crate::fixup::{self, FixOptions};

/// Run a fixup pass and print a human summary to stderr.
///
/// # Errors
///
/// Returns an error when the fixup pass fails.
pub fn run(args: &FixArgs) -> Result<(), SitesmithError> {
    let report = fixup::run_fix(&FixOptions {
        root: args.root.clone(),
        check: args.check,
    })?;

    let verb = if args.check { "would change" } else { "changed" };
    eprintln!(
        "files scanned: {}, {verb}: {}",
        report.files_scanned, report.files_changed
    );
    for (label, count) in &report.replacements {
        eprintln!("  {label}: {count}");
    }

    Ok(())
}
