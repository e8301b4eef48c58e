//! CLI argument definitions.
//!
//! All Clap derive structs for `sitesmith` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::pipeline::Include;

// ============================================================================
// Root CLI
// ============================================================================

/// Static-site migration tools for legacy JSX+JSON content trees.
#[derive(Parser, Debug)]
#[command(name = "sitesmith", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a legacy content tree into canonical static entities.
    Convert(ConvertArgs),

    /// Repair mojibake in an already-published output tree.
    Fix(FixArgs),
}

// ============================================================================
// Convert Command
// ============================================================================

/// Arguments for `convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Legacy input root containing the tier and category directories.
    #[arg(short, long, env = "SITESMITH_INPUT")]
    pub input: PathBuf,

    /// Output root for the generated entity directories.
    #[arg(short, long, env = "SITESMITH_OUT")]
    pub out: PathBuf,

    /// Directory of source images to copy entity images from.
    #[arg(long, env = "SITESMITH_IMAGES")]
    pub images: Option<PathBuf>,

    /// Entity kinds to convert.
    #[arg(long, value_enum, default_value = "all")]
    pub include: Include,

    /// Major tier directory name under the input root.
    #[arg(long, default_value = "Major speakers")]
    pub major_dir: String,

    /// Minor tier directory name under the input root.
    #[arg(long, default_value = "Minor speakers")]
    pub minor_dir: String,

    /// Concepts directory name under the input root.
    #[arg(long, default_value = "Concepts")]
    pub concepts_dir: String,

    /// Influences directory name under the input root.
    #[arg(long, default_value = "Influences")]
    pub influences_dir: String,
}

// ============================================================================
// Fix Command
// ============================================================================

/// Arguments for `fix`.
#[derive(Args, Debug)]
pub struct FixArgs {
    /// Root of the published tree to repair in place.
    #[arg(short, long, env = "SITESMITH_FIX_ROOT")]
    pub root: PathBuf,

    /// Report what would change without writing anything.
    #[arg(long)]
    pub check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_defaults() {
        let cli = Cli::parse_from(["sitesmith", "convert", "-i", "/in", "-o", "/out"]);
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.include, Include::All);
        assert_eq!(args.major_dir, "Major speakers");
        assert!(args.images.is_none());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["sitesmith", "-vv", "fix", "-r", "/site"]);
        assert_eq!(cli.verbose, 2);
    }
}
