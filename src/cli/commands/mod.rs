//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod convert;
pub mod fix;

use crate::cli::args::{Cli, Commands};
use crate::error::SitesmithError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub fn dispatch(cli: Cli) -> Result<(), SitesmithError> {
    match cli.command {
        Commands::Convert(args) => convert::run(&args),
        Commands::Fix(args) => fix::run(&args),
    }
}
