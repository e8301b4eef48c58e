//! `sitesmith` - static-site migration tools for legacy JSX+JSON trees.

use clap::Parser;

use sitesmith::cli::args::Cli;
use sitesmith::cli::commands;
use sitesmith::error::ExitCode;
use sitesmith::logging::{LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(LogFormat::Human, cli.verbose);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
