use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mbx::cli::{self, MbxArgs};

fn main() -> ExitCode {
    let args = MbxArgs::parse();
    init_tracing(args.verbose);
    cli::run(args)
}

/// Logs go to stderr so translated output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
