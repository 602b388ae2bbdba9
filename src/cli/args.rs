//! Command-line arguments and subcommands for `mbx`.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mbx",
    version,
    about = "Translate MoonBit sources with inline markup into plain MoonBit."
)]
pub struct MbxArgs {
    /// Configuration file. Defaults to `mbx.yaml` in the source root, if any.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate every source file under a directory, writing outputs beside the inputs.
    Build {
        /// Directory to scan recursively.
        #[arg(default_value = "src")]
        root: PathBuf,
        /// Translate and report errors without writing any output.
        #[arg(long)]
        check: bool,
    },
    /// Translate one file and print the result.
    Translate {
        #[arg(required = true)]
        file: PathBuf,
        /// Print a line diff against the input instead of the full output.
        #[arg(long)]
        diff: bool,
    },
    /// Show the concrete syntax tree of a file.
    Cst {
        #[arg(required = true)]
        file: PathBuf,
        /// Emit JSON instead of the indented dump.
        #[arg(long)]
        json: bool,
    },
}
