//! Entry point for all CLI commands.

pub mod args;
pub mod output;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

pub use args::{Command, MbxArgs};

use crate::config::TranslateConfig;
use crate::diagnostics::SourceContext;
use crate::driver::{BatchDriver, WriteMode};
use crate::syntax::SourceParser;
use crate::{err_msg, lowering, MbxError};

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Runs one parsed command line. Any error is rendered on stderr.
pub fn run(args: MbxArgs) -> ExitCode {
    let config = args.config.as_deref();
    let result = match args.command {
        Command::Build { root, check } => build(&root, config, check),
        Command::Translate { file, diff } => translate(&file, config, diff),
        Command::Cst { file, json } => cst(&file, json),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            output::print_error(e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn build(root: &Path, config: Option<&Path>, check: bool) -> Result<ExitCode, MbxError> {
    let config = TranslateConfig::resolve(config, root)?;
    let mode = if check { WriteMode::Check } else { WriteMode::Write };
    let report = BatchDriver::new(config).with_mode(mode).run(root)?;
    let code = if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };
    output::print_report(report, mode);
    Ok(code)
}

fn translate(file: &Path, config: Option<&Path>, diff: bool) -> Result<ExitCode, MbxError> {
    let config = TranslateConfig::resolve(config, Path::new("."))?;
    let source = read_source(file)?;
    let translated = lowering::translate(&source, &config)?;
    if diff {
        output::print_diff(&source.content, &translated);
    } else {
        output::print_text(&translated);
    }
    Ok(ExitCode::SUCCESS)
}

fn cst(file: &Path, json: bool) -> Result<ExitCode, MbxError> {
    let source = read_source(file)?;
    let tree = SourceParser::new().parse(&source)?;
    if json {
        let text = serde_json::to_string_pretty(&tree.root().snapshot())
            .map_err(|e| err_msg!(Internal, "cannot serialize syntax tree: {}", e))?;
        output::print_text(&text);
        output::print_text("\n");
    } else {
        output::print_text(&tree.dump());
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// HELPERS
// ============================================================================

fn read_source(path: &Path) -> Result<SourceContext, MbxError> {
    let content = fs::read_to_string(path).map_err(|e| MbxError::io(path, e))?;
    Ok(SourceContext::from_file(path.display().to_string(), content))
}
