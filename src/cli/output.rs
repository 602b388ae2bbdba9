//! User-facing output for the CLI: diagnostics, batch summaries, diffs and trees.

use std::io::Write;

use difference::{Changeset, Difference};
use miette::Report;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::driver::{BatchReport, WriteMode};
use crate::MbxError;

/// Renders an error with its source excerpt on stderr.
pub fn print_error(error: MbxError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

/// Reports every failure on stderr, then a one-line summary on stdout.
pub fn print_report(report: BatchReport, mode: WriteMode) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let translated = report.translated.len();
    let failed = report.failures.len();

    for file in &report.translated {
        let verb = if file.written { "wrote" } else { "checked" };
        let _ = writeln!(stdout, "{} {}", verb, file.output.display());
    }
    for failure in report.failures {
        eprintln!("{}", failure);
        print_error(failure.error);
    }

    let noun = match mode {
        WriteMode::Write => "translated",
        WriteMode::Check => "checked",
    };
    let color = if failed == 0 { Color::Green } else { Color::Red };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stdout, "{} {}, {} failed", translated, noun, failed);
    let _ = stdout.reset();
}

/// Prints a line diff between the input and its translation.
pub fn print_diff(before: &str, after: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let changeset = Changeset::new(before, after, "\n");
    for diff in &changeset.diffs {
        let (prefix, color, text) = match diff {
            Difference::Same(text) => (' ', None, text),
            Difference::Add(text) => ('+', Some(Color::Green), text),
            Difference::Rem(text) => ('-', Some(Color::Red), text),
        };
        for line in text.split('\n') {
            let _ = stdout.set_color(ColorSpec::new().set_fg(color));
            let _ = writeln!(stdout, "{}{}", prefix, line);
        }
    }
    let _ = stdout.reset();
}

pub fn print_text(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}
