//! Batch translation of a source tree.
//!
//! Each `.mbx` file is translated on its own and written next to its input
//! with the output extension. A failing file never stops the batch: its error
//! is recorded and no output is written for it.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::diagnostics::SourceContext;
use crate::discovery::SourceDiscoverer;
use crate::lowering;
use crate::MbxError;

/// A file that translated successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    /// False in check mode.
    pub written: bool,
}

/// A file that could not be translated.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: MbxError,
}

impl FileFailure {
    pub fn line(&self) -> Option<usize> {
        self.error.location().map(|(line, _)| line)
    }

    pub fn column(&self) -> Option<usize> {
        self.error.location().map(|(_, column)| column)
    }
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error.location() {
            Some((line, column)) => write!(
                f,
                "{}:{}:{}: {}",
                self.path.display(),
                line,
                column,
                self.error
            ),
            None => write!(f, "{}: {}", self.path.display(), self.error),
        }
    }
}

/// Outcome of a batch, in discovery order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub translated: Vec<TranslatedFile>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.translated.len() + self.failures.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    /// Translate everything, write nothing.
    Check,
}

#[derive(Debug, Clone)]
pub struct BatchDriver {
    config: TranslateConfig,
    mode: WriteMode,
}

impl BatchDriver {
    pub fn new(config: TranslateConfig) -> Self {
        Self {
            config,
            mode: WriteMode::Write,
        }
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Translates every matching file under `root`.
    ///
    /// Only a failure to walk `root` itself is returned as an error.
    pub fn run(&self, root: &Path) -> Result<BatchReport, MbxError> {
        let files = SourceDiscoverer::discover(root, &self.config.input_extension)?;
        info!(root = %root.display(), files = files.len(), "translating");

        let outcomes: Vec<(PathBuf, Result<TranslatedFile, MbxError>)> = if self.config.parallel {
            files
                .par_iter()
                .map(|path| (path.clone(), self.translate_file(path)))
                .collect()
        } else {
            files
                .iter()
                .map(|path| (path.clone(), self.translate_file(path)))
                .collect()
        };

        let mut report = BatchReport::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(file) => report.translated.push(file),
                Err(error) => report.failures.push(FileFailure { path, error }),
            }
        }
        Ok(report)
    }

    /// Reads, translates and (unless checking) writes one file.
    pub fn translate_file(&self, path: &Path) -> Result<TranslatedFile, MbxError> {
        let content = fs::read_to_string(path).map_err(|e| MbxError::io(path, e))?;
        let source = SourceContext::from_file(path.display().to_string(), content);
        let translated = lowering::translate(&source, &self.config)?;
        let output = self.config.output_path(path);

        let written = match self.mode {
            WriteMode::Check => false,
            WriteMode::Write => {
                fs::write(&output, &translated).map_err(|e| MbxError::io(&output, e))?;
                true
            }
        };
        debug!(input = %path.display(), output = %output.display(), written, "translated file");
        Ok(TranslatedFile {
            input: path.to_path_buf(),
            output,
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;

    #[test]
    fn failure_display_includes_position() {
        let source = SourceContext::from_file("bad.mbx", "<a>text</b>");
        let error = lowering::translate(&source, &TranslateConfig::default()).unwrap_err();
        let failure = FileFailure {
            path: PathBuf::from("bad.mbx"),
            error,
        };
        assert_eq!(failure.error.error_type(), ErrorType::UnmatchedElement);
        assert_eq!(failure.line(), Some(1));
        assert_eq!(failure.column(), Some(8));
        assert!(failure.to_string().starts_with("bad.mbx:1:8: "));
    }

    #[test]
    fn check_mode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("app.mbx");
        fs::write(&input, "fn f {\n  <br/>\n}\n").unwrap();

        let driver = BatchDriver::new(TranslateConfig::default()).with_mode(WriteMode::Check);
        let report = driver.run(dir.path()).unwrap();
        assert!(report.is_success());
        assert_eq!(report.translated.len(), 1);
        assert!(!report.translated[0].written);
        assert!(!dir.path().join("app.mbt").exists());
    }

    #[test]
    fn existing_output_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.mbx"), "let a = 1\n").unwrap();
        fs::write(dir.path().join("app.mbt"), "stale content that is much longer\n").unwrap();

        let report = BatchDriver::new(TranslateConfig::default())
            .run(dir.path())
            .unwrap();
        assert!(report.translated[0].written);
        assert_eq!(
            fs::read_to_string(dir.path().join("app.mbt")).unwrap(),
            "let a = 1\n"
        );
    }
}
