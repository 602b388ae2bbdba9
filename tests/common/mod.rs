//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use mbx::config::BuilderNames;
use mbx::diagnostics::ErrorType;
use mbx::{translate, MbxError, SourceContext, TranslateConfig};

/// Translates `text` with the default builder names.
pub fn translate_str(text: &str) -> String {
    try_translate(text, &TranslateConfig::default())
        .unwrap_or_else(|e| panic!("translation failed: {e:?}"))
}

pub fn try_translate(text: &str, config: &TranslateConfig) -> Result<String, MbxError> {
    translate(&SourceContext::from_file("test.mbx", text), config)
}

/// A config with `BUILD`, `ATTR` and `TEXT` as builder names.
pub fn placeholder_config() -> TranslateConfig {
    TranslateConfig {
        builders: BuilderNames {
            element: "BUILD".to_string(),
            attribute: "ATTR".to_string(),
            text: "TEXT".to_string(),
        },
        ..TranslateConfig::default()
    }
}

/// Translates with the placeholder builder names.
pub fn translate_placeholders(text: &str) -> String {
    try_translate(text, &placeholder_config())
        .unwrap_or_else(|e| panic!("translation failed: {e:?}"))
}

pub fn expect_error(text: &str, expected: ErrorType) -> MbxError {
    let err = try_translate(text, &TranslateConfig::default())
        .expect_err("translation unexpectedly succeeded");
    assert_eq!(err.error_type(), expected, "{err:?}");
    err
}

/// Writes `files` (relative path, content) under `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
