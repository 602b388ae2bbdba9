//! Translation settings.
//!
//! Everything has a default, so an absent or partial `mbx.yaml` is fine:
//!
//! ```yaml
//! builders:
//!   element: h
//!   attribute: attr
//!   text: text
//! input_extension: mbx
//! output_extension: mbt
//! max_depth: 256
//! parallel: false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::SourceContext;
use crate::{err_msg, err_src, MbxError, Span};

/// File picked up from the build root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "mbx.yaml";

/// Names of the UI-construction calls emitted for markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderNames {
    pub element: String,
    pub attribute: String,
    pub text: String,
}

impl Default for BuilderNames {
    fn default() -> Self {
        Self {
            element: "h".to_string(),
            attribute: "attr".to_string(),
            text: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateConfig {
    pub builders: BuilderNames,
    /// Extension of source files, compared case-insensitively.
    pub input_extension: String,
    pub output_extension: String,
    /// Maximum lowering recursion depth.
    pub max_depth: usize,
    /// Translate the files of a batch on the rayon pool.
    pub parallel: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            builders: BuilderNames::default(),
            input_extension: "mbx".to_string(),
            output_extension: "mbt".to_string(),
            max_depth: 256,
            parallel: false,
        }
    }
}

impl TranslateConfig {
    pub fn from_yaml(source: &SourceContext) -> Result<Self, MbxError> {
        let config: TranslateConfig = serde_yaml::from_str(&source.content).map_err(|e| {
            let offset = e.location().map_or(0, |loc| loc.index());
            err_src!(
                Config,
                format!("invalid configuration: {}", e),
                &source.to_named_source(),
                Span::new(offset, offset)
            )
            .with_cause(e)
        })?;
        config.validated()
    }

    pub fn load(path: &Path) -> Result<Self, MbxError> {
        let content = std::fs::read_to_string(path).map_err(|e| MbxError::io(path, e))?;
        debug!(path = %path.display(), "loading configuration");
        Self::from_yaml(&SourceContext::from_file(path.display().to_string(), content))
    }

    /// Explicit path wins; otherwise `mbx.yaml` in `root` if present; otherwise defaults.
    pub fn resolve(explicit: Option<&Path>, root: &Path) -> Result<Self, MbxError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate: PathBuf = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn output_path(&self, input: &Path) -> PathBuf {
        input.with_extension(&self.output_extension)
    }

    fn validated(mut self) -> Result<Self, MbxError> {
        for (field, name) in [
            ("builders.element", &self.builders.element),
            ("builders.attribute", &self.builders.attribute),
            ("builders.text", &self.builders.text),
        ] {
            if !is_callable_name(name) {
                return Err(err_msg!(Config, "{} is not a valid call target: {:?}", field, name));
            }
        }
        self.input_extension = self.input_extension.trim_start_matches('.').to_string();
        self.output_extension = self.output_extension.trim_start_matches('.').to_string();
        if self.input_extension.is_empty() || self.output_extension.is_empty() {
            return Err(err_msg!(Config, "file extensions must not be empty"));
        }
        if self.input_extension.eq_ignore_ascii_case(&self.output_extension) {
            return Err(err_msg!(
                Config,
                "input and output extension are both {:?}",
                self.input_extension
            ));
        }
        if self.max_depth == 0 {
            return Err(err_msg!(Config, "max_depth must be at least 1"));
        }
        Ok(self)
    }
}

// Identifiers, optionally package-qualified (`@ui.h`) or namespaced (`Html::h`).
fn is_callable_name(name: &str) -> bool {
    let body = name.strip_prefix('@').unwrap_or(name);
    !body.is_empty()
        && !body.starts_with(|c: char| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;

    fn yaml(text: &str) -> Result<TranslateConfig, MbxError> {
        TranslateConfig::from_yaml(&SourceContext::from_file("mbx.yaml", text))
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = yaml("builders:\n  element: BUILD\n").unwrap();
        assert_eq!(config.builders.element, "BUILD");
        assert_eq!(config.builders.attribute, "attr");
        assert_eq!(config.input_extension, "mbx");
        assert_eq!(config.max_depth, 256);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = yaml("max_depth: 4\nbuilder: {}\n").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.message().contains("builder"), "{}", err.message());
        assert!(err.location().is_some());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn extensions_are_normalized_and_checked() {
        let config = yaml("input_extension: .MBX\noutput_extension: .mbt\n").unwrap();
        assert_eq!(config.input_extension, "MBX");
        assert_eq!(config.output_extension, "mbt");
        assert!(yaml("output_extension: mbx\n").is_err());
    }

    #[test]
    fn builder_names_must_be_callable() {
        assert!(yaml("builders:\n  text: \"not a name\"\n").is_err());
        assert!(yaml("builders:\n  element: \"@ui.h\"\n").is_ok());
        assert!(yaml("max_depth: 0\n").is_err());
    }

    #[test]
    fn output_path_replaces_extension() {
        let config = TranslateConfig::default();
        assert_eq!(
            config.output_path(Path::new("src/main/app.MBX")),
            PathBuf::from("src/main/app.mbt")
        );
    }
}
