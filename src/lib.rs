//! `mbx` lowers inline markup in MoonBit sources into plain builder calls.
//!
//! ```
//! use mbx::{translate, SourceContext, TranslateConfig};
//!
//! let source = SourceContext::inline("let x = <img src=\"a.png\" />");
//! let output = translate(&source, &TranslateConfig::default()).unwrap();
//! assert_eq!(output, "let x = h(\"img\", [attr(\"src\", \"a.png\")], [])\n");
//! ```

pub use crate::diagnostics::{ErrorContext, MbxError, SourceContext};
pub use crate::syntax::Span;

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod driver;
pub mod lowering;
pub mod syntax;

pub use config::TranslateConfig;
pub use lowering::translate;
