use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::MbxError;

/// Finds the source files of a batch.
#[derive(Debug)]
pub struct SourceDiscoverer;

impl SourceDiscoverer {
    /// Recursively scans `root` for regular files with `extension`
    /// (case-insensitive). Everything else is skipped.
    ///
    /// The returned list is sorted so batches run in a deterministic order.
    pub fn discover<P: AsRef<Path>>(root: P, extension: &str) -> Result<Vec<PathBuf>, MbxError> {
        let root = root.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let message = format!("cannot walk {}: {}", root.display(), e);
                    return Err(match e.into_io_error() {
                        Some(io) => MbxError::io(root, io),
                        None => MbxError::Io {
                            message,
                            ctx: crate::ErrorContext::none(),
                            source: None,
                        },
                    });
                }
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Self::has_extension(path, extension) {
                continue;
            }

            files.push(path.to_path_buf());
        }
        files.sort();
        debug!(root = %root.display(), count = files.len(), "discovered source files");
        Ok(files)
    }

    pub fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
