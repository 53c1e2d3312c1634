//! Target list loading
//!
//! The list is plain text, one URL per line. Blank lines are kept as empty
//! targets unless `skip_blank_lines` is set; they then fail when the request
//! is built and show up in the results like any other failure.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::Target;

#[derive(Debug, Clone, Copy, Default)]
pub struct TargetOptions {
    pub skip_blank_lines: bool,
}

/// The target list could not be read
#[derive(Debug)]
pub struct TargetSourceError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl fmt::Display for TargetSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to read target list {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for TargetSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Split a target list into targets
///
/// Lines are trimmed (including a trailing `\r`). A final newline does not
/// produce an extra target.
pub fn parse_targets(content: &str, options: TargetOptions) -> Vec<Target> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !(options.skip_blank_lines && line.is_empty()))
        .map(Target::from)
        .collect()
}

pub async fn read_targets(
    path: impl AsRef<Path>,
    options: TargetOptions,
) -> Result<Vec<Target>, TargetSourceError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TargetSourceError {
            path: path.to_path_buf(),
            source,
        })?;

    let targets = parse_targets(&content, options);
    trace!("read {} targets from {}", targets.len(), path.display());
    Ok(targets)
}
