use std::fmt;
use std::io;
use std::path::Path;

use crate::AdError;

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Format a user friendly I/O error message with suggestions.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    use io::ErrorKind::*;
    let suggestion = match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        UnexpectedEof => "File appears truncated or corrupted.",
        WriteZero => "Disk may be full. Free up space and try again.",
        Other if err.raw_os_error() == Some(28) => "Disk may be full. Free up space and try again.",
        _ => "Check permissions or free up disk space.",
    };
    format!(
        "Error {} '{}': {}. {}",
        operation,
        path.display(),
        err,
        suggestion
    )
}

/// Convert an I/O error into a CLI error with context.
pub fn io_cli_error(operation: &str, path: &Path, err: io::Error) -> CliError {
    CliError {
        msg: format_io_error(operation, path, &err),
        source: Some(Box::new(err)),
    }
}

/// Simple CLI error from string.
pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        msg: msg.to_string(),
        source: None,
    }
}

/// Convert a library error into a CLI error with a hint.
pub fn ad_cli_error(context: &str, err: AdError) -> CliError {
    CliError {
        msg: format!("{}: {}", context, cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for an [`AdError`] variant.
pub fn cli_hint(err: &AdError) -> String {
    use AdError::*;
    match err {
        TruncatedHeader { .. } | TruncatedPayload { .. } => {
            format!(
                "{err}. Verify the anti-dictionary file is intact \
                 and the profile (--stream) matches."
            )
        }
        NoData => format!("{err}. The anti-dictionary file holds no blocks."),
        KeyOutOfRange { .. } | CountOutOfRange { .. } | KeyCount { .. } => {
            format!("{err}. This is a bug in the block fixture.")
        }
        Config(msg) => format!("{msg}. Invalid configuration."),
        Tool { command, status } => {
            format!("`{command}` exited with {status}. Check the tool path and its inputs.")
        }
        Io(io) => format!("{io}"),
        Json(e) => format!("{e}. Check the configuration file syntax."),
        Csv(e) => format!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_suggestion() {
        let err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let msg = format_io_error("reading", Path::new("x.ad"), &err);
        assert!(msg.starts_with("Error reading 'x.ad'"));
        assert!(msg.contains("Check that the file exists"));
    }

    #[test]
    fn truncation_hint_mentions_profile() {
        let err = AdError::TruncatedHeader {
            offset: 0,
            source: crate::byte_reader::ReadError::Truncated {
                offset: 0,
                wanted: 1,
                remaining: 0,
            },
        };
        assert!(ad_cli_error("scanning", err).to_string().contains("--stream"));
    }
}
