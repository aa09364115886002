//! Error types for portar-core.
//!
//! Missing artifacts are never errors — the locator and classifier report
//! absence in the data model. The errors here cover the few operations that
//! can genuinely fail: loading an explicit config file and relocating an
//! output document.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in portar-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An explicitly requested config file could not be read.
    #[error("cannot read layout config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A config file was read but is not valid YAML for a layout.
    #[error("invalid layout config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    /// Relocation was requested but there is no freshly generated output.
    #[error("no generated output found at {path}")]
    MissingOutput { path: PathBuf },

    /// Moving the output document failed.
    #[error("cannot relocate output to {path}: {source}")]
    Relocate {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_output_message_names_path() {
        let err = CoreError::MissingOutput {
            path: PathBuf::from("zig-demo.xlsx"),
        };
        assert!(err.to_string().contains("zig-demo.xlsx"));
    }

    #[test]
    fn test_relocate_message_carries_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = CoreError::Relocate {
            path: PathBuf::from("testing/zig-output-xls/demo.xlsx"),
            source: io,
        };
        let msg = err.to_string();
        assert!(msg.contains("relocate"));
        assert!(msg.contains("access denied"));
    }
}
