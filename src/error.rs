//! Errors that stop option resolution.
//!
//! Everything else (a missing key, a wrongly typed value, a repository path
//! that is not a group) falls back to the defaults and is only logged.

use std::path::PathBuf;
use thiserror::Error;

/// A fatal resolution failure. The process entry point turns these into an
/// exit status; resolution itself never exits.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Could not find a configuration directory: neither XDG_CONFIG_HOME nor a home directory is available")]
    NoConfigDir,

    #[error("Could not resolve configuration directory {}: {source}", .path.display())]
    ConfigDirUnresolved {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not open pacwall.conf: {source}\nRefer to /usr/share/doc/pacwall/README.rst for a configuration guide")]
    ConfigMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed pacwall.conf (line {line}): {message}")]
    ConfigMalformed { line: usize, message: String },

    #[error("Malformed pacwall.conf: repository entry '{name}' must be a string, found {found}")]
    InvalidRepositoryEntry { name: String, found: &'static str },

    #[error("USAGE: {program} [-ugk]\nSee /usr/share/doc/pacwall/README.rst for more info.")]
    CliUsage { program: String },
}

impl ResolveError {
    /// Exit status for the process entry point: 2 for misuse, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::CliUsage { .. } => 2,
            _ => 1,
        }
    }
}

/// Result type for option resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_message() {
        let err = ResolveError::CliUsage {
            program: "pacwall".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "USAGE: pacwall [-ugk]\nSee /usr/share/doc/pacwall/README.rst for more info."
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_malformed_message_with_line() {
        let err = ResolveError::ConfigMalformed {
            line: 7,
            message: "unexpected token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed pacwall.conf (line 7): unexpected token"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_unresolved_dir_message_names_path() {
        let err = ResolveError::ConfigDirUnresolved {
            path: PathBuf::from("cfg/pacwall"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "cwd is gone"),
        };
        assert_eq!(
            err.to_string(),
            "Could not resolve configuration directory cfg/pacwall: cwd is gone"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_missing_message_includes_os_error() {
        let err = ResolveError::ConfigMissing {
            path: PathBuf::from("/nowhere/pacwall.conf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let text = err.to_string();
        assert!(text.starts_with("Could not open pacwall.conf: No such file"));
        assert!(text.ends_with("for a configuration guide"));
    }
}
