//! Error taxonomy for the host boundary.
//!
//! Nothing in here crosses the tick boundary: `sim::tick` is infallible.
//! These errors come from start-up (tuning, scores) and shutdown (score save).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error enum for warp arena.
#[derive(Debug)]
pub enum ArenaError {
    /// A required input file could not be opened. Fatal at start-up.
    AssetMissing {
        /// Path that was requested.
        path: PathBuf,
    },

    /// A persisted document exists but could not be parsed.
    /// Callers recover by falling back to defaults.
    PersistenceRead {
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// Writing a persisted document failed.
    PersistenceWrite { path: PathBuf, source: io::Error },

    /// A programmer error detected at runtime, e.g. asking the director to
    /// spawn an archetype it has no factory for.
    RuntimeInvariant {
        /// Human-readable description of where the check failed.
        context: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::AssetMissing { path } => {
                write!(f, "required file '{}' is missing", path.display())
            }
            ArenaError::PersistenceRead { path, reason } => {
                write!(f, "could not read '{}': {}", path.display(), reason)
            }
            ArenaError::PersistenceWrite { path, source } => {
                write!(f, "could not write '{}': {}", path.display(), source)
            }
            ArenaError::RuntimeInvariant { context } => {
                write!(f, "runtime invariant violated: {}", context)
            }
        }
    }
}

impl std::error::Error for ArenaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArenaError::PersistenceWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias: a `Result` using `ArenaError` as the error type.
pub type ArenaResult<T> = Result<T, ArenaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_path() {
        let err = ArenaError::AssetMissing {
            path: PathBuf::from("tuning.json"),
        };
        assert!(err.to_string().contains("tuning.json"));
    }

    #[test]
    fn test_write_error_exposes_source() {
        use std::error::Error;
        let err = ArenaError::PersistenceWrite {
            path: PathBuf::from("gamedata.yml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
