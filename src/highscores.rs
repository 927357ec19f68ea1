//! Highscore persistence
//!
//! A single YAML document with one scalar field, `Highscore: <int>`, stored
//! in the working directory. Read at start-up, written on game over.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, ArenaResult};

/// Default score file name
pub const SCORES_FILE: &str = "gamedata.yml";

/// The persisted document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    #[serde(rename = "Highscore")]
    pub score: u64,
}

impl HighScore {
    pub fn new(score: u64) -> Self {
        Self { score }
    }

    /// Default path (`gamedata.yml` in the working directory)
    pub fn default_path() -> PathBuf {
        PathBuf::from(SCORES_FILE)
    }

    /// Record a finished run. Returns true if it beat the stored score.
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.score {
            self.score = score;
            true
        } else {
            false
        }
    }

    /// Load the highscore. Missing file is zero; a malformed file logs a
    /// warning and is treated as zero.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(hs)) => {
                log::info!("Loaded highscore {} from {}", hs.score, path.display());
                hs
            }
            Ok(None) => {
                log::info!("No highscore file found, starting fresh");
                Self::default()
            }
            Err(err) => {
                log::warn!("{err}; highscore reset to 0");
                Self::default()
            }
        }
    }

    /// Read the document, distinguishing "absent" from "malformed".
    pub fn read(path: &Path) -> ArenaResult<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ArenaError::PersistenceRead {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        };
        Self::parse(&text)
            .map(Some)
            .map_err(|reason| ArenaError::PersistenceRead {
                path: path.to_path_buf(),
                reason,
            })
    }

    /// Parse the document text
    pub fn parse(text: &str) -> Result<Self, String> {
        serde_yaml::from_str(text).map_err(|err| err.to_string())
    }

    /// Render the document text
    pub fn to_document(&self) -> String {
        format!("Highscore: {}\n", self.score)
    }

    /// Write the document
    pub fn save(&self, path: &Path) -> ArenaResult<()> {
        fs::write(path, self.to_document()).map_err(|source| ArenaError::PersistenceWrite {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Highscore {} saved to {}", self.score, path.display());
        Ok(())
    }
}
