//! Versioned JSON save documents.
//!
//! A save file is a single JSON object carrying a format version next to the
//! flattened game record. Every game field is optional on read and a
//! wrong-typed field decodes as missing, so a save written by hand or by an
//! older build still loads; per-field validation and fallback happen in the
//! world's restore path, not here.

use grid_crawl_core::SaveGame;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt, fs, io, path::Path};

/// Format version emitted by this build.
const SUPPORTED_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SaveDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(flatten)]
    game: SaveGame,
}

const fn default_version() -> u32 {
    SUPPORTED_VERSION
}

/// Serialises the game record and writes it to `path`.
pub(crate) fn write_save(path: &Path, game: &SaveGame) -> Result<(), SaveError> {
    let document = SaveDocument {
        version: SUPPORTED_VERSION,
        game: game.clone(),
    };
    let json = serde_json::to_string_pretty(&document)
        .expect("save snapshot serialization never fails");
    fs::write(path, json).map_err(SaveError::Io)
}

/// Reads and decodes the save file at `path`.
pub(crate) fn read_save(path: &Path) -> Result<SaveGame, SaveError> {
    let text = fs::read_to_string(path).map_err(SaveError::Io)?;
    decode(&text)
}

fn decode(text: &str) -> Result<SaveGame, SaveError> {
    // Parse to a value tree first so a wrong-typed field degrades to its
    // default instead of poisoning the rest of the document.
    let value: serde_json::Value = serde_json::from_str(text).map_err(SaveError::Malformed)?;
    let document: SaveDocument = serde_json::from_value(value).map_err(SaveError::Malformed)?;
    if document.version != SUPPORTED_VERSION {
        return Err(SaveError::UnsupportedVersion(document.version));
    }

    Ok(document.game)
}

/// Errors that can occur while reading or writing save files.
#[derive(Debug)]
pub(crate) enum SaveError {
    /// The save file could not be read or written.
    Io(io::Error),
    /// The file contents were not a valid save document.
    Malformed(serde_json::Error),
    /// The save was written by an incompatible format version.
    UnsupportedVersion(u32),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "could not access the save file: {error}"),
            Self::Malformed(error) => write!(f, "could not parse the save file: {error}"),
            Self::UnsupportedVersion(version) => {
                write!(f, "save version {version} is not supported")
            }
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Malformed(error) => Some(error),
            Self::UnsupportedVersion(_) => None,
        }
    }
}
