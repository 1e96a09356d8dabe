//! Team/player catalog loaded from the players.json-shaped file.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::players::PlayerDecl;

/// Catalog mapping team name to its ordered roster of player declarations.
///
/// Loaded once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct TeamCatalog {
    teams: BTreeMap<String, Vec<PlayerDecl>>,
}

/// Catalog loading or lookup error.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    Io { path: String, message: String },
    /// The catalog JSON is malformed.
    Parse(String),
    /// The requested team has no entry in the catalog.
    TeamNotFound(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read catalog \"{path}\": {message}")
            }
            Self::Parse(message) => write!(f, "invalid catalog JSON: {message}"),
            Self::TeamNotFound(team) => write!(f, "team \"{team}\" is not found"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl TeamCatalog {
    /// Loads the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    /// Parses the catalog from a JSON string.
    ///
    /// Expected shape: `{ "team": [ { "type": "...", "folder": "..." } ] }`.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the JSON is malformed or a declaration
    /// names an unknown category.
    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let teams: BTreeMap<String, Vec<PlayerDecl>> =
            serde_json::from_str(s).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(Self { teams })
    }

    /// Returns the roster for a team.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::TeamNotFound` for an unknown team id.
    pub fn roster(&self, team: &str) -> Result<&[PlayerDecl], CatalogError> {
        self.teams
            .get(team)
            .map(Vec::as_slice)
            .ok_or_else(|| CatalogError::TeamNotFound(team.to_string()))
    }

    /// Registered team names, in sorted order.
    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.teams.keys().map(String::as_str)
    }
}
