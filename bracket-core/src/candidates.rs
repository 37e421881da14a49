//! Candidate source
//!
//! Candidate files are JSON: either a bare array of items or an object with a
//! `candidates` array (the shape the candidates endpoint returns).

use std::path::Path;

use serde::Deserialize;

use crate::error::{BracketError, Result};
use crate::item::Item;

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateFile {
    List(Vec<Item>),
    Wrapped { candidates: Vec<Item> },
}

/// Parse candidates from JSON text
pub fn parse_candidates(content: &str) -> Result<Vec<Item>> {
    let file: CandidateFile =
        serde_json::from_str(content).map_err(|e| BracketError::Candidates(e.to_string()))?;

    Ok(match file {
        CandidateFile::List(items) => items,
        CandidateFile::Wrapped { candidates } => candidates,
    })
}

/// Load candidates from a JSON file
pub fn load_candidates(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BracketError::CandidatesNotFound(path.display().to_string()),
        _ => BracketError::Candidates(format!("{}: {}", path.display(), e)),
    })?;

    parse_candidates(&content)
}
