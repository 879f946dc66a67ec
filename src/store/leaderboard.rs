/// Leaderboard persistence.
///
/// Entries are ranked by score (highest first); equal scores keep the
/// earlier submission ahead. The file backend keeps every entry in one JSON
/// array and rewrites it on each submission.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LeaderboardError, StoreError};
use crate::store::kv::write_atomic;

pub const MAX_NAME_CHARS: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: u64,
    pub player_name: String,
    pub score: u32,
    pub timestamp: DateTime<Utc>,
}

pub trait Leaderboard {
    /// Best `n` entries, ranked.
    fn list_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    /// Record a score. The name is trimmed before validation.
    fn submit(&mut self, player_name: &str, score: u32) -> Result<LeaderboardEntry, LeaderboardError>;
}

/// Trim and check a player name: 1..=20 characters.
pub fn validate_name(raw: &str) -> Result<String, LeaderboardError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LeaderboardError::Validation("player name is empty".into()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(LeaderboardError::Validation(format!(
            "player name is longer than {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

/// Parse a score typed by a user. Anything but a non-negative integer is a
/// validation error.
pub fn parse_score(raw: &str) -> Result<u32, LeaderboardError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| LeaderboardError::Validation(format!("score {raw:?} is not a non-negative integer")))
}

/// Rank in place: score descending, then oldest first, then by id.
pub fn rank(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.timestamp.cmp(&b.timestamp))
            .then(a.id.cmp(&b.id))
    });
}

// ── File backend ──

pub struct FileLeaderboard {
    path: PathBuf,
}

impl FileLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileLeaderboard { path: path.into() }
    }

    fn read_all(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn write_all(&self, entries: &[LeaderboardEntry]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.path, &text)
    }

    /// Submission with an explicit timestamp.
    pub fn submit_at(
        &mut self,
        player_name: &str,
        score: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<LeaderboardEntry, LeaderboardError> {
        let player_name = validate_name(player_name)?;
        let mut entries = self.read_all()?;
        let id = entries.iter().map(|e| e.id).max().map_or(1, |m| m + 1);
        let entry = LeaderboardEntry { id, player_name, score, timestamp };
        entries.push(entry.clone());
        self.write_all(&entries)?;
        Ok(entry)
    }
}

impl Leaderboard for FileLeaderboard {
    fn list_top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut entries = self.read_all()?;
        rank(&mut entries);
        entries.truncate(n);
        Ok(entries)
    }

    fn submit(&mut self, player_name: &str, score: u32) -> Result<LeaderboardEntry, LeaderboardError> {
        self.submit_at(player_name, score, Utc::now())
    }
}
