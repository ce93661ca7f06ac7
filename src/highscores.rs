//! High score leaderboard
//!
//! Top 5 `(name, score)` pairs, persisted as a JSON array under the
//! `leaderboard` key.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PLAYER_NAME, MAX_LEADERBOARD_ENTRIES, MAX_NAME_CHARS};
use crate::persistence::{Storage, StorageError, load_json, save_json};

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

/// Trim a submitted name; empty or over-long names become the default
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if (1..=MAX_NAME_CHARS).contains(&len) {
        trimmed.to_string()
    } else {
        DEFAULT_PLAYER_NAME.to_string()
    }
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    const STORAGE_KEY: &'static str = "leaderboard";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        // Must beat the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert a score. Returns the 1-indexed rank, or None if it fell off the board.
    /// Equal scores keep submission order.
    pub fn add_score(&mut self, name: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let entry = LeaderboardEntry {
            name: normalize_name(name),
            score,
        };

        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        Some(pos + 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// HUD lines ("Ace: 42")
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|e| format!("{}: {}", e.name, e.score)).collect()
    }

    /// Restore sort order and cap after loading foreign data
    fn normalize(&mut self) {
        // Stable sort keeps submission order for ties
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
    }

    pub fn load(storage: &dyn Storage) -> Self {
        let mut board: Self = load_json(storage, Self::STORAGE_KEY);
        board.normalize();
        log::info!("Loaded {} leaderboard entries", board.entries.len());
        board
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        save_json(storage, Self::STORAGE_KEY, self)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn board(scores: &[u64]) -> Leaderboard {
        let mut b = Leaderboard::new();
        for (i, s) in scores.iter().enumerate() {
            b.add_score(&format!("p{}", i), *s);
        }
        b
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Ace"), "Ace");
        assert_eq!(normalize_name("  Ace  "), "Ace");
        assert_eq!(normalize_name(""), "Anonymous");
        assert_eq!(normalize_name("   "), "Anonymous");
        assert_eq!(normalize_name("TwelveLetter"), "Anonymous");
        assert_eq!(normalize_name("TenLetters"), "TenLetters");
    }

    #[test]
    fn test_sorted_and_capped() {
        let b = board(&[10, 50, 30, 70, 20, 40]);
        let scores: Vec<u64> = b.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![70, 50, 40, 30, 20]);
    }

    #[test]
    fn test_ace_joins_board() {
        let mut b = board(&[50, 40, 30]);
        assert_eq!(b.add_score("Ace", 42), Some(2));
        assert_eq!(b.entries[1], LeaderboardEntry {
            name: "Ace".to_string(),
            score: 42
        });
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let mut b = Leaderboard::new();
        b.add_score("first", 30);
        b.add_score("second", 30);
        assert_eq!(b.entries[0].name, "first");
        assert_eq!(b.entries[1].name, "second");
    }

    #[test]
    fn test_full_board_rejects_low_score() {
        let mut b = board(&[50, 40, 30, 20, 10]);
        assert!(!b.qualifies(10));
        assert_eq!(b.add_score("late", 10), None);
        assert_eq!(b.add_score("late", 11), Some(5));
        assert_eq!(b.entries.len(), 5);
    }

    #[test]
    fn test_zero_score_allowed_when_space() {
        let mut b = Leaderboard::new();
        assert_eq!(b.add_score("zero", 0), Some(1));
    }

    #[test]
    fn test_persist_and_clear() {
        let mut storage = MemoryStorage::new();
        let mut b = board(&[5, 15]);
        b.save(&mut storage).unwrap();
        // Stored as a plain array of {name, score}
        let raw = storage.get("leaderboard").unwrap().unwrap();
        assert!(raw.starts_with('['));
        assert_eq!(Leaderboard::load(&storage), b);

        b.clear();
        b.save(&mut storage).unwrap();
        assert!(Leaderboard::load(&storage).is_empty());
    }

    #[test]
    fn test_load_sorts_foreign_data() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                "leaderboard",
                r#"[{"name":"a","score":1},{"name":"b","score":9},{"name":"c","score":3},
                    {"name":"d","score":4},{"name":"e","score":5},{"name":"f","score":6}]"#,
            )
            .unwrap();
        let b = Leaderboard::load(&storage);
        assert_eq!(b.top_score(), Some(9));
        assert_eq!(b.entries.len(), 5);
        assert_eq!(b.entries.last().unwrap().score, 3);
    }
}
