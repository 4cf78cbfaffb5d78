//! Best finished matches on this device
//!
//! Rows have the same shape and ordering as the leaderboard
//! ([`rank_entries`]), so a local table and a fetched one read alike.

use serde::{Deserialize, Serialize};

use crate::ranking::{RANKING_TOP_N, RankingEntry, rank_entries};
use crate::storage;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    entries: Vec<RankingEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "bullseye_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Rows, best first
    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    /// Whether a finished match would make the table
    ///
    /// A tie with the last row qualifies, since the newer match ranks first.
    pub fn qualifies(&self, score: u32) -> bool {
        score > 0
            && (self.entries.len() < RANKING_TOP_N
                || self.entries.last().is_none_or(|last| score >= last.score))
    }

    /// Record a finished match, returning its 1-based rank if it made the table
    pub fn record(&mut self, name: &str, score: u32, date: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let entry = RankingEntry {
            name: name.to_string(),
            score,
            date,
        };
        let mut entries = std::mem::take(&mut self.entries);
        entries.push(entry.clone());
        self.entries = rank_entries(entries);
        self.entries.iter().position(|e| *e == entry).map(|i| i + 1)
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Restore ordering and bound on a table read back from storage
    fn reranked(self) -> Self {
        Self {
            entries: rank_entries(self.entries),
        }
    }

    pub fn load() -> Self {
        let table = storage::read_json::<HighScores>(Self::STORAGE_KEY)
            .map(HighScores::reranked)
            .unwrap_or_default();
        log::info!("Loaded {} local best matches", table.entries.len());
        table
    }

    pub fn save(&self) {
        if storage::write_json(Self::STORAGE_KEY, self) {
            log::debug!("Local best matches saved ({})", self.entries.len());
        }
    }
}
