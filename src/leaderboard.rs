//! Local high-score table, persisted as JSON in the user's data directory.
//!
//! This is a host service: the game loop never calls it. The host submits
//! `score()` whenever a round ends.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Entries kept on disk.
pub const MAX_STORED: usize = 10;
/// Entries shown on the start and game-over screens.
pub const TOP_SHOWN: usize = 5;

const SCORES_FILE: &str = "scores.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    /// `dd.mm.yyyy`
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

#[derive(Debug, Default)]
pub struct Leaderboard {
    scores: Vec<ScoreEntry>,
    path: Option<PathBuf>,
    /// Last score written during the current round, to avoid duplicates.
    last_saved: Option<u32>,
}

/// `<data dir>/flappy-bonus/`, created if needed.
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine data directory")?;
    let dir = base.join("flappy-bonus");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(dir)
}

impl Leaderboard {
    /// A table that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from the default location; falls back to an in-memory table.
    pub fn open_default() -> Self {
        match data_dir() {
            Ok(dir) => Self::open(dir.join(SCORES_FILE)),
            Err(e) => {
                warn!(error = %e, "leaderboard will not be saved");
                Self::in_memory()
            }
        }
    }

    /// Load `path`, treating a missing or unreadable file as empty.
    pub fn open(path: PathBuf) -> Self {
        let scores = load_scores(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "starting with an empty leaderboard");
            Vec::new()
        });
        Self {
            scores,
            path: Some(path),
            last_saved: None,
        }
    }

    /// Record a finished round. Zero scores and a repeat of the score
    /// already recorded this round are ignored. Returns whether it was added.
    pub fn add_score(&mut self, score: u32) -> Result<bool> {
        if score == 0 || self.last_saved == Some(score) {
            return Ok(false);
        }
        self.last_saved = Some(score);

        let now = chrono::Local::now();
        self.scores.push(ScoreEntry {
            score,
            date: now.format("%d.%m.%Y").to_string(),
            time: now.format("%H:%M").to_string(),
        });
        self.scores.sort_by(|a, b| b.score.cmp(&a.score));
        self.scores.truncate(MAX_STORED);

        self.save()?;
        Ok(true)
    }

    pub fn top_scores(&self) -> &[ScoreEntry] {
        &self.scores[..self.scores.len().min(TOP_SHOWN)]
    }

    pub fn all_scores(&self) -> &[ScoreEntry] {
        &self.scores
    }

    pub fn best_score(&self) -> u32 {
        self.scores.first().map_or(0, |e| e.score)
    }

    /// Forget the per-round duplicate guard. Call when a new round starts.
    pub fn reset_current_game(&mut self) {
        self.last_saved = None;
    }

    pub fn reset_scores(&mut self) -> Result<()> {
        self.scores.clear();
        self.last_saved = None;
        self.save()
    }

    /// One line per entry: `1. 42 (19.10.2026 14:05)`.
    pub fn format_scores(&self) -> String {
        self.scores
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {} ({} {})", i + 1, e.score, e.date, e.time))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.scores)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

fn load_scores(path: &Path) -> Result<Vec<ScoreEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let scores =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(scores)
}
