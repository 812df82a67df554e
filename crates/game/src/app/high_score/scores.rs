use engine::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub(crate) const HIGH_SCORES_KEY: &str = "highScores";
pub(crate) const LEADERBOARD_SIZE: usize = 10;

type ScoreResult<T> = Result<T, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScoreRecord {
    pub(crate) name: String,
    pub(crate) score: f64,
    pub(crate) stage: u32,
}

/// Every record lives as one JSON array under [`HIGH_SCORES_KEY`], sorted by
/// score ascending. Storage is never pruned; only the leaderboard view is capped.
pub(crate) struct ScoreBoard {
    store: Box<dyn KeyValueStore>,
}

impl ScoreBoard {
    pub(crate) fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Unreadable or malformed data counts as an empty board.
    pub(crate) fn records(&self) -> Vec<ScoreRecord> {
        let raw = match self.store.get(HIGH_SCORES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!(error = %error, "high_scores_unreadable");
                return Vec::new();
            }
        };
        match parse_records(&raw) {
            Ok(records) => records,
            Err(error) => {
                warn!(error = %error, "high_scores_malformed");
                Vec::new()
            }
        }
    }

    /// Read, append, sort, write. Returns the stored sequence.
    pub(crate) fn append_score(&mut self, record: ScoreRecord) -> ScoreResult<Vec<ScoreRecord>> {
        let mut records = self.records();
        records.push(record);
        records.sort_by(|a, b| a.score.total_cmp(&b.score));

        let json = serde_json::to_string(&records)
            .map_err(|error| format!("encode high scores: {error}"))?;
        self.store
            .set(HIGH_SCORES_KEY, &json)
            .map_err(|error| format!("write high scores: {error}"))?;
        Ok(records)
    }

    pub(crate) fn leaderboard(&self, stage: Option<u32>) -> Vec<ScoreRecord> {
        self.records()
            .into_iter()
            .filter(|record| stage.map_or(true, |stage| record.stage == stage))
            .take(LEADERBOARD_SIZE)
            .collect()
    }
}

fn parse_records(raw: &str) -> ScoreResult<Vec<ScoreRecord>> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, Vec<ScoreRecord>>(&mut deserializer) {
        Ok(records) => Ok(records),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse high scores: {source}"))
            } else {
                Err(format!("parse high scores at {path}: {source}"))
            }
        }
    }
}

/// One-based rank, e.g. `1. ABC - 45.67s`.
pub(crate) fn format_leaderboard_line(rank: usize, record: &ScoreRecord) -> String {
    format!("{rank}. {} - {:.2}s", record.name, record.score)
}
