// 📊 Multi-Term Aggregator
// Append-only record of per-term (average, credits); the cumulative average is
// recomputed from scratch on every query.

use crate::error::GradingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest possible term average on the 10-point scale
pub const MAX_TERM_AVERAGE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    /// 1-based position in the record
    pub term_index: u32,
    pub average: f64,
    pub credits: u32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRecord {
    entries: Vec<TermEntry>,
}

impl CumulativeRecord {
    pub fn new() -> Self {
        CumulativeRecord::default()
    }

    /// Rebuild from persisted entries, re-sequencing term indexes by position
    pub fn from_entries<I: IntoIterator<Item = TermEntry>>(entries: I) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| TermEntry {
                term_index: i as u32 + 1,
                ..entry
            })
            .collect();
        CumulativeRecord { entries }
    }

    /// Append a term. Averages must be finite and within 0..=10.
    pub fn append(&mut self, average: f64, credits: u32) -> Result<&TermEntry, GradingError> {
        if !average.is_finite() || !(0.0..=MAX_TERM_AVERAGE).contains(&average) {
            return Err(GradingError::InvalidTermAverage(average));
        }

        let entry = TermEntry {
            term_index: self.entries.len() as u32 + 1,
            average,
            credits,
            recorded_at: Utc::now(),
        };
        self.entries.push(entry);

        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Drop every entry
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_credits(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.credits)).sum()
    }

    /// Σ(average × credits) / Σ(credits), 0.0 when there are no credits
    pub fn cumulative_average(&self) -> f64 {
        let total_credits = self.total_credits();
        if total_credits == 0 {
            return 0.0;
        }

        let weighted: f64 = self
            .entries
            .iter()
            .map(|e| e.average * f64::from(e.credits))
            .sum();

        weighted / total_credits as f64
    }
}
