// ⛔ Fatal errors
// Data-quality problems (noise tokens, unknown codes, bad grade labels) never land here.
// Only broken invariants and caller mistakes do.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradingError {
    /// A catalogue entry carried a credit weight that is not a non-negative integer
    #[error("invalid credit weight {credits} for course {code}")]
    InvalidCredits { code: String, credits: i64 },

    /// No file-backed token source for this extension or method
    #[error("unsupported transcript source: {0}")]
    UnsupportedSource(String),

    /// Term averages live on the 0-10 scale
    #[error("term average {0} is outside 0.0..=10.0")]
    InvalidTermAverage(f64),

    /// OCR dump was not valid JSON
    #[error("OCR dump is not valid JSON: {0}")]
    InvalidOcrDump(#[from] serde_json::Error),
}
