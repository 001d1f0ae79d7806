// 🔍 Scan Pipeline
// tokens → student details → subject blocks → subject records → term result
//
// Pure and synchronous: the same token stream always yields the same subjects and
// term result. Only `id` and `scanned_at` differ between runs.

use crate::aggregator::{aggregate_subjects, TermResult};
use crate::entities::CourseLookup;
use crate::finalizer::{finalize_all, SubjectRecord};
use crate::parser::parse_tokens;
use crate::source::{detect_method, get_source, ExtractionMethod};
use crate::student::extract_student_details;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOutcome {
    Success,
    /// Empty token stream
    NoTextFound,
    /// Tokens present, but not a single course code among them
    NoSubjectsRecognized,
}

impl ScanOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ScanOutcome::Success => "success",
            ScanOutcome::NoTextFound => "No text found",
            ScanOutcome::NoSubjectsRecognized => "No subjects recognized",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub id: String,
    pub method: ExtractionMethod,
    pub outcome: ScanOutcome,
    pub student_name: String,
    pub usn: String,
    pub subjects: Vec<SubjectRecord>,
    pub term: TermResult,
    /// Subjects with grade status Fail
    pub failures: usize,
    /// SHA-256 of the token stream, for duplicate-scan detection
    pub fingerprint: String,
    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn is_success(&self) -> bool {
        self.outcome == ScanOutcome::Success
    }
}

/// Fingerprint a token stream. Each token is length-prefixed, so tokens that
/// themselves contain separators cannot collide with a different split.
pub fn fingerprint_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut hasher = Sha256::new();
    for token in tokens {
        let bytes = token.as_ref().as_bytes();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    format!("{:x}", hasher.finalize())
}

/// Run the full pipeline over an in-memory token stream
pub fn scan_tokens<S: AsRef<str>>(
    tokens: &[S],
    method: ExtractionMethod,
    registry: &dyn CourseLookup,
) -> ScanReport {
    let student = extract_student_details(tokens);
    let blocks = parse_tokens(tokens);
    let subjects = finalize_all(&blocks, registry);
    let term = aggregate_subjects(&subjects);

    let outcome = if tokens.is_empty() {
        ScanOutcome::NoTextFound
    } else if subjects.is_empty() {
        ScanOutcome::NoSubjectsRecognized
    } else {
        ScanOutcome::Success
    };

    if outcome != ScanOutcome::Success {
        info!(tokens = tokens.len(), outcome = outcome.message(), "scan produced no subjects");
    } else {
        info!(subjects = subjects.len(), sgpa = term.average, "scan complete");
    }

    let failures = subjects.iter().filter(|s| s.is_failed()).count();

    ScanReport {
        id: uuid::Uuid::new_v4().to_string(),
        method,
        outcome,
        student_name: student.name,
        usn: student.usn,
        subjects,
        term,
        failures,
        fingerprint: fingerprint_tokens(tokens),
        scanned_at: Utc::now(),
    }
}

/// Detect the source, read its tokens, scan them
pub fn scan_file(
    file_path: &Path,
    min_token_chars: usize,
    registry: &dyn CourseLookup,
) -> Result<ScanReport> {
    let method = detect_method(file_path)?;
    let tokens = get_source(method, min_token_chars)?.read_tokens(file_path)?;
    Ok(scan_tokens(tokens.as_slice(), method, registry))
}
