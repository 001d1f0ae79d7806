// 📥 Token Sources
// Turn upstream extraction output into an ordered token list.
//
// The OCR engine and PDF text extraction run elsewhere; these sources only read
// what they produced:
// - Digital text layer (.txt): whitespace-split, order preserved
// - OCR result dump (.json): every string harvested depth-first

use crate::error::GradingError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Recursion limit for OCR dumps
pub const MAX_OCR_DEPTH: usize = 10;

/// Strings shorter than this are dropped from OCR dumps by default
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 2;

// ============================================================================
// EXTRACTION METHOD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    DigitalText,
    OcrDump,
    /// Tokens handed in directly by the caller
    Direct,
}

impl ExtractionMethod {
    pub fn name(&self) -> &str {
        match self {
            ExtractionMethod::DigitalText => "Digital-Text",
            ExtractionMethod::OcrDump => "OCR-Dump",
            ExtractionMethod::Direct => "Direct",
        }
    }
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// TokenSource - Core trait
///
/// Adding a new upstream format means implementing this trait; the parser
/// never changes.
pub trait TokenSource: Send + Sync {
    /// Read a file and return its tokens in emission order
    fn read_tokens(&self, file_path: &Path) -> Result<Vec<String>>;

    /// Which method this source represents (reported with each scan)
    fn method(&self) -> ExtractionMethod;
}

/// Detect the source from the file extension
///
/// ```text
/// detect_method("marks_card.txt")  → DigitalText
/// detect_method("paddle_out.json") → OcrDump
/// ```
pub fn detect_method(file_path: &Path) -> std::result::Result<ExtractionMethod, GradingError> {
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "txt" => Ok(ExtractionMethod::DigitalText),
        "json" => Ok(ExtractionMethod::OcrDump),
        _ => Err(GradingError::UnsupportedSource(file_path.display().to_string())),
    }
}

/// Factory: Box<dyn TokenSource> for a method.
/// `Direct` streams are handed over in memory and have no file reader.
pub fn get_source(
    method: ExtractionMethod,
    min_token_chars: usize,
) -> std::result::Result<Box<dyn TokenSource>, GradingError> {
    match method {
        ExtractionMethod::OcrDump => Ok(Box::new(OcrDumpSource::new(min_token_chars))),
        ExtractionMethod::DigitalText => Ok(Box::new(DigitalTextSource)),
        ExtractionMethod::Direct => Err(GradingError::UnsupportedSource(method.name().to_string())),
    }
}

// ============================================================================
// DIGITAL TEXT
// ============================================================================

pub struct DigitalTextSource;

impl TokenSource for DigitalTextSource {
    fn read_tokens(&self, file_path: &Path) -> Result<Vec<String>> {
        let text = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read text layer: {}", file_path.display()))?;
        Ok(split_digital_text(&text))
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::DigitalText
    }
}

/// Split extracted text on any whitespace
pub fn split_digital_text(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

// ============================================================================
// OCR DUMP
// ============================================================================

pub struct OcrDumpSource {
    min_token_chars: usize,
}

impl OcrDumpSource {
    pub fn new(min_token_chars: usize) -> Self {
        OcrDumpSource { min_token_chars }
    }
}

impl Default for OcrDumpSource {
    fn default() -> Self {
        OcrDumpSource::new(DEFAULT_MIN_TOKEN_CHARS)
    }
}

impl TokenSource for OcrDumpSource {
    fn read_tokens(&self, file_path: &Path) -> Result<Vec<String>> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read OCR dump: {}", file_path.display()))?;
        let value: Value = serde_json::from_str(&content).map_err(GradingError::from)?;
        Ok(harvest_strings(&value, self.min_token_chars))
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::OcrDump
    }
}

/// Depth-first string harvest over an OCR result
///
/// OCR engines nest recognized text inside boxes, scores and page lists. Every
/// string that is long enough and not an internal `_field` is kept, arrays in
/// order, objects in document order. Numbers (confidence scores, coordinates)
/// are skipped.
pub fn harvest_strings(value: &Value, min_token_chars: usize) -> Vec<String> {
    let mut tokens = Vec::new();
    harvest_into(value, 0, min_token_chars, &mut tokens);
    tokens
}

fn harvest_into(value: &Value, depth: usize, min_token_chars: usize, tokens: &mut Vec<String>) {
    if depth > MAX_OCR_DEPTH {
        return;
    }

    match value {
        Value::String(s) => {
            if s.chars().count() >= min_token_chars && !s.starts_with('_') {
                tokens.push(s.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                harvest_into(item, depth + 1, min_token_chars, tokens);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                harvest_into(item, depth + 1, min_token_chars, tokens);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

// ============================================================================
// TESTS
// ============================================================================
