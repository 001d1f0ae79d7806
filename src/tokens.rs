// 🔤 Token Classifier
// Every recognized string is classified exactly once, before the parser sees it.
// The parser's transition table only ever matches on `TokenKind`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Course code: B + 2 or more letters + exactly 3 digits + optional letter suffix
/// Examples: BCS401, BCSL404, BCS405A, BDSL456B
static COURSE_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^B[A-Z]{2,}\d{3}[A-Z]?$").unwrap());

/// Highest value accepted as a mark
pub const MAX_MARK: u32 = 100;

// ============================================================================
// MARKER
// ============================================================================

/// Explicit result marker printed on the marks card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Marker {
    Pass,
    Fail,
}

impl Marker {
    pub fn from_token(token: &str) -> Option<Marker> {
        match token {
            "P" => Some(Marker::Pass),
            "F" => Some(Marker::Fail),
            _ => None,
        }
    }
}

// ============================================================================
// TOKEN KIND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Opens a new subject block
    CourseCode(String),
    /// Integer in 0..=100
    Number(u32),
    /// "P" or "F"
    Marker(Marker),
    /// Anything else (headers, names, out-of-range numbers, OCR garbage)
    Noise,
}

/// Trim + uppercase. Applied before any classification.
pub fn normalize(token: &str) -> String {
    token.trim().to_uppercase()
}

/// Classify a single raw token
pub fn classify(raw: &str) -> TokenKind {
    let token = normalize(raw);

    if is_course_code(&token) {
        return TokenKind::CourseCode(token);
    }

    if let Some(value) = parse_mark(&token) {
        return TokenKind::Number(value);
    }

    match Marker::from_token(&token) {
        Some(marker) => TokenKind::Marker(marker),
        None => TokenKind::Noise,
    }
}

/// Does an (already normalized) token look like a course code?
pub fn is_course_code(token: &str) -> bool {
    COURSE_CODE_REGEX.is_match(token)
}

/// Purely numeric token within [0, 100]
fn parse_mark(token: &str) -> Option<u32> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    // Overflow on absurdly long digit runs is just noise
    let value: u32 = token.parse().ok()?;
    if value <= MAX_MARK {
        Some(value)
    } else {
        None
    }
}

/// Lab naming convention inside the code itself: 4th character is `L` (BCSL404)
pub fn has_lab_position_marker(code: &str) -> bool {
    code.chars().nth(3) == Some('L')
}

/// Looser guess used for codes missing from the catalogue:
/// any `L` in a code longer than 5 characters
pub fn looks_like_lab_code(code: &str) -> bool {
    code.contains('L') && code.chars().count() > 5
}

// ============================================================================
// TESTS
// ============================================================================
