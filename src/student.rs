// 🎓 Student details from the marks card header

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// VTU university seat number: 1AB23CD456
static USN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d[A-Z]{2}\d{2}[A-Z]{2}\d{3})").unwrap());

static NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Student Name\s*[:\-\.]?\s*([A-Z\s\.]+?)(?:\s+Semester|$)").unwrap()
});

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDetails {
    pub usn: String,
    pub name: String,
}

impl Default for StudentDetails {
    fn default() -> Self {
        StudentDetails {
            usn: UNKNOWN.to_string(),
            name: UNKNOWN.to_string(),
        }
    }
}

/// Search the space-joined token stream for USN and student name
pub fn extract_student_details<S: AsRef<str>>(tokens: &[S]) -> StudentDetails {
    let full = tokens.iter().map(|t| t.as_ref()).collect::<Vec<&str>>().join(" ");

    let usn = USN_REGEX
        .captures(&full)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let name = NAME_REGEX
        .captures(&full)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| !n.is_empty());

    StudentDetails {
        usn: usn.unwrap_or_else(|| UNKNOWN.to_string()),
        name: name.unwrap_or_else(|| UNKNOWN.to_string()),
    }
}
