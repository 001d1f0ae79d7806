// 🧮 Grading Engine - single-term aggregation
//
// Contract A: finalized SubjectRecords from a scan
// Contract B: manually entered (course, credits, letter grade) triples
//
// Both reduce to the same tally: Σ credits, Σ earned points, failing names.

use crate::finalizer::SubjectRecord;
use crate::policy::{earned_points, grade_point_for_label};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const STATUS_PASS: &str = "Pass";
pub const STATUS_NO_CREDITS: &str = "No credits registered";

// ============================================================================
// TERM RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermResult {
    pub total_credits: u64,
    pub total_earned_points: u64,

    /// Rounded half-up to 2 decimal places
    pub average: f64,

    /// "Pass", "Fail (<names>)" or "No credits registered"
    pub status: String,
}

impl TermResult {
    /// Sentinel for zero registered credits. Not an error.
    pub fn no_credits() -> Self {
        TermResult {
            total_credits: 0,
            total_earned_points: 0,
            average: 0.0,
            status: STATUS_NO_CREDITS.to_string(),
        }
    }

    pub fn has_credits(&self) -> bool {
        self.total_credits > 0
    }

    pub fn is_pass(&self) -> bool {
        self.status == STATUS_PASS
    }

    pub fn advisory(&self) -> Advisory {
        if !self.has_credits() {
            Advisory::NoData
        } else if self.average < 6.0 {
            Advisory::NeedsReview
        } else if self.average > 9.0 {
            Advisory::Outstanding
        } else {
            Advisory::OnTrack
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "SGPA: {:.2}, Credits: {}, Points: {}, Status: {}",
            self.average, self.total_credits, self.total_earned_points, self.status
        )
    }
}

/// Study advice derived from the term average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    NoData,
    NeedsReview,
    OnTrack,
    Outstanding,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::NoData => "No graded credits yet.",
            Advisory::NeedsReview => "SGPA below 6.0. Recommended to review study habits.",
            Advisory::OnTrack => "On track.",
            Advisory::Outstanding => "High SGPA. Keep it up!",
        }
    }
}

// ============================================================================
// ROUNDING
// ============================================================================

/// `points / credits` rounded half-up at 2 decimals, computed on integers so the
/// result does not depend on binary float representation.
pub fn rounded_average(total_points: u64, total_credits: u64) -> f64 {
    if total_credits == 0 {
        return 0.0;
    }

    let points = u128::from(total_points);
    let credits = u128::from(total_credits);
    let hundredths = (points * 200 + credits) / (credits * 2);

    hundredths as f64 / 100.0
}

// ============================================================================
// TALLY
// ============================================================================

#[derive(Debug, Default)]
struct TermTally {
    credits: u64,
    points: u64,
    failed: Vec<String>,
}

impl TermTally {
    // Each product fits in u64; the running sums saturate
    fn add(mut self, name: &str, credits: u32, grade_point: u32, failed: bool) -> Self {
        self.credits = self.credits.saturating_add(u64::from(credits));
        self.points = self.points.saturating_add(earned_points(grade_point, credits));
        if failed {
            self.failed.push(name.to_string());
        }
        self
    }

    fn into_result(self) -> TermResult {
        if self.credits == 0 {
            return TermResult::no_credits();
        }

        let status = if self.failed.is_empty() {
            STATUS_PASS.to_string()
        } else {
            format!("Fail ({})", self.failed.join(", "))
        };

        TermResult {
            total_credits: self.credits,
            total_earned_points: self.points,
            average: rounded_average(self.points, self.credits),
            status,
        }
    }
}

// ============================================================================
// CONTRACT A - SUBJECT RECORDS
// ============================================================================

/// Aggregate finalized subjects; failures are listed by display name
pub fn aggregate_subjects(subjects: &[SubjectRecord]) -> TermResult {
    subjects
        .iter()
        .fold(TermTally::default(), |tally, s| {
            tally.add(&s.display_name, s.credit_weight, s.grade_point, s.is_failed())
        })
        .into_result()
}

// ============================================================================
// CONTRACT B - MANUAL ENTRY
// ============================================================================

/// One manually entered course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCourse {
    pub name: String,
    pub credits: u32,
    pub grade: String,
}

impl ManualCourse {
    pub fn new(name: &str, credits: u32, grade: &str) -> Self {
        ManualCourse {
            name: name.to_string(),
            credits,
            grade: grade.to_string(),
        }
    }

    /// Resolved grade point. Unknown labels count as 0 with a warning.
    pub fn grade_point(&self) -> u32 {
        grade_point_for_label(&self.grade).unwrap_or_else(|| {
            warn!(course = %self.name, grade = %self.grade.trim().to_uppercase(), "unknown grade label, treating as 0");
            0
        })
    }
}

/// Aggregate manual entries; a course fails when it resolves to 0 points
pub fn aggregate_manual(courses: &[ManualCourse]) -> TermResult {
    courses
        .iter()
        .fold(TermTally::default(), |tally, c| {
            let points = c.grade_point();
            tally.add(&c.name, c.credits, points, points == 0)
        })
        .into_result()
}

/// Load manual entries from a CSV with header `name,credits,grade`
pub fn load_manual_csv(path: &Path) -> Result<Vec<ManualCourse>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open grades file: {}", path.display()))?;

    let mut courses = Vec::new();
    for (line_num, result) in reader.deserialize().enumerate() {
        let course: ManualCourse = result.with_context(|| {
            format!("Failed to parse grades line {} in {}", line_num + 2, path.display())
        })?;
        courses.push(course);
    }

    Ok(courses)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finalizer::GradeStatus;
    use rstest::rstest;
    use std::io::Write;

    fn subject(name: &str, credits: u32, grade_point: u32, status: GradeStatus) -> SubjectRecord {
        SubjectRecord {
            code: "BCS401".to_string(),
            display_name: name.to_string(),
            credit_weight: credits,
            total_marks: 0,
            grade_status: status,
            grade_point,
        }
    }

    #[rstest]
    #[case(46, 5, 9.2)]
    #[case(36, 5, 7.2)]
    #[case(10, 3, 3.33)]
    #[case(20, 3, 6.67)]
    #[case(1, 8, 0.13)] // 0.125 rounds up
    #[case(0, 4, 0.0)]
    #[case(7, 0, 0.0)]
    fn test_rounded_average(#[case] points: u64, #[case] credits: u64, #[case] expected: f64) {
        assert_eq!(rounded_average(points, credits), expected);
    }

    #[test]
    fn test_aggregate_subjects_all_pass() {
        let subjects = vec![
            subject("ALGORITHMS", 4, 9, GradeStatus::Pass),
            subject("ADA LAB", 1, 10, GradeStatus::Pass),
        ];

        let result = aggregate_subjects(&subjects);
        assert_eq!(result.total_credits, 5);
        assert_eq!(result.total_earned_points, 46);
        assert_eq!(result.average, 9.2);
        assert_eq!(result.status, "Pass");
        assert!(result.is_pass());
    }

    #[test]
    fn test_aggregate_subjects_lists_failures_in_order() {
        let subjects = vec![
            subject("MICROCONTROLLERS", 4, 0, GradeStatus::Fail),
            subject("ALGORITHMS", 3, 8, GradeStatus::Pass),
            subject("DBMS", 4, 0, GradeStatus::Fail),
        ];

        let result = aggregate_subjects(&subjects);
        assert_eq!(result.status, "Fail (MICROCONTROLLERS, DBMS)");
        assert_eq!(result.total_credits, 11);
        assert_eq!(result.total_earned_points, 24);
        assert_eq!(result.average, 2.18);
    }

    #[test]
    fn test_aggregate_subjects_empty() {
        assert_eq!(aggregate_subjects(&[]), TermResult::no_credits());
    }

    #[test]
    fn test_zero_credit_guard() {
        let subjects = vec![subject("PHYSICAL EDUCATION", 0, 8, GradeStatus::Pass)];
        let result = aggregate_subjects(&subjects);

        assert_eq!(result.total_credits, 0);
        assert_eq!(result.average, 0.0);
        assert_eq!(result.status, STATUS_NO_CREDITS);
    }

    #[test]
    fn test_aggregate_manual() {
        let courses = vec![ManualCourse::new("Math", 4, "a+"), ManualCourse::new("Lab", 1, "f")];

        let result = aggregate_manual(&courses);
        assert_eq!(result.total_credits, 5);
        assert_eq!(result.total_earned_points, 36);
        assert_eq!(result.average, 7.2);
        assert_eq!(result.status, "Fail (Lab)");
    }

    #[test]
    fn test_aggregate_manual_unknown_grade_is_zero() {
        let courses = vec![
            ManualCourse::new("Math", 4, "O"),
            ManualCourse::new("Physics", 3, "Z"),
        ];

        let result = aggregate_manual(&courses);
        assert_eq!(result.total_earned_points, 40);
        assert_eq!(result.total_credits, 7);
        assert_eq!(result.status, "Fail (Physics)");
    }

    #[test]
    fn test_aggregate_manual_huge_credits() {
        let courses = vec![
            ManualCourse::new("Big", 500_000_000, "O"),
            ManualCourse::new("Bigger", u32::MAX, "A"),
        ];

        let result = aggregate_manual(&courses);
        let credits = 500_000_000u64 + u64::from(u32::MAX);
        let points = 5_000_000_000u64 + 8 * u64::from(u32::MAX);
        assert_eq!(result.total_credits, credits);
        assert_eq!(result.total_earned_points, points);
        assert_eq!(result.average, rounded_average(points, credits));
        assert_eq!(result.status, "Pass");
    }

    #[test]
    fn test_rounded_average_at_u64_limit() {
        assert_eq!(rounded_average(u64::MAX, u64::MAX), 1.0);
    }

    #[test]
    fn test_aggregate_manual_absent() {
        let result = aggregate_manual(&[ManualCourse::new("Chem", 3, " ab ")]);
        assert_eq!(result.status, "Fail (Chem)");
        assert_eq!(result.average, 0.0);
    }

    #[rstest]
    #[case(5.99, Advisory::NeedsReview)]
    #[case(6.0, Advisory::OnTrack)]
    #[case(9.0, Advisory::OnTrack)]
    #[case(9.01, Advisory::Outstanding)]
    fn test_advisory(#[case] average: f64, #[case] expected: Advisory) {
        let result = TermResult {
            total_credits: 20,
            total_earned_points: 0,
            average,
            status: STATUS_PASS.to_string(),
        };
        assert_eq!(result.advisory(), expected);
    }

    #[test]
    fn test_advisory_no_data() {
        assert_eq!(TermResult::no_credits().advisory(), Advisory::NoData);
    }

    #[test]
    fn test_load_manual_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,credits,grade").unwrap();
        writeln!(file, "Math, 4, a+").unwrap();
        writeln!(file, "Lab,1,f").unwrap();

        let courses = load_manual_csv(file.path()).unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0], ManualCourse::new("Math", 4, "a+"));
        assert_eq!(aggregate_manual(&courses).average, 7.2);
    }

    #[test]
    fn test_load_manual_csv_bad_credits() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,credits,grade").unwrap();
        writeln!(file, "Math,-4,A").unwrap();

        assert!(load_manual_csv(file.path()).is_err());
    }
}
