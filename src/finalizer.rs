// ✅ Subject Finalizer
// One raw block + a registry lookup → one immutable SubjectRecord.

use crate::entities::CourseLookup;
use crate::parser::RawSubjectBlock;
use crate::policy::{
    earned_points, grade_point_for_marks, LAB_CORRECTED_TOTAL, LAB_CORRECTION_WINDOW,
    PASS_THRESHOLD,
};
use crate::tokens::{has_lab_position_marker, Marker};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// GRADE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeStatus {
    Pass,
    Fail,
}

impl GradeStatus {
    /// Implicit status when the card carried no P/F marker
    pub fn from_marks(total_marks: u32) -> Self {
        if total_marks >= PASS_THRESHOLD {
            GradeStatus::Pass
        } else {
            GradeStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeStatus::Pass => "P",
            GradeStatus::Fail => "F",
        }
    }
}

impl From<Marker> for GradeStatus {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Pass => GradeStatus::Pass,
            Marker::Fail => GradeStatus::Fail,
        }
    }
}

// ============================================================================
// SUBJECT RECORD
// ============================================================================

/// Finalized subject. `earned_points` is always derived from
/// `grade_point × credit_weight`, including on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SubjectRow", from = "SubjectRow")]
pub struct SubjectRecord {
    pub code: String,
    pub display_name: String,
    pub credit_weight: u32,
    pub total_marks: u32,
    pub grade_status: GradeStatus,
    pub grade_point: u32,
}

impl SubjectRecord {
    pub fn earned_points(&self) -> u64 {
        earned_points(self.grade_point, self.credit_weight)
    }

    pub fn is_failed(&self) -> bool {
        self.grade_status == GradeStatus::Fail
    }
}

/// Wire shape of a SubjectRecord
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubjectRow {
    code: String,
    name: String,
    credits: u32,
    total_marks: u32,
    grade: GradeStatus,
    grade_point: u32,
    #[serde(default)]
    earned_points: u64,
}

impl From<SubjectRecord> for SubjectRow {
    fn from(record: SubjectRecord) -> Self {
        let earned_points = record.earned_points();
        SubjectRow {
            code: record.code,
            name: record.display_name,
            credits: record.credit_weight,
            total_marks: record.total_marks,
            grade: record.grade_status,
            grade_point: record.grade_point,
            earned_points,
        }
    }
}

impl From<SubjectRow> for SubjectRecord {
    // earned_points on the wire is ignored, it is recomputed
    fn from(row: SubjectRow) -> Self {
        SubjectRecord {
            code: row.code,
            display_name: row.name,
            credit_weight: row.credits,
            total_marks: row.total_marks,
            grade_status: row.grade,
            grade_point: row.grade_point,
        }
    }
}

// ============================================================================
// FINALIZATION
// ============================================================================

/// Laboratory course: "LAB" (upper case, as catalogue names are printed) in the
/// display name, or `L` as the 4th code character
pub fn is_lab_course(code: &str, display_name: &str) -> bool {
    display_name.contains("LAB") || has_lab_position_marker(code)
}

/// Lab components are often recognized as a raw subscore in 40..=50 instead of the
/// normalized total. Inside that window, and only for labs, the total becomes 99.
pub fn apply_lab_correction(total_marks: u32, is_lab: bool) -> u32 {
    if is_lab && LAB_CORRECTION_WINDOW.contains(&total_marks) {
        LAB_CORRECTED_TOTAL
    } else {
        total_marks
    }
}

/// Grade point for a finalized status + total
pub fn grade_point(total_marks: u32, status: GradeStatus) -> u32 {
    match status {
        GradeStatus::Fail => 0,
        GradeStatus::Pass => grade_point_for_marks(total_marks),
    }
}

/// Finalize one block
///
/// Total marks is the maximum observed number: OCR emits component marks next to
/// the total, and the total is assumed to be the largest of them. This is an
/// approximation; it is wrong whenever a component exceeds the printed total.
pub fn finalize_subject(block: &RawSubjectBlock, registry: &dyn CourseLookup) -> SubjectRecord {
    let course = registry.lookup(&block.code);

    let observed_max = block.observed_numbers.iter().copied().max().unwrap_or(0);

    let is_lab = is_lab_course(&block.code, &course.display_name);
    let total_marks = apply_lab_correction(observed_max, is_lab);
    if total_marks != observed_max {
        debug!(code = %block.code, observed = observed_max, corrected = total_marks, "lab score corrected");
    }

    let grade_status = block
        .result_marker
        .map(GradeStatus::from)
        .unwrap_or_else(|| GradeStatus::from_marks(total_marks));

    SubjectRecord {
        code: block.code.clone(),
        display_name: course.display_name,
        credit_weight: course.credit_weight,
        total_marks,
        grade_status,
        grade_point: grade_point(total_marks, grade_status),
    }
}

/// Finalize every block, preserving stream order
pub fn finalize_all(blocks: &[RawSubjectBlock], registry: &dyn CourseLookup) -> Vec<SubjectRecord> {
    blocks
        .iter()
        .map(|block| finalize_subject(block, registry))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Course, CourseRegistry};
    use proptest::prelude::*;

    fn fixture_registry() -> CourseRegistry {
        CourseRegistry::from_courses([
            Course::new("BCS401", "ANALYSIS & DESIGN OF ALGORITHMS", 4),
            Course::new("BCSL404", "ADA LAB", 1),
            Course::new("BXYZ410", "NETWORKS LAB", 2),
            Course::new("BPEK459", "PHYSICAL EDUCATION", 0),
        ])
    }

    #[test]
    fn test_finalize_uses_max_observed() {
        let registry = fixture_registry();
        let block = RawSubjectBlock::new("BCS401").with_numbers(&[38, 50, 88, 12]);

        let record = finalize_subject(&block, &registry);
        assert_eq!(record.total_marks, 88);
        assert_eq!(record.grade_status, GradeStatus::Pass);
        assert_eq!(record.grade_point, 9);
        assert_eq!(record.earned_points(), 36);
    }

    #[test]
    fn test_finalize_lab_correction_by_code() {
        let registry = fixture_registry();
        let block = RawSubjectBlock::new("BCSL404").with_numbers(&[45]);

        let record = finalize_subject(&block, &registry);
        assert_eq!(record.total_marks, 99);
        assert_eq!(record.grade_point, 10);
        assert_eq!(record.earned_points(), 10);
    }

    #[test]
    fn test_finalize_lab_correction_by_name() {
        let registry = fixture_registry();
        let block = RawSubjectBlock::new("BXYZ410").with_numbers(&[40]);

        let record = finalize_subject(&block, &registry);
        assert_eq!(record.total_marks, 99);
        assert_eq!(record.earned_points(), 20);
    }

    #[test]
    fn test_lab_correction_outside_window() {
        let registry = fixture_registry();

        let low = finalize_subject(&RawSubjectBlock::new("BCSL404").with_numbers(&[39]), &registry);
        assert_eq!(low.total_marks, 39);
        assert_eq!(low.grade_status, GradeStatus::Pass);
        assert_eq!(low.grade_point, 0);

        let high = finalize_subject(&RawSubjectBlock::new("BCSL404").with_numbers(&[51]), &registry);
        assert_eq!(high.total_marks, 51);
        assert_eq!(high.grade_point, 5);
    }

    #[test]
    fn test_mixed_case_lab_word_is_not_a_lab() {
        let registry = CourseRegistry::from_courses([Course::new("BCS410", "Collaborative Robotics", 3)]);
        let record = finalize_subject(&RawSubjectBlock::new("BCS410").with_numbers(&[45]), &registry);

        assert!(!is_lab_course("BCS410", "Collaborative Robotics"));
        assert_eq!(record.total_marks, 45);
        assert_eq!(record.grade_point, 4);
        assert_eq!(record.earned_points(), 12);
    }

    #[test]
    fn test_fallback_lab_name_without_lab_position() {
        // Unknown BLS401 falls back to "Lab BLS401" / 1 credit, but neither the
        // name nor the 4th code character marks it as a lab
        let registry = CourseRegistry::new();
        let record = finalize_subject(&RawSubjectBlock::new("BLS401").with_numbers(&[45]), &registry);

        assert_eq!(record.display_name, "Lab BLS401");
        assert_eq!(record.credit_weight, 1);
        assert_eq!(record.total_marks, 45);
        assert_eq!(record.grade_point, 4);
    }

    #[test]
    fn test_no_lab_correction_for_theory() {
        let registry = fixture_registry();
        let record = finalize_subject(&RawSubjectBlock::new("BCS401").with_numbers(&[45]), &registry);

        assert_eq!(record.total_marks, 45);
        assert_eq!(record.grade_point, 4);
    }

    #[test]
    fn test_explicit_fail_marker_overrides_marks() {
        let registry = fixture_registry();
        let block = RawSubjectBlock::new("BCS401")
            .with_numbers(&[92])
            .with_marker(Marker::Fail);

        let record = finalize_subject(&block, &registry);
        assert_eq!(record.grade_status, GradeStatus::Fail);
        assert_eq!(record.grade_point, 0);
        assert_eq!(record.earned_points(), 0);
    }

    #[test]
    fn test_explicit_pass_marker_below_threshold() {
        // Marker wins, but the marks table still gives 0 below 40
        let registry = fixture_registry();
        let block = RawSubjectBlock::new("BCS401")
            .with_numbers(&[30])
            .with_marker(Marker::Pass);

        let record = finalize_subject(&block, &registry);
        assert_eq!(record.grade_status, GradeStatus::Pass);
        assert_eq!(record.grade_point, 0);
    }

    #[test]
    fn test_unknown_code_without_numbers() {
        let registry = fixture_registry();
        let record = finalize_subject(&RawSubjectBlock::new("ZZZ999"), &registry);

        assert_eq!(record.display_name, "Unknown Course");
        assert_eq!(record.credit_weight, 3);
        assert_eq!(record.total_marks, 0);
        assert_eq!(record.grade_status, GradeStatus::Fail);
        assert_eq!(record.grade_point, 0);
        assert_eq!(record.earned_points(), 0);
    }

    #[test]
    fn test_zero_credit_course() {
        let registry = fixture_registry();
        let record = finalize_subject(&RawSubjectBlock::new("BPEK459").with_numbers(&[75]), &registry);

        assert_eq!(record.grade_point, 8);
        assert_eq!(record.earned_points(), 0);
    }

    #[test]
    fn test_serde_recomputes_earned_points() {
        let json = r#"{"code":"BCS401","name":"ALGO","credits":4,"total_marks":88,
                       "grade":"Pass","grade_point":9,"earned_points":999}"#;
        let record: SubjectRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.earned_points(), 36);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["earned_points"], 36);
        assert_eq!(value["name"], "ALGO");
    }

    proptest! {
        #[test]
        fn test_lab_correction_only_inside_window(marks in 0u32..=100, is_lab in any::<bool>()) {
            let corrected = apply_lab_correction(marks, is_lab);
            if is_lab && (40..=50).contains(&marks) {
                prop_assert_eq!(corrected, 99);
            } else {
                prop_assert_eq!(corrected, marks);
            }
        }
    }
}
