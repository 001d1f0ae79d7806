// 📏 Grading Policy - Rules as Data
// VTU grading scale. Boundaries are hardcoded on purpose: these numbers are
// display- and comparison-significant and must not drift.

use crate::tokens::MAX_MARK;
use std::ops::RangeInclusive;

/// Minimum total marks for an implicit pass
pub const PASS_THRESHOLD: u32 = 35;

/// Lab totals recognized inside this window are treated as a misread subscore
pub const LAB_CORRECTION_WINDOW: RangeInclusive<u32> = 40..=50;

/// Value substituted for a corrected lab total
pub const LAB_CORRECTED_TOTAL: u32 = 99;

/// Marks-to-point table (0-100 scale), checked top to bottom
/// (lower bound, grade point)
pub const MARKS_TO_POINTS: &[(u32, u32)] = &[
    (90, 10),
    (80, 9),
    (70, 8),
    (60, 7),
    (55, 6),
    (50, 5),
    (40, 4),
];

/// Letter-grade table for manual entry (independent of the marks table)
pub const LETTER_GRADES: &[(&str, u32)] = &[
    ("O", 10),  // Outstanding
    ("A+", 9),  // Excellent
    ("A", 8),   // Very Good
    ("B+", 7),  // Good
    ("B", 6),   // Above Average
    ("C", 5),   // Average
    ("P", 4),   // Pass
    ("F", 0),   // Fail
    ("AB", 0),  // Absent
];

/// Grade point for a total on the 0-100 scale. Anything below 40 is 0,
/// and so is anything off the scale.
pub fn grade_point_for_marks(total_marks: u32) -> u32 {
    if total_marks > MAX_MARK {
        return 0;
    }

    MARKS_TO_POINTS
        .iter()
        .find(|(lower, _)| total_marks >= *lower)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

/// Grade point for a user-typed label ("a+", " O ").
/// None when the label is not on the scale.
pub fn grade_point_for_label(label: &str) -> Option<u32> {
    let key = label.trim().to_uppercase();
    LETTER_GRADES
        .iter()
        .find(|(grade, _)| *grade == key)
        .map(|(_, points)| *points)
}

/// Credit points a subject contributes: no hidden rounding.
/// Widened to u64 so the product of any two u32 values fits.
pub fn earned_points(grade_point: u32, credit_weight: u32) -> u64 {
    u64::from(grade_point) * u64::from(credit_weight)
}
