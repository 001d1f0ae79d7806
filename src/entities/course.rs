// 📚 Course Entity + Course Registry
//
// "Course code is IDENTITY, name and credits are VALUES"
//
// Problem solved:
// - Marks cards only print the code; credits drive the weighted average
// - Unknown codes must still produce a usable weight (documented fallback)
// - The registry is passed into the finalizer, never reached through a global

use crate::error::GradingError;
use crate::tokens::{looks_like_lab_code, normalize};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

/// Display name used when nothing is known about a code
pub const UNKNOWN_COURSE_NAME: &str = "Unknown Course";

/// Credit weight assumed for an unknown theory course
pub const DEFAULT_CREDITS: u32 = 3;

/// Credit weight assumed for an unknown lab course
pub const DEFAULT_LAB_CREDITS: u32 = 1;

// ============================================================================
// COURSE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Normalized course code (BCS401)
    pub code: String,

    /// Name shown on reports
    pub display_name: String,

    /// Institution-assigned weight
    pub credit_weight: u32,
}

impl Course {
    pub fn new(code: &str, display_name: &str, credit_weight: u32) -> Self {
        Course {
            code: normalize(code),
            display_name: display_name.to_string(),
            credit_weight,
        }
    }
}

/// Catalogue file row. Credits are read wide so a negative weight is
/// reported as such instead of a generic parse failure.
#[derive(Debug, Deserialize)]
struct CatalogueEntry {
    code: String,
    name: String,
    credits: i64,
}

impl TryFrom<CatalogueEntry> for Course {
    type Error = GradingError;

    fn try_from(entry: CatalogueEntry) -> std::result::Result<Self, Self::Error> {
        let credits = u32::try_from(entry.credits).map_err(|_| GradingError::InvalidCredits {
            code: entry.code.clone(),
            credits: entry.credits,
        })?;
        Ok(Course::new(&entry.code, &entry.name, credits))
    }
}

// ============================================================================
// LOOKUP SEAM
// ============================================================================

/// CourseLookup - what the finalizer needs from a registry
///
/// Must never fail: unknown codes resolve through the fallback policy.
pub trait CourseLookup: Send + Sync {
    fn lookup(&self, code: &str) -> Course;
}

/// Fallback for codes missing from the catalogue
///
/// - Lab naming convention (an `L` in a code longer than 5 chars) → 1 credit
/// - Anything else → "Unknown Course", 3 credits
pub fn fallback_course(code: &str) -> Course {
    let code = normalize(code);

    if looks_like_lab_code(&code) {
        warn!(code = %code, credits = DEFAULT_LAB_CREDITS, "course not in registry, assuming lab");
        return Course::new(&code, &format!("Lab {}", code), DEFAULT_LAB_CREDITS);
    }

    warn!(code = %code, credits = DEFAULT_CREDITS, "course not in registry, assuming default credits");
    Course::new(&code, UNKNOWN_COURSE_NAME, DEFAULT_CREDITS)
}

// ============================================================================
// COURSE REGISTRY
// ============================================================================

/// In-memory catalogue keyed by normalized code
///
/// Reads take a shared lock; `register` swaps a single entry under the write lock,
/// so a reader sees either the old entry or the new one.
#[derive(Clone, Debug)]
pub struct CourseRegistry {
    courses: Arc<RwLock<HashMap<String, Course>>>,
}

impl CourseRegistry {
    /// Registry with the default VTU catalogue
    pub fn new() -> Self {
        let registry = CourseRegistry::empty();
        registry.register_default_courses();
        registry
    }

    /// Registry with no entries (every lookup falls back)
    pub fn empty() -> Self {
        CourseRegistry {
            courses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Build from a list of courses (test fixtures, custom catalogues)
    pub fn from_courses<I: IntoIterator<Item = Course>>(courses: I) -> Self {
        let registry = CourseRegistry::empty();
        for course in courses {
            registry.register(course);
        }
        registry
    }

    /// Load a catalogue from a JSON array of `{code, name, credits}`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read course catalogue: {:?}", path.as_ref()))?;

        let entries: Vec<CatalogueEntry> =
            serde_json::from_str(&content).context("Failed to parse course catalogue JSON")?;

        let courses = entries
            .into_iter()
            .map(Course::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CourseRegistry::from_courses(courses))
    }

    /// 4th semester CSE scheme plus common 3rd semester codes
    fn register_default_courses(&self) {
        let defaults = [
            ("BCS401", "ANALYSIS & DESIGN OF ALGORITHMS", 3),
            ("BCS402", "MICROCONTROLLERS", 4),
            ("BCS403", "DATABASE MANAGEMENT SYSTEMS", 4),
            ("BCSL404", "ADA LAB", 1),
            ("BBOC407", "BIOLOGY FOR ENGINEERS", 2),
            ("BUHK408", "HUMAN VALUES", 1),
            ("BPEK459", "PHYSICAL EDUCATION", 0),
            ("BCS405A", "DISCRETE MATH", 3),
            ("BDSL456B", "MONGODB", 1),
            ("BCSL405", "Subject BCSL405", 1),
            ("BCSL406", "Subject BCSL406", 1),
            ("BCS301", "Subject BCS301", 4),
            ("BCS302", "Subject BCS302", 4),
            ("BCS303", "Subject BCS303", 4),
        ];

        for (code, name, credits) in defaults {
            self.register(Course::new(code, name, credits));
        }
    }

    /// Add or replace a course
    pub fn register(&self, course: Course) {
        let mut courses = self.courses.write().unwrap_or_else(PoisonError::into_inner);
        courses.insert(course.code.clone(), course);
    }

    /// Catalogue entry only, no fallback
    pub fn get(&self, code: &str) -> Option<Course> {
        let courses = self.courses.read().unwrap_or_else(PoisonError::into_inner);
        courses.get(&normalize(code)).cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// All courses sorted by code
    pub fn all_courses(&self) -> Vec<Course> {
        let courses = self.courses.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Course> = courses.values().cloned().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }

    pub fn count(&self) -> usize {
        self.courses.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl CourseLookup for CourseRegistry {
    fn lookup(&self, code: &str) -> Course {
        self.get(code).unwrap_or_else(|| fallback_course(code))
    }
}

impl Default for CourseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
