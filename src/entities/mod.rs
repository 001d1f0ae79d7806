// Entity Models
// Course identity is the normalized code; name and credit weight are values
// supplied by the registry.

pub mod course;

pub use course::{fallback_course, Course, CourseLookup, CourseRegistry};
