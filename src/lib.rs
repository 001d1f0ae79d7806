// SGPA Scanner - Core Library
// Marks-card token stream → subject records → SGPA, plus multi-term CGPA tracking

pub mod tokens;
pub mod parser;
pub mod source;
pub mod student;
pub mod policy;
pub mod entities;
pub mod finalizer;
pub mod aggregator;
pub mod cumulative;
pub mod scan;
pub mod db;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use tokens::{classify, Marker, TokenKind};
pub use parser::{parse_tokens, ParserState, RawSubjectBlock};
pub use source::{
    detect_method, get_source, DigitalTextSource, ExtractionMethod, OcrDumpSource, TokenSource,
};
pub use student::{extract_student_details, StudentDetails};
pub use entities::{Course, CourseLookup, CourseRegistry};
pub use finalizer::{finalize_all, finalize_subject, GradeStatus, SubjectRecord};
pub use aggregator::{
    aggregate_manual, aggregate_subjects, load_manual_csv, Advisory, ManualCourse, TermResult,
};
pub use cumulative::{CumulativeRecord, TermEntry};
pub use scan::{scan_file, scan_tokens, ScanOutcome, ScanReport};
pub use db::{
    append_term, count_scans, insert_scan, load_cumulative_record, open_database, reset_terms,
    setup_database,
};
pub use config::AppConfig;
pub use error::GradingError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
