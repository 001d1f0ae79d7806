use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sgpa_scanner::{
    aggregate_manual, append_term, insert_scan, load_cumulative_record, load_manual_csv,
    open_database, reset_terms, scan_file, AppConfig, ScanReport, TermResult, VERSION,
};

#[derive(Parser)]
#[command(name = "sgpa-scanner", version, about = "Marks card → SGPA calculator")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a marks card (.txt text layer or .json OCR dump)
    Scan {
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Store the report in the database
        #[arg(long)]
        save: bool,
    },
    /// SGPA from a CSV of name,credits,grade
    Calc {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Multi-semester tracker
    Term {
        #[command(subcommand)]
        action: TermAction,
    },
    /// List the course catalogue
    Courses,
}

#[derive(Subcommand)]
enum TermAction {
    /// Record a semester
    Add { sgpa: f64, credits: u32 },
    /// Show recorded semesters and the CGPA
    List,
    /// Forget every recorded semester
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("sgpa-scanner v{}", VERSION);

    match cli.command {
        Command::Scan { file, json, save } => run_scan(&config, &file, json, save),
        Command::Calc { file, json } => run_calc(&file, json),
        Command::Term { action } => run_term(&config, action),
        Command::Courses => run_courses(&config),
    }
}

fn run_scan(config: &AppConfig, file: &Path, json: bool, save: bool) -> Result<()> {
    let registry = config.course_registry()?;
    let report = scan_file(file, config.min_token_chars, &registry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if save {
        let conn = open_database(&config.database_path)?;
        if insert_scan(&conn, &report)? {
            println!("💾 Scan saved ({})", report.id);
        } else {
            println!("✓ Same marks card already saved, skipped");
        }
    }

    Ok(())
}

fn print_report(report: &ScanReport) {
    println!("🎓 {} ({})", report.student_name, report.usn);
    println!("📄 Method: {}", report.method.name());

    if !report.is_success() {
        println!("⚠️  {}", report.outcome.message());
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for s in &report.subjects {
        println!(
            "{:<9} {:<34} {:>2}cr {:>3} {} {:>2}pt",
            s.code,
            s.display_name,
            s.credit_weight,
            s.total_marks,
            s.grade_status.as_str(),
            s.earned_points()
        );
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print_term(&report.term);
}

fn print_term(term: &TermResult) {
    println!("🧮 {}", term.summary());
    println!("💡 {}", term.advisory().message());
}

fn run_calc(file: &Path, json: bool) -> Result<()> {
    let courses = load_manual_csv(file)?;
    let result = aggregate_manual(&courses);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("📂 Loaded {} courses", courses.len());
        print_term(&result);
    }

    Ok(())
}

fn run_term(config: &AppConfig, action: TermAction) -> Result<()> {
    let conn = open_database(&config.database_path)?;

    match action {
        TermAction::Add { sgpa, credits } => {
            let mut record = load_cumulative_record(&conn)?;
            let entry = record.append(sgpa, credits)?.clone();
            append_term(&conn, &entry)?;
            println!("➕ Semester {} added: SGPA {:.2}, {} credits", entry.term_index, sgpa, credits);
            println!("🎯 Cumulative CGPA: {:.2}", record.cumulative_average());
        }
        TermAction::List => {
            let record = load_cumulative_record(&conn)?;
            if record.is_empty() {
                println!("No semesters recorded yet.");
                return Ok(());
            }
            for entry in record.entries() {
                println!("Semester {:>2}: SGPA {:.2}, {} credits", entry.term_index, entry.average, entry.credits);
            }
            println!("🎯 Cumulative CGPA: {:.2}", record.cumulative_average());
        }
        TermAction::Reset => {
            let removed = reset_terms(&conn)?;
            println!("🗑️  Removed {} semesters", removed);
        }
    }

    Ok(())
}

fn run_courses(config: &AppConfig) -> Result<()> {
    let registry = config.course_registry()?;

    println!("📚 {} courses", registry.count());
    for course in registry.all_courses() {
        println!("{:<9} {:>2}cr  {}", course.code, course.credit_weight, course.display_name);
    }

    Ok(())
}
