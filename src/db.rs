use crate::cumulative::{CumulativeRecord, TermEntry};
use crate::scan::ScanReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Terms Table (append-only multi-term tracker)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS terms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            term_index INTEGER NOT NULL,
            average REAL NOT NULL,
            credits INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Scans Table (one row per distinct token stream)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS scans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scan_id TEXT UNIQUE NOT NULL,
            fingerprint TEXT UNIQUE NOT NULL,
            usn TEXT NOT NULL,
            sgpa REAL NOT NULL,
            report TEXT NOT NULL,
            scanned_at TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_scans_usn ON scans(usn)",
        [],
    )?;

    Ok(())
}

/// Open (or create) the database file and make sure the schema exists
pub fn open_database(path: &std::path::Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

// ============================================================================
// TERMS
// ============================================================================

pub fn append_term(conn: &Connection, entry: &TermEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO terms (term_index, average, credits, recorded_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.term_index,
            entry.average,
            entry.credits,
            entry.recorded_at.to_rfc3339(),
        ],
    )?;

    debug!(term = entry.term_index, average = entry.average, credits = entry.credits, "term stored");
    Ok(())
}

/// Load every stored term in insertion order
pub fn load_cumulative_record(conn: &Connection) -> Result<CumulativeRecord> {
    let mut stmt = conn.prepare(
        "SELECT term_index, average, credits, recorded_at FROM terms ORDER BY id ASC",
    )?;

    let entries = stmt
        .query_map([], |row| {
            let recorded_at: String = row.get(3)?;

            Ok(TermEntry {
                term_index: row.get(0)?,
                average: row.get(1)?,
                credits: row.get(2)?,
                recorded_at: DateTime::parse_from_rfc3339(&recorded_at)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
                    })?
                    .with_timezone(&Utc),
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to load stored terms")?;

    Ok(CumulativeRecord::from_entries(entries))
}

/// Delete every stored term, returns how many were removed
pub fn reset_terms(conn: &Connection) -> Result<usize> {
    let removed = conn.execute("DELETE FROM terms", [])?;
    info!(removed, "terms reset");
    Ok(removed)
}

// ============================================================================
// SCANS
// ============================================================================

/// Store a scan report. Returns false when the same token stream was already stored.
pub fn insert_scan(conn: &Connection, report: &ScanReport) -> Result<bool> {
    let report_json = serde_json::to_string(report)?;

    let result = conn.execute(
        "INSERT INTO scans (scan_id, fingerprint, usn, sgpa, report, scanned_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id,
            report.fingerprint,
            report.usn,
            report.term.average,
            report_json,
            report.scanned_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            debug!(fingerprint = %report.fingerprint, "duplicate scan skipped");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_scan_by_fingerprint(conn: &Connection, fingerprint: &str) -> Result<Option<ScanReport>> {
    let report_json: Option<String> = conn
        .query_row(
            "SELECT report FROM scans WHERE fingerprint = ?1",
            params![fingerprint],
            |row| row.get(0),
        )
        .optional()?;

    report_json
        .map(|json| serde_json::from_str(&json).context("Failed to decode stored scan report"))
        .transpose()
}

pub fn count_scans(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM scans", [], |row| row.get(0))?;
    Ok(count)
}
