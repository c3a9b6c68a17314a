//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Column names match the upstream records database so rows can be copied
/// across verbatim.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS students (
    STUDENT_ID           TEXT PRIMARY KEY NOT NULL CHECK (STUDENT_ID <> ''),
    E_NAME               TEXT NOT NULL,
    CPR_NO               TEXT,
    PB_EMAIL             TEXT,
    MOBILE               TEXT,
    GENDER               TEXT,
    BDATE                TEXT,            -- usually YYYY-MM-DD
    CITIZENSHIP          TEXT,
    PROFILE_PICTURE      TEXT,            -- URI
    COLLEGE              TEXT,
    MAJR1                TEXT,
    PERS_EMAIL           TEXT,
    SPRADDR_STREET_LINE1 TEXT,
    SPRADDR_STREET_LINE2 TEXT,
    SPRADDR_STREET_LINE3 TEXT,
    SPRADDR_CITY         TEXT,
    SPRADDR_ZIP          TEXT
);

CREATE INDEX IF NOT EXISTS students_name_idx ON students(E_NAME);

PRAGMA user_version = 1;
";
