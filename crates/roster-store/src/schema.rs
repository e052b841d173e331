// SPDX-License-Identifier: Apache-2.0

use rusqlite::Connection;

pub const SQLITE_SCHEMA_VERSION: i64 = 1;

pub(crate) const USER_COLUMNS: &str =
    "id, name, email, phone, department, position, salary, hire_date, created_at";
pub(crate) const REPORT_COLUMNS: &str =
    "id, title, description, report_type, generated_by, file_path, created_at";

pub(crate) fn apply_file_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA foreign_keys=ON;
        PRAGMA temp_store=MEMORY;
        ",
    )
}

pub(crate) fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL,
          email TEXT NOT NULL UNIQUE,
          phone TEXT,
          department TEXT NOT NULL,
          position TEXT NOT NULL,
          salary REAL NOT NULL CHECK (salary >= 0 AND salary <= 1000000000),
          hire_date TEXT NOT NULL,
          created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS users_created_at_idx ON users (created_at);
        CREATE INDEX IF NOT EXISTS users_name_idx ON users (name);
        CREATE TABLE IF NOT EXISTS reports (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          title TEXT NOT NULL,
          description TEXT,
          report_type TEXT NOT NULL,
          generated_by TEXT NOT NULL DEFAULT 'System',
          file_path TEXT NOT NULL,
          created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS reports_created_at_idx ON reports (created_at);
        ",
    )?;
    conn.execute_batch(&format!("PRAGMA user_version={SQLITE_SCHEMA_VERSION};"))
}
