// SPDX-License-Identifier: Apache-2.0

use crate::schema::{apply_file_pragmas, migrate, REPORT_COLUMNS, USER_COLUMNS};
use crate::{RecordStore, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use roster_model::{
    NewReport, NewUser, Report, ReportId, User, UserId, ValidationError, SALARY_MAX,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, instrument};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
// Keeps `IN (...)` lists well under SQLite's bound-parameter limit.
const ID_CHUNK: usize = 500;

/// SQLite store behind a single mutex-guarded connection.
///
/// Queries run on the blocking pool; the database engine serializes writes.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and applies the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Persistence(format!("create {} failed: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_file_pragmas(&conn)?;
        migrate(&conn)?;
        info!(path = %path.display(), "record store opened");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        migrate(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Inserts the sample roster when the users table is empty.
    /// Returns how many rows were inserted.
    pub async fn seed_sample_users(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let existing: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
            if existing > 0 {
                return Ok(0);
            }
            let tx = conn.transaction()?;
            let samples = crate::seed::sample_users();
            for user in &samples {
                insert_user(&tx, user)?;
            }
            tx.commit()?;
            Ok(samples.len())
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Persistence("connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Persistence(format!("store task failed: {e}")))?
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        department: row.get(4)?,
        position: row.get(5)?,
        salary: row.get(6)?,
        hire_date: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        report_type: row.get(3)?,
        generated_by: row.get(4)?,
        file_path: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn insert_user(conn: &Connection, user: &NewUser) -> Result<UserId, StoreError> {
    conn.execute(
        "INSERT INTO users (name, email, phone, department, position, salary, hire_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.name,
            user.email,
            user.phone,
            user.department,
            user.position,
            user.salary,
            user.hire_date,
            Utc::now(),
        ],
    )
    .map_err(|e| map_user_insert_error(e, &user.email))?;
    Ok(conn.last_insert_rowid())
}

fn map_user_insert_error(err: rusqlite::Error, email: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Conflict(format!("a user with email {email} already exists"))
        }
        // The only CHECK on users is the salary range.
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_CHECK =>
        {
            StoreError::Validation(ValidationError::single(
                "salary",
                format!("must be between 0 and {SALARY_MAX:.0}"),
            ))
        }
        _ => StoreError::Persistence(err.to_string()),
    }
}

fn by_name(a: &User, b: &User) -> std::cmp::Ordering {
    a.name.cmp(&b.name).then(a.id.cmp(&b.id))
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], user_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> Result<User, StoreError> {
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                user_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("user {id} not found")))
        })
        .await
    }

    #[instrument(skip(self, user), fields(department = %user.department))]
    async fn create_user(&self, user: NewUser) -> Result<UserId, StoreError> {
        let id = self.with_conn(move |conn| insert_user(conn, &user)).await?;
        debug!(user_id = id, "user created");
        Ok(id)
    }

    async fn list_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = ids.to_vec();
        self.with_conn(move |conn| {
            let mut users = Vec::with_capacity(ids.len());
            for chunk in ids.chunks(ID_CHUNK) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let mut stmt = conn.prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id IN ({placeholders})"
                ))?;
                let rows = stmt.query_map(params_from_iter(chunk.iter()), user_from_row)?;
                for row in rows {
                    users.push(row?);
                }
            }
            users.sort_by(by_name);
            Ok(users)
        })
        .await
    }

    async fn list_users_by_name(&self) -> Result<Vec<User>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY name, id"
            ))?;
            let rows = stmt.query_map([], user_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], report_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    #[instrument(skip(self, report), fields(report_type = %report.report_type, file = %report.file_path))]
    async fn create_report(&self, report: NewReport) -> Result<ReportId, StoreError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO reports (title, description, report_type, generated_by, file_path, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    report.title,
                    report.description,
                    report.report_type.as_str(),
                    report.generated_by,
                    report.file_path,
                    Utc::now(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}
