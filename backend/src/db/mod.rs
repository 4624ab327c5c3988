//! # SQLite persistence
//!
//! Every request opens its own connection to the database file and runs its
//! queries on actix's blocking thread pool through [`Database::run`], so the
//! async workers never wait on disk I/O.
//!
//! ## Sub-modules:
//! - `schema`: table definitions, applied once at startup.
//! - `users`: accounts and bearer-token sessions.
//! - `surveys`: surveys and their ordered questions.
//! - `responses`: submitted responses and dashboard counters.

pub mod responses;
pub mod schema;
pub mod surveys;
pub mod users;

use crate::error::ApiError;
use actix_web::web;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Handle to the database file, cheap to clone into `web::Data`.
#[derive(Clone)]
pub struct Database {
    path: Arc<PathBuf>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Arc::new(path.as_ref().to_path_buf()),
        }
    }

    /// Opens a connection with foreign keys enforced, so deleting a survey
    /// cascades to its questions and responses.
    pub fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(self.path.as_path())?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    pub fn init_schema(&self) -> rusqlite::Result<()> {
        schema::init_schema(&self.open()?)
    }

    /// Runs `f` with a fresh connection on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        web::block(move || {
            let mut conn = db.open()?;
            f(&mut conn)
        })
        .await?
    }
}

/// Whether any survey image or user avatar still points at `url`.
///
/// Stored files are content-addressed and may be shared, so a file is only
/// removed once nothing references it.
pub fn storage_url_in_use(conn: &Connection, url: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM surveys WHERE image_url = ?1)
             OR EXISTS(SELECT 1 FROM users WHERE avatar_url = ?1)",
        rusqlite::params![url],
        |row| row.get(0),
    )
}

/// Maps a JSON column that failed to parse into a rusqlite conversion error.
pub(crate) fn json_column_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
}
