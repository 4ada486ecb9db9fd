//! Document store over SQLite.
//!
//! Every collection is a table holding the JSON document alongside indexed
//! columns for the store id, the domain key and the slug. Uniqueness of the
//! latter two is enforced by the schema, so concurrent writers race at the
//! database rather than in application code.

mod collection;
mod filter;

pub use collection::{Collection, MAX_STORED_REAL};
pub use filter::{Field, Filter, Scalar};

use bson::oid::ObjectId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A type persisted as a document in its own collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Table backing the collection.
    const COLLECTION: &'static str;
    /// Name of the JSON field that holds the domain identifier.
    const KEY_FIELD: &'static str;

    fn id(&self) -> &str;
    fn key(&self) -> &str;
    fn slug(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Errors raised by the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index (store id, domain key or slug) rejected the write.
    #[error("duplicate key in collection '{collection}': {message}")]
    DuplicateKey {
        collection: &'static str,
        message: String,
    },
    /// An increment was refused because the result could not be stored as
    /// the field's numeric type. The document is unchanged.
    #[error("increment out of range in collection '{collection}'")]
    OutOfRange { collection: &'static str },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("failed to encode or decode document: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("failed to create database directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Classify an error raised by a write against `collection`.
    pub(crate) fn from_write(collection: &'static str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey {
                collection,
                message: db.message().to_string(),
            },
            _ => StoreError::Database(err),
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

/// Generate a fresh store id.
pub fn new_object_id() -> String {
    ObjectId::new().to_hex()
}

/// Whether `id` is syntactically a store id (24 hex digits).
pub fn is_object_id(id: &str) -> bool {
    ObjectId::parse_str(id).is_ok()
}

/// Fixed-width timestamp used for the sortable `created_at`/`updated_at`
/// columns and for timestamps written into documents by the store.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Open (creating if needed) the database at `path` and run migrations.
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::debug!("Database ready at {}", path.display());
    Ok(pool)
}
