//! Error type for building and populating a future works GeoPackage.

use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    // =========================================================================
    // Schema construction
    // =========================================================================
    /// Refusing to build over an existing file.
    #[error("output already exists: {0:?}")]
    OutputExists(PathBuf),

    #[error("geopackage not found: {0:?}")]
    MissingOutput(PathBuf),

    #[error("spatial reference system {0} is not defined in gpkg_spatial_ref_sys")]
    MissingSrs(i32),

    #[error("table {table}: foreign key {column} references missing table {target}")]
    MissingForeignKeyTarget {
        table: &'static str,
        column: &'static str,
        target: &'static str,
    },

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("circular dependency detected at: {0}")]
    CircularDependency(String),

    #[error("view {view} references missing {what}")]
    MissingViewSource { view: &'static str, what: String },

    // =========================================================================
    // Constraint violations
    // =========================================================================
    #[error("code {code:?} is not a member of {list}")]
    UnknownCode { list: &'static str, code: String },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("geometry srs {found} does not match column srs {expected}")]
    WrongSrs { expected: i32, found: i32 },

    #[error("table {table} has no column {column}")]
    UnknownColumn { table: &'static str, column: String },

    /// Dependent rows were requested before their parent table had any.
    #[error("cannot populate {table} before {requires} has rows")]
    OrderingViolation {
        table: &'static str,
        requires: &'static str,
    },

    #[error("geopackage already populated: {0} has rows")]
    AlreadyPopulated(&'static str),

    /// A planned date offset lands outside the calendar chrono can represent.
    #[error("planned date out of range: {0} days from the build date")]
    DateOutOfRange(i64),
}

impl Error {
    /// True when the storage engine rejected a row (FK, UNIQUE, NOT NULL or
    /// CHECK), or when a value failed the crate's own insert-time checks.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Error::Database(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == ErrorCode::ConstraintViolation
            }
            Error::UnknownCode { .. }
            | Error::InvalidGeometry(_)
            | Error::WrongSrs { .. }
            | Error::UnknownColumn { .. } => true,
            _ => false,
        }
    }

    /// True for errors that mean the schema itself could not be built.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::OutputExists(_)
                | Error::MissingSrs(_)
                | Error::MissingForeignKeyTarget { .. }
                | Error::TableExists(_)
                | Error::UnknownTable(_)
                | Error::CircularDependency(_)
                | Error::MissingViewSource { .. }
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
