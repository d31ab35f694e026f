use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::Result;
use crate::geometry::LineString;
use crate::schema::{CodeList, TableSchema};

/// A column value ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Real(f64),
    Text(String),
    /// Encoded and SRS-checked by the writer against its column
    Geometry(LineString),
}

impl SqlValue {
    pub fn text(s: impl Into<String>) -> Self {
        SqlValue::Text(s.into())
    }

    pub fn opt_text(s: Option<&str>) -> Self {
        s.map(SqlValue::text).unwrap_or(SqlValue::Null)
    }

    pub fn code<C: CodeList>(value: C) -> Self {
        SqlValue::Text(value.code().to_string())
    }

    pub fn opt_code<C: CodeList>(value: Option<C>) -> Self {
        value.map(SqlValue::code).unwrap_or(SqlValue::Null)
    }

    /// GeoPackage DATE: `YYYY-MM-DD`
    pub fn date(d: NaiveDate) -> Self {
        SqlValue::Text(d.format("%Y-%m-%d").to_string())
    }

    pub fn opt_date(d: Option<NaiveDate>) -> Self {
        d.map(SqlValue::date).unwrap_or(SqlValue::Null)
    }

    /// GeoPackage DATETIME: `YYYY-MM-DDTHH:MM:SS.SSSZ`
    pub fn timestamp(t: DateTime<Utc>) -> Self {
        SqlValue::Text(t.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn opt_timestamp(t: Option<DateTime<Utc>>) -> Self {
        t.map(SqlValue::timestamp).unwrap_or(SqlValue::Null)
    }

    /// Bind to a statement parameter; geometries must already be encoded
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
            SqlValue::Geometry(line) => stmt.raw_bind_parameter(idx, line.to_gpkg()?)?,
        }
        Ok(())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

/// A row that can be written to one declared table
pub trait Record {
    fn schema() -> &'static TableSchema;

    /// Identifier used in logs and errors
    fn key(&self) -> String;

    /// Column values; columns not listed are left NULL
    fn values(&self) -> Vec<(&'static str, SqlValue)>;
}
