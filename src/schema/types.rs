use std::collections::HashSet;

/// British National Grid, the only SRS a geometry column may carry.
pub const BRITISH_NATIONAL_GRID: i32 = 27700;

/// Natural key column every entity and relationship row is referenced by.
pub const SYSTEM_ID: &str = "systemid";

/// Key column of every code list table.
pub const CODE: &str = "code";

/// Geometry type of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    LineString,
}

impl GeometryType {
    /// Name used in DDL and `gpkg_geometry_columns.geometry_type_name`
    pub const fn sql_name(self) -> &'static str {
        match self {
            GeometryType::LineString => "LINESTRING",
        }
    }

    /// WKB geometry type code
    pub const fn wkb_code(self) -> u32 {
        match self {
            GeometryType::LineString => 2,
        }
    }
}

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// ISO-8601 calendar date, `YYYY-MM-DD`
    Date,
    /// ISO-8601 UTC timestamp, `YYYY-MM-DDTHH:MM:SS.SSSZ`
    DateTime,
    /// GeoPackage binary geometry tagged with an SRS id
    Geometry { kind: GeometryType, srs_id: i32 },
}

impl ColumnType {
    pub const fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Geometry { kind, .. } => kind.sql_name(),
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            unique: false,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            unique: false,
        }
    }

    /// Create a required, unique text key column
    pub const fn key(name: &'static str) -> Self {
        Self {
            name,
            col_type: ColumnType::Text,
            nullable: false,
            unique: true,
        }
    }

    /// Create a geometry column bound to an SRS
    pub const fn geometry(name: &'static str, kind: GeometryType, srs_id: i32) -> Self {
        Self {
            name,
            col_type: ColumnType::Geometry { kind, srs_id },
            nullable: false,
            unique: false,
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    /// Reference to an entity or relationship row by its system id
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: SYSTEM_ID,
        }
    }

    /// Reference to a code list entry
    pub const fn code(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: CODE,
        }
    }

    pub fn is_code_list(&self) -> bool {
        self.references_column == CODE
    }
}

/// Index definition
#[derive(Debug, Clone)]
pub struct Index {
    pub columns: &'static [&'static str],
    pub unique: bool,
}

impl Index {
    /// Create a non-unique index
    pub const fn on(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            unique: false,
        }
    }

    /// Create a unique index
    pub const fn unique(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            unique: true,
        }
    }
}

/// What role a table plays in the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    CodeList,
    Entity,
    Relationship,
}

/// Table schema definition
///
/// Every table gets an implicit `fid INTEGER PRIMARY KEY AUTOINCREMENT` as
/// GeoPackage requires; rows reference each other through their key columns.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub kind: TableKind,
    pub description: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    /// Explicit index definitions; unique ones become table constraints
    pub indexes: &'static [Index],
    /// Raw CHECK expressions
    pub checks: &'static [&'static str],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn geometry_column(&self) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| matches!(c.col_type, ColumnType::Geometry { .. }))
    }

    /// `gpkg_contents.data_type` for this table
    pub fn data_type(&self) -> &'static str {
        if self.geometry_column().is_some() {
            "features"
        } else {
            "attributes"
        }
    }

    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}
