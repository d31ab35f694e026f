use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info, warn};

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use super::srs::DEFAULT_SRS;
use super::view_gen::generate_create_view;
use crate::error::{Error, Result};
use crate::geometry::{Envelope, LineString};
use crate::record::{Record, SqlValue};
use crate::schema::{
    build_order, get_code_list, validate_code, CodeListDef, ColumnType, TableKind, TableSchema,
    ViewSchema, UNIFIED_VIEW,
};

/// `application_id` of a GeoPackage: 'GPKG' as a big-endian u32
pub const APPLICATION_ID: i32 = 0x4750_4B47;
/// GeoPackage 1.3.0
pub const USER_VERSION: i32 = 10300;

const CORE_SCHEMA: &str = "
CREATE TABLE gpkg_spatial_ref_sys (
    srs_name TEXT NOT NULL,
    srs_id INTEGER PRIMARY KEY,
    organization TEXT NOT NULL,
    organization_coordsys_id INTEGER NOT NULL,
    definition TEXT NOT NULL,
    description TEXT
);
CREATE TABLE gpkg_contents (
    table_name TEXT NOT NULL PRIMARY KEY,
    data_type TEXT NOT NULL,
    identifier TEXT UNIQUE,
    description TEXT DEFAULT '',
    last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
    min_x DOUBLE,
    min_y DOUBLE,
    max_x DOUBLE,
    max_y DOUBLE,
    srs_id INTEGER,
    CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
CREATE TABLE gpkg_geometry_columns (
    table_name TEXT NOT NULL,
    column_name TEXT NOT NULL,
    geometry_type_name TEXT NOT NULL,
    srs_id INTEGER NOT NULL,
    z TINYINT NOT NULL,
    m TINYINT NOT NULL,
    CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),
    CONSTRAINT uk_gc_table_name UNIQUE (table_name),
    CONSTRAINT fk_gc_tn FOREIGN KEY (table_name) REFERENCES gpkg_contents(table_name),
    CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id) REFERENCES gpkg_spatial_ref_sys(srs_id)
);
";

/// Owns the connection to one GeoPackage for the length of a build
pub struct GeoPackageWriter {
    conn: Connection,
}

impl GeoPackageWriter {
    /// Create a new, empty GeoPackage holding only the core tables and SRS rows
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(Error::OutputExists(path.to_path_buf()));
        }

        let conn = Connection::open(path)?;
        let writer = Self::init(conn)?;
        info!(path = %path.display(), "created geopackage");
        Ok(writer)
    }

    /// Open an existing GeoPackage for writing
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingOutput(path.to_path_buf()));
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = DELETE;
             PRAGMA application_id = {APPLICATION_ID};
             PRAGMA user_version = {USER_VERSION};"
        ))?;

        let mut writer = Self { conn };
        let tx = writer.conn.transaction()?;
        tx.execute_batch(CORE_SCHEMA)?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO gpkg_spatial_ref_sys
                 (srs_name, srs_id, organization, organization_coordsys_id, definition, description)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for srs in DEFAULT_SRS {
                stmt.execute(params![
                    srs.srs_name,
                    srs.srs_id,
                    srs.organization,
                    srs.organization_coordsys_id,
                    srs.definition,
                    srs.description
                ])?;
            }
        }
        tx.commit()?;

        Ok(writer)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// True for tables and views
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        table_exists(&self.conn, name)
    }

    pub fn srs_exists(&self, srs_id: i32) -> Result<bool> {
        srs_exists(&self.conn, srs_id)
    }

    /// Materialize a table declaration and register it with the GeoPackage
    pub fn create_table(&mut self, schema: &TableSchema) -> Result<()> {
        let tx = self.conn.transaction()?;
        create_table_in(&tx, schema)?;
        tx.commit()?;
        info!(table = schema.name, "created table");
        Ok(())
    }

    /// Create a code list table and seed its fixed values
    pub fn create_code_list(&mut self, def: &CodeListDef) -> Result<()> {
        let tx = self.conn.transaction()?;
        create_table_in(&tx, def.schema)?;

        let columns: Vec<&str> = def.schema.columns.iter().map(|c| c.name).collect();
        let rows = (def.rows)();
        {
            let mut stmt = tx.prepare_cached(&generate_insert(def.schema.name, &columns))?;
            for row in &rows {
                for (idx, col) in columns.iter().enumerate() {
                    let value = match *col {
                        "code" => SqlValue::text(row.code),
                        "label" => SqlValue::text(row.label),
                        "description" => SqlValue::opt_text(row.description),
                        "applicabledomains" => SqlValue::opt_text(row.applicable_domains.as_deref()),
                        _ => SqlValue::Null,
                    };
                    value.bind_to(idx + 1, &mut stmt)?;
                }
                stmt.raw_execute()?;
            }
        }
        tx.commit()?;

        info!(table = def.name(), values = rows.len(), "created code list");
        Ok(())
    }

    /// Create a view after checking every table and column it reads
    pub fn create_view(&mut self, view: &ViewSchema) -> Result<()> {
        let tx = self.conn.transaction()?;

        if table_exists(&tx, view.name)? {
            return Err(Error::TableExists(view.name.to_string()));
        }

        for (table, column) in view.references() {
            if !column_exists(&tx, table, column)? {
                return Err(Error::MissingViewSource {
                    view: view.name,
                    what: format!("{table}.{column}"),
                });
            }
        }

        tx.execute_batch(&generate_create_view(view)?)?;

        let srs_id = view.geometry().map(|(_, _, srs)| srs);
        let data_type = if srs_id.is_some() { "features" } else { "attributes" };
        register_contents(&tx, view.name, data_type, view.description, srs_id)?;
        if let Some((column, kind, srs)) = view.geometry() {
            register_geometry_column(&tx, view.name, column, kind.sql_name(), srs)?;
        }
        tx.commit()?;

        info!(view = view.name, columns = view.output_columns().len(), "created view");
        Ok(())
    }

    /// Insert records into their table in one transaction.
    ///
    /// Each value is checked before it reaches SQLite: the column must be
    /// declared, geometries must be valid in the column's SRS and codes must be
    /// members of the referenced list. Any failure rolls back the whole batch.
    pub fn insert<R: Record>(&mut self, records: &[R]) -> Result<usize> {
        let schema = R::schema();
        let tx = self.conn.transaction()?;

        for record in records {
            let values = record.values();
            for (column, value) in &values {
                check_value(schema, column, value)?;
            }

            let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
            let mut stmt = tx.prepare_cached(&generate_insert(schema.name, &columns))?;
            for (idx, (_, value)) in values.iter().enumerate() {
                value.bind_to(idx + 1, &mut stmt)?;
            }
            stmt.raw_execute().inspect_err(|e| {
                debug!(table = schema.name, key = %record.key(), error = %e, "insert rejected")
            })?;
        }

        tx.commit()?;
        debug!(table = schema.name, rows = records.len(), "inserted");
        Ok(records.len())
    }

    pub fn row_count(&self, table: &str) -> Result<u64> {
        row_count(&self.conn, table)
    }

    /// Recompute a feature table's bounding box in `gpkg_contents`
    pub fn update_extent(&self, schema: &TableSchema) -> Result<Option<Envelope>> {
        let Some(geom) = schema.geometry_column() else {
            return Ok(None);
        };

        let mut extent: Option<Envelope> = None;
        {
            let mut stmt = self
                .conn
                .prepare(&format!("SELECT {} FROM {}", geom.name, schema.name))?;
            let mut rows = stmt.query([])?;

            while let Some(row) = rows.next()? {
                let blob: Vec<u8> = row.get(0)?;
                let Some(env) = LineString::from_gpkg(&blob)?.envelope() else {
                    continue;
                };
                extent = Some(match extent {
                    None => env,
                    Some(e) => Envelope {
                        min_x: e.min_x.min(env.min_x),
                        max_x: e.max_x.max(env.max_x),
                        min_y: e.min_y.min(env.min_y),
                        max_y: e.max_y.max(env.max_y),
                    },
                });
            }
        }

        if let Some(e) = extent {
            self.conn.execute(
                "UPDATE gpkg_contents SET min_x = ?, min_y = ?, max_x = ?, max_y = ?,
                 last_change = strftime('%Y-%m-%dT%H:%M:%fZ','now')
                 WHERE table_name = ?",
                params![e.min_x, e.min_y, e.max_x, e.max_y, schema.name],
            )?;
        }

        Ok(extent)
    }

    /// Finalize the database
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        self.conn.close().map_err(|(_, e)| Error::Database(e))
    }
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
            [name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn srs_exists(conn: &Connection, srs_id: i32) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM gpkg_spatial_ref_sys WHERE srs_id = ?",
            [srs_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2",
            [table, column],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn row_count(conn: &Connection, table: &str) -> Result<u64> {
    if !table_exists(conn, table)? {
        return Err(Error::UnknownTable(table.to_string()));
    }
    let count: i64 = conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?;
    Ok(count as u64)
}

fn create_table_in(conn: &Connection, schema: &TableSchema) -> Result<()> {
    if table_exists(conn, schema.name)? {
        return Err(Error::TableExists(schema.name.to_string()));
    }

    for fk in schema.foreign_keys {
        if fk.references_table != schema.name && !table_exists(conn, fk.references_table)? {
            return Err(Error::MissingForeignKeyTarget {
                table: schema.name,
                column: fk.column,
                target: fk.references_table,
            });
        }
    }

    let geometry = schema.geometry_column().and_then(|c| match c.col_type {
        ColumnType::Geometry { kind, srs_id } => Some((c.name, kind, srs_id)),
        _ => None,
    });
    if let Some((_, _, srs_id)) = geometry {
        if !srs_exists(conn, srs_id)? {
            return Err(Error::MissingSrs(srs_id));
        }
    }

    conn.execute_batch(&generate_create_table(schema))?;
    for index_sql in generate_indexes(schema) {
        conn.execute_batch(&index_sql)?;
    }

    register_contents(
        conn,
        schema.name,
        schema.data_type(),
        schema.description,
        geometry.map(|(_, _, srs)| srs),
    )?;
    if let Some((column, kind, srs_id)) = geometry {
        register_geometry_column(conn, schema.name, column, kind.sql_name(), srs_id)?;
    }

    Ok(())
}

fn register_contents(
    conn: &Connection,
    table: &str,
    data_type: &str,
    description: &str,
    srs_id: Option<i32>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO gpkg_contents (table_name, data_type, identifier, description, srs_id)
         VALUES (?, ?, ?, ?, ?)",
        params![table, data_type, table, description, srs_id],
    )?;
    Ok(())
}

fn register_geometry_column(
    conn: &Connection,
    table: &str,
    column: &str,
    geometry_type: &str,
    srs_id: i32,
) -> Result<()> {
    conn.execute(
        "INSERT INTO gpkg_geometry_columns (table_name, column_name, geometry_type_name, srs_id, z, m)
         VALUES (?, ?, ?, ?, 0, 0)",
        params![table, column, geometry_type, srs_id],
    )?;
    Ok(())
}

/// Insert-time checks that SQLite cannot express
fn check_value(schema: &'static TableSchema, column: &str, value: &SqlValue) -> Result<()> {
    let col = schema.column(column).ok_or_else(|| Error::UnknownColumn {
        table: schema.name,
        column: column.to_string(),
    })?;

    match (value, col.col_type) {
        (SqlValue::Geometry(line), ColumnType::Geometry { srs_id, .. }) => line.validate_for(srs_id),
        (SqlValue::Geometry(_), _) => Err(Error::InvalidGeometry(format!(
            "{}.{} is not a geometry column",
            schema.name, column
        ))),
        (SqlValue::Text(code), _) => match schema.foreign_key(column) {
            Some(fk) if fk.is_code_list() => validate_code(fk.references_table, code),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}

/// Create every declared table in dependency order, then the unified view
pub fn build_schema(writer: &mut GeoPackageWriter) -> Result<()> {
    let tables = build_order()?;
    info!(tables = tables.len(), "building schema");

    for schema in &tables {
        match schema.kind {
            TableKind::CodeList => {
                let def = get_code_list(schema.name)
                    .ok_or_else(|| Error::UnknownTable(schema.name.to_string()))?;
                writer.create_code_list(def)?;
            }
            TableKind::Entity | TableKind::Relationship => writer.create_table(schema)?,
        }
    }

    writer.create_view(&UNIFIED_VIEW)
}

/// Create a GeoPackage at `path` holding the full schema and no data.
///
/// On failure the partially written file is removed.
pub fn create_geopackage(path: &Path) -> Result<GeoPackageWriter> {
    let mut writer = GeoPackageWriter::create(path)?;

    match build_schema(&mut writer) {
        Ok(()) => Ok(writer),
        Err(e) => {
            drop(writer);
            remove_partial(path);
            Err(e)
        }
    }
}

/// Delete a half-built GeoPackage. Its connection must already be closed.
pub fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!(path = %path.display(), "removed partial geopackage"),
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial geopackage"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        CodeRow, Column, ForeignKey, GeometryType, Index, NETWORK_LINK, ORGANISATION, UTILITY_TYPE,
    };

    fn schema_only() -> GeoPackageWriter {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        build_schema(&mut writer).unwrap();
        writer
    }

    #[test]
    fn test_core_tables_and_pragmas() {
        let writer = GeoPackageWriter::open_in_memory().unwrap();
        let conn = writer.connection();

        let app_id: i32 = conn.query_row("PRAGMA application_id", [], |r| r.get(0)).unwrap();
        let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0)).unwrap();
        assert_eq!(app_id, APPLICATION_ID);
        assert_eq!(version, USER_VERSION);

        for srs in [-1, 0, 4326, 27700] {
            assert!(writer.srs_exists(srs).unwrap(), "srs {srs} missing");
        }
        assert!(writer.table_exists("gpkg_contents").unwrap());
        assert!(writer.table_exists("gpkg_geometry_columns").unwrap());
    }

    #[test]
    fn test_build_schema_registers_layers() {
        let writer = schema_only();
        let conn = writer.connection();

        let (data_type, srs): (String, i32) = conn
            .query_row(
                "SELECT data_type, srs_id FROM gpkg_contents WHERE table_name = 'networklink'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(data_type, "features");
        assert_eq!(srs, 27700);

        let geom_type: String = conn
            .query_row(
                "SELECT geometry_type_name FROM gpkg_geometry_columns WHERE table_name = 'future_works_unified'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(geom_type, "LINESTRING");

        assert_eq!(writer.row_count("utilitytypevalue").unwrap(), 10);
        assert_eq!(writer.row_count("networklink").unwrap(), 0);
    }

    #[test]
    fn test_create_table_twice_fails() {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        writer.create_code_list(get_code_list(UTILITY_TYPE.name).unwrap()).unwrap();
        let err = writer.create_table(&UTILITY_TYPE).unwrap_err();
        assert!(matches!(err, Error::TableExists(_)));
    }

    fn duplicated_rows() -> Vec<CodeRow> {
        vec![
            CodeRow::new("fw-utl-001", "Electricity"),
            CodeRow::new("fw-utl-002", "Gas"),
            CodeRow::new("fw-utl-001", "Electricity again"),
        ]
    }

    #[test]
    fn test_duplicate_code_rolls_back_code_list() {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        let def = CodeListDef {
            schema: &UTILITY_TYPE,
            rows: duplicated_rows,
        };

        let err = writer.create_code_list(&def).unwrap_err();
        assert!(err.is_constraint_violation(), "{err}");
        assert!(!writer.table_exists("utilitytypevalue").unwrap());
        let registered: i64 = writer
            .connection()
            .query_row(
                "SELECT count(*) FROM gpkg_contents WHERE table_name = 'utilitytypevalue'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(registered, 0);
    }

    #[test]
    fn test_missing_fk_target_fails() {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        let err = writer.create_table(&ORGANISATION).unwrap_err();
        assert!(matches!(err, Error::MissingForeignKeyTarget { table: "organisation", .. }));
        assert!(!writer.table_exists("organisation").unwrap());
    }

    static FOREIGN_GRID: TableSchema = TableSchema {
        name: "foreigngrid",
        kind: TableKind::Entity,
        description: "",
        columns: &[Column::geometry("geom", GeometryType::LineString, 2157)],
        foreign_keys: &[],
        indexes: &[],
        checks: &[],
    };

    #[test]
    fn test_missing_srs_fails() {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        let err = writer.create_table(&FOREIGN_GRID).unwrap_err();
        assert!(matches!(err, Error::MissingSrs(2157)));
        assert!(err.is_schema_error());
        assert!(!writer.table_exists("foreigngrid").unwrap());
    }

    static DANGLING: TableSchema = TableSchema {
        name: "dangling",
        kind: TableKind::Entity,
        description: "",
        columns: &[Column::new("parent", ColumnType::Text)],
        foreign_keys: &[ForeignKey::new("parent", "nosuchtable")],
        indexes: &[Index::on(&["parent"])],
        checks: &[],
    };

    #[test]
    fn test_dangling_fk_leaves_nothing_behind() {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        assert!(writer.create_table(&DANGLING).is_err());
        let registered: i64 = writer
            .connection()
            .query_row("SELECT count(*) FROM gpkg_contents WHERE table_name = 'dangling'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(registered, 0);
    }

    #[test]
    fn test_view_requires_its_sources() {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        let err = writer.create_view(&UNIFIED_VIEW).unwrap_err();
        assert!(matches!(err, Error::MissingViewSource { .. }));
    }

    #[test]
    fn test_row_count_rejects_unknown_table() {
        let writer = schema_only();
        assert!(matches!(
            writer.row_count("nosuchtable"),
            Err(Error::UnknownTable(_))
        ));
        assert!(writer.update_extent(&NETWORK_LINK).unwrap().is_none());
    }
}
