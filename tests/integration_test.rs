//! End-to-end tests: build a GeoPackage on disk, populate it and check the
//! stored rows, the constraints and the unified view.
//!
//! Run with:
//! ```sh
//! cargo test --test integration_test
//! ```

use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

use future_works::geometry::LineString;
use future_works::model::{Lifecycle, NetworkLink, OrganisationContact, Provenance};
use future_works::populate::{build_geopackage, SampleDataPopulator, SampleSize};
use future_works::schema::{
    UtilityType, ENTITY_TABLES, NETWORK_LINK, RELATIONSHIP_TABLES, UNIFIED_VIEW,
};
use future_works::writer::{create_geopackage, GeoPackageWriter};
use future_works::Error;

// =============================================================================
// Test Configuration
// =============================================================================

/// Random seed for reproducible sample data
const RANDOM_SEED: u64 = 42;

fn populator(size: SampleSize) -> SampleDataPopulator {
    SampleDataPopulator::new(size, RANDOM_SEED)
        .with_clock(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
}

// =============================================================================
// Shared Test Database
// =============================================================================

/// Shared populated GeoPackage - built once and reused by read-only tests
static TEST_DB: Lazy<Mutex<TestDatabase>> = Lazy::new(|| Mutex::new(TestDatabase::new()));

struct TestDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDatabase {
    fn new() -> Self {
        let (dir, path, mut writer) = fresh_geopackage();
        populator(SampleSize::default())
            .populate(&mut writer)
            .expect("Failed to populate test geopackage");
        writer.finalize().expect("Failed to finalize test geopackage");

        Self { _dir: dir, path }
    }

    fn connection(&self) -> Connection {
        Connection::open(&self.path).expect("Failed to open test geopackage")
    }
}

fn get_test_db() -> Connection {
    TEST_DB.lock().unwrap().connection()
}

/// A schema-only GeoPackage in its own temp directory
fn fresh_geopackage() -> (TempDir, PathBuf, GeoPackageWriter) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("future_works.gpkg");
    let writer = create_geopackage(&path).expect("Failed to create geopackage");
    (dir, path, writer)
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}

fn link(id: &str, programme: &str, geometry: LineString) -> NetworkLink {
    NetworkLink {
        id: id.to_string(),
        lifecycle: Lifecycle::active(Utc::now()),
        provenance: Provenance::default(),
        programme_id: programme.to_string(),
        provider_id: None,
        geometry,
        object_name: None,
        description: None,
        utility_type: UtilityType::Water,
        utility_subtype: None,
        work_status: None,
        work_type: None,
        material: None,
        installation_method: None,
        installation_date: None,
        depth: None,
        planned_start: None,
        planned_end: None,
        confidence: None,
        link_status: None,
        location_type: None,
        usrn: Some("40701234".to_string()),
        locale_reference: None,
    }
}

// =============================================================================
// GeoPackage Container
// =============================================================================

#[test]
fn test_geopackage_header() {
    let conn = get_test_db();
    let app_id: i64 = count(&conn, "PRAGMA application_id");
    let version: i64 = count(&conn, "PRAGMA user_version");
    assert_eq!(app_id, 0x4750_4B47);
    assert_eq!(version, 10300);

    let srs = count(
        &conn,
        "SELECT count(*) FROM gpkg_spatial_ref_sys WHERE srs_id IN (-1, 0, 4326, 27700)",
    );
    assert_eq!(srs, 4);
}

#[test]
fn test_every_table_registered() {
    let conn = get_test_db();
    for table in ENTITY_TABLES.iter().chain(RELATIONSHIP_TABLES) {
        let registered = count(
            &conn,
            &format!("SELECT count(*) FROM gpkg_contents WHERE table_name = '{}'", table.name),
        );
        assert_eq!(registered, 1, "{} not in gpkg_contents", table.name);
    }

    let view_srs = count(
        &conn,
        "SELECT srs_id FROM gpkg_geometry_columns WHERE table_name = 'future_works_unified'",
    );
    assert_eq!(view_srs, 27700);
}

// =============================================================================
// Stored Data
// =============================================================================

#[test]
fn test_code_columns_hold_listed_codes() {
    let conn = get_test_db();
    for table in ENTITY_TABLES.iter().chain(RELATIONSHIP_TABLES) {
        for fk in table.foreign_keys.iter().filter(|fk| fk.is_code_list()) {
            let bad = count(
                &conn,
                &format!(
                    "SELECT count(*) FROM {t} WHERE {c} IS NOT NULL AND {c} NOT IN (SELECT code FROM {l})",
                    t = table.name,
                    c = fk.column,
                    l = fk.references_table
                ),
            );
            assert_eq!(bad, 0, "{}.{} holds unlisted codes", table.name, fk.column);
        }
    }
}

#[test]
fn test_link_geometries_valid_in_bng() {
    let conn = get_test_db();
    let mut stmt = conn.prepare("SELECT systemid, geom FROM networklink").unwrap();
    let rows: Vec<(String, Vec<u8>)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(rows.len(), 9);
    for (id, blob) in rows {
        let line = LineString::from_gpkg(&blob).unwrap();
        assert_eq!(line.srs_id, 27700, "{id}");
        assert!(line.points.len() >= 2, "{id}");
        line.validate_for(27700).unwrap();
    }

    let (min_x, max_x): (f64, f64) = conn
        .query_row(
            "SELECT min_x, max_x FROM gpkg_contents WHERE table_name = 'networklink'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert!(min_x < max_x);
}

#[test]
fn test_links_reach_their_organisation() {
    let conn = get_test_db();
    let orphans = count(
        &conn,
        "SELECT count(*) FROM networklink nl
         LEFT JOIN plannedprogramme p ON p.systemid = nl.programmeid_fk
         LEFT JOIN organisation o ON o.systemid = p.dataproviderid_fk
         WHERE p.fid IS NULL OR o.fid IS NULL",
    );
    assert_eq!(orphans, 0);

    let violations: Vec<String> = conn
        .prepare("PRAGMA foreign_key_check")
        .unwrap()
        .query_map([], |r| r.get::<_, String>(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert!(violations.is_empty(), "{violations:?}");
}

// =============================================================================
// Unified View
// =============================================================================

#[test]
fn test_view_has_one_row_per_link() {
    let conn = get_test_db();
    assert_eq!(
        count(&conn, "SELECT count(*) FROM future_works_unified"),
        count(&conn, "SELECT count(*) FROM networklink")
    );
}

#[test]
fn test_view_row_count_for_small_sample() {
    let (_dir, _path, mut writer) = fresh_geopackage();
    let size = SampleSize {
        organisations: 3,
        contacts_per_organisation: 1,
        programmes: 2,
        links: 5,
    };
    populator(size).populate(&mut writer).unwrap();

    assert_eq!(writer.row_count("future_works_unified").unwrap(), 5);
}

#[test]
fn test_view_resolves_every_label() {
    let conn = get_test_db();
    let labels: Vec<&str> = UNIFIED_VIEW
        .sources
        .iter()
        .flat_map(|s| s.labels.iter().map(|l| l.output))
        .chain(UNIFIED_VIEW.aggregates.iter().flat_map(|a| a.labels.iter().map(|l| l.output)))
        .collect();
    assert!(labels.contains(&"utility_type"));

    let predicate = labels
        .iter()
        .map(|l| format!("{l} IS NOT NULL"))
        .collect::<Vec<_>>()
        .join(" AND ");
    let complete = count(
        &conn,
        &format!("SELECT count(*) FROM future_works_unified WHERE {predicate}"),
    );
    assert!(complete >= 1);

    let gas: String = conn
        .query_row(
            "SELECT utility_type FROM future_works_unified WHERE work_id = 'nl-001'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(gas, "Gas");
}

#[test]
fn test_view_aggregates_contacts() {
    let conn = get_test_db();
    let (names, emails, contacts): (String, String, i64) = conn
        .query_row(
            "SELECT contact_names, contact_emails, contact_count
             FROM future_works_unified WHERE work_id = 'nl-001'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(names, "Planning Coordinator - Network Planning");
    assert_eq!(emails, "planning@northerngas.co.uk");
    assert_eq!(contacts, 1);
}

#[test]
fn test_several_contacts_do_not_multiply_rows() {
    let (_dir, _path, mut writer) = fresh_geopackage();
    let size = SampleSize {
        contacts_per_organisation: 3,
        ..SampleSize::default()
    };
    populator(size).populate(&mut writer).unwrap();
    let conn = writer.connection();

    assert_eq!(count(conn, "SELECT count(*) FROM future_works_unified"), 9);
    assert_eq!(
        count(conn, "SELECT min(contact_count) FROM future_works_unified"),
        3
    );

    let names: String = conn
        .query_row(
            "SELECT contact_names FROM future_works_unified WHERE work_id = 'nl-001'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(names.split("; ").count(), 3);

    let emails: String = conn
        .query_row(
            "SELECT contact_emails FROM future_works_unified WHERE work_id = 'nl-001'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(
        emails,
        "planning@northerngas.co.uk; planning2@northerngas.co.uk; planning3@northerngas.co.uk"
    );
}

#[test]
fn test_organisation_without_contacts() {
    let (_dir, _path, mut writer) = fresh_geopackage();
    let size = SampleSize {
        contacts_per_organisation: 0,
        ..SampleSize::default()
    };
    let populated = populator(size).populate(&mut writer).unwrap();
    assert_eq!(populated.contacts, 0);
    assert_eq!(populated.relationships, 0);

    let conn = writer.connection();
    assert_eq!(count(conn, "SELECT count(*) FROM future_works_unified"), 9);
    assert_eq!(
        count(conn, "SELECT count(*) FROM future_works_unified WHERE contact_names IS NULL AND contact_count = 0"),
        9
    );
}

// =============================================================================
// Constraint Violations
// =============================================================================

#[test]
fn test_duplicate_relationship_rejected() {
    let (_dir, _path, mut writer) = fresh_geopackage();
    populator(SampleSize::default()).populate(&mut writer).unwrap();

    let duplicate = OrganisationContact {
        organisation_id: "org-001".to_string(),
        contact_id: "ctc-001".to_string(),
    };
    let err = writer.insert(&[duplicate]).unwrap_err();
    assert!(err.is_constraint_violation(), "{err}");
    assert_eq!(
        writer.row_count("relationship_organisationtocontactdetails").unwrap(),
        5
    );
}

#[test]
fn test_link_to_missing_programme_rejected() {
    let (_dir, _path, mut writer) = fresh_geopackage();
    populator(SampleSize::default()).populate(&mut writer).unwrap();

    let orphan = link(
        "nl-100",
        "prg-999",
        LineString::bng([(430000.0, 434000.0), (430100.0, 434000.0)]),
    );
    let err = writer.insert(&[orphan]).unwrap_err();
    assert!(err.is_constraint_violation(), "{err}");
    assert_eq!(writer.row_count(NETWORK_LINK.name).unwrap(), 9);
}

#[test]
fn test_batch_rolls_back_on_bad_geometry() {
    let (_dir, _path, mut writer) = fresh_geopackage();
    populator(SampleSize::default()).populate(&mut writer).unwrap();

    let good = link(
        "nl-100",
        "prg-001",
        LineString::bng([(430000.0, 434000.0), (430100.0, 434000.0)]),
    );
    let closed = link(
        "nl-101",
        "prg-001",
        LineString::bng([
            (430000.0, 434000.0),
            (430100.0, 434000.0),
            (430100.0, 434100.0),
            (430000.0, 434000.0),
        ]),
    );

    let err = writer.insert(&[good, closed]).unwrap_err();
    assert!(matches!(err, Error::InvalidGeometry(_)));
    assert_eq!(writer.row_count(NETWORK_LINK.name).unwrap(), 9);
}

#[test]
fn test_wrong_srs_rejected() {
    let (_dir, _path, mut writer) = fresh_geopackage();
    populator(SampleSize::default()).populate(&mut writer).unwrap();

    let mut geometry = LineString::bng([(-1.55, 53.8), (-1.54, 53.8)]);
    geometry.srs_id = 4326;
    let err = writer.insert(&[link("nl-100", "prg-001", geometry)]).unwrap_err();
    assert!(matches!(err, Error::WrongSrs { expected: 27700, found: 4326 }));
}

// =============================================================================
// Build Lifecycle
// =============================================================================

#[test]
fn test_create_refuses_existing_file() {
    let (_dir, path, writer) = fresh_geopackage();
    writer.finalize().unwrap();

    let err = create_geopackage(&path).err().unwrap();
    assert!(matches!(err, Error::OutputExists(_)));
    assert!(err.is_schema_error());

    // The existing file is left as it was
    let conn = Connection::open(&path).unwrap();
    assert_eq!(count(&conn, "SELECT count(*) FROM utilitytypevalue"), 10);
}

#[test]
fn test_build_leaves_no_file_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future_works.gpkg");

    let mut failing = populator(SampleSize::default()).with_start_offset(i64::MAX / 1_000_000);
    let err = build_geopackage(&path, &mut failing).unwrap_err();
    assert!(matches!(err, Error::DateOutOfRange(_)));
    assert!(!path.exists());
}

#[test]
fn test_build_writes_populated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future_works.gpkg");

    let populated = build_geopackage(&path, &mut populator(SampleSize::default())).unwrap();
    assert_eq!(populated.links, 9);

    let conn = Connection::open(&path).unwrap();
    assert_eq!(count(&conn, "SELECT count(*) FROM future_works_unified"), 9);
}

#[test]
fn test_populate_reopened_file_twice_fails() {
    let (_dir, path, writer) = fresh_geopackage();
    writer.finalize().unwrap();

    let mut writer = GeoPackageWriter::open(&path).unwrap();
    populator(SampleSize::default()).populate(&mut writer).unwrap();
    writer.finalize().unwrap();

    let mut writer = GeoPackageWriter::open(&path).unwrap();
    let err = populator(SampleSize::default()).populate(&mut writer).unwrap_err();
    assert!(matches!(err, Error::AlreadyPopulated(_)));
    assert_eq!(writer.row_count("organisation").unwrap(), 5);
}

#[test]
fn test_populate_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = GeoPackageWriter::open(&dir.path().join("absent.gpkg")).err().unwrap();
    assert!(matches!(err, Error::MissingOutput(_)));
}
