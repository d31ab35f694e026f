//! Seeded sample data for a freshly built GeoPackage.
//!
//! Rows are written parent first: organisations, contact details, the
//! organisation/contact links, programmes and finally network links. Each
//! entity type goes in as one transaction.

pub mod sample;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::path::Path;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry::{LineString, Point};
use crate::model::{
    ContactDetails, Depth, Lifecycle, NetworkLink, Organisation, OrganisationContact,
    PlannedProgramme, Provenance,
};
use crate::schema::{
    CodeList, ConfidenceLevel, ContactDetailsType, DataProvenance, DataSensitivityLevel,
    PlannedWorkStatus, UtilitySubtype, CONTACT_DETAILS, ENTITY_TABLES, NETWORK_LINK, ORGANISATION,
    ORGANISATION_TO_CONTACT_DETAILS, PLANNED_PROGRAMME, RELATIONSHIP_TABLES,
};
use crate::writer::{create_geopackage, remove_partial, GeoPackageWriter};
use sample::{
    asset_noun, link_status_for, materials_for, INSTALLATION_METHODS, ORGANISATIONS, PROGRAMMES,
    STREETS, WORK_TYPES,
};

/// Leeds city centre, British National Grid
pub const LEEDS: Point = Point::new(430_000.0, 434_000.0);

/// How many rows of each kind to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSize {
    pub organisations: usize,
    pub contacts_per_organisation: usize,
    pub programmes: usize,
    pub links: usize,
}

impl Default for SampleSize {
    fn default() -> Self {
        Self {
            organisations: 5,
            contacts_per_organisation: 1,
            programmes: 4,
            links: 9,
        }
    }
}

/// Rows written by a population run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Populated {
    pub organisations: usize,
    pub contacts: usize,
    pub relationships: usize,
    pub programmes: usize,
    pub links: usize,
}

pub struct SampleDataPopulator {
    size: SampleSize,
    rng: StdRng,
    now: DateTime<Utc>,
    origin: Point,
    start_offset: i64,
    organisations: Vec<Organisation>,
    contacts: Vec<ContactDetails>,
    programmes: Vec<PlannedProgramme>,
}

impl SampleDataPopulator {
    pub fn new(size: SampleSize, seed: u64) -> Self {
        Self {
            size,
            rng: StdRng::seed_from_u64(seed),
            now: Utc::now(),
            origin: LEEDS,
            start_offset: 0,
            organisations: Vec::new(),
            contacts: Vec::new(),
            programmes: Vec::new(),
        }
    }

    /// Fix the build time used for timestamps and planned dates
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Centre of the area links are scattered around
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Shift every planned date by this many days
    pub fn with_start_offset(mut self, days: i64) -> Self {
        self.start_offset = days;
        self
    }

    /// Write the full sample set into a GeoPackage that has no data yet
    pub fn populate(&mut self, writer: &mut GeoPackageWriter) -> Result<Populated> {
        for table in ENTITY_TABLES.iter().chain(RELATIONSHIP_TABLES) {
            if writer.row_count(table.name)? > 0 {
                return Err(Error::AlreadyPopulated(table.name));
            }
        }
        self.today()?;

        let populated = Populated {
            organisations: self.insert_organisations(writer)?,
            contacts: self.insert_contacts(writer)?,
            relationships: self.insert_relationships(writer)?,
            programmes: self.insert_programmes(writer)?,
            links: self.insert_links(writer)?,
        };

        if let Some(extent) = writer.update_extent(&NETWORK_LINK)? {
            info!(
                min_x = extent.min_x,
                min_y = extent.min_y,
                max_x = extent.max_x,
                max_y = extent.max_y,
                "updated networklink extent"
            );
        }

        Ok(populated)
    }

    pub fn insert_organisations(&mut self, writer: &mut GeoPackageWriter) -> Result<usize> {
        let lifecycle = Lifecycle::active(self.now);
        let organisations: Vec<Organisation> = (0..self.size.organisations)
            .map(|i| {
                let sample = &ORGANISATIONS[i % ORGANISATIONS.len()];
                let round = i / ORGANISATIONS.len();
                Organisation {
                    id: format!("org-{:03}", i + 1),
                    lifecycle: lifecycle.clone(),
                    name: numbered(sample.name, round),
                    short_name: Some(numbered(sample.short_name, round)),
                    organisation_type: sample.organisation_type,
                    swa_code: Some(numbered(sample.short_name, round)),
                    website_url: Some(sample.website_url.to_string()),
                }
            })
            .collect();

        let count = writer.insert(&organisations)?;
        info!(count, "inserted organisations");
        self.organisations = organisations;
        Ok(count)
    }

    pub fn insert_contacts(&mut self, writer: &mut GeoPackageWriter) -> Result<usize> {
        let lifecycle = Lifecycle::active(self.now);
        let mut contacts = Vec::new();

        for i in 0..self.size.organisations {
            let sample = &ORGANISATIONS[i % ORGANISATIONS.len()].contact;
            for n in 0..self.size.contacts_per_organisation {
                // Extra contacts take the next roles in list order
                let role = if n == 0 {
                    sample.role
                } else {
                    let offset = ContactDetailsType::ALL
                        .iter()
                        .position(|r| *r == sample.role)
                        .unwrap_or(0);
                    ContactDetailsType::ALL[(offset + n) % ContactDetailsType::ALL.len()]
                };
                let mailbox = if n == 0 {
                    sample.mailbox.to_string()
                } else {
                    format!("{}{}", sample.mailbox, n + 1)
                };

                contacts.push(ContactDetails {
                    id: format!("ctc-{:03}", contacts.len() + 1),
                    lifecycle: lifecycle.clone(),
                    name: format!("{} - {}", role.label(), sample.department),
                    role,
                    department: Some(sample.department.to_string()),
                    email: Some(format!("{}@{}", mailbox, sample.email_domain)),
                    telephone: Some(sample.telephone.to_string()),
                });
            }
        }

        let count = writer.insert(&contacts)?;
        info!(count, "inserted contact details");
        self.contacts = contacts;
        Ok(count)
    }

    pub fn insert_relationships(&mut self, writer: &mut GeoPackageWriter) -> Result<usize> {
        let table = ORGANISATION_TO_CONTACT_DETAILS.name;
        let per_org = self.size.contacts_per_organisation;
        if self.size.organisations == 0 || per_org == 0 {
            info!("no organisation contacts requested");
            return Ok(0);
        }
        require(writer, table, ORGANISATION.name)?;
        require(writer, table, CONTACT_DETAILS.name)?;
        require_generated(&self.organisations, table, ORGANISATION.name)?;
        require_generated(&self.contacts, table, CONTACT_DETAILS.name)?;

        let links: Vec<OrganisationContact> = self
            .organisations
            .iter()
            .enumerate()
            .flat_map(|(i, org)| {
                self.contacts
                    .iter()
                    .skip(i * per_org)
                    .take(per_org)
                    .map(move |contact| OrganisationContact {
                        organisation_id: org.id.clone(),
                        contact_id: contact.id.clone(),
                    })
            })
            .collect();

        let count = writer.insert(&links)?;
        info!(count, "inserted organisation contacts");
        Ok(count)
    }

    pub fn insert_programmes(&mut self, writer: &mut GeoPackageWriter) -> Result<usize> {
        if self.size.programmes == 0 {
            return Ok(0);
        }
        require(writer, PLANNED_PROGRAMME.name, ORGANISATION.name)?;
        require_generated(&self.organisations, PLANNED_PROGRAMME.name, ORGANISATION.name)?;

        let lifecycle = Lifecycle::active(self.now);
        let today = self.today()?;
        let mut programmes = Vec::with_capacity(self.size.programmes);
        for i in 0..self.size.programmes {
            let org = &self.organisations[i % self.organisations.len()];
            let sample = &PROGRAMMES[i % PROGRAMMES.len()];
            let round = i / PROGRAMMES.len();
            let id = format!("prg-{:03}", i + 1);
            let start = add_days(today, sample.starts_in)?;
            programmes.push(PlannedProgramme {
                lifecycle: lifecycle.clone(),
                provenance: Provenance {
                    certification: Some("Provisional".to_string()),
                    provider_unique_id: Some(id.clone()),
                    data_owner: Some(org.id.clone()),
                    sensitivity: Some(sample.sensitivity),
                    source: Some(DataProvenance::CapitalProgramme),
                },
                organisation_id: org.id.clone(),
                name: numbered(sample.name, round),
                programme_type: Some(sample.programme_type),
                description: Some(sample.description.to_string()),
                planned_start: Some(start),
                planned_end: Some(add_days(start, sample.duration)?),
                id,
            });
        }

        let count = writer.insert(&programmes)?;
        info!(count, "inserted planned programmes");
        self.programmes = programmes;
        Ok(count)
    }

    pub fn insert_links(&mut self, writer: &mut GeoPackageWriter) -> Result<usize> {
        if self.size.links == 0 {
            return Ok(0);
        }
        require(writer, NETWORK_LINK.name, PLANNED_PROGRAMME.name)?;
        require_generated(&self.programmes, NETWORK_LINK.name, PLANNED_PROGRAMME.name)?;

        let mut links = Vec::with_capacity(self.size.links);
        for i in 0..self.size.links {
            let programme = self.programmes[i % self.programmes.len()].clone();
            links.push(self.network_link(i, &programme)?);
        }

        let count = writer.insert(&links)?;
        info!(count, "inserted network links");
        Ok(count)
    }

    fn network_link(&mut self, i: usize, programme: &PlannedProgramme) -> Result<NetworkLink> {
        let org_index = self
            .organisations
            .iter()
            .position(|o| o.id == programme.organisation_id)
            .unwrap_or(0);
        let utility = ORGANISATIONS[org_index % ORGANISATIONS.len()].utility;
        let street = &STREETS[i % STREETS.len()];
        let work_type = self.pick(WORK_TYPES);

        let window_start = match programme.planned_start {
            Some(date) => date,
            None => self.today()?,
        };
        let window_end = match programme.planned_end {
            Some(date) => date,
            None => add_days(window_start, 90)?,
        };
        let span = (window_end - window_start).num_days().max(31);
        let start = add_days(window_start, self.rng.gen_range(0..span - 30))?;
        let end = add_days(start, self.rng.gen_range(5..=30))?;
        let depth = (self.rng.gen_range(0.5..1.6_f64) * 10.0).round() / 10.0;

        Ok(NetworkLink {
            id: format!("nl-{:03}", i + 1),
            lifecycle: Lifecycle::active(self.now),
            provenance: Provenance {
                certification: None,
                provider_unique_id: None,
                data_owner: Some(programme.organisation_id.clone()),
                sensitivity: Some(DataSensitivityLevel::Public),
                source: Some(self.pick(&[
                    DataProvenance::AssetManagementSystem,
                    DataProvenance::CapitalProgramme,
                    DataProvenance::EngineeringAssessment,
                ])),
            },
            programme_id: programme.id.clone(),
            provider_id: Some(programme.organisation_id.clone()),
            geometry: self.line(),
            object_name: Some(format!("{} {}", street.name, asset_noun(utility))),
            description: Some(format!("{} of {}", work_type.label(), asset_noun(utility).to_lowercase())),
            utility_type: utility,
            utility_subtype: Some(self.pick(&UtilitySubtype::for_utility(utility))),
            work_status: Some(self.pick(&[
                PlannedWorkStatus::Proposed,
                PlannedWorkStatus::Approved,
                PlannedWorkStatus::Scheduled,
                PlannedWorkStatus::InPreparation,
            ])),
            work_type: Some(work_type),
            material: Some(self.pick(materials_for(utility))),
            installation_method: Some(self.pick(INSTALLATION_METHODS)),
            installation_date: Some(start),
            depth: Some(Depth::metres(depth)),
            planned_start: Some(start),
            planned_end: Some(end),
            confidence: Some(self.pick(ConfidenceLevel::ALL)),
            link_status: Some(link_status_for(work_type)),
            location_type: Some(street.location),
            usrn: Some(street.usrn.to_string()),
            locale_reference: Some(street.name.to_string()),
        })
    }

    /// A 2 to 4 vertex line near the origin with strictly increasing eastings,
    /// so it can never cross itself
    fn line(&mut self) -> LineString {
        let vertices = self.rng.gen_range(2..=4);
        let mut x = (self.origin.x + self.rng.gen_range(-1500.0..1500.0_f64)).round();
        let mut y = (self.origin.y + self.rng.gen_range(-1500.0..1500.0_f64)).round();

        let mut points = Vec::with_capacity(vertices);
        points.push((x, y));
        for _ in 1..vertices {
            x += self.rng.gen_range(50.0..250.0_f64).round();
            y += self.rng.gen_range(-100.0..100.0_f64).round();
            points.push((x, y));
        }
        LineString::bng(points)
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.gen_range(0..items.len())]
    }

    fn today(&self) -> Result<NaiveDate> {
        add_days(self.now.date_naive(), self.start_offset)
    }
}

/// Create a GeoPackage at `path` and fill it with sample data.
///
/// Nothing is left at `path` when any step fails.
pub fn build_geopackage(path: &Path, populator: &mut SampleDataPopulator) -> Result<Populated> {
    let mut writer = create_geopackage(path)?;
    let populated = match populator.populate(&mut writer) {
        Ok(populated) => populated,
        Err(e) => {
            drop(writer);
            remove_partial(path);
            return Err(e);
        }
    };

    if let Err(e) = writer.finalize() {
        remove_partial(path);
        return Err(e);
    }
    Ok(populated)
}

/// Rows for `table` need rows in `requires` first
fn require(writer: &GeoPackageWriter, table: &'static str, requires: &'static str) -> Result<()> {
    if writer.row_count(requires)? == 0 {
        return Err(Error::OrderingViolation { table, requires });
    }
    Ok(())
}

/// Parent rows must have come from this populator so children can point at them
fn require_generated<T>(parents: &[T], table: &'static str, requires: &'static str) -> Result<()> {
    if parents.is_empty() {
        return Err(Error::OrderingViolation { table, requires });
    }
    Ok(())
}

fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|d| date.checked_add_signed(d))
        .ok_or(Error::DateOutOfRange(days))
}

/// Sample names repeat once the fixed set runs out; later rounds get a suffix
fn numbered(base: &str, round: usize) -> String {
    if round == 0 {
        base.to_string()
    } else {
        format!("{} {}", base, round + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::build_schema;
    use chrono::TimeZone;

    fn writer() -> GeoPackageWriter {
        let mut writer = GeoPackageWriter::open_in_memory().unwrap();
        build_schema(&mut writer).unwrap();
        writer
    }

    fn populator(size: SampleSize) -> SampleDataPopulator {
        SampleDataPopulator::new(size, 42)
            .with_clock(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_default_population() {
        let mut writer = writer();
        let populated = populator(SampleSize::default()).populate(&mut writer).unwrap();

        assert_eq!(
            populated,
            Populated {
                organisations: 5,
                contacts: 5,
                relationships: 5,
                programmes: 4,
                links: 9,
            }
        );
        assert_eq!(writer.row_count("networklink").unwrap(), 9);
    }

    #[test]
    fn test_same_seed_same_lines() {
        let mut a = populator(SampleSize::default());
        let mut b = populator(SampleSize::default());
        for _ in 0..10 {
            assert_eq!(a.line(), b.line());
        }
    }

    #[test]
    fn test_lines_are_valid_and_monotonic() {
        let mut p = populator(SampleSize::default());
        for _ in 0..200 {
            let line = p.line();
            assert!((2..=4).contains(&line.points.len()));
            assert!(line.points.windows(2).all(|w| w[1].x > w[0].x));
            line.validate_for(27700).unwrap();
        }
    }

    #[test]
    fn test_links_before_programmes_is_rejected() {
        let mut writer = writer();
        let mut p = populator(SampleSize::default());
        p.insert_organisations(&mut writer).unwrap();

        let err = p.insert_links(&mut writer).unwrap_err();
        assert!(matches!(
            err,
            Error::OrderingViolation {
                table: "networklink",
                requires: "plannedprogramme"
            }
        ));
        assert_eq!(writer.row_count("networklink").unwrap(), 0);
    }

    #[test]
    fn test_relationships_need_contacts() {
        let mut writer = writer();
        let mut p = populator(SampleSize::default());
        p.insert_organisations(&mut writer).unwrap();
        assert!(matches!(
            p.insert_relationships(&mut writer),
            Err(Error::OrderingViolation { requires: "contactdetails", .. })
        ));
    }

    #[test]
    fn test_parents_from_another_populator_are_rejected() {
        let mut writer = writer();
        populator(SampleSize::default()).insert_organisations(&mut writer).unwrap();

        let err = populator(SampleSize::default())
            .insert_programmes(&mut writer)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::OrderingViolation {
                table: "plannedprogramme",
                requires: "organisation"
            }
        ));
        assert_eq!(writer.row_count("plannedprogramme").unwrap(), 0);
    }

    #[test]
    fn test_populate_without_contacts() {
        let mut writer = writer();
        let size = SampleSize {
            contacts_per_organisation: 0,
            ..SampleSize::default()
        };
        let populated = populator(size).populate(&mut writer).unwrap();

        assert_eq!(populated.contacts, 0);
        assert_eq!(populated.relationships, 0);
        assert_eq!(populated.links, 9);
        assert_eq!(writer.row_count("future_works_unified").unwrap(), 9);
    }

    #[test]
    fn test_start_offset_out_of_range() {
        let mut writer = writer();
        let err = populator(SampleSize::default())
            .with_start_offset(i64::MAX / 1_000_000)
            .populate(&mut writer)
            .unwrap_err();

        assert!(matches!(err, Error::DateOutOfRange(_)));
        assert_eq!(writer.row_count("organisation").unwrap(), 0);
    }

    #[test]
    fn test_populate_twice_fails() {
        let mut writer = writer();
        populator(SampleSize::default()).populate(&mut writer).unwrap();
        let err = populator(SampleSize::default()).populate(&mut writer).unwrap_err();
        assert!(matches!(err, Error::AlreadyPopulated("organisation")));
    }

    #[test]
    fn test_more_organisations_than_samples() {
        let mut writer = writer();
        let size = SampleSize {
            organisations: 7,
            contacts_per_organisation: 2,
            programmes: 6,
            links: 12,
        };
        let populated = populator(size).populate(&mut writer).unwrap();
        assert_eq!(populated.organisations, 7);
        assert_eq!(populated.contacts, 14);
        assert_eq!(populated.relationships, 14);
        assert_eq!(populated.links, 12);

        let name: String = writer
            .connection()
            .query_row("SELECT name FROM organisation WHERE systemid = 'org-006'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "Northern Gas Networks 2");
    }
}
