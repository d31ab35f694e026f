//! Typed rows for the profile's entity and relationship tables.
//!
//! Every code-list attribute is held as its enum, so a record can only name a
//! member of the list; the writer re-checks codes and geometry on insert.

use chrono::{DateTime, NaiveDate, Utc};

use crate::geometry::LineString;
use crate::record::{Record, SqlValue};
use crate::schema::{
    ConfidenceLevel, ContactDetailsType, DataProvenance, DataSensitivityLevel, InstallationMethod,
    LifecycleStatus, LinkStatus, LocationType, Material, MeasurementUnit, OrganisationType,
    PlannedWorkStatus, ProgrammeType, TableSchema, UtilitySubtype, UtilityType, WorkType,
    CONTACT_DETAILS, NETWORK_LINK, ORGANISATION, ORGANISATION_TO_CONTACT_DETAILS,
    PLANNED_PROGRAMME,
};

/// Lifecycle columns shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    pub status: LifecycleStatus,
    pub last_updated: DateTime<Utc>,
    pub status_changed: Option<DateTime<Utc>>,
    pub loaded: DateTime<Utc>,
}

impl Lifecycle {
    pub fn active(now: DateTime<Utc>) -> Self {
        Self {
            status: LifecycleStatus::Active,
            last_updated: now,
            status_changed: None,
            loaded: now,
        }
    }

    fn values(&self) -> [(&'static str, SqlValue); 4] {
        [
            ("lifecyclestatus", SqlValue::code(self.status)),
            ("datelastupdated", SqlValue::timestamp(self.last_updated)),
            ("dateoflastlifecyclestatuschange", SqlValue::opt_timestamp(self.status_changed)),
            ("systemloaddate", SqlValue::timestamp(self.loaded)),
        ]
    }
}

/// Who supplied a programme or link and how it may be handled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
    pub certification: Option<String>,
    pub provider_unique_id: Option<String>,
    pub data_owner: Option<String>,
    pub sensitivity: Option<DataSensitivityLevel>,
    pub source: Option<DataProvenance>,
}

impl Provenance {
    fn values(&self) -> [(&'static str, SqlValue); 5] {
        [
            ("certification", SqlValue::opt_text(self.certification.as_deref())),
            (
                "dataproviderassigneduniqueid",
                SqlValue::opt_text(self.provider_unique_id.as_deref()),
            ),
            ("dataowner", SqlValue::opt_text(self.data_owner.as_deref())),
            ("datasensitivitylevel", SqlValue::opt_code(self.sensitivity)),
            ("dataprovenance", SqlValue::opt_code(self.source)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Organisation {
    pub id: String,
    pub lifecycle: Lifecycle,
    pub name: String,
    pub short_name: Option<String>,
    pub organisation_type: OrganisationType,
    pub swa_code: Option<String>,
    pub website_url: Option<String>,
}

impl Record for Organisation {
    fn schema() -> &'static TableSchema {
        &ORGANISATION
    }

    fn key(&self) -> String {
        self.id.clone()
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        let mut values = vec![("systemid", SqlValue::text(&self.id))];
        values.extend(self.lifecycle.values());
        values.extend([
            ("name", SqlValue::text(&self.name)),
            ("shortname", SqlValue::opt_text(self.short_name.as_deref())),
            ("organisationtype", SqlValue::code(self.organisation_type)),
            ("swacode", SqlValue::opt_text(self.swa_code.as_deref())),
            ("websiteurl", SqlValue::opt_text(self.website_url.as_deref())),
        ]);
        values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetails {
    pub id: String,
    pub lifecycle: Lifecycle,
    pub name: String,
    pub role: ContactDetailsType,
    pub department: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

impl Record for ContactDetails {
    fn schema() -> &'static TableSchema {
        &CONTACT_DETAILS
    }

    fn key(&self) -> String {
        self.id.clone()
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        let mut values = vec![("systemid", SqlValue::text(&self.id))];
        values.extend(self.lifecycle.values());
        values.extend([
            ("contactname", SqlValue::text(&self.name)),
            ("contactdetailstype", SqlValue::code(self.role)),
            ("departmentname", SqlValue::opt_text(self.department.as_deref())),
            ("emailaddress", SqlValue::opt_text(self.email.as_deref())),
            ("telephonenumber", SqlValue::opt_text(self.telephone.as_deref())),
        ]);
        values
    }
}

/// Row of `relationship_organisationtocontactdetails`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrganisationContact {
    pub organisation_id: String,
    pub contact_id: String,
}

impl Record for OrganisationContact {
    fn schema() -> &'static TableSchema {
        &ORGANISATION_TO_CONTACT_DETAILS
    }

    fn key(&self) -> String {
        format!("{}->{}", self.organisation_id, self.contact_id)
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("linkedorganisationid", SqlValue::text(&self.organisation_id)),
            ("linkedcontactdetailsid", SqlValue::text(&self.contact_id)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedProgramme {
    pub id: String,
    pub lifecycle: Lifecycle,
    pub provenance: Provenance,
    /// Owning organisation; must already exist
    pub organisation_id: String,
    pub name: String,
    pub programme_type: Option<ProgrammeType>,
    pub description: Option<String>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
}

impl Record for PlannedProgramme {
    fn schema() -> &'static TableSchema {
        &PLANNED_PROGRAMME
    }

    fn key(&self) -> String {
        self.id.clone()
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        let mut values = vec![("systemid", SqlValue::text(&self.id))];
        values.extend(self.lifecycle.values());
        values.extend(self.provenance.values());
        values.extend([
            ("programmename", SqlValue::text(&self.name)),
            ("programmetype", SqlValue::opt_code(self.programme_type)),
            ("programmedescription", SqlValue::opt_text(self.description.as_deref())),
            ("plannedstartdate", SqlValue::opt_date(self.planned_start)),
            ("plannedenddate", SqlValue::opt_date(self.planned_end)),
            ("dataproviderid_fk", SqlValue::text(&self.organisation_id)),
        ]);
        values
    }
}

/// A planned depth and the unit it is measured in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Depth {
    pub value: f64,
    pub unit: MeasurementUnit,
}

impl Depth {
    pub fn metres(value: f64) -> Self {
        Self {
            value,
            unit: MeasurementUnit::Metres,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkLink {
    pub id: String,
    pub lifecycle: Lifecycle,
    pub provenance: Provenance,
    /// Owning programme; must already exist
    pub programme_id: String,
    pub provider_id: Option<String>,
    pub geometry: LineString,
    pub object_name: Option<String>,
    pub description: Option<String>,
    pub utility_type: UtilityType,
    pub utility_subtype: Option<UtilitySubtype>,
    pub work_status: Option<PlannedWorkStatus>,
    pub work_type: Option<WorkType>,
    pub material: Option<Material>,
    pub installation_method: Option<InstallationMethod>,
    pub installation_date: Option<NaiveDate>,
    pub depth: Option<Depth>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub confidence: Option<ConfidenceLevel>,
    pub link_status: Option<LinkStatus>,
    pub location_type: Option<LocationType>,
    /// Unique Street Reference Number, stored as given
    pub usrn: Option<String>,
    pub locale_reference: Option<String>,
}

impl Record for NetworkLink {
    fn schema() -> &'static TableSchema {
        &NETWORK_LINK
    }

    fn key(&self) -> String {
        self.id.clone()
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        let mut values = vec![
            ("systemid", SqlValue::text(&self.id)),
            ("geom", SqlValue::Geometry(self.geometry.clone())),
        ];
        values.extend(self.lifecycle.values());
        values.extend(self.provenance.values());
        values.extend([
            ("objectname", SqlValue::opt_text(self.object_name.as_deref())),
            ("description", SqlValue::opt_text(self.description.as_deref())),
            ("utilitytype", SqlValue::code(self.utility_type)),
            ("utilitysubtype", SqlValue::opt_code(self.utility_subtype)),
            ("plannedworkstatus", SqlValue::opt_code(self.work_status)),
            ("worktype", SqlValue::opt_code(self.work_type)),
            ("plannedmaterial", SqlValue::opt_code(self.material)),
            ("plannedinstallationmethod", SqlValue::opt_code(self.installation_method)),
            ("plannedinstallationdate", SqlValue::opt_date(self.installation_date)),
            (
                "planneddepth_depth",
                self.depth.map(|d| d.value.into()).unwrap_or(SqlValue::Null),
            ),
            (
                "planneddepth_unitofmeasure",
                SqlValue::opt_code(self.depth.map(|d| d.unit)),
            ),
            ("plannedstartdate", SqlValue::opt_date(self.planned_start)),
            ("plannedenddate", SqlValue::opt_date(self.planned_end)),
            ("confidencelevel", SqlValue::opt_code(self.confidence)),
            ("linkstatus", SqlValue::opt_code(self.link_status)),
            ("locationtype", SqlValue::opt_code(self.location_type)),
            ("usrn", SqlValue::opt_text(self.usrn.as_deref())),
            ("localereference", SqlValue::opt_text(self.locale_reference.as_deref())),
            ("dataproviderid_fk", SqlValue::opt_text(self.provider_id.as_deref())),
            ("programmeid_fk", SqlValue::text(&self.programme_id)),
        ]);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// Every value a record produces names a declared column, once
    fn assert_columns_declared<R: Record>(record: &R) {
        let schema = R::schema();
        let values = record.values();
        let mut seen = std::collections::HashSet::new();
        for (col, _) in &values {
            assert!(schema.column(col).is_some(), "{}.{col} not declared", schema.name);
            assert!(seen.insert(*col), "{col} written twice");
        }
    }

    #[test]
    fn test_records_match_declarations() {
        let org = Organisation {
            id: "org-001".into(),
            lifecycle: Lifecycle::active(now()),
            name: "Northern Gas Networks".into(),
            short_name: Some("NGN".into()),
            organisation_type: OrganisationType::UtilityCompany,
            swa_code: Some("NGN".into()),
            website_url: None,
        };
        assert_columns_declared(&org);

        let link = NetworkLink {
            id: "nl-001".into(),
            lifecycle: Lifecycle::active(now()),
            provenance: Provenance::default(),
            programme_id: "prg-001".into(),
            provider_id: Some("org-001".into()),
            geometry: LineString::bng([(430100.0, 433875.0), (430300.0, 433875.0)]),
            object_name: None,
            description: None,
            utility_type: UtilityType::Gas,
            utility_subtype: Some(UtilitySubtype::MediumPressure),
            work_status: None,
            work_type: None,
            material: None,
            installation_method: None,
            installation_date: None,
            depth: Some(Depth::metres(1.2)),
            planned_start: None,
            planned_end: None,
            confidence: None,
            link_status: None,
            location_type: None,
            usrn: Some("40701234".into()),
            locale_reference: None,
        };
        assert_columns_declared(&link);
        let values = link.values();
        let unit = values.iter().find(|(c, _)| *c == "planneddepth_unitofmeasure").unwrap();
        assert_eq!(unit.1, SqlValue::text("fw-mun-001"));

        assert_columns_declared(&OrganisationContact {
            organisation_id: "org-001".into(),
            contact_id: "ctc-001".into(),
        });
    }
}
