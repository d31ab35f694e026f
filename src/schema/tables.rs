//! Table schema definitions for the UK Future Works Profile entities

use super::codelists::CODE_LISTS;
use super::relationships::RELATIONSHIP_TABLES;
use super::types::*;

// =============================================================================
// Organisation schema
// =============================================================================

pub static ORGANISATION: TableSchema = TableSchema {
    name: "organisation",
    kind: TableKind::Entity,
    description: "Organisations sharing future works",
    columns: &[
        Column::key(SYSTEM_ID),
        Column::required("lifecyclestatus", ColumnType::Text),
        Column::required("datelastupdated", ColumnType::DateTime),
        Column::new("dateoflastlifecyclestatuschange", ColumnType::DateTime),
        Column::required("systemloaddate", ColumnType::DateTime),
        Column::required("name", ColumnType::Text),
        Column::new("shortname", ColumnType::Text),
        Column::required("organisationtype", ColumnType::Text),
        Column::new("swacode", ColumnType::Text),
        Column::new("websiteurl", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::code("lifecyclestatus", "lifecyclestatusvalue"),
        ForeignKey::code("organisationtype", "organisationtypevalue"),
    ],
    indexes: &[],
    checks: &[],
};

pub static CONTACT_DETAILS: TableSchema = TableSchema {
    name: "contactdetails",
    kind: TableKind::Entity,
    description: "Contact points, linked to organisations by relationship",
    columns: &[
        Column::key(SYSTEM_ID),
        Column::required("lifecyclestatus", ColumnType::Text),
        Column::required("datelastupdated", ColumnType::DateTime),
        Column::new("dateoflastlifecyclestatuschange", ColumnType::DateTime),
        Column::required("systemloaddate", ColumnType::DateTime),
        Column::required("contactname", ColumnType::Text),
        Column::required("contactdetailstype", ColumnType::Text),
        Column::new("departmentname", ColumnType::Text),
        Column::new("emailaddress", ColumnType::Text),
        Column::new("telephonenumber", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::code("lifecyclestatus", "lifecyclestatusvalue"),
        ForeignKey::code("contactdetailstype", "contactdetailstypevalue"),
    ],
    indexes: &[],
    checks: &["emailaddress IS NOT NULL OR telephonenumber IS NOT NULL"],
};

// =============================================================================
// Future works schema
// =============================================================================

pub static PLANNED_PROGRAMME: TableSchema = TableSchema {
    name: "plannedprogramme",
    kind: TableKind::Entity,
    description: "Programmes of planned works owned by an organisation",
    columns: &[
        Column::key(SYSTEM_ID),
        Column::required("lifecyclestatus", ColumnType::Text),
        Column::required("datelastupdated", ColumnType::DateTime),
        Column::new("dateoflastlifecyclestatuschange", ColumnType::DateTime),
        Column::required("systemloaddate", ColumnType::DateTime),
        Column::new("certification", ColumnType::Text),
        Column::new("dataproviderassigneduniqueid", ColumnType::Text),
        Column::new("dataowner", ColumnType::Text),
        Column::new("datasensitivitylevel", ColumnType::Text),
        Column::new("dataprovenance", ColumnType::Text),
        Column::required("programmename", ColumnType::Text),
        Column::new("programmetype", ColumnType::Text),
        Column::new("programmedescription", ColumnType::Text),
        Column::new("plannedstartdate", ColumnType::Date),
        Column::new("plannedenddate", ColumnType::Date),
        Column::required("dataproviderid_fk", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::code("lifecyclestatus", "lifecyclestatusvalue"),
        ForeignKey::code("datasensitivitylevel", "datasensitivitylevelvalue"),
        ForeignKey::code("dataprovenance", "dataprovenancevalue"),
        ForeignKey::code("programmetype", "programmetypevalue"),
        ForeignKey::new("dataproviderid_fk", "organisation"),
    ],
    indexes: &[],
    checks: &["plannedenddate IS NULL OR plannedstartdate IS NULL OR plannedenddate >= plannedstartdate"],
};

pub static NETWORK_LINK: TableSchema = TableSchema {
    name: "networklink",
    kind: TableKind::Entity,
    description: "Linear network features affected by planned works",
    columns: &[
        Column::key(SYSTEM_ID),
        Column::geometry("geom", GeometryType::LineString, BRITISH_NATIONAL_GRID),
        Column::required("lifecyclestatus", ColumnType::Text),
        Column::required("datelastupdated", ColumnType::DateTime),
        Column::new("dateoflastlifecyclestatuschange", ColumnType::DateTime),
        Column::required("systemloaddate", ColumnType::DateTime),
        Column::new("certification", ColumnType::Text),
        Column::new("dataproviderassigneduniqueid", ColumnType::Text),
        Column::new("dataowner", ColumnType::Text),
        Column::new("datasensitivitylevel", ColumnType::Text),
        Column::new("dataprovenance", ColumnType::Text),
        Column::new("objectname", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        Column::required("utilitytype", ColumnType::Text),
        Column::new("utilitysubtype", ColumnType::Text),
        Column::new("plannedworkstatus", ColumnType::Text),
        Column::new("worktype", ColumnType::Text),
        Column::new("plannedmaterial", ColumnType::Text),
        Column::new("plannedinstallationmethod", ColumnType::Text),
        Column::new("plannedinstallationdate", ColumnType::Date),
        Column::new("planneddepth_depth", ColumnType::Real),
        Column::new("planneddepth_unitofmeasure", ColumnType::Text),
        Column::new("plannedstartdate", ColumnType::Date),
        Column::new("plannedenddate", ColumnType::Date),
        Column::new("confidencelevel", ColumnType::Text),
        Column::new("linkstatus", ColumnType::Text),
        Column::new("locationtype", ColumnType::Text),
        // External street identifier; stored as given, never resolved
        Column::new("usrn", ColumnType::Text),
        Column::new("localereference", ColumnType::Text),
        Column::new("dataproviderid_fk", ColumnType::Text),
        Column::required("programmeid_fk", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::code("lifecyclestatus", "lifecyclestatusvalue"),
        ForeignKey::code("datasensitivitylevel", "datasensitivitylevelvalue"),
        ForeignKey::code("dataprovenance", "dataprovenancevalue"),
        ForeignKey::code("utilitytype", "utilitytypevalue"),
        ForeignKey::code("utilitysubtype", "utilitysubtypevalue"),
        ForeignKey::code("plannedworkstatus", "plannedworkstatusvalue"),
        ForeignKey::code("worktype", "worktypevalue"),
        ForeignKey::code("plannedmaterial", "materialvalue"),
        ForeignKey::code("plannedinstallationmethod", "installationmethodvalue"),
        ForeignKey::code("planneddepth_unitofmeasure", "measurementunitsvalue"),
        ForeignKey::code("confidencelevel", "confidencelevelvalue"),
        ForeignKey::code("linkstatus", "linkstatusvalue"),
        ForeignKey::code("locationtype", "locationtypevalue"),
        ForeignKey::new("dataproviderid_fk", "organisation"),
        ForeignKey::new("programmeid_fk", "plannedprogramme"),
    ],
    indexes: &[Index::on(&["usrn"])],
    checks: &[
        "plannedenddate IS NULL OR plannedstartdate IS NULL OR plannedenddate >= plannedstartdate",
        "planneddepth_depth IS NULL OR planneddepth_depth >= 0",
    ],
};

// =============================================================================
// Schema Registry
// =============================================================================

/// Entity tables in dependency order
pub static ENTITY_TABLES: &[&TableSchema] = &[
    &ORGANISATION,
    &CONTACT_DETAILS,
    &PLANNED_PROGRAMME,
    &NETWORK_LINK,
];

/// Every declared table: code lists, entities, then relationships
pub fn all_tables() -> Vec<&'static TableSchema> {
    CODE_LISTS
        .iter()
        .map(|c| c.schema)
        .chain(ENTITY_TABLES.iter().copied())
        .chain(RELATIONSHIP_TABLES.iter().copied())
        .collect()
}

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    all_tables().into_iter().find(|t| t.name == name)
}
