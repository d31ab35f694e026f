//! Code list definitions for the UK Future Works Profile.
//!
//! Every enumerated attribute in the profile is drawn from one of these closed
//! lists. Each list is a Rust enum, so a typed record can only ever carry a
//! member of its list; the table is created and seeded alongside the schema
//! and referenced by foreign key from the attribute column.

use super::types::*;
use crate::error::{Error, Result};

/// A closed enumeration backed by a code list table
pub trait CodeList: Copy + Sized + 'static {
    /// Name of the backing table
    const TABLE: &'static str;
    /// Every member, in code order
    const ALL: &'static [Self];

    fn code(self) -> &'static str;
    fn label(self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }

    /// Like [`CodeList::from_code`], but an unknown code is an error
    fn parse_code(code: &str) -> Result<Self> {
        Self::from_code(code).ok_or_else(|| Error::UnknownCode {
            list: Self::TABLE,
            code: code.to_string(),
        })
    }
}

/// One row of a code list table
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRow {
    pub code: &'static str,
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub applicable_domains: Option<String>,
}

impl CodeRow {
    pub fn new(code: &'static str, label: &'static str) -> Self {
        Self {
            code,
            label,
            description: None,
            applicable_domains: None,
        }
    }
}

/// Declaration of one code list: its table and its fixed value set
pub struct CodeListDef {
    pub schema: &'static TableSchema,
    pub rows: fn() -> Vec<CodeRow>,
}

impl CodeListDef {
    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    pub fn contains(&self, code: &str) -> bool {
        (self.rows)().iter().any(|r| r.code == code)
    }
}

impl std::fmt::Debug for CodeListDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeListDef")
            .field("name", &self.schema.name)
            .finish()
    }
}

/// Rows for any list whose entries are plain (code, label) pairs
pub fn rows_of<C: CodeList>() -> Vec<CodeRow> {
    C::ALL
        .iter()
        .map(|v| CodeRow::new(v.code(), v.label()))
        .collect()
}

const CODE_LIST_COLUMNS: &[Column] = &[
    Column::key(CODE),
    Column::required("label", ColumnType::Text),
    Column::new("description", ColumnType::Text),
];

const UTILITY_SUBTYPE_COLUMNS: &[Column] = &[
    Column::key(CODE),
    Column::required("label", ColumnType::Text),
    Column::new("description", ColumnType::Text),
    Column::new("applicabledomains", ColumnType::Text),
];

const fn code_list_schema(
    name: &'static str,
    columns: &'static [Column],
    description: &'static str,
) -> TableSchema {
    TableSchema {
        name,
        kind: TableKind::CodeList,
        description,
        columns,
        foreign_keys: &[],
        indexes: &[],
        checks: &[],
    }
}

macro_rules! code_list {
    (
        $(#[$meta:meta])*
        $name:ident, $schema:ident => $table:literal, $columns:expr, $description:literal {
            $($variant:ident = $code:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl CodeList for $name {
            const TABLE: &'static str = $table;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        pub static $schema: TableSchema = code_list_schema($table, $columns, $description);
    };
}

code_list! {
    LifecycleStatus, LIFECYCLE_STATUS => "lifecyclestatusvalue", CODE_LIST_COLUMNS,
    "Lifecycle status of a record" {
        Active = "fw-lcs-001", "Active";
        Draft = "fw-lcs-002", "Draft";
        UnderReview = "fw-lcs-003", "Under Review";
        Approved = "fw-lcs-004", "Approved";
        Superseded = "fw-lcs-005", "Superseded";
        Cancelled = "fw-lcs-006", "Cancelled";
        Archived = "fw-lcs-007", "Archived";
    }
}

code_list! {
    OrganisationType, ORGANISATION_TYPE => "organisationtypevalue", CODE_LIST_COLUMNS,
    "Kind of organisation" {
        UtilityCompany = "fw-org-001", "Utility Company";
        LocalAuthority = "fw-org-002", "Local Authority";
        HighwayAuthority = "fw-org-003", "Highway Authority";
        Contractor = "fw-org-004", "Contractor";
        Consultant = "fw-org-005", "Consultant";
        RegulatoryBody = "fw-org-006", "Regulatory Body";
        Other = "fw-org-007", "Other";
    }
}

code_list! {
    ContactDetailsType, CONTACT_DETAILS_TYPE => "contactdetailstypevalue", CODE_LIST_COLUMNS,
    "Role of a contact" {
        PlanningCoordinator = "fw-cdt-001", "Planning Coordinator";
        ProjectManager = "fw-cdt-002", "Project Manager";
        EmergencyContact = "fw-cdt-003", "Emergency Contact";
        AssetProtection = "fw-cdt-004", "Asset Protection";
        GeneralEnquiries = "fw-cdt-005", "General Enquiries";
        Other = "fw-cdt-006", "Other";
    }
}

code_list! {
    PlannedWorkStatus, PLANNED_WORK_STATUS => "plannedworkstatusvalue", CODE_LIST_COLUMNS,
    "Status of planned work" {
        Proposed = "fw-pws-001", "Proposed";
        UnderConsultation = "fw-pws-002", "Under Consultation";
        Approved = "fw-pws-003", "Approved";
        Scheduled = "fw-pws-004", "Scheduled";
        InPreparation = "fw-pws-005", "In Preparation";
        InProgress = "fw-pws-006", "In Progress";
        Completed = "fw-pws-007", "Completed";
        OnHold = "fw-pws-008", "On Hold";
        Cancelled = "fw-pws-009", "Cancelled";
        Deferred = "fw-pws-010", "Deferred";
    }
}

code_list! {
    ProgrammeType, PROGRAMME_TYPE => "programmetypevalue", CODE_LIST_COLUMNS,
    "Kind of planned programme" {
        CapitalInvestment = "fw-prg-001", "Capital Investment";
        RoutineMaintenance = "fw-prg-002", "Routine Maintenance";
        EmergencyPreparedness = "fw-prg-003", "Emergency Preparedness";
        NetworkExpansion = "fw-prg-004", "Network Expansion";
        AssetReplacement = "fw-prg-005", "Asset Replacement";
        RegulatoryCompliance = "fw-prg-006", "Regulatory Compliance";
        CustomerConnection = "fw-prg-007", "Customer Connection";
        NetworkReinforcement = "fw-prg-008", "Network Reinforcement";
        Other = "fw-prg-009", "Other";
    }
}

code_list! {
    WorkType, WORK_TYPE => "worktypevalue", CODE_LIST_COLUMNS,
    "Kind of work planned on a link" {
        NewInstallation = "fw-wkt-001", "New Installation";
        FullReplacement = "fw-wkt-002", "Full Replacement";
        PartialReplacement = "fw-wkt-003", "Partial Replacement";
        Upgrade = "fw-wkt-004", "Upgrade";
        Repair = "fw-wkt-005", "Repair";
        Removal = "fw-wkt-006", "Removal";
        Abandonment = "fw-wkt-007", "Abandonment";
        Relocation = "fw-wkt-008", "Relocation";
        ProtectionWorks = "fw-wkt-009", "Protection Works";
        SurveyInvestigation = "fw-wkt-010", "Survey/Investigation";
        Other = "fw-wkt-011", "Other";
    }
}

code_list! {
    ConfidenceLevel, CONFIDENCE_LEVEL => "confidencelevelvalue", CODE_LIST_COLUMNS,
    "Confidence that the work will go ahead as planned" {
        Confirmed = "fw-cnf-001", "Confirmed";
        HighlyLikely = "fw-cnf-002", "Highly Likely";
        Likely = "fw-cnf-003", "Likely";
        Possible = "fw-cnf-004", "Possible";
        UnderReview = "fw-cnf-005", "Under Review";
        Tentative = "fw-cnf-006", "Tentative";
    }
}

code_list! {
    UtilityType, UTILITY_TYPE => "utilitytypevalue", CODE_LIST_COLUMNS,
    "Utility carried by a link" {
        Electricity = "fw-utl-001", "Electricity";
        Gas = "fw-utl-002", "Gas";
        Water = "fw-utl-003", "Water";
        Sewer = "fw-utl-004", "Sewer";
        Telecommunications = "fw-utl-005", "Telecommunications";
        DistrictHeating = "fw-utl-006", "District Heating";
        FuelAndChemicals = "fw-utl-007", "Fuel and Chemicals";
        TransportSignalling = "fw-utl-008", "Transport Signalling";
        Drainage = "fw-utl-009", "Drainage";
        Other = "fw-utl-010", "Other";
    }
}

code_list! {
    UtilitySubtype, UTILITY_SUBTYPE => "utilitysubtypevalue", UTILITY_SUBTYPE_COLUMNS,
    "Utility subtype, with the utility types it applies to" {
        HighVoltage = "fw-uts-001", "High Voltage";
        LowVoltage = "fw-uts-002", "Low Voltage";
        StreetLighting = "fw-uts-003", "Street Lighting";
        HighPressure = "fw-uts-004", "High Pressure";
        MediumPressure = "fw-uts-005", "Medium Pressure";
        LowPressure = "fw-uts-006", "Low Pressure";
        PotableWater = "fw-uts-007", "Potable Water";
        RawWater = "fw-uts-008", "Raw Water";
        FoulSewer = "fw-uts-009", "Foul Sewer";
        SurfaceWater = "fw-uts-010", "Surface Water";
        CombinedSewer = "fw-uts-011", "Combined Sewer";
        FibreOptic = "fw-uts-012", "Fibre Optic";
        CopperCable = "fw-uts-013", "Copper Cable";
        Other = "fw-uts-014", "Other";
    }
}

code_list! {
    Material, MATERIAL => "materialvalue", CODE_LIST_COLUMNS,
    "Planned material" {
        Polyethylene = "fw-mat-001", "PE (Polyethylene)";
        Pvc = "fw-mat-002", "PVC";
        DuctileIron = "fw-mat-003", "Ductile Iron";
        Steel = "fw-mat-004", "Steel";
        Concrete = "fw-mat-005", "Concrete";
        Clay = "fw-mat-006", "Clay";
        Copper = "fw-mat-007", "Copper";
        FibreOptic = "fw-mat-008", "Fibre Optic";
        Composite = "fw-mat-009", "Composite";
        Hdpe = "fw-mat-010", "HDPE";
        CastIron = "fw-mat-011", "Cast Iron";
        Unknown = "fw-mat-012", "Unknown";
        Other = "fw-mat-013", "Other";
    }
}

code_list! {
    InstallationMethod, INSTALLATION_METHOD => "installationmethodvalue", CODE_LIST_COLUMNS,
    "Planned installation method" {
        OpenCut = "fw-ins-001", "Open Cut";
        DirectionalDrilling = "fw-ins-002", "Directional Drilling";
        Moling = "fw-ins-003", "Moling";
        Tunnelling = "fw-ins-004", "Tunnelling";
        ThrustBoring = "fw-ins-005", "Thrust Boring";
        PipeJacking = "fw-ins-006", "Pipe Jacking";
        SlipLining = "fw-ins-007", "Slip Lining";
        PipeBursting = "fw-ins-008", "Pipe Bursting";
        Trenching = "fw-ins-009", "Trenching";
        Other = "fw-ins-010", "Other";
    }
}

code_list! {
    LocationType, LOCATION_TYPE => "locationtypevalue", CODE_LIST_COLUMNS,
    "Kind of land the link runs through" {
        Carriageway = "fw-loc-001", "Carriageway";
        Footway = "fw-loc-002", "Footway";
        Verge = "fw-loc-003", "Verge";
        CyclePath = "fw-loc-004", "Cycle Path";
        PrivateLand = "fw-loc-005", "Private Land";
        OpenSpace = "fw-loc-006", "Open Space";
        RailwayLand = "fw-loc-007", "Railway Land";
        Waterway = "fw-loc-008", "Waterway";
        Other = "fw-loc-009", "Other";
    }
}

code_list! {
    DataProvenance, DATA_PROVENANCE => "dataprovenancevalue", CODE_LIST_COLUMNS,
    "Where a record's data came from" {
        AssetManagementSystem = "fw-dpv-001", "Asset Management System";
        PlanningApplication = "fw-dpv-002", "Planning Application";
        CapitalProgramme = "fw-dpv-003", "Capital Programme";
        RegulatorySubmission = "fw-dpv-004", "Regulatory Submission";
        CustomerRequest = "fw-dpv-005", "Customer Request";
        EngineeringAssessment = "fw-dpv-006", "Engineering Assessment";
        ManualEntry = "fw-dpv-007", "Manual Entry";
        Other = "fw-dpv-008", "Other";
    }
}

code_list! {
    MeasurementUnit, MEASUREMENT_UNITS => "measurementunitsvalue", CODE_LIST_COLUMNS,
    "Units of measure" {
        Metres = "fw-mun-001", "Metres";
        Millimetres = "fw-mun-002", "Millimetres";
        Kilometres = "fw-mun-003", "Kilometres";
        SquareMetres = "fw-mun-004", "Square Metres";
        Degrees = "fw-mun-005", "Degrees";
        Bar = "fw-mun-006", "Bar";
        Kilovolts = "fw-mun-007", "kV";
        Unknown = "fw-mun-008", "Unknown";
    }
}

code_list! {
    DataSensitivityLevel, DATA_SENSITIVITY_LEVEL => "datasensitivitylevelvalue", CODE_LIST_COLUMNS,
    "Handling classification of a record" {
        Public = "fw-dsl-001", "Public";
        Official = "fw-dsl-002", "Official";
        OfficialSensitive = "fw-dsl-003", "Official-Sensitive";
        Restricted = "fw-dsl-004", "Restricted";
        Confidential = "fw-dsl-005", "Confidential";
        Secret = "fw-dsl-006", "Secret";
        TopSecret = "fw-dsl-007", "Top Secret";
    }
}

code_list! {
    LinkStatus, LINK_STATUS => "linkstatusvalue", CODE_LIST_COLUMNS,
    "Status of the asset a link represents" {
        New = "fw-lks-001", "New";
        Existing = "fw-lks-002", "Existing";
        ProposedNew = "fw-lks-003", "Proposed New";
        ExistingToBeModified = "fw-lks-004", "Existing - To Be Modified";
        ExistingToBeReplaced = "fw-lks-005", "Existing - To Be Replaced";
        ExistingToBeRemoved = "fw-lks-006", "Existing - To Be Removed";
    }
}

impl UtilitySubtype {
    /// Utility types this subtype may be used with
    pub fn applicable_utilities(self) -> &'static [UtilityType] {
        use UtilityType::*;
        match self {
            UtilitySubtype::HighVoltage
            | UtilitySubtype::LowVoltage
            | UtilitySubtype::StreetLighting => &[Electricity],
            UtilitySubtype::HighPressure
            | UtilitySubtype::MediumPressure
            | UtilitySubtype::LowPressure => &[Gas],
            UtilitySubtype::PotableWater | UtilitySubtype::RawWater => &[Water],
            UtilitySubtype::FoulSewer | UtilitySubtype::CombinedSewer => &[Sewer],
            UtilitySubtype::SurfaceWater => &[Sewer, Drainage],
            UtilitySubtype::FibreOptic | UtilitySubtype::CopperCable => &[Telecommunications],
            UtilitySubtype::Other => UtilityType::ALL,
        }
    }

    /// Subtypes usable with a utility type; always includes `Other`
    pub fn for_utility(utility: UtilityType) -> Vec<UtilitySubtype> {
        Self::ALL
            .iter()
            .copied()
            .filter(|s| s.applicable_utilities().contains(&utility))
            .collect()
    }

    fn applicable_domains(self) -> String {
        if self == UtilitySubtype::Other {
            return "All".to_string();
        }
        self.applicable_utilities()
            .iter()
            .map(|u| u.label())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn utility_subtype_rows() -> Vec<CodeRow> {
    UtilitySubtype::ALL
        .iter()
        .map(|s| CodeRow {
            applicable_domains: Some(s.applicable_domains()),
            ..CodeRow::new(s.code(), s.label())
        })
        .collect()
}

// =============================================================================
// Code List Registry
// =============================================================================

/// All code lists, in creation order
pub static CODE_LISTS: &[CodeListDef] = &[
    CodeListDef { schema: &LIFECYCLE_STATUS, rows: rows_of::<LifecycleStatus> },
    CodeListDef { schema: &ORGANISATION_TYPE, rows: rows_of::<OrganisationType> },
    CodeListDef { schema: &CONTACT_DETAILS_TYPE, rows: rows_of::<ContactDetailsType> },
    CodeListDef { schema: &PLANNED_WORK_STATUS, rows: rows_of::<PlannedWorkStatus> },
    CodeListDef { schema: &PROGRAMME_TYPE, rows: rows_of::<ProgrammeType> },
    CodeListDef { schema: &WORK_TYPE, rows: rows_of::<WorkType> },
    CodeListDef { schema: &CONFIDENCE_LEVEL, rows: rows_of::<ConfidenceLevel> },
    CodeListDef { schema: &UTILITY_TYPE, rows: rows_of::<UtilityType> },
    CodeListDef { schema: &UTILITY_SUBTYPE, rows: utility_subtype_rows },
    CodeListDef { schema: &MATERIAL, rows: rows_of::<Material> },
    CodeListDef { schema: &INSTALLATION_METHOD, rows: rows_of::<InstallationMethod> },
    CodeListDef { schema: &LOCATION_TYPE, rows: rows_of::<LocationType> },
    CodeListDef { schema: &DATA_PROVENANCE, rows: rows_of::<DataProvenance> },
    CodeListDef { schema: &MEASUREMENT_UNITS, rows: rows_of::<MeasurementUnit> },
    CodeListDef { schema: &DATA_SENSITIVITY_LEVEL, rows: rows_of::<DataSensitivityLevel> },
    CodeListDef { schema: &LINK_STATUS, rows: rows_of::<LinkStatus> },
];

/// Get a code list by table name
pub fn get_code_list(name: &str) -> Option<&'static CodeListDef> {
    CODE_LISTS.iter().find(|c| c.schema.name == name)
}

/// Check an untyped code against its list
pub fn validate_code(list: &str, code: &str) -> Result<()> {
    let def = get_code_list(list).ok_or_else(|| Error::UnknownTable(list.to_string()))?;
    if def.contains(code) {
        Ok(())
    } else {
        Err(Error::UnknownCode {
            list: def.schema.name,
            code: code.to_string(),
        })
    }
}
