//! Fixed sample material the generator draws from: Leeds-area utilities,
//! their programmes and the streets their works run along.

use crate::schema::{
    ContactDetailsType, DataSensitivityLevel, InstallationMethod, LinkStatus, LocationType,
    Material, OrganisationType, ProgrammeType, UtilityType, WorkType,
};

pub struct SampleOrganisation {
    pub name: &'static str,
    pub short_name: &'static str,
    pub organisation_type: OrganisationType,
    pub website_url: &'static str,
    /// Utility its works are laid for
    pub utility: UtilityType,
    pub contact: SampleContact,
}

pub struct SampleContact {
    pub role: ContactDetailsType,
    pub department: &'static str,
    pub email_domain: &'static str,
    pub mailbox: &'static str,
    pub telephone: &'static str,
}

pub struct SampleProgramme {
    pub name: &'static str,
    pub programme_type: ProgrammeType,
    pub description: &'static str,
    pub sensitivity: DataSensitivityLevel,
    /// Days from the build date to the planned start
    pub starts_in: i64,
    pub duration: i64,
}

pub struct SampleStreet {
    pub name: &'static str,
    pub usrn: &'static str,
    pub location: LocationType,
}

pub const ORGANISATIONS: &[SampleOrganisation] = &[
    SampleOrganisation {
        name: "Northern Gas Networks",
        short_name: "NGN",
        organisation_type: OrganisationType::UtilityCompany,
        website_url: "https://www.northerngasnetworks.co.uk",
        utility: UtilityType::Gas,
        contact: SampleContact {
            role: ContactDetailsType::PlanningCoordinator,
            department: "Network Planning",
            email_domain: "northerngas.co.uk",
            mailbox: "planning",
            telephone: "0800 040 7766",
        },
    },
    SampleOrganisation {
        name: "Yorkshire Water Services",
        short_name: "YWS",
        organisation_type: OrganisationType::UtilityCompany,
        website_url: "https://www.yorkshirewater.com",
        utility: UtilityType::Water,
        contact: SampleContact {
            role: ContactDetailsType::AssetProtection,
            department: "Asset Management",
            email_domain: "yorkshirewater.co.uk",
            mailbox: "assetprotection",
            telephone: "0345 124 2424",
        },
    },
    SampleOrganisation {
        name: "Northern Powergrid",
        short_name: "NPG",
        organisation_type: OrganisationType::UtilityCompany,
        website_url: "https://www.northernpowergrid.com",
        utility: UtilityType::Electricity,
        contact: SampleContact {
            role: ContactDetailsType::ProjectManager,
            department: "Capital Projects",
            email_domain: "northernpowergrid.com",
            mailbox: "projects",
            telephone: "0800 011 3332",
        },
    },
    SampleOrganisation {
        name: "BT Openreach",
        short_name: "BTO",
        organisation_type: OrganisationType::UtilityCompany,
        website_url: "https://www.openreach.com",
        utility: UtilityType::Telecommunications,
        contact: SampleContact {
            role: ContactDetailsType::PlanningCoordinator,
            department: "Network Development",
            email_domain: "openreach.co.uk",
            mailbox: "networkplanning",
            telephone: "0800 023 2023",
        },
    },
    SampleOrganisation {
        name: "Leeds City Council Highways",
        short_name: "LCC",
        organisation_type: OrganisationType::HighwayAuthority,
        website_url: "https://www.leeds.gov.uk",
        utility: UtilityType::Other,
        contact: SampleContact {
            role: ContactDetailsType::EmergencyContact,
            department: "Highway Services",
            email_domain: "leeds.gov.uk",
            mailbox: "highways",
            telephone: "0113 222 4444",
        },
    },
];

pub const PROGRAMMES: &[SampleProgramme] = &[
    SampleProgramme {
        name: "Leeds City Centre Gas Main Replacement 2025",
        programme_type: ProgrammeType::AssetReplacement,
        description: "Replacement of aging cast iron mains with modern PE pipes in Leeds city centre",
        sensitivity: DataSensitivityLevel::Official,
        starts_in: 60,
        duration: 180,
    },
    SampleProgramme {
        name: "Yorkshire Clean Water Investment Programme",
        programme_type: ProgrammeType::CapitalInvestment,
        description: "Major investment to improve water quality and reduce leakage",
        sensitivity: DataSensitivityLevel::Public,
        starts_in: 90,
        duration: 275,
    },
    SampleProgramme {
        name: "Smart Grid Upgrade Programme",
        programme_type: ProgrammeType::NetworkReinforcement,
        description: "Installation of smart meters and grid monitoring equipment",
        sensitivity: DataSensitivityLevel::OfficialSensitive,
        starts_in: 30,
        duration: 150,
    },
    SampleProgramme {
        name: "Fibre to the Premises Rollout - Leeds",
        programme_type: ProgrammeType::NetworkExpansion,
        description: "FTTP deployment to residential and business premises",
        sensitivity: DataSensitivityLevel::Public,
        starts_in: 45,
        duration: 255,
    },
];

pub const STREETS: &[SampleStreet] = &[
    SampleStreet { name: "Park Lane", usrn: "40701234", location: LocationType::Carriageway },
    SampleStreet { name: "The Headrow", usrn: "40701235", location: LocationType::Carriageway },
    SampleStreet { name: "Kirkstall Road (A65)", usrn: "40705678", location: LocationType::Carriageway },
    SampleStreet { name: "Commercial Street", usrn: "40702345", location: LocationType::Footway },
    SampleStreet { name: "City Square", usrn: "40703456", location: LocationType::OpenSpace },
    SampleStreet { name: "Wellington Street", usrn: "40704567", location: LocationType::Footway },
    SampleStreet { name: "Hyde Park Corner", usrn: "40706789", location: LocationType::Verge },
    SampleStreet { name: "Woodhouse Lane", usrn: "40707890", location: LocationType::Carriageway },
    SampleStreet { name: "A660/Shaw Lane Junction", usrn: "40709012", location: LocationType::Carriageway },
];

pub const WORK_TYPES: &[WorkType] = &[
    WorkType::NewInstallation,
    WorkType::FullReplacement,
    WorkType::PartialReplacement,
    WorkType::Upgrade,
    WorkType::Relocation,
];

pub const INSTALLATION_METHODS: &[InstallationMethod] = &[
    InstallationMethod::OpenCut,
    InstallationMethod::DirectionalDrilling,
    InstallationMethod::Moling,
    InstallationMethod::Trenching,
];

/// Status of the asset implied by the work carried out on it
pub fn link_status_for(work: WorkType) -> LinkStatus {
    match work {
        WorkType::NewInstallation => LinkStatus::New,
        WorkType::FullReplacement => LinkStatus::ExistingToBeReplaced,
        WorkType::Removal | WorkType::Abandonment => LinkStatus::ExistingToBeRemoved,
        _ => LinkStatus::ExistingToBeModified,
    }
}

pub fn materials_for(utility: UtilityType) -> &'static [Material] {
    match utility {
        UtilityType::Gas => &[Material::Polyethylene, Material::Steel],
        UtilityType::Water => &[Material::DuctileIron, Material::Hdpe, Material::Polyethylene],
        UtilityType::Sewer | UtilityType::Drainage => &[Material::Clay, Material::Concrete, Material::Pvc],
        UtilityType::Electricity => &[Material::Copper, Material::Composite],
        UtilityType::Telecommunications => &[Material::FibreOptic, Material::Copper],
        UtilityType::DistrictHeating => &[Material::Steel],
        _ => &[Material::Other],
    }
}

/// What a link of this utility is called on the ground
pub fn asset_noun(utility: UtilityType) -> &'static str {
    match utility {
        UtilityType::Gas => "Gas Main",
        UtilityType::Water => "Water Main",
        UtilityType::Sewer => "Sewer",
        UtilityType::Drainage => "Drain",
        UtilityType::Electricity => "Cable",
        UtilityType::Telecommunications => "Fibre Route",
        UtilityType::DistrictHeating => "Heat Main",
        UtilityType::FuelAndChemicals => "Pipeline",
        UtilityType::TransportSignalling => "Signalling Cable",
        UtilityType::Other => "Multi-Utility Corridor",
    }
}
