//! Spatial reference systems written to `gpkg_spatial_ref_sys`.

use crate::schema::BRITISH_NATIONAL_GRID;

#[derive(Debug, Clone)]
pub struct SpatialRefSys {
    pub srs_name: &'static str,
    pub srs_id: i32,
    pub organization: &'static str,
    pub organization_coordsys_id: i32,
    pub definition: &'static str,
    pub description: &'static str,
}

pub const UNDEFINED_CARTESIAN: SpatialRefSys = SpatialRefSys {
    srs_name: "Undefined cartesian SRS",
    srs_id: -1,
    organization: "NONE",
    organization_coordsys_id: -1,
    definition: "undefined",
    description: "undefined cartesian coordinate reference system",
};

pub const UNDEFINED_GEOGRAPHIC: SpatialRefSys = SpatialRefSys {
    srs_name: "Undefined geographic SRS",
    srs_id: 0,
    organization: "NONE",
    organization_coordsys_id: 0,
    definition: "undefined",
    description: "undefined geographic coordinate reference system",
};

pub const WGS84: SpatialRefSys = SpatialRefSys {
    srs_name: "WGS 84 geodetic",
    srs_id: 4326,
    organization: "EPSG",
    organization_coordsys_id: 4326,
    definition: r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AXIS["Latitude",NORTH],AXIS["Longitude",EAST],AUTHORITY["EPSG","4326"]]"#,
    description: "longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid",
};

pub const OSGB36_BNG: SpatialRefSys = SpatialRefSys {
    srs_name: "OSGB 1936 / British National Grid",
    srs_id: BRITISH_NATIONAL_GRID,
    organization: "EPSG",
    organization_coordsys_id: BRITISH_NATIONAL_GRID,
    definition: r#"PROJCS["OSGB 1936 / British National Grid",GEOGCS["OSGB 1936",DATUM["OSGB_1936",SPHEROID["Airy 1830",6377563.396,299.3249646,AUTHORITY["EPSG","7001"]],AUTHORITY["EPSG","6277"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4277"]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",49],PARAMETER["central_meridian",-2],PARAMETER["scale_factor",0.9996012717],PARAMETER["false_easting",400000],PARAMETER["false_northing",-100000],UNIT["metre",1,AUTHORITY["EPSG","9001"]],AXIS["Easting",EAST],AXIS["Northing",NORTH],AUTHORITY["EPSG","27700"]]"#,
    description: "United Kingdom Ordnance Survey National Grid",
};

/// Rows every GeoPackage must carry, plus the profile's grid
pub const DEFAULT_SRS: &[SpatialRefSys] =
    &[UNDEFINED_CARTESIAN, UNDEFINED_GEOGRAPHIC, WGS84, OSGB36_BNG];
