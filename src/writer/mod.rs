pub mod geopackage;
pub mod schema_gen;
pub mod srs;
pub mod view_gen;

pub use geopackage::{build_schema, create_geopackage, remove_partial, GeoPackageWriter};
pub use srs::{SpatialRefSys, DEFAULT_SRS};
