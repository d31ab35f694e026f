//! Build settings, read from an optional TOML file layered with
//! `FUTURE_WORKS_*` environment variables.
//!
//! ```toml
//! seed = 7
//! programme_start_offset_days = 14
//!
//! [sample]
//! organisations = 3
//! links = 20
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `FUTURE_WORKS_SAMPLE__LINKS=20`.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::geometry::Point;
use crate::populate::{SampleDataPopulator, SampleSize, LEEDS};

pub const DEFAULT_CONFIG_FILE: &str = "future-works.toml";
pub const ENV_PREFIX: &str = "FUTURE_WORKS";
pub const DEFAULT_SEED: u64 = 27700;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub sample: SampleSize,
    pub seed: u64,
    /// Days added to every planned date
    pub programme_start_offset_days: i64,
    pub origin_easting: f64,
    pub origin_northing: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            sample: SampleSize::default(),
            seed: DEFAULT_SEED,
            programme_start_offset_days: 0,
            origin_easting: LEEDS.x,
            origin_northing: LEEDS.y,
        }
    }
}

impl BuildConfig {
    /// Load from `path` if it exists, then the environment
    pub fn load(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.origin_easting, self.origin_northing)
    }

    pub fn populator(&self) -> SampleDataPopulator {
        SampleDataPopulator::new(self.sample, self.seed)
            .with_origin(self.origin())
            .with_start_offset(self.programme_start_offset_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.sample.links, 9);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "seed = 7\n\n[sample]\norganisations = 3\nlinks = 20").unwrap();

        let config = BuildConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.sample.organisations, 3);
        assert_eq!(config.sample.links, 20);
        assert_eq!(config.sample.programmes, 4);
        assert_eq!(config.origin(), LEEDS);
    }
}
