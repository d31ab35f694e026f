use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{BuildConfig, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "future-works")]
#[command(version, about = "Build UK Future Works Profile GeoPackages")]
pub struct Cli {
    /// TOML settings file (optional)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty GeoPackage with every table, code list and the unified view
    Create {
        /// Output GeoPackage path; must not exist
        output: PathBuf,
    },

    /// Fill an existing, empty GeoPackage with sample data
    Populate {
        /// GeoPackage created by `create`
        geopackage: PathBuf,

        #[command(flatten)]
        sample: SampleArgs,
    },

    /// Create and populate in one go
    Build {
        /// Output GeoPackage path; must not exist
        output: PathBuf,

        #[command(flatten)]
        sample: SampleArgs,
    },

    /// Print record counts and distributions
    Summary {
        geopackage: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List declared tables in build order
    ListTables,

    /// List code list values
    ListCodes {
        /// Only this code list table
        table: Option<String>,
    },
}

/// Overrides for the sample generator
#[derive(Args, Debug, Default)]
pub struct SampleArgs {
    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub organisations: Option<usize>,

    #[arg(long)]
    pub contacts_per_organisation: Option<usize>,

    #[arg(long)]
    pub programmes: Option<usize>,

    #[arg(long)]
    pub links: Option<usize>,
}

impl SampleArgs {
    /// Apply flags on top of loaded settings
    pub fn apply(&self, config: &mut BuildConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(n) = self.organisations {
            config.sample.organisations = n;
        }
        if let Some(n) = self.contacts_per_organisation {
            config.sample.contacts_per_organisation = n;
        }
        if let Some(n) = self.programmes {
            config.sample.programmes = n;
        }
        if let Some(n) = self.links {
            config.sample.links = n;
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
