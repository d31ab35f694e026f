pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod populate;
pub mod record;
pub mod report;
pub mod schema;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::{Error, Result};
