pub mod codelists;
pub mod dependencies;
pub mod relationships;
pub mod tables;
pub mod types;
pub mod view;

pub use codelists::*;
pub use dependencies::*;
pub use relationships::*;
pub use tables::*;
pub use types::*;
pub use view::*;
