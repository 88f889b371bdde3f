//! Towns - treasury, buildings, dwellings and recruitment

pub mod buildings;
pub mod resources;
pub mod town;

pub use buildings::BuildingKind;
pub use resources::{ResourceKind, Resources};
pub use town::{faction_units, Dwelling, Recruitment, Town};
