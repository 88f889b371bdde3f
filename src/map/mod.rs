//! Adventure map - terrain, objects, fog of war and path lookup

pub mod adventure_map;
pub mod objects;
pub mod pathfinding;
pub mod scenario;
pub mod terrain;

pub use adventure_map::{AdventureMap, Tile};
pub use objects::{MapObject, MapObjectKind};
pub use pathfinding::{find_path, MapPath};
pub use scenario::standard_map;
pub use terrain::Terrain;
