//! The standard two-player scenario map
//!
//! Layout is fixed relative to the map size: a water border, roads from both
//! capitals to a guarded neutral town in the middle, and mines, piles, lairs
//! and chests placed symmetrically between them.

use super::adventure_map::AdventureMap;
use super::objects::{MapObject, MapObjectKind};
use super::terrain::Terrain;
use crate::core::error::{GameError, Result};
use crate::core::types::{GridPos, PlayerId};
use crate::town::ResourceKind;
use crate::units::{Faction, UnitRegistry};

pub const MIN_SCENARIO_SIZE: i32 = 12;

/// Capital of player 1
pub fn first_capital(_map: &AdventureMap) -> GridPos {
    GridPos::new(3, 3)
}

/// Capital of player 2, mirrored across the map
pub fn second_capital(map: &AdventureMap) -> GridPos {
    GridPos::new(map.width - 4, map.height - 4)
}

pub fn standard_map(width: i32, height: i32, registry: &UnitRegistry) -> Result<AdventureMap> {
    if width < MIN_SCENARIO_SIZE || height < MIN_SCENARIO_SIZE {
        return Err(GameError::InvalidConfig(format!(
            "scenario map must be at least {MIN_SCENARIO_SIZE}x{MIN_SCENARIO_SIZE}, got {width}x{height}"
        )));
    }

    let mut map = AdventureMap::new(width, height);
    for x in 0..width {
        map.set_terrain(GridPos::new(x, 0), Terrain::Water);
        map.set_terrain(GridPos::new(x, height - 1), Terrain::Water);
    }
    for y in 0..height {
        map.set_terrain(GridPos::new(0, y), Terrain::Water);
        map.set_terrain(GridPos::new(width - 1, y), Terrain::Water);
    }

    let (w, h) = (width, height);
    let center = GridPos::new(w / 2, h / 2);
    let p1 = first_capital(&map);
    let p2 = second_capital(&map);
    lay_road(&mut map, p1, center);
    lay_road(&mut map, p2, center);

    // Rough ground flanking the roads
    map.set_terrain(GridPos::new(2, h / 2), Terrain::Forest);
    map.set_terrain(GridPos::new(w - 3, h / 2 - 1), Terrain::Forest);
    map.set_terrain(GridPos::new(w / 2 - 1, 2), Terrain::Swamp);
    map.set_terrain(GridPos::new(w / 2 + 1, h - 3), Terrain::Sand);

    let town = |name: &str, faction| MapObjectKind::Town {
        name: name.to_string(),
        faction,
    };
    map.add_object(MapObject::new(p1, town("Steadwick", Faction::Castle)).with_owner(PlayerId(1)));
    map.add_object(MapObject::new(p2, town("Kreelah", Faction::Inferno)).with_owner(PlayerId(2)));
    map.add_object(
        MapObject::new(center, town("Deyja", Faction::Necropolis)).with_guardians(vec![
            registry.create_stack("SKELETON", 30)?,
            registry.create_stack("ZOMBIE", 15)?,
        ]),
    );

    let mine = |resource, amount| MapObjectKind::Mine { resource, amount };
    map.add_object(MapObject::new(GridPos::new(3, h - 4), mine(ResourceKind::Gold, 1000)));
    map.add_object(MapObject::new(GridPos::new(w - 4, 3), mine(ResourceKind::Wood, 2)));
    map.add_object(
        MapObject::new(GridPos::new(w / 2, 3), mine(ResourceKind::Ore, 2))
            .with_guardians(vec![registry.create_stack("ORC", 8)?]),
    );
    map.add_object(
        MapObject::new(GridPos::new(w / 2, h - 4), mine(ResourceKind::Gems, 1))
            .with_guardians(vec![registry.create_stack("ORC", 12)?]),
    );

    let pile = |resource, amount| MapObjectKind::ResourcePile { resource, amount };
    map.add_object(MapObject::new(GridPos::new(2, 5), pile(ResourceKind::Gold, 750)));
    map.add_object(MapObject::new(GridPos::new(w - 3, h - 6), pile(ResourceKind::Wood, 5)));
    map.add_object(MapObject::new(GridPos::new(5, 2), pile(ResourceKind::Ore, 5)));
    map.add_object(MapObject::new(GridPos::new(w - 6, h - 3), pile(ResourceKind::Gems, 2)));

    map.add_object(
        MapObject::new(GridPos::new(w / 2 - 2, h / 2 + 2), MapObjectKind::MonsterLair)
            .with_guardians(vec![registry.create_stack("WOLF", 20)?])
            .with_reward(1000),
    );
    map.add_object(
        MapObject::new(GridPos::new(w / 2 + 2, h / 2 - 2), MapObjectKind::MonsterLair)
            .with_guardians(vec![registry.create_stack("OGRE", 5)?])
            .with_reward(1500),
    );

    let chest = MapObjectKind::TreasureChest {
        gold: 1500,
        experience: 1000,
    };
    map.add_object(MapObject::new(GridPos::new(4, 4), chest.clone()));
    map.add_object(MapObject::new(GridPos::new(w - 5, h - 5), chest));

    tracing::debug!(width, height, objects = map.objects().len(), "scenario map built");
    Ok(map)
}

/// Walk diagonally then straight toward `to`, paving every tile but the last
fn lay_road(map: &mut AdventureMap, from: GridPos, to: GridPos) {
    let mut pos = from;
    while pos != to {
        if map.terrain(pos) != Some(Terrain::Water) {
            map.set_terrain(pos, Terrain::Road);
        }
        pos = pos.offset((to.x - pos.x).signum(), (to.y - pos.y).signum());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::pathfinding::find_path;

    #[test]
    fn test_rejects_small_maps() {
        let registry = UnitRegistry::standard();
        assert!(matches!(
            standard_map(8, 20, &registry),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_objects_do_not_overlap() {
        let registry = UnitRegistry::standard();
        for size in [12, 13, 20, 32] {
            let map = standard_map(size, size, &registry).expect("valid size");
            for object in map.objects() {
                assert_eq!(
                    map.objects_at(object.pos).count(),
                    1,
                    "{} at {}",
                    object.name(),
                    object.pos
                );
                assert!(map.is_passable(object.pos));
            }
        }
    }

    #[test]
    fn test_capitals_are_connected() {
        let registry = UnitRegistry::standard();
        let map = standard_map(20, 16, &registry).expect("valid size");
        let path = find_path(&map, first_capital(&map), second_capital(&map)).expect("connected");
        assert!(!path.steps.is_empty());
        assert_eq!(map.terrain(GridPos::new(4, 4)), Some(Terrain::Road));
    }
}
