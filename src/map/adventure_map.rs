//! Adventure map - terrain grid, placed objects and fog of war

use serde::{Deserialize, Serialize};

use super::objects::MapObject;
use super::terrain::Terrain;
use crate::core::types::{GridPos, ObjectId, PlayerId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub terrain: Terrain,
    /// Players that have seen this tile
    pub visible_to: Vec<PlayerId>,
}

/// Row-major tile grid plus the object list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdventureMap {
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    objects: Vec<MapObject>,
    next_object_id: u32,
}

impl AdventureMap {
    /// All-grass map
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::default(); size],
            objects: Vec::new(),
            next_object_id: 1,
        }
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    pub fn tile(&self, pos: GridPos) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub fn terrain(&self, pos: GridPos) -> Option<Terrain> {
        self.tile(pos).map(|t| t.terrain)
    }

    /// Out-of-bounds positions are ignored
    pub fn set_terrain(&mut self, pos: GridPos, terrain: Terrain) {
        if let Some(i) = self.index(pos) {
            self.tiles[i].terrain = terrain;
        }
    }

    pub fn is_passable(&self, pos: GridPos) -> bool {
        self.terrain(pos).map_or(false, |t| t.is_passable())
    }

    /// Cost of entering a tile; infinite off the map
    pub fn move_cost(&self, pos: GridPos) -> f64 {
        self.terrain(pos)
            .map_or(f64::INFINITY, |t| t.movement_cost())
    }

    /// Register an object and return its id
    pub fn add_object(&mut self, mut object: MapObject) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        object.id = id;
        self.objects.push(object);
        id
    }

    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&MapObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut MapObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn objects_at(&self, pos: GridPos) -> impl Iterator<Item = &MapObject> {
        self.objects.iter().filter(move |o| o.pos == pos)
    }

    pub fn has_object_at(&self, pos: GridPos) -> bool {
        self.objects_at(pos).next().is_some()
    }

    /// Reveal the disc of `radius` around `center` to a player
    pub fn update_visibility(&mut self, center: GridPos, radius: i32, player: PlayerId) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                if let Some(i) = self.index(center.offset(dx, dy)) {
                    let seen = &mut self.tiles[i].visible_to;
                    if !seen.contains(&player) {
                        seen.push(player);
                    }
                }
            }
        }
    }

    pub fn is_visible_to(&self, pos: GridPos, player: PlayerId) -> bool {
        self.tile(pos)
            .map_or(false, |t| t.visible_to.contains(&player))
    }

    pub fn visible_tile_count(&self, player: PlayerId) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.visible_to.contains(&player))
            .count()
    }
}
