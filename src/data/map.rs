//! Static map description: named tile layers and object layers.
//!
//! The map is authored elsewhere and exported to RON. Tile layers list
//! `(col, row, image)` entries; object layers list free-form rectangles with
//! an optional image and a name (`Small`/`Large` trees, `Start`, `Bed`, `Trader`).

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::DataError;
use crate::shared::TILE_SIZE;

/// Layers the world builder reads. A map without any of these is rejected.
pub const REQUIRED_LAYERS: [&str; 11] = [
    "HouseFloor",
    "HouseFurnitureBottom",
    "HouseWalls",
    "HouseFurnitureTop",
    "Fence",
    "Water",
    "Collision",
    "Farmable",
    "Trees",
    "Decoration",
    "Player",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileRecord {
    pub col: i32,
    pub row: i32,
    /// Collision-only layers carry no image.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectRecord {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapData {
    /// Width in tiles.
    pub width: i32,
    /// Height in tiles.
    pub height: i32,
    /// Full-map ground image, painted at the origin.
    pub ground_image: String,
    #[serde(default)]
    pub tile_layers: HashMap<String, Vec<TileRecord>>,
    #[serde(default)]
    pub object_layers: HashMap<String, Vec<ObjectRecord>>,
}

impl MapData {
    pub fn from_ron(text: &str) -> Result<Self, DataError> {
        let map: MapData = ron::from_str(text)?;
        map.validate()?;
        Ok(map)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(DataError::EmptyMap {
                width: self.width,
                height: self.height,
            });
        }
        for layer in REQUIRED_LAYERS {
            if !self.tile_layers.contains_key(layer) && !self.object_layers.contains_key(layer) {
                return Err(DataError::MissingLayer(layer.to_string()));
            }
        }
        if self.spawn_point().is_none() {
            return Err(DataError::MissingSpawn);
        }
        Ok(())
    }

    pub fn tiles(&self, layer: &str) -> &[TileRecord] {
        self.tile_layers.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn objects(&self, layer: &str) -> &[ObjectRecord] {
        self.object_layers.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// World position of the `Start` marker in the `Player` layer.
    pub fn spawn_point(&self) -> Option<IVec2> {
        self.objects("Player")
            .iter()
            .find(|obj| obj.name == "Start")
            .map(|obj| IVec2::new(obj.x, obj.y))
    }

    pub fn pixel_size(&self) -> IVec2 {
        IVec2::new(self.width * TILE_SIZE, self.height * TILE_SIZE)
    }
}

pub fn load_map(path: impl AsRef<Path>) -> Result<MapData, DataError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = MapData::from_ron(&text)?;
    info!(
        "[Data] Map {} loaded: {}x{} tiles, {} tile layers, {} object layers",
        path.display(),
        map.width,
        map.height,
        map.tile_layers.len(),
        map.object_layers.len()
    );
    Ok(map)
}
