//! Farming domain — soil tilling, watering, planting, crop growth, harvest.
//!
//! `SoilGrid` is the source of truth. Drawables for soil patches, puddles and
//! plants are derived from it by the sync systems in `render`.

use bevy::prelude::*;
use std::collections::HashMap;
use crate::data::MapData;
use crate::shared::*;

pub mod soil;
mod events_handler;
mod harvest;
mod render;

pub use soil::{Plant, PlantId, SoilCell, SoilGrid};

/// Per-species growth parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropDef {
    /// Stage increment per watered day.
    pub growth_rate: f32,
    /// Stage at which the plant becomes harvestable.
    pub max_stage: u32,
    /// Vertical nudge of the plant image relative to its tile's midbottom.
    pub y_offset: i32,
}

const FALLBACK_CROP: CropDef = CropDef {
    growth_rate: 1.0,
    max_stage: 5,
    y_offset: 0,
};

#[derive(Resource, Debug, Clone)]
pub struct CropRegistry {
    pub crops: HashMap<Species, CropDef>,
}

impl Default for CropRegistry {
    fn default() -> Self {
        let crops = HashMap::from([
            (
                Species::Corn,
                CropDef {
                    growth_rate: 1.0,
                    max_stage: 5,
                    y_offset: -16,
                },
            ),
            (
                Species::Tomato,
                CropDef {
                    growth_rate: 0.7,
                    max_stage: 5,
                    y_offset: -8,
                },
            ),
        ]);
        Self { crops }
    }
}

impl CropRegistry {
    pub fn get(&self, species: Species) -> &CropDef {
        self.crops.get(&species).unwrap_or(&FALLBACK_CROP)
    }
}

/// Frame-library key of a species' growth stages.
pub fn plant_frames_key(species: Species) -> String {
    format!("fruit/{}", species.name())
}

/// Soil patch drawable for one tilled tile.
#[derive(Component, Debug, Clone, Copy)]
pub struct SoilPatch {
    pub tile: TileCoord,
}

/// Water puddle drawable for one watered tile.
#[derive(Component, Debug, Clone, Copy)]
pub struct Puddle {
    pub tile: TileCoord,
}

/// Drawable of a living plant.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlantSprite {
    pub id: PlantId,
}

/// Which drawable entities exist for which soil state, so sync can diff.
#[derive(Resource, Default, Debug)]
pub struct FarmEntities {
    pub soil: HashMap<TileCoord, Entity>,
    pub puddles: HashMap<TileCoord, Entity>,
    pub plants: HashMap<PlantId, Entity>,
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SoilGrid>()
            .init_resource::<CropRegistry>()
            .init_resource::<FarmEntities>()
            .add_systems(Startup, setup_soil)
            .add_systems(
                Update,
                (
                    events_handler::handle_soil_tools,
                    events_handler::handle_seed_use,
                )
                    .chain()
                    .in_set(FrameSet::Effects),
            )
            .add_systems(Update, harvest::plant_collision.in_set(FrameSet::Harvest))
            // ------------------------------------------------------------------
            // Visual sync — runs after all state mutations
            // ------------------------------------------------------------------
            .add_systems(
                PostUpdate,
                (
                    render::sync_soil_patches,
                    render::sync_puddles,
                    render::sync_plants,
                ),
            );
    }
}

/// Size the soil grid to the map and mark its `Farmable` tiles.
fn setup_soil(map: Res<MapData>, mut soil: ResMut<SoilGrid>) {
    let farmable = map
        .tiles("Farmable")
        .iter()
        .map(|tile| TileCoord::new(tile.col, tile.row));
    *soil = SoilGrid::new(map.width, map.height, farmable);
    info!(
        "[Farming] Soil grid {}x{} with {} farmable tiles",
        map.width,
        map.height,
        map.tiles("Farmable").len()
    );
}
