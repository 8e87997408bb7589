//! Drawable synchronisation — keep soil, puddle and plant entities in step
//! with `SoilGrid`. Spawns missing entities, refreshes images, despawns stale ones.

use bevy::prelude::*;
use crate::data::FrameLibrary;
use crate::shared::*;
use super::{
    plant_frames_key, CropRegistry, FarmEntities, Plant, PlantId, PlantSprite, Puddle, SoilGrid,
    SoilPatch,
};

// ─────────────────────────────────────────────────────────────────────────────
// Soil patches
// ─────────────────────────────────────────────────────────────────────────────

/// One patch per tilled tile, its image picked by the tilled-neighbour mask.
pub fn sync_soil_patches(
    mut commands: Commands,
    soil: Res<SoilGrid>,
    frames: Res<FrameLibrary>,
    mut farm_entities: ResMut<FarmEntities>,
    mut patches: Query<(&SoilPatch, &mut Drawable)>,
) {
    if !soil.is_changed() {
        return;
    }

    for (patch, mut drawable) in &mut patches {
        let mask = soil.neighbour_mask(patch.tile) as usize;
        if let Some(frame) = frames.clamped("soil", mask) {
            if drawable.image != *frame {
                drawable.image = frame.clone();
            }
        }
    }

    for tile in soil.tilled_tiles() {
        if farm_entities.soil.contains_key(&tile) {
            continue;
        }
        let mask = soil.neighbour_mask(tile) as usize;
        let Some(frame) = frames.clamped("soil", mask) else {
            continue;
        };
        let entity = commands
            .spawn((
                SoilPatch { tile },
                Drawable::at_topleft(tile.world_rect().min, frame.clone(), DepthLayer::Soil),
            ))
            .id();
        farm_entities.soil.insert(tile, entity);
    }

    let stale: Vec<TileCoord> = farm_entities
        .soil
        .keys()
        .filter(|tile| !soil.is_tilled(**tile))
        .copied()
        .collect();
    for tile in stale {
        if let Some(entity) = farm_entities.soil.remove(&tile) {
            commands.entity(entity).despawn();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Puddles
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic per-tile pick so neighbouring puddles differ.
pub fn puddle_variant(tile: TileCoord) -> usize {
    (tile.col.wrapping_mul(31) ^ tile.row.wrapping_mul(17)).unsigned_abs() as usize
}

pub fn sync_puddles(
    mut commands: Commands,
    soil: Res<SoilGrid>,
    frames: Res<FrameLibrary>,
    mut farm_entities: ResMut<FarmEntities>,
) {
    if !soil.is_changed() {
        return;
    }

    for tile in soil.watered_tiles() {
        if farm_entities.puddles.contains_key(&tile) {
            continue;
        }
        let Some(frame) = frames.wrapped("soil_water", puddle_variant(tile)) else {
            continue;
        };
        let entity = commands
            .spawn((
                Puddle { tile },
                Drawable::at_topleft(tile.world_rect().min, frame.clone(), DepthLayer::SoilWater),
            ))
            .id();
        farm_entities.puddles.insert(tile, entity);
    }

    let dried: Vec<TileCoord> = farm_entities
        .puddles
        .keys()
        .filter(|tile| !soil.is_watered(**tile))
        .copied()
        .collect();
    for tile in dried {
        if let Some(entity) = farm_entities.puddles.remove(&tile) {
            commands.entity(entity).despawn();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plants
// ─────────────────────────────────────────────────────────────────────────────

/// The drawable a plant should currently have, or `None` if its frames are missing.
pub fn plant_drawable(plant: &Plant, crops: &CropRegistry, frames: &FrameLibrary) -> Option<Drawable> {
    let def = crops.get(plant.species);
    let stage = plant.growth_stage.floor().max(0.0) as usize;
    let frame = frames.clamped(&plant_frames_key(plant.species), stage)?;
    let anchor = rect_midbottom(plant.tile.world_rect()) + IVec2::new(0, def.y_offset);
    let layer = if plant.growth_stage > 0.0 {
        DepthLayer::Main
    } else {
        DepthLayer::GroundPlant
    };
    Some(Drawable::at_midbottom(anchor, frame.clone(), layer))
}

pub fn sync_plants(
    mut commands: Commands,
    soil: Res<SoilGrid>,
    crops: Res<CropRegistry>,
    frames: Res<FrameLibrary>,
    mut farm_entities: ResMut<FarmEntities>,
    mut sprites: Query<(&PlantSprite, &mut Drawable)>,
) {
    if !soil.is_changed() {
        return;
    }

    for (sprite, mut drawable) in &mut sprites {
        let Some(plant) = soil.get_plant(sprite.id) else {
            continue;
        };
        if let Some(wanted) = plant_drawable(plant, &crops, &frames) {
            if drawable.image != wanted.image || drawable.layer != wanted.layer {
                *drawable = wanted;
            }
        }
    }

    for (id, plant) in soil.plants() {
        if farm_entities.plants.contains_key(&id) {
            continue;
        }
        let Some(drawable) = plant_drawable(plant, &crops, &frames) else {
            continue;
        };
        let entity = commands.spawn((PlantSprite { id }, drawable)).id();
        farm_entities.plants.insert(id, entity);
    }

    let gone: Vec<PlantId> = farm_entities
        .plants
        .keys()
        .filter(|id| soil.get_plant(**id).is_none())
        .copied()
        .collect();
    for id in gone {
        if let Some(entity) = farm_entities.plants.remove(&id) {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> FrameLibrary {
        let mut frames = FrameLibrary::default();
        let stages = (0..6)
            .map(|i| Frame::new(format!("fruit/corn/{i}.png"), IVec2::new(40, 20 + i * 8)))
            .collect();
        frames.insert("fruit/corn", stages).unwrap();
        frames
    }

    #[test]
    fn seedling_sits_on_ground_plant_layer() {
        let plant = Plant {
            species: Species::Corn,
            tile: TileCoord::new(2, 3),
            growth_stage: 0.0,
            harvestable: false,
        };
        let drawable = plant_drawable(&plant, &CropRegistry::default(), &library()).unwrap();
        assert_eq!(drawable.layer, DepthLayer::GroundPlant);
        assert_eq!(rect_midbottom(drawable.rect), IVec2::new(2 * 64 + 32, 4 * 64 - 16));
    }

    #[test]
    fn grown_plant_uses_stage_frame_on_main() {
        let plant = Plant {
            species: Species::Corn,
            tile: TileCoord::new(0, 0),
            growth_stage: 2.0,
            harvestable: false,
        };
        let drawable = plant_drawable(&plant, &CropRegistry::default(), &library()).unwrap();
        assert_eq!(drawable.layer, DepthLayer::Main);
        assert_eq!(drawable.image.path, "fruit/corn/2.png");
    }

    #[test]
    fn puddle_variant_is_stable() {
        assert_eq!(puddle_variant(TileCoord::new(4, 7)), puddle_variant(TileCoord::new(4, 7)));
    }
}
