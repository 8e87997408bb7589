//! Tool and seed effects landing on the soil grid.
//!
//! The player domain decides *which* action fires; these handlers only map it
//! to a tile and apply the matching grid operation. Axe hits are handled by the
//! world domain.

use bevy::prelude::*;
use crate::shared::*;
use super::SoilGrid;

pub fn handle_soil_tools(mut tool_events: EventReader<ToolUseEvent>, mut soil: ResMut<SoilGrid>) {
    for event in tool_events.read() {
        let tile = TileCoord::from_world(event.target);
        match event.tool {
            ToolKind::Hoe => {
                if soil.till(tile) {
                    debug!("[Farming] Tilled {:?}", tile);
                }
            }
            ToolKind::Water => {
                if soil.water(tile) {
                    debug!("[Farming] Watered {:?}", tile);
                }
            }
            ToolKind::Axe => {}
        }
    }
}

/// Plant the thrown seed. A seed is consumed only when planting succeeds.
pub fn handle_seed_use(
    mut seed_events: EventReader<SeedUseEvent>,
    mut soil: ResMut<SoilGrid>,
    mut inventory: ResMut<Inventory>,
) {
    for event in seed_events.read() {
        let tile = TileCoord::from_world(event.target);
        if !soil.can_plant(tile) {
            continue;
        }
        if !inventory.take_seed(event.species) {
            debug!("[Farming] No {} seeds left", event.species.name());
            continue;
        }
        if soil.plant(tile, event.species).is_some() {
            debug!(
                "[Farming] Planted {} at {:?} ({} seeds left)",
                event.species.name(),
                tile,
                inventory.seed_count(event.species)
            );
        }
    }
}
