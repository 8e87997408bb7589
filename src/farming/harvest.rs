//! Harvest — the player collects ripe plants by walking into them.

use bevy::prelude::*;
use crate::shared::*;
use super::{FarmEntities, PlantSprite, SoilGrid};

pub fn plant_collision(
    mut commands: Commands,
    mut soil: ResMut<SoilGrid>,
    mut farm_entities: ResMut<FarmEntities>,
    mut inventory: ResMut<Inventory>,
    mut harvested: EventWriter<HarvestEvent>,
    player: Query<&Hitbox, With<Player>>,
    plants: Query<(Entity, &PlantSprite, &Drawable)>,
) {
    let Ok(hitbox) = player.get_single() else {
        return;
    };

    for (entity, sprite, drawable) in &plants {
        let ripe = soil.get_plant(sprite.id).is_some_and(|p| p.harvestable);
        if !ripe || !overlaps(drawable.rect, hitbox.0) {
            continue;
        }
        let Some(plant) = soil.get_plant(sprite.id).cloned() else {
            continue;
        };
        let Some(item) = soil.harvest(sprite.id) else {
            continue;
        };

        inventory.add(item, 1);
        harvested.send(HarvestEvent {
            species: plant.species,
            tile: plant.tile,
        });
        commands.spawn((
            Particle::lasting(PARTICLE_SECS),
            Drawable::at_topleft(drawable.rect.min, drawable.image.clone(), DepthLayer::Main),
        ));
        commands.entity(entity).despawn();
        farm_entities.plants.remove(&sprite.id);
        debug!(
            "[Farming] Harvested {} at {:?} (now {})",
            plant.species.name(),
            plant.tile,
            inventory.count(item)
        );
    }
}
