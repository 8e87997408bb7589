//! Animated tiles and short-lived particles.

use bevy::prelude::*;
use crate::data::FrameLibrary;
use crate::shared::*;

/// A drawable that loops through a frame sequence at a fixed rate.
#[derive(Component, Debug, Clone)]
pub struct AnimatedTile {
    pub key: String,
    pub frame_index: f32,
    pub fps: f32,
}

pub fn animate_tiles(
    time: Res<Time>,
    frames: Res<FrameLibrary>,
    mut tiles: Query<(&mut AnimatedTile, &mut Drawable)>,
) {
    let dt = time.delta_secs();
    for (mut tile, mut drawable) in &mut tiles {
        let len = frames.get(&tile.key).len();
        if len == 0 {
            continue;
        }
        tile.frame_index += tile.fps * dt;
        if tile.frame_index >= len as f32 {
            tile.frame_index = 0.0;
        }
        if let Some(frame) = frames.wrapped(&tile.key, tile.frame_index as usize) {
            if drawable.image != *frame {
                drawable.image = frame.clone();
            }
        }
    }
}

pub fn tick_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut Particle)>,
) {
    for (entity, mut particle) in &mut particles {
        particle.timer.tick(time.delta());
        if particle.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
