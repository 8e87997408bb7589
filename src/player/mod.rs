pub mod movement;
pub mod timers;
mod tools;
mod interaction;
mod spawn;

use bevy::prelude::*;
use crate::shared::*;

pub use timers::{ActionTimers, PendingEffect, TimedAction};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerState>();
        app.init_resource::<PlayerInput>();

        app.add_systems(Startup, spawn::spawn_player);

        // -- The per-frame player chain; order matters --
        app.add_systems(
            Update,
            (
                tools::read_input,
                interaction::interact,
                tools::update_status,
                tools::tick_timers,
                movement::move_player,
                tools::update_target,
                tools::animate_player,
            )
                .chain()
                .in_set(FrameSet::Simulate),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Player components (player-domain only)
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    /// Continuous centre position; the hitbox is snapped to its rounded value.
    pub pos: Vec2,
    /// Raw input direction, -1/0/+1 per axis. Normalised when integrated.
    pub direction: Vec2,
    pub facing: Facing,
    pub mode: PlayerMode,
    pub speed: f32,
}

impl PlayerMovement {
    pub fn at(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            direction: Vec2::ZERO,
            facing: Facing::Down,
            mode: PlayerMode::Idle,
            speed,
        }
    }

    pub fn animation_key(&self) -> String {
        animation_key(self.facing, self.mode)
    }
}

/// Fractional frame cursor into the current animation.
#[derive(Component, Debug, Clone, Default)]
pub struct PlayerAnimation {
    pub frame_index: f32,
    pub fps: f32,
}

/// World point tools and seeds are aimed at, refreshed every frame.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ToolTarget(pub Vec2);
