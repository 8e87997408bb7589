use bevy::prelude::*;
use crate::config::SimConfig;
use crate::data::{FrameLibrary, MapData};
use crate::shared::*;
use super::{ActionTimers, PlayerAnimation, PlayerMovement, ToolTarget};

/// Build the player's drawable and hitbox, centred on `spawn`.
pub fn player_body(spawn: IVec2, frame: Frame) -> (Drawable, Hitbox) {
    let drawable = Drawable::centered(spawn, frame, DepthLayer::Main);
    let hitbox = inflate(drawable.rect, -PLAYER_HITBOX_INSET.x, -PLAYER_HITBOX_INSET.y);
    (drawable, Hitbox(hitbox))
}

/// Spawn the player at the map's `Start` marker and hand out starting stock.
pub fn spawn_player(
    mut commands: Commands,
    map: Res<MapData>,
    frames: Res<FrameLibrary>,
    config: Res<SimConfig>,
    mut inventory: ResMut<Inventory>,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: don't double-spawn.
    if !existing.is_empty() {
        return;
    }
    let Some(spawn) = map.spawn_point() else {
        warn!("[Player] Map has no Start marker; no player spawned");
        return;
    };
    let Some(frame) = frames.first(&animation_key(Facing::Down, PlayerMode::Idle)) else {
        warn!("[Player] No idle frames loaded; no player spawned");
        return;
    };

    let (drawable, hitbox) = player_body(spawn, frame.clone());
    let center = rect_center(hitbox.0).as_vec2();
    let movement = PlayerMovement::at(center, config.player_speed);
    let target = ToolTarget(center + movement.facing.tool_offset());

    commands.spawn((
        Player,
        movement,
        PlayerAnimation {
            frame_index: 0.0,
            fps: config.animation_fps,
        },
        ActionTimers::from_config(&config),
        target,
        hitbox,
        drawable,
    ));
    *inventory = Inventory::with_starting(config.starting_money, config.starting_seeds);
    info!("[Player] Spawned at {:?}", spawn);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hitbox_is_inset_and_centred() {
        let (drawable, hitbox) = player_body(IVec2::new(1000, 800), Frame::new("p.png", IVec2::splat(192)));
        assert_eq!(rect_center(drawable.rect), IVec2::new(1000, 800));
        assert_eq!(hitbox.0.size(), IVec2::new(66, 122));
        assert_eq!(rect_center(hitbox.0), IVec2::new(1000, 800));
    }
}
