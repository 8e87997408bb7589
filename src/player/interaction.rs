use bevy::prelude::*;
use crate::shared::*;
use super::{ActionTimers, PlayerMovement, TimedAction};

/// The first zone the player's drawable overlaps, if any.
pub fn zone_under(player_rect: IRect, zones: impl IntoIterator<Item = InteractionZone>) -> Option<ZoneKind> {
    zones
        .into_iter()
        .find(|zone| overlaps(zone.rect, player_rect))
        .map(|zone| zone.kind)
}

/// Interact: the trader opens the shop, the bed puts the player to sleep.
pub fn interact(
    input: Res<PlayerInput>,
    mut state: ResMut<PlayerState>,
    zones: Query<&InteractionZone>,
    mut player: Query<(&mut PlayerMovement, &ActionTimers, &Drawable), With<Player>>,
    mut toggles: EventWriter<ShopToggleEvent>,
) {
    if !input.interact || state.sleeping {
        return;
    }
    let Ok((mut movement, timers, drawable)) = player.get_single_mut() else {
        return;
    };
    if timers.is_active(TimedAction::ToolUse) {
        return;
    }

    match zone_under(drawable.rect, zones.iter().copied()) {
        Some(ZoneKind::Trader) => {
            toggles.send(ShopToggleEvent);
        }
        Some(ZoneKind::Bed) => {
            movement.facing = Facing::Left;
            movement.direction = Vec2::ZERO;
            state.sleeping = true;
            info!("[Player] Going to sleep");
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_overlapping_zone() {
        let bed = InteractionZone {
            kind: ZoneKind::Bed,
            rect: rect_from_topleft(IVec2::new(0, 0), IVec2::new(64, 64)),
        };
        let trader = InteractionZone {
            kind: ZoneKind::Trader,
            rect: rect_from_topleft(IVec2::new(500, 0), IVec2::new(64, 64)),
        };
        let near_bed = rect_from_center(IVec2::new(70, 40), IVec2::new(40, 40));
        assert_eq!(zone_under(near_bed, [bed, trader]), Some(ZoneKind::Bed));
        let far = rect_from_center(IVec2::new(300, 300), IVec2::new(40, 40));
        assert_eq!(zone_under(far, [bed, trader]), None);
    }
}
