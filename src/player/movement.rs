use bevy::prelude::*;
use crate::shared::*;
use super::PlayerMovement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Push `hitbox` out of every obstacle it overlaps, along `axis` only. The side
/// is chosen by the sign of `direction` (the velocity component on that axis).
/// Returns the resolved rect and whether any clamp happened.
pub fn resolve_axis(mut hitbox: IRect, direction: f32, axis: Axis, obstacles: &[IRect]) -> (IRect, bool) {
    let mut hit = false;
    for &obstacle in obstacles {
        if !overlaps(obstacle, hitbox) {
            continue;
        }
        let size = hitbox.size();
        let min = match axis {
            Axis::Horizontal if direction > 0.0 => IVec2::new(obstacle.min.x - size.x, hitbox.min.y),
            Axis::Horizontal if direction < 0.0 => IVec2::new(obstacle.max.x, hitbox.min.y),
            Axis::Vertical if direction > 0.0 => IVec2::new(hitbox.min.x, obstacle.min.y - size.y),
            Axis::Vertical if direction < 0.0 => IVec2::new(hitbox.min.x, obstacle.max.y),
            _ => continue,
        };
        hitbox = rect_from_topleft(min, size);
        hit = true;
    }
    (hitbox, hit)
}

/// One movement integration: normalise `direction`, move `distance` along it,
/// x first then y, resolving collisions after each axis. The continuous
/// position is resynchronised to the hitbox centre whenever a clamp happens.
pub fn step(pos: Vec2, hitbox: IRect, direction: Vec2, distance: f32, obstacles: &[IRect]) -> (Vec2, IRect) {
    let dir = direction.normalize_or_zero();
    let mut pos = pos;

    pos.x += dir.x * distance;
    let center = rect_center(hitbox);
    let moved = recenter(hitbox, IVec2::new(pos.x.round() as i32, center.y));
    let (mut hitbox, hit) = resolve_axis(moved, dir.x, Axis::Horizontal, obstacles);
    if hit {
        pos.x = rect_center(hitbox).x as f32;
    }

    pos.y += dir.y * distance;
    let center = rect_center(hitbox);
    let moved = recenter(hitbox, IVec2::new(center.x, pos.y.round() as i32));
    let (resolved, hit) = resolve_axis(moved, dir.y, Axis::Vertical, obstacles);
    hitbox = resolved;
    if hit {
        pos.y = rect_center(hitbox).y as f32;
    }

    (pos, hitbox)
}

/// Integrate the player's motion against every static collider and keep the
/// drawable centred on the hitbox.
pub fn move_player(
    time: Res<Time>,
    colliders: Query<&Collider>,
    mut player: Query<(&mut PlayerMovement, &mut Hitbox, &mut Drawable), With<Player>>,
) {
    let Ok((mut movement, mut hitbox, mut drawable)) = player.get_single_mut() else {
        return;
    };
    let obstacles: Vec<IRect> = colliders.iter().map(|c| c.0).collect();
    let distance = movement.speed * time.delta_secs();
    let (pos, resolved) = step(movement.pos, hitbox.0, movement.direction, distance, &obstacles);

    movement.pos = pos;
    if hitbox.0 != resolved {
        hitbox.0 = resolved;
    }
    let centered = recenter(drawable.rect, rect_center(resolved));
    if drawable.rect != centered {
        drawable.rect = centered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HITBOX: IVec2 = IVec2::new(66, 122);

    fn player_at(center: IVec2) -> (Vec2, IRect) {
        (center.as_vec2(), rect_from_center(center, HITBOX))
    }

    #[test]
    fn diagonal_speed_equals_axial_speed() {
        let (pos, hitbox) = player_at(IVec2::new(500, 500));
        let (diag, _) = step(pos, hitbox, Vec2::new(1.0, 1.0), 10.0, &[]);
        assert!(((diag - pos).length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn moving_right_clamps_to_obstacle_left_edge() {
        let (pos, hitbox) = player_at(IVec2::new(100, 100));
        let wall = rect_from_topleft(IVec2::new(140, 0), IVec2::new(20, 300));
        let (pos, hitbox) = step(pos, hitbox, Vec2::X, 20.0, &[wall]);
        assert_eq!(hitbox.max.x, 140);
        assert_eq!(pos.x, rect_center(hitbox).x as f32);
        assert!(!overlaps(hitbox, wall));
    }

    #[test]
    fn slides_along_wall_when_moving_diagonally() {
        let (pos, hitbox) = player_at(IVec2::new(100, 100));
        let wall = rect_from_topleft(IVec2::new(133, -500), IVec2::new(20, 1000));
        let (next, hitbox) = step(pos, hitbox, Vec2::new(1.0, 1.0), 10.0, &[wall]);
        assert_eq!(hitbox.max.x, 133);
        assert!(next.y > pos.y, "vertical motion survives the horizontal clamp");
    }

    #[test]
    fn moving_up_clamps_to_obstacle_bottom_edge() {
        let (pos, hitbox) = player_at(IVec2::new(100, 200));
        let ceiling = rect_from_topleft(IVec2::new(0, 100), IVec2::new(300, 35));
        let (_, hitbox) = step(pos, hitbox, Vec2::NEG_Y, 10.0, &[ceiling]);
        assert_eq!(hitbox.min.y, 135);
    }

    #[test]
    fn zero_direction_does_not_move() {
        let (pos, hitbox) = player_at(IVec2::new(77, 91));
        assert_eq!(step(pos, hitbox, Vec2::ZERO, 50.0, &[]), (pos, hitbox));
    }

    fn obstacle() -> impl Strategy<Value = IRect> {
        (0..900i32, 0..900i32, 12..120i32, 12..120i32)
            .prop_map(|(x, y, w, h)| rect_from_topleft(IVec2::new(x, y), IVec2::new(w, h)))
    }

    fn input() -> impl Strategy<Value = (i8, i8, f32)> {
        (-1i8..=1, -1i8..=1, 0.001f32..0.033)
    }

    proptest! {
        #[test]
        fn hitbox_never_ends_a_frame_inside_an_obstacle(
            obstacles in prop::collection::vec(obstacle(), 0..24),
            inputs in prop::collection::vec(input(), 1..120),
        ) {
            let (mut pos, mut hitbox) = player_at(IVec2::new(450, 450));
            let obstacles: Vec<IRect> = obstacles
                .into_iter()
                .filter(|o| !overlaps(*o, hitbox))
                .collect();

            for (dx, dy, dt) in inputs {
                let direction = Vec2::new(dx as f32, dy as f32);
                let (next_pos, next_hitbox) = step(pos, hitbox, direction, 200.0 * dt, &obstacles);
                pos = next_pos;
                hitbox = next_hitbox;
                for o in &obstacles {
                    prop_assert!(!overlaps(*o, hitbox), "{:?} overlaps {:?}", hitbox, o);
                }
            }
        }
    }
}
