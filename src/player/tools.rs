use bevy::prelude::*;
use crate::data::FrameLibrary;
use crate::shared::*;
use super::{ActionTimers, PendingEffect, PlayerAnimation, PlayerMovement, TimedAction, ToolTarget};

/// Direction and facing from the four directional flags. Vertical is read
/// first and horizontal second, so horizontal facing wins on diagonals.
pub fn direction_from_input(input: &PlayerInput, facing: Facing) -> (Vec2, Facing) {
    let mut direction = Vec2::ZERO;
    let mut facing = facing;

    if input.up {
        direction.y = -1.0;
        facing = Facing::Up;
    } else if input.down {
        direction.y = 1.0;
        facing = Facing::Down;
    }

    if input.right {
        direction.x = 1.0;
        facing = Facing::Right;
    } else if input.left {
        direction.x = -1.0;
        facing = Facing::Left;
    }

    (direction, facing)
}

/// Input is ignored entirely while a tool swing or seed throw is running, or
/// while the player sleeps.
pub fn read_input(
    input: Res<PlayerInput>,
    mut state: ResMut<PlayerState>,
    mut player: Query<
        (&mut PlayerMovement, &mut ActionTimers, &mut PlayerAnimation, &ToolTarget),
        With<Player>,
    >,
) {
    let Ok((mut movement, mut timers, mut animation, target)) = player.get_single_mut() else {
        return;
    };
    if timers.is_active(TimedAction::ToolUse)
        || timers.is_active(TimedAction::SeedUse)
        || state.sleeping
    {
        return;
    }

    let (direction, facing) = direction_from_input(&input, movement.facing);
    movement.direction = direction;
    movement.facing = facing;

    if input.use_tool {
        let effect = PendingEffect::Tool {
            tool: state.selected_tool(),
            target: target.0,
        };
        if timers.activate(TimedAction::ToolUse, Some(effect)) {
            movement.direction = Vec2::ZERO;
            animation.frame_index = 0.0;
        }
    }

    if input.next_tool && timers.activate(TimedAction::ToolSwitch, None) {
        state.cycle_tool();
        debug!("[Player] Tool: {}", state.selected_tool().name());
    }

    if input.use_seed {
        let effect = PendingEffect::Seed {
            species: state.selected_seed(),
            target: target.0,
        };
        if timers.activate(TimedAction::SeedUse, Some(effect)) {
            movement.direction = Vec2::ZERO;
            animation.frame_index = 0.0;
        }
    }

    if input.next_seed && timers.activate(TimedAction::SeedSwitch, None) {
        state.cycle_seed();
        debug!("[Player] Seed: {}", state.selected_seed().name());
    }
}

pub fn update_status(
    state: Res<PlayerState>,
    mut player: Query<(&mut PlayerMovement, &ActionTimers), With<Player>>,
) {
    let Ok((mut movement, timers)) = player.get_single_mut() else {
        return;
    };
    let mode = if timers.is_active(TimedAction::ToolUse) {
        PlayerMode::Tool(state.selected_tool())
    } else if movement.direction == Vec2::ZERO {
        PlayerMode::Idle
    } else {
        PlayerMode::Walking
    };
    if movement.mode != mode {
        movement.mode = mode;
    }
}

/// Advance the four action timers and fire the effects of any that ran out.
pub fn tick_timers(
    time: Res<Time>,
    mut player: Query<&mut ActionTimers, With<Player>>,
    mut tool_events: EventWriter<ToolUseEvent>,
    mut seed_events: EventWriter<SeedUseEvent>,
) {
    let Ok(mut timers) = player.get_single_mut() else {
        return;
    };
    for (_, effect) in timers.tick(time.delta()) {
        match effect {
            Some(PendingEffect::Tool { tool, target }) => {
                tool_events.send(ToolUseEvent { tool, target });
            }
            Some(PendingEffect::Seed { species, target }) => {
                seed_events.send(SeedUseEvent { species, target });
            }
            None => {}
        }
    }
}

pub fn update_target(
    mut player: Query<(&PlayerMovement, &Drawable, &mut ToolTarget), With<Player>>,
) {
    let Ok((movement, drawable, mut target)) = player.get_single_mut() else {
        return;
    };
    target.0 = rect_center(drawable.rect).as_vec2() + movement.facing.tool_offset();
}

pub fn animate_player(
    time: Res<Time>,
    frames: Res<FrameLibrary>,
    mut player: Query<(&PlayerMovement, &mut PlayerAnimation, &mut Drawable), With<Player>>,
) {
    let Ok((movement, mut animation, mut drawable)) = player.get_single_mut() else {
        return;
    };
    let sequence = frames.get(&movement.animation_key());
    if sequence.is_empty() {
        return;
    }

    animation.frame_index += animation.fps * time.delta_secs();
    if animation.frame_index >= sequence.len() as f32 {
        animation.frame_index = 0.0;
    }
    let frame = &sequence[(animation.frame_index as usize).min(sequence.len() - 1)];
    if drawable.image != *frame {
        let center = rect_center(drawable.rect);
        drawable.rect = rect_from_center(center, frame.size);
        drawable.image = frame.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_facing_wins_on_diagonal() {
        let input = PlayerInput {
            up: true,
            left: true,
            ..default()
        };
        let (direction, facing) = direction_from_input(&input, Facing::Down);
        assert_eq!(direction, Vec2::new(-1.0, -1.0));
        assert_eq!(facing, Facing::Left);
    }

    #[test]
    fn no_input_keeps_facing() {
        let (direction, facing) = direction_from_input(&PlayerInput::default(), Facing::Right);
        assert_eq!(direction, Vec2::ZERO);
        assert_eq!(facing, Facing::Right);
    }

    #[test]
    fn up_beats_down() {
        let input = PlayerInput {
            up: true,
            down: true,
            ..default()
        };
        assert_eq!(direction_from_input(&input, Facing::Left).1, Facing::Up);
    }
}
