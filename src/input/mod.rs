use bevy::prelude::*;
use crate::shared::*;

/// Keyboard → `PlayerInput`. Only the windowed binary adds this; headless
/// runs write `PlayerInput` themselves.
pub struct KeyboardInputPlugin;

impl Plugin for KeyboardInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KeyBindings>()
            .init_resource::<PlayerInput>()
            .add_systems(PreUpdate, (read_keyboard, close_shop_on_cancel).chain());
    }
}

/// The single point where hardware input becomes game actions.
fn read_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    mut input: ResMut<PlayerInput>,
) {
    *input = read_bindings(&bindings, |key| keys.pressed(key));
    input.close_menu = keys.just_pressed(bindings.close_menu);
}

/// Build the held-state flags from any "is this key down" source.
pub fn read_bindings(bindings: &KeyBindings, pressed: impl Fn(KeyCode) -> bool) -> PlayerInput {
    PlayerInput {
        up: pressed(bindings.move_up),
        down: pressed(bindings.move_down),
        left: pressed(bindings.move_left),
        right: pressed(bindings.move_right),
        use_tool: pressed(bindings.use_tool),
        next_tool: pressed(bindings.next_tool),
        use_seed: pressed(bindings.use_seed),
        next_seed: pressed(bindings.next_seed),
        interact: pressed(bindings.interact),
        close_menu: false,
    }
}

fn close_shop_on_cancel(
    input: Res<PlayerInput>,
    state: Res<State<GameState>>,
    mut toggles: EventWriter<ShopToggleEvent>,
) {
    if input.close_menu && *state.get() == GameState::Shop {
        toggles.send(ShopToggleEvent);
    }
}
