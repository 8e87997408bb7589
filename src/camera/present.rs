//! Mirrors the composited `FrameBuffer` into Bevy sprites for the windowed
//! build. Headless runs never add this plugin.

use bevy::prelude::*;
use std::collections::HashMap;

use super::FrameBuffer;
use crate::shared::*;

pub struct PresentPlugin;

impl Plugin for PresentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ImageCache>()
            .add_systems(Startup, setup_camera)
            .add_systems(PostUpdate, present_frame);
    }
}

/// Handles for every image path the frame buffer has referenced so far.
#[derive(Resource, Default)]
pub struct ImageCache {
    handles: HashMap<String, Handle<Image>>,
}

impl ImageCache {
    fn handle(&mut self, path: &str, assets: &AssetServer) -> Handle<Image> {
        if let Some(handle) = self.handles.get(path) {
            return handle.clone();
        }
        let handle: Handle<Image> = assets.load(path.to_string());
        self.handles.insert(path.to_string(), handle.clone());
        handle
    }
}

/// One reusable sprite slot; slot `n` shows the `n`-th blit.
#[derive(Component, Debug, Clone, Copy)]
pub struct ScreenSlot(pub usize);

/// Depth step between consecutive blits.
const SLOT_Z_STEP: f32 = 0.001;

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Centre of a y-down screen rect in Bevy's y-up, screen-centred space.
pub fn screen_to_view(rect: IRect) -> Vec2 {
    let center = rect.min.as_vec2() + rect.size().as_vec2() / 2.0;
    Vec2::new(center.x - SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0 - center.y)
}

fn present_frame(
    mut commands: Commands,
    buffer: Res<FrameBuffer>,
    assets: Res<AssetServer>,
    mut cache: ResMut<ImageCache>,
    mut slots: Query<(&ScreenSlot, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    let color = Color::srgb(buffer.tint.x, buffer.tint.y, buffer.tint.z);
    let mut filled = 0;

    for (slot, mut sprite, mut transform, mut visibility) in &mut slots {
        let Some(blit) = buffer.blits.get(slot.0) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        sprite.image = cache.handle(&blit.image.path, &assets);
        sprite.custom_size = Some(blit.rect.size().as_vec2());
        sprite.color = color;
        transform.translation = screen_to_view(blit.rect).extend(slot.0 as f32 * SLOT_Z_STEP);
        *visibility = Visibility::Visible;
        filled = filled.max(slot.0 + 1);
    }

    // Grow the pool when the frame has more blits than slots.
    for (index, blit) in buffer.blits.iter().enumerate().skip(filled) {
        if slots.iter().any(|(slot, ..)| slot.0 == index) {
            continue;
        }
        commands.spawn((
            ScreenSlot(index),
            Sprite {
                image: cache.handle(&blit.image.path, &assets),
                custom_size: Some(blit.rect.size().as_vec2()),
                color,
                ..default()
            },
            Transform::from_translation(screen_to_view(blit.rect).extend(index as f32 * SLOT_Z_STEP)),
        ));
    }
}
