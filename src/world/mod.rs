//! World domain plugin.
//!
//! Responsible for:
//! - Populating the map: ground, house layers, fences, water, decoration
//! - Static collision rectangles (fences, flowers, trees, map border)
//! - Trees, apples and stumps, and axe interactions
//! - Spawn-point interaction zones (bed, trader)
//! - Animated water and particles

use bevy::prelude::*;

use crate::config::SimConfig;
use crate::data::{FrameLibrary, MapData};
use crate::shared::*;

pub mod effects;
pub mod trees;

pub use effects::AnimatedTile;
pub use trees::{Apple, Stump, Tree, TreeSize};

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_world)
            .add_systems(
                Update,
                (effects::animate_tiles, effects::tick_particles).in_set(FrameSet::Simulate),
            )
            .add_systems(Update, trees::handle_axe.in_set(FrameSet::Effects));
    }
}

/// Marker for the full-map ground image.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ground;

// ═══════════════════════════════════════════════════════════════════════
// MAP POPULATION
// ═══════════════════════════════════════════════════════════════════════

fn tile_frame(image: &Option<String>) -> Option<Frame> {
    image
        .as_ref()
        .map(|path| Frame::new(path.clone(), IVec2::splat(TILE_SIZE)))
}

fn tile_topleft(col: i32, row: i32) -> IVec2 {
    IVec2::new(col * TILE_SIZE, row * TILE_SIZE)
}

/// Build every static entity the map describes.
pub fn setup_world(
    mut commands: Commands,
    map: Res<MapData>,
    frames: Res<FrameLibrary>,
    config: Res<SimConfig>,
    mut rng: ResMut<SimRng>,
) {
    if map.width <= 0 || map.height <= 0 {
        warn!("[World] Empty map, nothing to populate");
        return;
    }

    commands.spawn((
        Ground,
        Drawable::at_topleft(
            IVec2::ZERO,
            Frame::new(map.ground_image.clone(), map.pixel_size()),
            DepthLayer::Ground,
        ),
    ));

    // House
    for (layer, depth) in [
        ("HouseFloor", DepthLayer::HouseBottom),
        ("HouseFurnitureBottom", DepthLayer::HouseBottom),
        ("HouseWalls", DepthLayer::Main),
        ("HouseFurnitureTop", DepthLayer::Main),
    ] {
        for tile in map.tiles(layer) {
            if let Some(frame) = tile_frame(&tile.image) {
                commands.spawn(Drawable::at_topleft(tile_topleft(tile.col, tile.row), frame, depth));
            }
        }
    }

    // Fence: drawn and solid
    for tile in map.tiles("Fence") {
        if let Some(frame) = tile_frame(&tile.image) {
            let drawable = Drawable::at_topleft(tile_topleft(tile.col, tile.row), frame, DepthLayer::Main);
            let collider = Collider(trees::object_hitbox(drawable.rect));
            commands.spawn((drawable, collider));
        }
    }

    // Water: animated
    if let Some(first) = frames.first("water") {
        for tile in map.tiles("Water") {
            commands.spawn((
                AnimatedTile {
                    key: "water".to_string(),
                    frame_index: 0.0,
                    fps: config.water_fps,
                },
                Drawable::at_topleft(tile_topleft(tile.col, tile.row), first.clone(), DepthLayer::Water),
            ));
        }
    }

    // Trees
    let apple = frames.first("fruit/apple").cloned();
    let mut tree_count = 0;
    for obj in map.objects("Trees") {
        let (Some(size), Some(path)) = (TreeSize::from_name(&obj.name), obj.image.as_ref()) else {
            warn!("[World] Skipping tree object '{}' without size or image", obj.name);
            continue;
        };
        let drawable = Drawable::at_topleft(
            IVec2::new(obj.x, obj.y),
            Frame::new(path.clone(), IVec2::new(obj.width, obj.height)),
            DepthLayer::Main,
        );
        let rect = drawable.rect;
        let mut tree = Tree {
            size,
            health: config.tree_health,
            apples: Vec::new(),
        };
        let entity = commands.spawn_empty().id();
        if let Some(apple) = &apple {
            trees::grow_apples(&mut commands, entity, &mut tree, rect, apple, config.apple_chance, &mut rng.0);
        }
        commands
            .entity(entity)
            .insert((tree, drawable, Collider(trees::object_hitbox(rect))));
        tree_count += 1;
    }

    // Decoration (wild flowers)
    for obj in map.objects("Decoration") {
        let Some(path) = obj.image.as_ref() else {
            continue;
        };
        let drawable = Drawable::at_topleft(
            IVec2::new(obj.x, obj.y),
            Frame::new(path.clone(), IVec2::new(obj.width, obj.height)),
            DepthLayer::Main,
        );
        let hitbox = inflate(drawable.rect, -20, -(drawable.rect.height() as f32 * 0.9) as i32);
        commands.spawn((drawable, Collider(hitbox)));
    }

    // Invisible border
    let mut border = 0;
    for tile in map.tiles("Collision") {
        let rect = TileCoord::new(tile.col, tile.row).world_rect();
        commands.spawn(Collider(trees::object_hitbox(rect)));
        border += 1;
    }

    // Interaction zones
    for obj in map.objects("Player") {
        let kind = match obj.name.as_str() {
            "Bed" => ZoneKind::Bed,
            "Trader" => ZoneKind::Trader,
            _ => continue,
        };
        commands.spawn(InteractionZone {
            kind,
            rect: rect_from_topleft(IVec2::new(obj.x, obj.y), IVec2::new(obj.width, obj.height)),
        });
    }

    info!(
        "[World] Map populated: {} trees, {} border tiles, {} water tiles",
        tree_count,
        border,
        map.tiles("Water").len()
    );
}
