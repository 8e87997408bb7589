//! Trees, apples and stumps.
//!
//! A tree takes `tree_health` axe hits. Every hit knocks one apple loose into
//! the inventory; the last hit fells it into a stump and yields wood.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use crate::config::SimConfig;
use crate::data::FrameLibrary;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeSize {
    Small,
    Large,
}

impl TreeSize {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Small" => Some(TreeSize::Small),
            "Large" => Some(TreeSize::Large),
            _ => None,
        }
    }

    /// Apple anchor offsets from the tree's top-left corner.
    pub fn apple_anchors(self) -> &'static [IVec2] {
        const SMALL: [IVec2; 6] = [
            IVec2::new(18, 17),
            IVec2::new(30, 37),
            IVec2::new(12, 50),
            IVec2::new(30, 45),
            IVec2::new(20, 30),
            IVec2::new(30, 10),
        ];
        const LARGE: [IVec2; 6] = [
            IVec2::new(30, 24),
            IVec2::new(60, 65),
            IVec2::new(50, 50),
            IVec2::new(16, 40),
            IVec2::new(45, 50),
            IVec2::new(42, 70),
        ];
        match self {
            TreeSize::Small => &SMALL,
            TreeSize::Large => &LARGE,
        }
    }

    pub fn stump_key(self) -> &'static str {
        match self {
            TreeSize::Small => "stumps/small",
            TreeSize::Large => "stumps/large",
        }
    }
}

/// A standing tree. Felled trees lose this component and keep only a `Stump`.
#[derive(Component, Debug, Clone)]
pub struct Tree {
    pub size: TreeSize,
    pub health: u8,
    pub apples: Vec<Entity>,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Stump {
    pub size: TreeSize,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Apple {
    pub tree: Entity,
}

/// Collision rect for ordinary world objects: 20% narrower, 75% shorter.
pub fn object_hitbox(rect: IRect) -> IRect {
    inflate(rect, -(rect.width() as f32 * 0.2) as i32, -(rect.height() as f32 * 0.75) as i32)
}

pub fn stump_hitbox(rect: IRect) -> IRect {
    inflate(rect, -10, -(rect.height() as f32 * 0.6) as i32)
}

/// Spawn an apple on each anchor with probability `chance`.
pub fn grow_apples(
    commands: &mut Commands,
    tree_entity: Entity,
    tree: &mut Tree,
    tree_rect: IRect,
    apple: &Frame,
    chance: f64,
    rng: &mut impl Rng,
) {
    for &anchor in tree.size.apple_anchors() {
        if !rng.gen_bool(probability(chance)) {
            continue;
        }
        let entity = commands
            .spawn((
                Apple { tree: tree_entity },
                Drawable::at_topleft(tree_rect.min + anchor, apple.clone(), DepthLayer::Fruit),
            ))
            .id();
        tree.apples.push(entity);
    }
}

pub fn clear_apples(commands: &mut Commands, tree: &mut Tree) {
    for apple in tree.apples.drain(..) {
        commands.entity(apple).despawn();
    }
}

/// Day-advance: every standing tree drops its apples and grows a fresh set.
pub fn regrow_fruit(
    commands: &mut Commands,
    trees: &mut Query<(Entity, &mut Tree, &Drawable)>,
    frames: &FrameLibrary,
    chance: f64,
    rng: &mut impl Rng,
) {
    let Some(apple) = frames.first("fruit/apple") else {
        return;
    };
    for (entity, mut tree, drawable) in trees.iter_mut() {
        clear_apples(commands, &mut tree);
        grow_apples(commands, entity, &mut tree, drawable.rect, apple, chance, rng);
    }
}

/// Axe hits on standing trees whose rect contains the swing target.
#[allow(clippy::too_many_arguments)]
pub fn handle_axe(
    mut commands: Commands,
    mut tool_events: EventReader<ToolUseEvent>,
    config: Res<SimConfig>,
    frames: Res<FrameLibrary>,
    mut rng: ResMut<SimRng>,
    mut inventory: ResMut<Inventory>,
    mut trees: Query<(Entity, &mut Tree, &mut Drawable, &mut Collider)>,
    apples: Query<&Drawable, (With<Apple>, Without<Tree>)>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Axe {
            continue;
        }
        for (entity, mut tree, mut drawable, mut collider) in &mut trees {
            if tree.health == 0 || !contains_point(drawable.rect, event.target) {
                continue;
            }
            tree.health -= 1;
            debug!("[World] Tree hit, {} health left", tree.health);

            if let Some(&apple) = tree.apples.choose(&mut rng.0) {
                tree.apples.retain(|&a| a != apple);
                if let Ok(apple_drawable) = apples.get(apple) {
                    commands.spawn((
                        Particle::lasting(PARTICLE_SECS),
                        Drawable::at_topleft(
                            apple_drawable.rect.min,
                            apple_drawable.image.clone(),
                            DepthLayer::Fruit,
                        ),
                    ));
                }
                commands.entity(apple).despawn();
                inventory.add(ItemKind::Apple, 1);
            }

            if tree.health > 0 {
                continue;
            }

            commands.spawn((
                Particle::lasting(PARTICLE_SECS),
                Drawable::at_topleft(drawable.rect.min, drawable.image.clone(), DepthLayer::Fruit),
            ));
            clear_apples(&mut commands, &mut tree);
            if let Some(stump) = frames.first(tree.size.stump_key()) {
                drawable.set_image_anchored(stump.clone());
            }
            collider.0 = stump_hitbox(drawable.rect);
            inventory.add(ItemKind::Wood, config.tree_wood_yield);
            commands.entity(entity).remove::<Tree>().insert(Stump { size: tree.size });
            info!(
                "[World] Tree felled, wood now {}",
                inventory.count(ItemKind::Wood)
            );
        }
    }
}
