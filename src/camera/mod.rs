//! Camera compositor — centres the view on the player and paints every
//! drawable into the frame buffer, depth layer first, then vertical centre.

use bevy::prelude::*;

use crate::shared::*;

pub mod present;

pub use present::PresentPlugin;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameBuffer>()
            .init_resource::<ScreenTint>()
            .add_systems(Update, composite.in_set(FrameSet::Composite));
    }
}

/// One drawable painted at a screen position.
#[derive(Debug, Clone, PartialEq)]
pub struct Blit {
    pub entity: Entity,
    /// Screen-space rectangle (world rect minus the camera offset).
    pub rect: IRect,
    pub image: Frame,
    pub layer: DepthLayer,
}

/// The last composited frame, in paint order.
#[derive(Resource, Debug, Clone)]
pub struct FrameBuffer {
    pub offset: IVec2,
    pub blits: Vec<Blit>,
    /// Per-channel multiplier in 0..=1.
    pub tint: Vec3,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            offset: IVec2::ZERO,
            blits: Vec::new(),
            tint: Vec3::ONE,
        }
    }
}

impl FrameBuffer {
    pub fn clear(&mut self) {
        self.blits.clear();
    }

    pub fn blit_of(&self, entity: Entity) -> Option<&Blit> {
        self.blits.iter().find(|blit| blit.entity == entity)
    }
}

/// World offset that puts `focus`'s centre in the middle of the screen.
pub fn camera_offset(focus: IRect) -> IVec2 {
    let half = Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0).as_ivec2();
    rect_center(focus) - half
}

/// Paint order: depth layer ascending, then vertical centre ascending.
/// Equal keys fall back to entity id so every frame sorts the same way.
pub fn compose<'a>(
    drawables: impl IntoIterator<Item = (Entity, &'a Drawable)>,
    offset: IVec2,
) -> Vec<Blit> {
    let mut sorted: Vec<(Entity, &Drawable)> = drawables.into_iter().collect();
    sorted.sort_by_key(|(entity, drawable)| (drawable.layer, center_y(drawable.rect), *entity));
    sorted
        .into_iter()
        .map(|(entity, drawable)| Blit {
            entity,
            rect: IRect {
                min: drawable.rect.min - offset,
                max: drawable.rect.max - offset,
            },
            image: drawable.image.clone(),
            layer: drawable.layer,
        })
        .collect()
}

pub fn composite(
    mut buffer: ResMut<FrameBuffer>,
    tint: Res<ScreenTint>,
    player: Query<&Drawable, With<Player>>,
    drawables: Query<(Entity, &Drawable)>,
) {
    buffer.clear();
    if let Ok(focus) = player.get_single() {
        buffer.offset = camera_offset(focus.rect);
    }
    let offset = buffer.offset;
    buffer.blits = compose(drawables.iter(), offset);
    buffer.tint = tint.multiplier();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawable(topleft: IVec2, size: IVec2, layer: DepthLayer) -> Drawable {
        Drawable::at_topleft(topleft, Frame::new("test.png", size), layer)
    }

    #[test]
    fn lower_layer_paints_first_regardless_of_y() {
        let low = drawable(IVec2::new(0, 500), IVec2::splat(64), DepthLayer::Soil);
        let high = drawable(IVec2::new(0, 0), IVec2::splat(64), DepthLayer::Main);
        let blits = compose(
            [(Entity::from_raw(1), &high), (Entity::from_raw(2), &low)],
            IVec2::ZERO,
        );
        assert_eq!(blits[0].layer, DepthLayer::Soil);
        assert_eq!(blits[1].layer, DepthLayer::Main);
    }

    #[test]
    fn same_layer_sorts_by_vertical_centre() {
        let trunk = drawable(IVec2::new(0, 100), IVec2::new(64, 128), DepthLayer::Main);
        let player = drawable(IVec2::new(0, 150), IVec2::new(64, 64), DepthLayer::Main);
        let blits = compose(
            [(Entity::from_raw(7), &player), (Entity::from_raw(3), &trunk)],
            IVec2::ZERO,
        );
        // trunk centre 164, player centre 182
        assert_eq!(blits[0].entity, Entity::from_raw(3));
        assert_eq!(blits[1].entity, Entity::from_raw(7));
    }

    #[test]
    fn ties_break_on_entity() {
        let a = drawable(IVec2::ZERO, IVec2::splat(64), DepthLayer::Main);
        let b = drawable(IVec2::new(200, 0), IVec2::splat(64), DepthLayer::Main);
        let blits = compose(
            [(Entity::from_raw(9), &a), (Entity::from_raw(4), &b)],
            IVec2::ZERO,
        );
        assert_eq!(blits[0].entity, Entity::from_raw(4));
    }

    #[test]
    fn focus_lands_in_screen_centre() {
        let player = drawable(IVec2::new(1000, 2000), IVec2::new(192, 192), DepthLayer::Main);
        let offset = camera_offset(player.rect);
        let blits = compose([(Entity::from_raw(1), &player)], offset);
        assert_eq!(rect_center(blits[0].rect), IVec2::new(640, 360));
        assert_eq!(offset, IVec2::new(1096 - 640, 2096 - 360));
    }
}
