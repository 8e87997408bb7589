//! Weather domain — the daily rain roll, the rain overlay and the sky tint.
//!
//! Rain is decided once per day, at startup and on each day-advance, by the
//! level orchestrator calling `roll_rain`. During the day this module only
//! draws it.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SimConfig;
use crate::data::{FrameLibrary, MapData};
use crate::shared::*;

pub struct WeatherPlugin;

impl Plugin for WeatherPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Weather>()
            .init_resource::<ScreenTint>()
            .add_systems(
                Update,
                (
                    (spawn_rain, move_drops)
                        .chain()
                        .run_if(in_state(GameState::Playing)),
                    fade_sky,
                )
                    .in_set(FrameSet::Weather),
            );
    }
}

/// Today's weather. Changes only when a day starts.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Weather {
    pub raining: bool,
}

/// One draw from the injected random source.
pub fn roll_rain(rng: &mut impl Rng, chance: f64) -> bool {
    rng.gen_bool(probability(chance))
}

/// A falling drop's continuous position and velocity.
#[derive(Component, Debug, Clone, Copy)]
pub struct RainDrop {
    pub pos: Vec2,
    pub velocity: Vec2,
}

/// Screen-space direction drops fall in, scaled by each drop's speed.
pub const DROP_DIRECTION: Vec2 = Vec2::new(-2.0, 4.0);

fn rain_lifetime(rng: &mut impl Rng) -> f32 {
    rng.gen_range(0.4..=0.5)
}

/// One floor splash and one falling drop per frame at random map positions.
pub fn spawn_rain(
    mut commands: Commands,
    weather: Res<Weather>,
    map: Res<MapData>,
    frames: Res<FrameLibrary>,
    mut rng: ResMut<SimRng>,
) {
    if !weather.raining {
        return;
    }
    let size = map.pixel_size();
    if size.x <= 0 || size.y <= 0 {
        return;
    }
    let rng = &mut rng.0;

    if let Some(frame) = frames.get("rain/floor").choose(rng) {
        let at = IVec2::new(rng.gen_range(0..size.x), rng.gen_range(0..size.y));
        commands.spawn((
            Particle::lasting(rain_lifetime(rng)),
            Drawable::at_topleft(at, frame.clone(), DepthLayer::RainFloor),
        ));
    }

    if let Some(frame) = frames.get("rain/drops").choose(rng) {
        let at = IVec2::new(rng.gen_range(0..size.x), rng.gen_range(0..size.y));
        let speed: f32 = rng.gen_range(200.0..250.0);
        commands.spawn((
            Particle::lasting(rain_lifetime(rng)),
            RainDrop {
                pos: at.as_vec2(),
                velocity: DROP_DIRECTION * speed,
            },
            Drawable::at_topleft(at, frame.clone(), DepthLayer::RainDrops),
        ));
    }
}

pub fn move_drops(time: Res<Time>, mut drops: Query<(&mut RainDrop, &mut Drawable)>) {
    let dt = time.delta_secs();
    for (mut drop, mut drawable) in &mut drops {
        let velocity = drop.velocity;
        drop.pos += velocity * dt;
        let size = drawable.rect.size();
        drawable.rect = rect_from_topleft(drop.pos.round().as_ivec2(), size);
    }
}

/// Move each channel toward the evening colour by `rate * dt`, never past it.
pub fn fade_toward(tint: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let step = rate * dt;
    Vec3::new(
        (tint.x - step).max(target.x.min(tint.x)),
        (tint.y - step).max(target.y.min(tint.y)),
        (tint.z - step).max(target.z.min(tint.z)),
    )
}

pub fn fade_sky(time: Res<Time>, config: Res<SimConfig>, mut tint: ResMut<ScreenTint>) {
    let next = fade_toward(tint.sky, SKY_END_COLOR, config.sky_fade_rate, time.delta_secs());
    if next != tint.sky {
        tint.sky = next;
    }
}
