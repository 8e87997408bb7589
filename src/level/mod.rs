//! Level orchestrator — wires every domain plugin together, fixes the
//! per-frame phase order, and owns the shop toggle and the sleep → day-advance
//! hand-off.
//!
//! This is the only module that reaches into several domains directly.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::camera::CameraPlugin;
use crate::config::SimConfig;
use crate::data::{FrameLibrary, MapData};
use crate::economy::EconomyPlugin;
use crate::farming::{CropRegistry, FarmingPlugin, SoilGrid};
use crate::player::PlayerPlugin;
use crate::shared::*;
use crate::weather::{roll_rain, Weather, WeatherPlugin};
use crate::world::trees::{self, Tree};
use crate::world::WorldPlugin;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

/// Everything needed to run the simulation without a window.
///
/// Expects `MinimalPlugins` (or `DefaultPlugins`) and a `StatesPlugin`.
/// Insert `SimConfig`, `MapData` and `FrameLibrary` before adding it; any
/// that are missing start out empty.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>();

        app.add_event::<ToolUseEvent>()
            .add_event::<SeedUseEvent>()
            .add_event::<DayAdvanceEvent>()
            .add_event::<ShopToggleEvent>()
            .add_event::<TradeEvent>()
            .add_event::<HarvestEvent>();

        // A config inserted by hand skips `SimConfig::load`, so clean it here too.
        let config = app
            .world_mut()
            .remove_resource::<SimConfig>()
            .unwrap_or_default()
            .sanitized();
        app.insert_resource(config)
            .init_resource::<MapData>()
            .init_resource::<FrameLibrary>()
            .init_resource::<Inventory>()
            .init_resource::<PlayerState>()
            .init_resource::<ScreenTint>()
            .init_resource::<DayCounter>()
            .init_resource::<DayTransition>();

        if !app.world().contains_resource::<SimRng>() {
            let seed = app.world().resource::<SimConfig>().rng_seed;
            app.insert_resource(SimRng::from_seed_option(seed));
        }

        app.configure_sets(
            Update,
            (
                FrameSet::Composite,
                FrameSet::Simulate.run_if(in_state(GameState::Playing)),
                FrameSet::Effects.run_if(in_state(GameState::Playing)),
                FrameSet::Harvest.run_if(in_state(GameState::Playing)),
                FrameSet::Weather,
                FrameSet::Sleep,
            )
                .chain(),
        );

        app.add_plugins((
            FarmingPlugin,
            PlayerPlugin,
            WorldPlugin,
            WeatherPlugin,
            CameraPlugin,
            EconomyPlugin,
        ));

        // After farming's Startup has built the soil grid.
        app.add_systems(PostStartup, roll_first_day);

        app.add_systems(
            Update,
            (toggle_shop, run_day_transition, advance_day)
                .chain()
                .in_set(FrameSet::Sleep),
        );
    }
}

/// Drive one frame of `dt` seconds.
///
/// Time is pinned to a manual step, so repeated calls are deterministic.
/// Bevy reports a zero delta on an app's very first update.
pub fn advance(app: &mut App, dt: f32) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(
        Duration::from_secs_f32(dt.max(0.0)),
    ));
    app.update();
}

// ═══════════════════════════════════════════════════════════════════════
// SHOP
// ═══════════════════════════════════════════════════════════════════════

fn toggle_shop(
    mut events: EventReader<ShopToggleEvent>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    // An even number of toggles in one frame cancels out.
    let toggles = events.read().count();
    if toggles % 2 == 0 {
        return;
    }
    let target = match state.get() {
        GameState::Playing => GameState::Shop,
        GameState::Shop => GameState::Playing,
    };
    info!("[Level] Shop toggled: {:?} -> {:?}", state.get(), target);
    next.set(target);
}

// ═══════════════════════════════════════════════════════════════════════
// DAYS
// ═══════════════════════════════════════════════════════════════════════

/// Current in-game day, starting at 1.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCounter(pub u32);

impl Default for DayCounter {
    fn default() -> Self {
        Self(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    #[default]
    Idle,
    FadingOut,
    FadingIn,
}

/// What a transition step asks the caller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCue {
    None,
    /// The screen just went black.
    AdvanceDay,
    /// Fully faded back in; the player may wake.
    Wake,
}

/// Sleep screen fade: out to black, one day-advance, back in.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DayTransition {
    pub phase: TransitionPhase,
    pub brightness: f32,
}

impl Default for DayTransition {
    fn default() -> Self {
        Self {
            phase: TransitionPhase::Idle,
            brightness: 1.0,
        }
    }
}

impl DayTransition {
    pub fn step(&mut self, sleeping: bool, dt: f32, speed: f32) -> TransitionCue {
        match self.phase {
            TransitionPhase::Idle => {
                if sleeping {
                    self.phase = TransitionPhase::FadingOut;
                }
                TransitionCue::None
            }
            TransitionPhase::FadingOut => {
                self.brightness -= speed * dt;
                if self.brightness <= 0.0 {
                    self.brightness = 0.0;
                    self.phase = TransitionPhase::FadingIn;
                    return TransitionCue::AdvanceDay;
                }
                TransitionCue::None
            }
            TransitionPhase::FadingIn => {
                self.brightness += speed * dt;
                if self.brightness >= 1.0 {
                    self.brightness = 1.0;
                    self.phase = TransitionPhase::Idle;
                    return TransitionCue::Wake;
                }
                TransitionCue::None
            }
        }
    }
}

fn run_day_transition(
    time: Res<Time>,
    config: Res<SimConfig>,
    counter: Res<DayCounter>,
    mut player_state: ResMut<PlayerState>,
    mut transition: ResMut<DayTransition>,
    mut tint: ResMut<ScreenTint>,
    mut day_events: EventWriter<DayAdvanceEvent>,
) {
    if transition.phase == TransitionPhase::Idle && !player_state.sleeping {
        return;
    }
    match transition.step(player_state.sleeping, time.delta_secs(), config.transition_speed) {
        TransitionCue::AdvanceDay => {
            day_events.send(DayAdvanceEvent { day: counter.0 });
        }
        TransitionCue::Wake => {
            player_state.sleeping = false;
            debug!("[Level] Player woke up");
        }
        TransitionCue::None => {}
    }
    tint.brightness = transition.brightness;
}

/// Batched start-of-day update. Growth is judged against the day that just
/// ended, then the soil dries and the new day's rain is rolled.
#[allow(clippy::too_many_arguments)]
/// Day one gets the same rain roll as every later day. No tile is tilled
/// yet, so there is nothing to water.
fn roll_first_day(
    config: Res<SimConfig>,
    mut soil: ResMut<SoilGrid>,
    mut weather: ResMut<Weather>,
    mut rng: ResMut<SimRng>,
) {
    weather.raining = roll_rain(&mut rng.0, config.rain_chance);
    soil.raining = weather.raining;
    info!("[Level] Day 1 begins: raining={}", weather.raining);
}

fn advance_day(
    mut commands: Commands,
    mut events: EventReader<DayAdvanceEvent>,
    config: Res<SimConfig>,
    crops: Res<CropRegistry>,
    frames: Res<FrameLibrary>,
    mut counter: ResMut<DayCounter>,
    mut soil: ResMut<SoilGrid>,
    mut weather: ResMut<Weather>,
    mut rng: ResMut<SimRng>,
    mut tint: ResMut<ScreenTint>,
    mut trees: Query<(Entity, &mut Tree, &Drawable)>,
) {
    for event in events.read() {
        if event.day != counter.0 {
            debug!("[Level] Ignoring day-advance for day {} (today is {})", event.day, counter.0);
            continue;
        }

        let grown = soil.update_plants(&crops);
        soil.remove_water();

        weather.raining = roll_rain(&mut rng.0, config.rain_chance);
        soil.raining = weather.raining;
        if weather.raining {
            soil.water_all();
        }

        trees::regrow_fruit(&mut commands, &mut trees, &frames, config.apple_chance, &mut rng.0);
        tint.sky = ScreenTint::default().sky;

        counter.0 += 1;
        info!(
            "[Level] Day {} begins: raining={}, {} plants grew",
            counter.0, weather.raining, grown
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_fades_out_advances_once_and_wakes() {
        let mut transition = DayTransition::default();
        let mut sleeping = true;
        let mut cues = Vec::new();
        for _ in 0..40 {
            let cue = transition.step(sleeping, 0.1, 1.0);
            if cue == TransitionCue::Wake {
                sleeping = false;
            }
            cues.push(cue);
        }
        assert_eq!(cues.iter().filter(|c| **c == TransitionCue::AdvanceDay).count(), 1);
        assert_eq!(cues.iter().filter(|c| **c == TransitionCue::Wake).count(), 1);

        let black = cues.iter().position(|c| *c == TransitionCue::AdvanceDay);
        let wake = cues.iter().position(|c| *c == TransitionCue::Wake);
        assert!(black < wake);
    }

    #[test]
    fn idle_transition_waits_for_sleep() {
        let mut transition = DayTransition::default();
        assert_eq!(transition.step(false, 1.0, 1.0), TransitionCue::None);
        assert_eq!(transition.phase, TransitionPhase::Idle);
        assert_eq!(transition.brightness, 1.0);
    }
}
