//! Windowed entry point.
//!
//! Run from a directory holding the game assets:
//!
//! ```text
//! assets/
//!   config/sim.ron           optional, missing fields keep their defaults
//!   data/map.ron             the map, with every layer in `data::REQUIRED_LAYERS`
//!   graphics/<key>/N.png     one folder per key in `data::required_frame_keys`,
//!                            frames numbered from 0 (`character/down_idle/0.png`,
//!                            `fruit/corn/0.png`, `soil_water/0.png`, ...)
//! ```
//!
//! A missing map or frame folder is reported and the game exits before a
//! window opens. `tests/headless.rs` builds the same simulation from
//! in-memory data instead.

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use sproutvale::camera::PresentPlugin;
use sproutvale::config::SimConfig;
use sproutvale::data::{load_map, required_frame_keys, DataError, FolderFrames, FrameLibrary};
use sproutvale::input::KeyboardInputPlugin;
use sproutvale::level::SimulationPlugin;
use sproutvale::shared::*;

const ASSET_ROOT: &str = "assets";
const CONFIG_PATH: &str = "assets/config/sim.ron";
const MAP_PATH: &str = "assets/data/map.ron";

fn main() -> Result<(), DataError> {
    // Everything the simulation reads is loaded up front; a bad asset stops
    // the game before a window opens.
    let config = SimConfig::load(CONFIG_PATH)?;
    let map = load_map(MAP_PATH)?;
    let frames = FrameLibrary::load(
        &FolderFrames::new(ASSET_ROOT, "graphics"),
        required_frame_keys(),
    )?;

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Sproutvale".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: false,
                        ..default()
                    }),
                    ..default()
                })
                .set(AssetPlugin {
                    file_path: ASSET_ROOT.into(),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .insert_resource(config)
        .insert_resource(map)
        .insert_resource(frames)
        .add_plugins(SimulationPlugin)
        .add_plugins(KeyboardInputPlugin)
        .add_plugins(PresentPlugin)
        .run();

    Ok(())
}
