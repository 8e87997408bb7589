//! Data layer — the map/tile source and the image-sequence provider.
//!
//! Both are consumed once at startup. Anything missing or unreadable here is
//! fatal: the game never runs on a partially loaded world.

pub mod frames;
pub mod map;

use std::path::PathBuf;
use thiserror::Error;

pub use frames::{required_frame_keys, FolderFrames, FrameLibrary, FrameProvider};
pub use map::{load_map, MapData, ObjectRecord, TileRecord, REQUIRED_LAYERS};

/// Startup failures while reading maps, configs and image folders.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed RON: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("map is missing required layer '{0}'")]
    MissingLayer(String),

    #[error("map has no 'Start' marker in the Player layer")]
    MissingSpawn,

    #[error("map dimensions must be positive, got {width}x{height}")]
    EmptyMap { width: i32, height: i32 },

    #[error("no frames found for asset key '{0}'")]
    EmptyFrames(String),

    #[error("cannot read image header {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
