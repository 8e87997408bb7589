//! Image-sequence provider: logical key → ordered, non-empty list of frames.

use bevy::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::DataError;
use crate::shared::{animation_key, Facing, Frame, PlayerMode, TOOL_ORDER};

/// Anything that can turn an asset key into its frame sequence.
pub trait FrameProvider {
    fn frames(&self, key: &str) -> Result<Vec<Frame>, DataError>;
}

/// Reads `<root>/<prefix>/<key>/*.png`, ordered by numeric file stem
/// (`0.png`, `1.png`, … `10.png`) and then by name.
#[derive(Debug, Clone)]
pub struct FolderFrames {
    root: PathBuf,
    prefix: String,
}

impl FolderFrames {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }
}

impl FrameProvider for FolderFrames {
    fn frames(&self, key: &str) -> Result<Vec<Frame>, DataError> {
        let dir = self.root.join(&self.prefix).join(key);
        let entries = std::fs::read_dir(&dir).map_err(|source| DataError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
            .collect();
        files.sort_by(|a, b| frame_order(a).cmp(&frame_order(b)));

        let mut frames = Vec::with_capacity(files.len());
        for path in files {
            let (w, h) = image::image_dimensions(&path).map_err(|source| DataError::Image {
                path: path.clone(),
                source,
            })?;
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            frames.push(Frame::new(
                format!("{}/{}/{}", self.prefix, key, file_name),
                IVec2::new(w as i32, h as i32),
            ));
        }
        Ok(frames)
    }
}

fn frame_order(path: &Path) -> (u64, String) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    (stem.parse().unwrap_or(u64::MAX), stem)
}

/// Every key the simulation looks up at runtime.
pub fn required_frame_keys() -> Vec<String> {
    let mut keys = Vec::new();
    for facing in [Facing::Up, Facing::Down, Facing::Left, Facing::Right] {
        keys.push(animation_key(facing, PlayerMode::Idle));
        keys.push(animation_key(facing, PlayerMode::Walking));
        for tool in TOOL_ORDER {
            keys.push(animation_key(facing, PlayerMode::Tool(tool)));
        }
    }
    for key in [
        "water",
        "soil",
        "soil_water",
        "fruit/corn",
        "fruit/tomato",
        "fruit/apple",
        "stumps/small",
        "stumps/large",
        "rain/drops",
        "rain/floor",
    ] {
        keys.push(key.to_string());
    }
    keys
}

/// Loaded frame sequences. Every stored sequence is non-empty.
#[derive(Resource, Debug, Clone, Default)]
pub struct FrameLibrary {
    sequences: HashMap<String, Vec<Frame>>,
}

impl FrameLibrary {
    pub fn load<P, I, K>(provider: &P, keys: I) -> Result<Self, DataError>
    where
        P: FrameProvider + ?Sized,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut library = Self::default();
        for key in keys {
            let key = key.as_ref();
            library.insert(key, provider.frames(key)?)?;
        }
        info!("[Data] {} frame sequences loaded", library.sequences.len());
        Ok(library)
    }

    pub fn insert(&mut self, key: impl Into<String>, frames: Vec<Frame>) -> Result<(), DataError> {
        let key = key.into();
        if frames.is_empty() {
            return Err(DataError::EmptyFrames(key));
        }
        self.sequences.insert(key, frames);
        Ok(())
    }

    /// The whole sequence; empty if the key was never loaded.
    pub fn get(&self, key: &str) -> &[Frame] {
        self.sequences.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Frame `index`, clamped to the last frame of the sequence.
    pub fn clamped(&self, key: &str, index: usize) -> Option<&Frame> {
        let frames = self.get(key);
        frames.get(index.min(frames.len().saturating_sub(1)))
    }

    /// Frame `index`, wrapping around the sequence length.
    pub fn wrapped(&self, key: &str, index: usize) -> Option<&Frame> {
        let frames = self.get(key);
        if frames.is_empty() {
            return None;
        }
        frames.get(index % frames.len())
    }

    pub fn first(&self, key: &str) -> Option<&Frame> {
        self.get(key).first()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sequences.contains_key(key)
    }
}
