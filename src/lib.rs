//! Sproutvale library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the windowed entry point. The library
//! exposes the same modules so that `tests/` can build a headless
//! simulation without a window or GPU.

pub mod shared;
pub mod config;
pub mod data;
pub mod input;
pub mod farming;
pub mod player;
pub mod world;
pub mod weather;
pub mod camera;
pub mod economy;
pub mod level;
