// LogcatView - platform/mod.rs
//
// Platform layer: config directory resolution, config.toml, file reading.
// Dependencies: standard library, directories, memmap2, toml.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
