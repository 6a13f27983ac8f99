// LogcatView - core/mod.rs
//
// Core logic layer: formats, parsing, bug report splitting, filtering.
// Dependencies: standard library, regex, serde.
// Must NOT depend on: platform, app, or perform any I/O.

pub mod bugreport;
pub mod filter;
pub mod format;
pub mod model;
pub mod parser;
pub mod sync;
