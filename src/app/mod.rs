// LogcatView - app/mod.rs
//
// Application layer: loading orchestration, listener plumbing, and the
// per-channel view state.
// Dependencies: core and platform layers.

pub mod events;
pub mod loader;
pub mod panel;
