//! Core application setup, configuration and session state.
//!
//! Builds the headless app, loads [`config::PlacementConfig`] and owns the
//! session state machine that hides placed objects during interruptions.

/// Plugin registration, frame system ordering and headless app creation.
///
/// Systems run in the chained [`app_setup::FrameSet`] phases so the object
/// registry has a single writer per frame.
pub mod app_setup;

/// Session state machine and the hide/show transitions.
pub mod app_state;

/// JSON configuration with defaults from the `constants` crate.
pub mod config;
