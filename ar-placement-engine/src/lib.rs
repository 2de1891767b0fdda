//! Focus-point placement and virtual object lifecycle for AR scenes.
//!
//! ## Architecture
//!
//! ```text
//! ArSceneProvider ──frame──> PlacementTracker ──focus pose──┐
//!        ^                                                 v
//!        └──── anchors ──── place_at_focus_point <── ObjectRegistry <── AsyncComputeTaskPool loads
//! ```
//!
//! - [`engine::placement`]: focus tracking state machine and indicator.
//! - [`engine::objects`]: object records, background loading, registry.
//! - [`engine::session`]: provider contract, frame systems, scripted sessions.
//! - [`engine::lighting`]: exclusive lighting modes and light estimates.
//! - [`engine::core`]: config, session state and the Bevy plugin.
//! - [`tools`]: request/outcome events and the placement coordinator.

pub mod engine;
pub mod tools;

pub use engine::core::app_setup::{ArPlacementPlugin, FrameSet, create_app};
pub use engine::core::config::{ConfigError, PlacementConfig};
