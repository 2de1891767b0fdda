//! Bridge between the AR platform and the placement core.
//!
//! The platform is abstracted as an [`ArSceneProvider`] held by the
//! [`ArSession`] resource. Once per `Update` the frame systems poll it:
//!
//! ```text
//! ArSceneProvider::next_frame
//!        │
//!        ├─ interrupted / tracking ──> SessionState (hide / show objects)
//!        ├─ hit (alignment filtered) ──> PlacementTracker::update
//!        ├─ anchor events (in order) ──> ObjectRegistry::sync_pose / remove_bound_to
//!        └─ light estimate ──> LightingModeState
//! ```
//!
//! [`scripted`] replays recorded sessions from JSON for the headless binary
//! and the integration tests.

/// Provider contract, per-frame input types and the session resource.
pub mod provider;

/// JSON-scripted provider and action replay.
pub mod scripted;

/// Frame systems applying provider input to the core resources.
pub mod systems;

pub use provider::{AnchorEvent, ArFrame, ArSceneProvider, ArSession, TrackingState};
pub use scripted::{ScriptError, ScriptedActions, ScriptedProvider, ScriptedSessionPlugin, SessionScript};
