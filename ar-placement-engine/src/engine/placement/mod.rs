//! Focus-point tracking for object placement.
//!
//! Each frame the AR provider's screen-centre hit test feeds
//! [`PlacementTracker`], a two-state machine:
//!
//! ```text
//! Initializing ──hit──> Detecting(hit)
//!      ^                  │    ^
//!      └──────no hit──────┘    └─ hit (latest always wins)
//! ```
//!
//! No smoothing is applied. Losing the surface for one frame drops back to
//! `Initializing` so objects are never placed against a surface that is no
//! longer visible.

/// Focus indicator visibility and placement availability.
pub mod focus_indicator;

/// Surface hit-test snapshots, alignment tags and anchor identifiers.
pub mod surface;

/// Placement state machine driven by per-frame hit results.
pub mod tracker;

pub use focus_indicator::FocusIndicator;
pub use surface::{Alignment, AnchorId, SurfaceHit};
pub use tracker::{PlacementState, PlacementTracker};
