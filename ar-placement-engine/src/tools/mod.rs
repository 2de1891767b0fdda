//! Presentation-facing placement tools.
//!
//! The presentation layer never touches the registry directly. It sends
//! request events and observes outcome events:
//!
//! ```text
//! PlacementRequested ──> request_placement ──> (background load)
//!                                                   │
//!                        apply_load_completions <───┘
//!                          ├─> place_at_focus_point ok ──> ObjectPlaced
//!                          └─> NoSurface / rejected ─────> ObjectReleased + PlacementFailed
//!
//! RemovalRequested ──────> remove + anchor removal ──> ObjectReleased
//! SessionResetRequested ─> remove_all (newest first) ─> ObjectReleased × n
//! ```

/// Placement of ready objects at the focus point.
pub mod coordinator;

/// Request and outcome events plus the systems handling them.
pub mod object_manager;
