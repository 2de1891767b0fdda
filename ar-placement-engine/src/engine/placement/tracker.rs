use bevy::prelude::*;

use super::surface::{Alignment, SurfaceHit};

/// Where the focus indicator currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlacementState {
    /// No usable surface found yet.
    #[default]
    Initializing,
    /// A usable surface is tracked at `hit`.
    Detecting { hit: SurfaceHit },
}

impl PlacementState {
    pub fn hit(&self) -> Option<&SurfaceHit> {
        match self {
            Self::Initializing => None,
            Self::Detecting { hit } => Some(hit),
        }
    }

    pub fn is_detecting(&self) -> bool {
        matches!(self, Self::Detecting { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Detecting { .. } => "detecting",
        }
    }
}

/// Per-frame focus state machine.
///
/// The next state is a function of the latest hit only: a missing hit always
/// collapses to `Initializing`, a present hit always replaces the previous one.
#[derive(Resource, Debug, Default)]
pub struct PlacementTracker {
    state: PlacementState,
}

impl PlacementTracker {
    pub fn update(&mut self, hit: Option<SurfaceHit>) -> PlacementState {
        let next = match hit {
            Some(hit) => PlacementState::Detecting { hit },
            None => PlacementState::Initializing,
        };

        if next.label() != self.state.label() {
            debug!("Focus state: {} -> {}", self.state.label(), next.label());
        }

        self.state = next;
        next
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn current_alignment(&self) -> Option<Alignment> {
        self.state.hit().map(|hit| hit.alignment)
    }

    /// Pose a new object would be placed at, if a surface is tracked.
    pub fn focus_pose(&self) -> Option<Transform> {
        self.state.hit().map(|hit| hit.pose)
    }

    /// Back to `Initializing`, used when the AR session itself restarts.
    pub fn reset(&mut self) {
        self.state = PlacementState::Initializing;
    }
}
