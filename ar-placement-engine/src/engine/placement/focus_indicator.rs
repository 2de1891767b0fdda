use bevy::prelude::*;

use super::tracker::PlacementState;

/// Presentation-facing snapshot of the focus indicator.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusIndicator {
    /// Indicator is drawn only while no placed object is in view.
    pub visible: bool,
    /// A surface is tracked, so "add object" can be enabled.
    pub placement_available: bool,
}

impl Default for FocusIndicator {
    fn default() -> Self {
        Self {
            visible: true,
            placement_available: false,
        }
    }
}

impl FocusIndicator {
    pub fn refresh(&mut self, state: PlacementState, objects_in_view: usize) {
        let visible = objects_in_view == 0;
        let placement_available = state.is_detecting();

        if visible != self.visible {
            debug!("Focus indicator {}", if visible { "shown" } else { "hidden" });
        }

        self.visible = visible;
        self.placement_available = placement_available;
    }
}
