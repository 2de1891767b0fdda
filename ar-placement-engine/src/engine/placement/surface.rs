use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Orientation class of a detected real-world surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Horizontal,
    Vertical,
}

/// Identifier of a point or plane tracked by the AR scene provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Hit-test result for a single frame.
///
/// Created fresh every frame by the provider and never stored beyond the
/// tracker's current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub pose: Transform,
    /// Surface anchor the hit was computed against, if the provider knows it.
    pub anchor: Option<AnchorId>,
    pub alignment: Alignment,
}

impl SurfaceHit {
    pub fn new(pose: Transform, anchor: Option<AnchorId>, alignment: Alignment) -> Self {
        Self {
            pose,
            anchor,
            alignment,
        }
    }

    /// Horizontal hit at `translation` with no anchor reference.
    pub fn horizontal_at(translation: Vec3) -> Self {
        Self::new(
            Transform::from_translation(translation),
            None,
            Alignment::Horizontal,
        )
    }
}
