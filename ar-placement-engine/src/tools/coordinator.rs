use bevy::prelude::*;

use crate::engine::objects::{ObjectHandle, ObjectRegistry, RegistryError};
use crate::engine::placement::{AnchorId, PlacementTracker};
use crate::engine::session::ArSceneProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("no surface under the focus point")]
    NoSurface,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Anchor a ready object at the current focus point.
///
/// Scale carried by the hit pose is dropped so the object keeps its own size.
/// On failure nothing is left behind: an anchor created for a rejected attach
/// is removed again.
pub fn place_at_focus_point(
    tracker: &PlacementTracker,
    registry: &mut ObjectRegistry,
    provider: &mut dyn ArSceneProvider,
    handle: ObjectHandle,
) -> Result<AnchorId, PlacementError> {
    let pose = tracker
        .focus_pose()
        .ok_or(PlacementError::NoSurface)?
        .with_scale(Vec3::ONE);

    let anchor = provider.add_anchor(pose);
    if let Err(err) = registry.attach(handle, pose, anchor) {
        provider.remove_anchor(anchor);
        return Err(err.into());
    }

    info!("Placed {} at {:?} on {}", handle, pose.translation, anchor);
    Ok(anchor)
}
