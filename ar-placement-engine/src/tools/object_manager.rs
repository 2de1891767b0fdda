use bevy::prelude::*;

use super::coordinator::{PlacementError, place_at_focus_point};
use crate::engine::objects::{ObjectHandle, ObjectRegistry};
use crate::engine::placement::{AnchorId, PlacementTracker};
use crate::engine::session::ArSession;

/// User picked a template to add to the scene.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequested {
    pub template_id: String,
}

/// User asked to delete one object.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalRequested {
    pub handle: ObjectHandle,
}

/// Restart tracking and clear the scene.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionResetRequested;

/// A loaded object was anchored at the focus point.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPlaced {
    pub handle: ObjectHandle,
    pub anchor: AnchorId,
}

/// A loaded object could not be placed and was removed again.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementFailed {
    pub handle: ObjectHandle,
    pub reason: PlacementError,
}

/// An object left the registry. Emitted exactly once per removed record.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectReleased {
    pub handle: ObjectHandle,
}

pub fn handle_placement_requests(
    mut requests: EventReader<PlacementRequested>,
    mut registry: ResMut<ObjectRegistry>,
) {
    for request in requests.read() {
        registry.request_placement(&request.template_id);
    }
}

pub fn handle_removal_requests(
    mut requests: EventReader<RemovalRequested>,
    mut registry: ResMut<ObjectRegistry>,
    mut session: ResMut<ArSession>,
    mut released: EventWriter<ObjectReleased>,
) {
    for request in requests.read() {
        let Some(record) = registry.remove(request.handle) else {
            debug!("Removal of {} ignored, not in registry", request.handle);
            continue;
        };

        if let Some(anchor) = record.anchor() {
            session.provider_mut().remove_anchor(anchor);
        }
        info!("Removed {}", record.handle());
        released.write(ObjectReleased {
            handle: record.handle(),
        });
    }
}

/// Any number of reset requests in one frame collapse into a single reset.
pub fn handle_session_reset(
    mut requests: EventReader<SessionResetRequested>,
    mut tracker: ResMut<PlacementTracker>,
    mut registry: ResMut<ObjectRegistry>,
    mut session: ResMut<ArSession>,
    mut released: EventWriter<ObjectReleased>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    let removed = registry.remove_all();
    info!("Session reset, releasing {} objects", removed.len());
    for record in removed {
        released.write(ObjectReleased {
            handle: record.handle(),
        });
    }

    tracker.reset();
    session.provider_mut().reset();
}

/// Apply finished loads and place each newly ready object at the focus point.
/// An object that cannot be placed is removed, as if the user deselected it.
pub fn apply_load_completions(
    mut registry: ResMut<ObjectRegistry>,
    tracker: Res<PlacementTracker>,
    mut session: ResMut<ArSession>,
    mut placed: EventWriter<ObjectPlaced>,
    mut failed: EventWriter<PlacementFailed>,
    mut released: EventWriter<ObjectReleased>,
) {
    for handle in registry.drain_completions() {
        match place_at_focus_point(&tracker, &mut registry, session.provider_mut(), handle) {
            Ok(anchor) => {
                placed.write(ObjectPlaced { handle, anchor });
            }
            Err(reason) => {
                warn!("Could not place {}: {}", handle, reason);
                if registry.remove(handle).is_some() {
                    released.write(ObjectReleased { handle });
                }
                failed.write(PlacementFailed { handle, reason });
            }
        }
    }
}
