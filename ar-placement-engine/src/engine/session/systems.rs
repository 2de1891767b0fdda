use bevy::prelude::*;

use super::provider::{AnchorEvent, ArSession, TrackingState};
use crate::engine::core::app_state::SessionState;
use crate::engine::core::config::PlacementConfig;
use crate::engine::lighting::LightingModeState;
use crate::engine::objects::ObjectRegistry;
use crate::engine::placement::{FocusIndicator, PlacementTracker};
use crate::tools::object_manager::ObjectReleased;

/// Pull one frame from the provider and apply it: session state, focus
/// tracking, anchor events in emission order, then the light estimate.
/// Does nothing when the provider has no new frame.
#[allow(clippy::too_many_arguments)]
pub fn process_ar_frame(
    mut session: ResMut<ArSession>,
    config: Res<PlacementConfig>,
    mut tracker: ResMut<PlacementTracker>,
    mut registry: ResMut<ObjectRegistry>,
    mut lighting: ResMut<LightingModeState>,
    state: Res<State<SessionState>>,
    mut next_state: ResMut<NextState<SessionState>>,
    mut released: EventWriter<ObjectReleased>,
    mut last_tracking: Local<Option<TrackingState>>,
) {
    let Some(frame) = session.next_frame() else {
        return;
    };

    if *last_tracking != Some(frame.tracking) {
        info!("Tracking state: {:?}", frame.tracking);
        *last_tracking = Some(frame.tracking);
    }

    match state.get() {
        SessionState::Running if frame.interrupted => {
            next_state.set(SessionState::Interrupted);
        }
        SessionState::Interrupted
            if !frame.interrupted && frame.tracking == TrackingState::Normal =>
        {
            next_state.set(SessionState::Running);
        }
        _ => {}
    }

    let hit = frame.hit.filter(|hit| config.detects(hit.alignment));
    tracker.update(hit);

    for event in &frame.anchor_events {
        match *event {
            AnchorEvent::Added { anchor, pose } | AnchorEvent::Updated { anchor, pose } => {
                registry.sync_pose(anchor, pose);
            }
            AnchorEvent::Removed { anchor } => {
                for record in registry.remove_bound_to(anchor) {
                    info!("{} lost with {}", record.handle(), anchor);
                    released.write(ObjectReleased {
                        handle: record.handle(),
                    });
                }
            }
        }
    }

    lighting.apply_estimate(frame.light_estimate);
}

/// Refresh the focus indicator from the tracker and what is currently in view.
pub fn update_focus_indicator(
    session: Res<ArSession>,
    tracker: Res<PlacementTracker>,
    registry: Res<ObjectRegistry>,
    mut indicator: ResMut<FocusIndicator>,
) {
    let provider = session.provider();
    // Hidden objects are not drawn, so they do not count as in view.
    let in_view = registry.visible_set(|record| {
        !record.is_hidden()
            && record
                .pose()
                .is_some_and(|pose| provider.in_frustum(pose))
    });

    indicator.refresh(tracker.state(), in_view.len());
}
