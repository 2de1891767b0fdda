use bevy::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use super::provider::{AnchorEvent, ArFrame, ArSceneProvider, ArSession, TrackingState};
use crate::engine::core::app_setup::FrameSet;
use crate::engine::lighting::{LightingMode, LightingModeRequested};
use crate::engine::objects::{ObjectHandle, ObjectRegistry};
use crate::engine::placement::{Alignment, AnchorId, SurfaceHit};
use crate::tools::object_manager::{PlacementRequested, RemovalRequested, SessionResetRequested};
use constants::placement::DEFAULT_TEMPLATE_ID;

/// Lowest id handed out for object anchors. Scripts naming higher plane
/// anchors push the first object anchor above them.
const FIRST_OBJECT_ANCHOR: u64 = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read session script {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse session script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Pose as written in scripts: translation plus an `[x, y, z, w]` quaternion.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptPose {
    pub translation: [f32; 3],
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl ScriptPose {
    fn to_transform(self) -> Transform {
        Transform::from_translation(Vec3::from_array(self.translation))
            .with_rotation(Quat::from_array(self.rotation).normalize())
    }
}

/// Simple view cone standing in for the camera frustum.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptView {
    pub origin: [f32; 3],
    pub forward: [f32; 3],
    pub half_angle_degrees: f32,
    pub far: f32,
}

impl Default for ScriptView {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0, 0.0],
            forward: [0.0, 0.0, -1.0],
            half_angle_degrees: 30.0,
            far: 20.0,
        }
    }
}

impl ScriptView {
    fn contains(&self, point: Vec3) -> bool {
        let to_point = point - Vec3::from_array(self.origin);
        let distance = to_point.length();
        if distance <= f32::EPSILON {
            return true;
        }
        if distance > self.far {
            return false;
        }
        let forward = Vec3::from_array(self.forward).normalize_or_zero();
        forward.angle_between(to_point) <= self.half_angle_degrees.to_radians()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptHit {
    pub pose: ScriptPose,
    #[serde(default)]
    pub anchor: Option<u64>,
    #[serde(default = "horizontal")]
    pub alignment: Alignment,
}

fn horizontal() -> Alignment {
    Alignment::Horizontal
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptAnchorEvent {
    Added { anchor: u64, pose: ScriptPose },
    Updated { anchor: u64, pose: ScriptPose },
    Removed { anchor: u64 },
}

impl ScriptAnchorEvent {
    fn anchor(&self) -> u64 {
        match *self {
            Self::Added { anchor, .. } | Self::Updated { anchor, .. } | Self::Removed { anchor } => {
                anchor
            }
        }
    }
}

impl From<ScriptAnchorEvent> for AnchorEvent {
    fn from(event: ScriptAnchorEvent) -> Self {
        match event {
            ScriptAnchorEvent::Added { anchor, pose } => AnchorEvent::Added {
                anchor: AnchorId(anchor),
                pose: pose.to_transform(),
            },
            ScriptAnchorEvent::Updated { anchor, pose } => AnchorEvent::Updated {
                anchor: AnchorId(anchor),
                pose: pose.to_transform(),
            },
            ScriptAnchorEvent::Removed { anchor } => AnchorEvent::Removed {
                anchor: AnchorId(anchor),
            },
        }
    }
}

/// Presentation-layer action replayed alongside a frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    Place {
        #[serde(default = "default_template")]
        template: String,
    },
    Remove {
        object: u64,
    },
    Reset,
    Lighting {
        mode: LightingMode,
    },
}

fn default_template() -> String {
    DEFAULT_TEMPLATE_ID.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptFrame {
    #[serde(default)]
    pub hit: Option<ScriptHit>,
    #[serde(default)]
    pub anchor_events: Vec<ScriptAnchorEvent>,
    #[serde(default)]
    pub tracking: TrackingState,
    #[serde(default)]
    pub interrupted: bool,
    #[serde(default)]
    pub light_estimate: Option<f32>,
    /// Replaces the view cone from this frame on.
    #[serde(default)]
    pub view: Option<ScriptView>,
    #[serde(default)]
    pub actions: Vec<ScriptAction>,
    /// Emit this frame several times; actions fire on the first copy only.
    #[serde(default = "one")]
    pub repeat: u32,
}

fn one() -> u32 {
    1
}

/// Recorded AR session: frames plus the user actions taken during them.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub view: ScriptView,
    pub frames: Vec<ScriptFrame>,
}

impl SessionScript {
    pub fn from_path(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Split into the provider replaying frames and the queue of user actions,
    /// both indexed by frame.
    pub fn into_parts(self) -> (ScriptedProvider, ScriptedActions) {
        let mut frames = VecDeque::new();
        let mut actions = VecDeque::new();
        let mut next_anchor = FIRST_OBJECT_ANCHOR;

        for frame in self.frames {
            let named = frame
                .hit
                .iter()
                .filter_map(|hit| hit.anchor)
                .chain(frame.anchor_events.iter().map(ScriptAnchorEvent::anchor));
            for anchor in named {
                next_anchor = next_anchor.max(anchor.saturating_add(1));
            }

            let ar_frame = ArFrame {
                hit: frame.hit.map(|hit| {
                    SurfaceHit::new(
                        hit.pose.to_transform(),
                        hit.anchor.map(AnchorId),
                        hit.alignment,
                    )
                }),
                anchor_events: frame.anchor_events.into_iter().map(Into::into).collect(),
                tracking: frame.tracking,
                interrupted: frame.interrupted,
                light_estimate: frame.light_estimate,
            };

            for copy in 0..frame.repeat.max(1) {
                frames.push_back((ar_frame.clone(), frame.view));
                actions.push_back(if copy == 0 {
                    frame.actions.clone()
                } else {
                    Vec::new()
                });
            }
        }

        let provider = ScriptedProvider {
            frames,
            view: self.view,
            anchors: BTreeMap::new(),
            next_anchor,
        };
        (provider, ScriptedActions { pending: actions })
    }
}

/// Provider replaying scripted frames in order.
pub struct ScriptedProvider {
    frames: VecDeque<(ArFrame, Option<ScriptView>)>,
    view: ScriptView,
    anchors: BTreeMap<AnchorId, Transform>,
    next_anchor: u64,
}

impl ScriptedProvider {
    pub fn remaining_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }
}

impl ArSceneProvider for ScriptedProvider {
    fn next_frame(&mut self) -> Option<ArFrame> {
        let (frame, view) = self.frames.pop_front()?;
        if let Some(view) = view {
            self.view = view;
        }
        for event in &frame.anchor_events {
            match *event {
                AnchorEvent::Added { anchor, pose } | AnchorEvent::Updated { anchor, pose } => {
                    self.anchors.insert(anchor, pose);
                }
                AnchorEvent::Removed { anchor } => {
                    self.anchors.remove(&anchor);
                }
            }
        }
        Some(frame)
    }

    fn add_anchor(&mut self, pose: Transform) -> AnchorId {
        let anchor = AnchorId(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(anchor, pose);
        anchor
    }

    fn remove_anchor(&mut self, anchor: AnchorId) {
        self.anchors.remove(&anchor);
    }

    fn in_frustum(&self, pose: &Transform) -> bool {
        self.view.contains(pose.translation)
    }

    fn reset(&mut self) {
        self.anchors.clear();
    }
}

/// User actions still to replay, one entry per scripted frame.
#[derive(Resource, Debug, Default)]
pub struct ScriptedActions {
    pending: VecDeque<Vec<ScriptAction>>,
}

impl ScriptedActions {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Replays scripted user actions and optionally exits once the script ends.
pub struct ScriptedSessionPlugin {
    actions: Vec<Vec<ScriptAction>>,
    exit_when_finished: bool,
}

impl ScriptedSessionPlugin {
    pub fn new(actions: ScriptedActions, exit_when_finished: bool) -> Self {
        Self {
            actions: actions.pending.into_iter().collect(),
            exit_when_finished,
        }
    }
}

impl Plugin for ScriptedSessionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ScriptedActions {
            pending: self.actions.iter().cloned().collect(),
        })
        .add_systems(
            Update,
            dispatch_scripted_actions
                .in_set(FrameSet::Input)
                .after(super::systems::process_ar_frame),
        );

        if self.exit_when_finished {
            app.add_systems(
                Update,
                exit_when_script_finished.in_set(FrameSet::Presentation),
            );
        }
    }
}

/// Turn this frame's scripted actions into presentation events.
pub fn dispatch_scripted_actions(
    mut actions: ResMut<ScriptedActions>,
    mut placements: EventWriter<PlacementRequested>,
    mut removals: EventWriter<RemovalRequested>,
    mut resets: EventWriter<SessionResetRequested>,
    mut lighting: EventWriter<LightingModeRequested>,
) {
    let Some(frame_actions) = actions.pending.pop_front() else {
        return;
    };

    for action in frame_actions {
        match action {
            ScriptAction::Place { template } => {
                placements.write(PlacementRequested {
                    template_id: template,
                });
            }
            ScriptAction::Remove { object } => {
                removals.write(RemovalRequested {
                    handle: ObjectHandle::from_raw(object),
                });
            }
            ScriptAction::Reset => {
                resets.write(SessionResetRequested);
            }
            ScriptAction::Lighting { mode } => {
                lighting.write(LightingModeRequested { mode });
            }
        }
    }
}

fn exit_when_script_finished(
    session: Res<ArSession>,
    actions: Res<ScriptedActions>,
    registry: Res<ObjectRegistry>,
    mut exit: EventWriter<AppExit>,
) {
    if !session.is_idle() || !actions.is_empty() {
        return;
    }

    let placed = registry.iter().filter(|r| r.anchor().is_some()).count();
    info!(
        "Scripted session finished after {} frames: {} objects, {} placed",
        session.frames_received(),
        registry.len(),
        placed
    );
    exit.write(AppExit::Success);
}
