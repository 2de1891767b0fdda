use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::placement::{AnchorId, SurfaceHit};

/// Camera tracking quality reported with each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    NotAvailable,
    Limited,
    #[default]
    Normal,
}

/// Anchor change emitted by the provider, applied in emission order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorEvent {
    Added { anchor: AnchorId, pose: Transform },
    Updated { anchor: AnchorId, pose: Transform },
    Removed { anchor: AnchorId },
}

impl AnchorEvent {
    pub fn anchor(&self) -> AnchorId {
        match self {
            Self::Added { anchor, .. } | Self::Updated { anchor, .. } | Self::Removed { anchor } => {
                *anchor
            }
        }
    }
}

/// Everything the provider reports for one captured frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArFrame {
    /// Screen-centre hit test against detected surfaces.
    pub hit: Option<SurfaceHit>,
    pub anchor_events: Vec<AnchorEvent>,
    pub tracking: TrackingState,
    /// Session was interrupted (app backgrounded, camera taken away).
    pub interrupted: bool,
    /// Ambient light estimate in lumens, when light estimation is running.
    pub light_estimate: Option<f32>,
}

/// Tracking, hit testing and anchors, supplied by the AR platform.
pub trait ArSceneProvider: Send + Sync + 'static {
    /// Next captured frame, or `None` if no new frame is available.
    fn next_frame(&mut self) -> Option<ArFrame>;

    /// Start tracking a new anchor at `pose`.
    fn add_anchor(&mut self, pose: Transform) -> AnchorId;

    fn remove_anchor(&mut self, anchor: AnchorId);

    /// Whether content at `pose` lies inside the current camera frustum.
    fn in_frustum(&self, pose: &Transform) -> bool;

    /// Restart tracking and drop every anchor.
    fn reset(&mut self);
}

/// Resource wrapping the active provider.
#[derive(Resource)]
pub struct ArSession {
    provider: Box<dyn ArSceneProvider>,
    frames_received: u64,
    idle: bool,
}

impl ArSession {
    pub fn new(provider: Box<dyn ArSceneProvider>) -> Self {
        Self {
            provider,
            frames_received: 0,
            idle: false,
        }
    }

    pub fn next_frame(&mut self) -> Option<ArFrame> {
        let frame = self.provider.next_frame();
        self.idle = frame.is_none();
        if frame.is_some() {
            self.frames_received += 1;
        }
        frame
    }

    pub fn provider(&self) -> &dyn ArSceneProvider {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn ArSceneProvider {
        self.provider.as_mut()
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// The last poll returned no frame.
    pub fn is_idle(&self) -> bool {
        self.idle
    }
}
