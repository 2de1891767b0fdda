use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::placement::AnchorId;

/// Stable identifier of a placed object, valid until the object is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    /// Rebuild a handle from its raw id, e.g. one echoed back by a frontend.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Ready,
}

/// Renderable content produced by a content loader.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectContent {
    pub template_id: String,
    pub scene_path: String,
    /// Bounding box size in metres.
    pub size: Vec3,
}

/// One placed virtual object.
///
/// Owned by the registry; outside code only sees shared references or the
/// record handed back on removal.
#[derive(Debug)]
pub struct VirtualObjectRecord {
    handle: ObjectHandle,
    template_id: String,
    status: LoadStatus,
    content: Option<ObjectContent>,
    anchor: Option<AnchorId>,
    pose: Option<Transform>,
    hidden: bool,
}

impl VirtualObjectRecord {
    pub(crate) fn pending(handle: ObjectHandle, template_id: &str) -> Self {
        Self {
            handle,
            template_id: template_id.to_string(),
            status: LoadStatus::Pending,
            content: None,
            anchor: None,
            pose: None,
            hidden: false,
        }
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == LoadStatus::Ready
    }

    pub fn content(&self) -> Option<&ObjectContent> {
        self.content.as_ref()
    }

    pub fn anchor(&self) -> Option<AnchorId> {
        self.anchor
    }

    pub fn pose(&self) -> Option<&Transform> {
        self.pose.as_ref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Give up ownership of the loaded content, releasing the record.
    pub fn into_content(self) -> Option<ObjectContent> {
        self.content
    }

    pub(crate) fn mark_ready(&mut self, content: ObjectContent) {
        self.status = LoadStatus::Ready;
        self.content = Some(content);
    }

    pub(crate) fn bind(&mut self, pose: Transform, anchor: AnchorId) {
        self.pose = Some(pose);
        self.anchor = Some(anchor);
    }

    pub(crate) fn set_pose(&mut self, pose: Transform) {
        self.pose = Some(pose);
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}
