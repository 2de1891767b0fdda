use bevy::prelude::*;

use crate::engine::objects::ObjectRegistry;

/// AR session lifecycle.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum SessionState {
    #[default]
    Running,
    /// App backgrounded or camera lost; placed objects are hidden.
    Interrupted,
}

pub fn hide_objects_on_interruption(mut registry: ResMut<ObjectRegistry>) {
    info!("→ Session interrupted, hiding {} objects", registry.len());
    registry.set_all_hidden(true);
}

pub fn show_objects_on_resume(mut registry: ResMut<ObjectRegistry>) {
    info!("→ Session resumed, showing {} objects", registry.len());
    registry.set_all_hidden(false);
}
