use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::sync::Arc;
use std::time::Duration;

// Crate engine modules
use crate::engine::core::app_state::{
    SessionState, hide_objects_on_interruption, show_objects_on_resume,
};
use crate::engine::core::config::PlacementConfig;
use crate::engine::lighting::{LightingModeRequested, LightingModeState, lighting_mode_system};
use crate::engine::objects::{CatalogLoader, ObjectRegistry};
use crate::engine::placement::{FocusIndicator, PlacementTracker};
use crate::engine::session::systems::{process_ar_frame, update_focus_indicator};
use crate::engine::session::{ArSceneProvider, ArSession};
// Crate tools modules
use crate::tools::object_manager::{
    ObjectPlaced, ObjectReleased, PlacementFailed, PlacementRequested, RemovalRequested,
    SessionResetRequested, apply_load_completions, handle_placement_requests,
    handle_removal_requests, handle_session_reset,
};

/// Per-frame phases, run in this order inside `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Provider frame: session state, tracker, anchor events, light estimate.
    Input,
    /// Presentation requests: lighting, reset, removal, new placements.
    Requests,
    /// Drained load completions and automatic placement.
    Completions,
    /// Focus indicator and other derived presentation state.
    Presentation,
}

/// Registers the placement core: resources, events and the frame systems.
///
/// The frame systems only run once an [`ArSession`] resource is present.
/// An [`ObjectRegistry`] inserted before this plugin is kept, so callers can
/// supply their own content loader.
pub struct ArPlacementPlugin {
    config: PlacementConfig,
}

impl ArPlacementPlugin {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ArPlacementPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<StatesPlugin>() {
            app.add_plugins(StatesPlugin);
        }

        let config = self.config.clone();
        if !app.world().contains_resource::<ObjectRegistry>() {
            let loader = Arc::new(CatalogLoader::new(config.catalog.clone()));
            app.insert_resource(ObjectRegistry::new(
                loader,
                config.duplicate_completion_policy,
            ));
        }

        app.insert_resource(LightingModeState::new(config.lighting))
            .insert_resource(config)
            .init_state::<SessionState>()
            .init_resource::<PlacementTracker>()
            .init_resource::<FocusIndicator>()
            .add_event::<PlacementRequested>()
            .add_event::<RemovalRequested>()
            .add_event::<SessionResetRequested>()
            .add_event::<LightingModeRequested>()
            .add_event::<ObjectPlaced>()
            .add_event::<PlacementFailed>()
            .add_event::<ObjectReleased>();

        app.configure_sets(
            Update,
            (
                FrameSet::Input,
                FrameSet::Requests,
                FrameSet::Completions,
                FrameSet::Presentation,
            )
                .chain()
                .run_if(resource_exists::<ArSession>),
        );

        // Every registry mutation happens in this chain, one system at a time.
        app.add_systems(Update, process_ar_frame.in_set(FrameSet::Input))
            .add_systems(
                Update,
                (
                    lighting_mode_system,
                    handle_session_reset,
                    handle_removal_requests,
                    handle_placement_requests,
                )
                    .chain()
                    .in_set(FrameSet::Requests),
            )
            .add_systems(
                Update,
                apply_load_completions.in_set(FrameSet::Completions),
            )
            .add_systems(
                Update,
                update_focus_indicator.in_set(FrameSet::Presentation),
            );

        app.add_systems(
            OnEnter(SessionState::Interrupted),
            hide_objects_on_interruption,
        )
        .add_systems(OnExit(SessionState::Interrupted), show_objects_on_resume);
    }
}

/// Headless app driving `provider` at the configured frame rate.
pub fn create_app(config: PlacementConfig, provider: Box<dyn ArSceneProvider>) -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
        Duration::from_secs_f64(1.0 / config.frame_rate),
    )))
    .add_plugins(LogPlugin {
        level: config.log_level(),
        filter: config.log_filter.clone(),
        ..default()
    })
    .insert_resource(ArSession::new(provider))
    .add_plugins(ArPlacementPlugin::new(config));

    app
}
