//! Lighting mode control.
//!
//! One exclusive [`LightingMode`] is active at a time. The frame system
//! publishes the intensities a renderer would apply in [`LightingModeState`]:
//!
//! ```text
//! light estimate (lm) ──> environment_intensity = estimate / base_intensity
//!                    └──> spot_intensity = clamp(estimate, min, max)   (LightEstimation only)
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use constants::lighting::{BASE_INTENSITY, ESTIMATED_LIGHT_MAX, ESTIMATED_LIGHT_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingMode {
    #[default]
    Default,
    Ambient,
    LightEstimation,
    EnvironmentMap,
}

/// Lighting section of the placement config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// Ambient intensity in lumens that maps to an environment intensity of 1.0.
    pub base_intensity: f32,
    pub spot_min: f32,
    pub spot_max: f32,
    pub initial_mode: LightingMode,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            base_intensity: BASE_INTENSITY,
            spot_min: ESTIMATED_LIGHT_MIN,
            spot_max: ESTIMATED_LIGHT_MAX,
            initial_mode: LightingMode::Default,
        }
    }
}

impl LightingSettings {
    pub fn environment_intensity(&self, estimate: Option<f32>) -> f32 {
        match estimate {
            Some(ambient) => ambient / self.base_intensity,
            None => 1.0,
        }
    }

    pub fn spot_intensity(&self, estimate: f32) -> f32 {
        estimate.clamp(self.spot_min, self.spot_max)
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LightingModeState {
    pub current_mode: LightingMode,
    pub environment_intensity: f32,
    /// Only set while `LightEstimation` is active and an estimate is available.
    pub spot_intensity: Option<f32>,
    pub settings: LightingSettings,
}

impl Default for LightingModeState {
    fn default() -> Self {
        Self::new(LightingSettings::default())
    }
}

impl LightingModeState {
    pub fn new(settings: LightingSettings) -> Self {
        Self {
            current_mode: settings.initial_mode,
            environment_intensity: 1.0,
            spot_intensity: None,
            settings,
        }
    }

    /// Recompute published intensities from this frame's estimate.
    pub fn apply_estimate(&mut self, estimate: Option<f32>) {
        self.environment_intensity = self.settings.environment_intensity(estimate);
        self.spot_intensity = match (self.current_mode, estimate) {
            (LightingMode::LightEstimation, Some(ambient)) => {
                Some(self.settings.spot_intensity(ambient))
            }
            _ => None,
        };
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingModeRequested {
    pub mode: LightingMode,
}

/// Switch lighting mode on request. The last request in a frame wins.
pub fn lighting_mode_system(
    mut requests: EventReader<LightingModeRequested>,
    mut lighting: ResMut<LightingModeState>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };

    if request.mode != lighting.current_mode {
        info!("Lighting mode: {:?} -> {:?}", lighting.current_mode, request.mode);
        lighting.current_mode = request.mode;
        if request.mode != LightingMode::LightEstimation {
            lighting.spot_intensity = None;
        }
    }
}
