/// Ambient intensity (lumens) that maps to a lighting environment intensity of 1.0.
pub const BASE_INTENSITY: f32 = 1000.0;

/// Lower bound applied to estimated spot light intensity.
pub const ESTIMATED_LIGHT_MIN: f32 = 600.0;

/// Upper bound applied to estimated spot light intensity.
pub const ESTIMATED_LIGHT_MAX: f32 = 1400.0;
