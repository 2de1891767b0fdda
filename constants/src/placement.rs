/// Frame rate used by the headless session runner when none is configured.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Accepted frame rate range (Hz) for the headless runner.
pub const MIN_FRAME_RATE: f64 = 0.001;
pub const MAX_FRAME_RATE: f64 = 1000.0;

/// Plane detection defaults, horizontal surfaces only.
pub const DETECT_HORIZONTAL_PLANES: bool = true;
pub const DETECT_VERTICAL_PLANES: bool = false;

/// Template placed when a request does not name one.
pub const DEFAULT_TEMPLATE_ID: &str = "car";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILTER: &str = "ar_placement_engine=debug";
