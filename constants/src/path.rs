pub const DEFAULT_CONFIG_PATH: &str = "assets/placement_config.json";
pub const DEFAULT_SCRIPT_PATH: &str = "assets/scripted_session.json";
