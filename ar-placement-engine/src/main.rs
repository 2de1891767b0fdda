use anyhow::Context;
use ar_placement_engine::engine::session::{ScriptedSessionPlugin, SessionScript};
use ar_placement_engine::{PlacementConfig, create_app};
use bevy::prelude::*;
use clap::Parser;
use constants::path::{DEFAULT_CONFIG_PATH, DEFAULT_SCRIPT_PATH};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ar-placement-engine")]
#[command(about = "Replay a scripted AR session through the placement engine", long_about = None)]
struct Cli {
    /// Placement config (JSON). Defaults apply when omitted and the default file is absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scripted session to replay
    #[arg(short, long, default_value = DEFAULT_SCRIPT_PATH)]
    script: PathBuf,

    /// Override the configured frame rate (Hz)
    #[arg(long)]
    frame_rate: Option<f64>,

    /// Keep running after the script has been replayed
    #[arg(long)]
    keep_running: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<PlacementConfig> {
    let mut config = match &cli.config {
        Some(path) => PlacementConfig::from_path(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                PlacementConfig::from_path(&default_path)?
            } else {
                PlacementConfig::default()
            }
        }
    };

    if let Some(frame_rate) = cli.frame_rate {
        config.frame_rate = frame_rate;
        config.validate()?;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let script = SessionScript::from_path(&cli.script)
        .with_context(|| format!("loading session script {}", cli.script.display()))?;
    let (provider, actions) = script.into_parts();

    let mut app = create_app(config, Box::new(provider));
    app.add_plugins(ScriptedSessionPlugin::new(actions, !cli.keep_running));

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("session exited with code {}", code),
    }
}
