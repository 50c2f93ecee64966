mod settings;
mod turn;

use scenario::{
    resolve_scenario_paths, GameScenario, GlobalStrings, ScenarioError, StartupError,
    StringsError, TableError,
};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::settings::{Settings, SettingsError};
use crate::turn::run_turn;

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Strings(#[from] StringsError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Save(#[from] TableError),
}

fn main() {
    init_tracing();
    info!("=== Warring Startup ===");

    if let Err(err) = run() {
        error!(error = %err, "run_failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), RunError> {
    let paths = resolve_scenario_paths()?;
    let settings = Settings::load_or_default(&paths.root.join("settings.json"))?;
    let strings = GlobalStrings::load_or_default(&paths.strings_file)?;
    let scenario = GameScenario::load(&paths.save_dir, strings)?;
    let script = paths.scripts_dir.join(&settings.script);

    for turn in 1..=settings.turns {
        let report = run_turn(&scenario, &script);
        info!(
            turn,
            factions_run = report.factions_run,
            script_failures = report.script_failures,
            "turn_completed"
        );
    }

    scenario.save(&paths.save_dir)?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
