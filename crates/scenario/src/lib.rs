use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod architecture;
mod faction;
mod link;
mod list;
mod lua_ai;
mod object;
mod person;
mod scenario;
mod strings;
mod table;
mod troop;
mod troop_animation;

#[cfg(test)]
mod test_fixtures;

pub use architecture::Architecture;
pub use faction::Faction;
pub use list::{DuplicateId, GameObjectList};
pub use lua_ai::{run_faction_ai, AiError, FACTION_AI_ENTRY};
pub use object::{
    get_field, get_field_string, satisfies, ExportedField, FieldValue, GameColor, GameObject,
    ObjectId,
};
pub use person::Person;
pub use scenario::{GameScenario, ResolveError, ScenarioError, UnresolvedScenario};
pub use strings::{GlobalStrings, StringKey, StringsError};
pub use table::{QuickEntry, TableError};
pub use troop::Troop;
pub use troop_animation::{AnimationBuildError, TroopAnimation, TroopAnimationBuilder};

pub const ROOT_ENV_VAR: &str = "WARRING_ROOT";

/// Well-known locations under the project root.
#[derive(Debug, Clone)]
pub struct ScenarioPaths {
    pub root: PathBuf,
    pub save_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub strings_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "WARRING_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or saves/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or saves/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/warring\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_scenario_paths() -> Result<ScenarioPaths, StartupError> {
    let root = resolve_root()?;
    let save_dir = root.join("saves");
    let scripts_dir = root.join("scripts");
    let strings_file = root.join("assets").join("strings.xml");

    Ok(ScenarioPaths {
        root,
        save_dir,
        scripts_dir,
        strings_file,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_saves = path.join("saves").is_dir();

    cargo_toml && (has_crates || has_saves)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_repo_marker(&cwd.join("definitely_not_a_marker")));
    }
}
