use std::env;
use std::str::FromStr;

use engine::{
    compile_stage_database, resolve_app_paths, FileKeyValueStore, LoopConfig, Scene, SceneKey,
    ScenePayload,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::autopilot::Autopilot;
use super::encounter::{build_encounter_scene, DEFAULT_CHARACTER, ENCOUNTER_SCENE};
use super::high_score::{validate_name, HighScoreScene, ScoreBoard};

const STAGE_ENV_VAR: &str = "DETENTION_STAGE";
const CHARACTER_ENV_VAR: &str = "DETENTION_CHARACTER";
const PLAYER_NAME_ENV_VAR: &str = "DETENTION_PLAYER_NAME";
const SEED_ENV_VAR: &str = "DETENTION_SEED";
const REALTIME_ENV_VAR: &str = "DETENTION_REALTIME";

const DEFAULT_STAGE: u32 = 1;
const DEFAULT_PLAYER_NAME: &str = "AAA";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scenes: Vec<Box<dyn Scene>>,
    pub(crate) initial_scene: SceneKey,
    pub(crate) initial_payload: ScenePayload,
    pub(crate) input: Autopilot,
}

pub(crate) fn build_app() -> Result<AppWiring, String> {
    init_tracing();
    info!("=== Detention Dash Startup ===");

    let paths = resolve_app_paths().map_err(|error| format!("resolve app paths: {error}"))?;
    let stages = compile_stage_database(&paths.stages_file())
        .map_err(|error| format!("compile stages: {error}"))?;
    info!(
        root = %paths.root.display(),
        stage_count = stages.stages().len(),
        store = %paths.store_file().display(),
        "startup"
    );

    let stage = env_or_default(STAGE_ENV_VAR, DEFAULT_STAGE);
    let character = env::var(CHARACTER_ENV_VAR)
        .ok()
        .map(|raw| raw.trim().to_ascii_lowercase())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| DEFAULT_CHARACTER.to_string());
    let player_name = player_name_from_env();
    let rng_seed = env::var(SEED_ENV_VAR)
        .ok()
        .and_then(|raw| parse_or_warn::<u64>(SEED_ENV_VAR, &raw));
    let realtime = env::var(REALTIME_ENV_VAR)
        .ok()
        .is_some_and(|raw| parse_flag(&raw));

    let board = ScoreBoard::new(Box::new(FileKeyValueStore::open(paths.store_file())));
    let scenes = vec![
        build_encounter_scene(stages, rng_seed),
        Box::new(HighScoreScene::new(board)) as Box<dyn Scene>,
    ];

    Ok(AppWiring {
        config: LoopConfig {
            realtime,
            ..LoopConfig::default()
        },
        scenes,
        initial_scene: ENCOUNTER_SCENE,
        initial_payload: ScenePayload {
            character_key: Some(character),
            elapsed_seconds: None,
            stage: Some(stage),
        },
        input: Autopilot::new(player_name),
    })
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

fn env_or_default<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|raw| parse_or_warn(var, &raw))
        .unwrap_or(default)
}

fn parse_or_warn<T: FromStr>(var: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var, value = raw, "invalid_env_value_using_default");
            None
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn player_name_from_env() -> String {
    let Ok(raw) = env::var(PLAYER_NAME_ENV_VAR) else {
        return DEFAULT_PLAYER_NAME.to_string();
    };
    match validate_name(&raw) {
        Ok(name) => name,
        Err(error) => {
            warn!(var = PLAYER_NAME_ENV_VAR, error = %error, "invalid_env_value_using_default");
            DEFAULT_PLAYER_NAME.to_string()
        }
    }
}
