//! Locating the project root and the files the game reads and writes under it.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ROOT_ENV_VAR: &str = "DETENTION_ROOT";
pub const STAGES_FILE_NAME: &str = "stages.xml";
pub const STORE_FILE_NAME: &str = "local_storage.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl AppPaths {
    pub fn stages_file(&self) -> PathBuf {
        self.base_content_dir.join(STAGES_FILE_NAME)
    }

    pub fn store_file(&self) -> PathBuf {
        self.save_dir.join(STORE_FILE_NAME)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("environment variable {var} is not valid unicode: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("cannot locate the running executable: {0}")]
    CurrentExe(#[source] io::Error),
    #[error("executable path {0} has no parent directory")]
    ExeHasNoParent(PathBuf),
    #[error("cannot create save directory {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("DETENTION_ROOT={path} is not a project root (needs Cargo.toml plus crates/ or assets/)")]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "no project root above {start_dir} (looked for Cargo.toml plus crates/ or assets/); \
set DETENTION_ROOT, e.g. `export DETENTION_ROOT=/path/to/detention-dash`"
    )]
    RootNotFound { start_dir: PathBuf },
}

/// Honors [`ROOT_ENV_VAR`] first, then walks up from the executable.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let candidate = canonical_or_raw(Path::new(&value));
            if !is_project_root(&candidate) {
                return Err(StartupError::InvalidEnvRoot { path: candidate });
            }
            candidate
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: canonical_or_raw(exe_dir),
            })?
        }
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: ROOT_ENV_VAR,
                source,
            })
        }
    };
    app_paths_for_root(root)
}

/// Derives every path from `root` and makes sure the save directory exists.
pub fn app_paths_for_root(root: PathBuf) -> Result<AppPaths, StartupError> {
    let save_dir = root.join("saves");
    fs::create_dir_all(&save_dir).map_err(|source| StartupError::CreateSaveDir {
        path: save_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        base_content_dir: root.join("assets").join("base"),
        save_dir,
        root,
    })
}

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_project_root(candidate))
        .map(canonical_or_raw)
}

fn is_project_root(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && (path.join("crates").is_dir() || path.join("assets").is_dir())
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
