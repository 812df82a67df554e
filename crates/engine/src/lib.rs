pub mod app;
pub mod content;
mod paths;
pub mod storage;

pub use app::{
    run_app, AppError, Body, BodyDesc, Camera2D, CameraShake, Contact, EntityId, ExitReason,
    FiredTimer, InputAction, InputSnapshot, InputSource, LoopConfig, LoopMetricsSnapshot,
    RunSummary, Scene, SceneCommand, SceneKey, ScenePayload, SceneWorld, Scheduler, TimerId, Vec2,
    WorldConfig,
};
pub use content::{
    compile_stage_database, BossBehaviorKind, ContentCompileError, ContentErrorCode,
    SourceLocation, StageDatabase, StageDef,
};
pub use paths::{
    app_paths_for_root, resolve_app_paths, AppPaths, StartupError, ROOT_ENV_VAR, STAGES_FILE_NAME,
    STORE_FILE_NAME,
};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StoreError};
