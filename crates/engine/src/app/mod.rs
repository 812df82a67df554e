mod input;
mod loop_runner;
mod metrics;
mod physics;
mod scene;
mod scheduler;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, ExitReason, InputSource, LoopConfig, RunSummary};
pub use metrics::LoopMetricsSnapshot;
pub use physics::{Body, BodyDesc, Contact, WorldConfig};
pub use scene::{
    Camera2D, CameraShake, EntityId, InputSnapshot, Scene, SceneCommand, SceneKey, ScenePayload,
    SceneWorld, Vec2,
};
pub use scheduler::{FiredTimer, Scheduler, TimerId};
