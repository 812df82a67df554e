mod autopilot;
pub(crate) mod bootstrap;
mod encounter;
mod high_score;
pub(crate) mod loop_runner;
