mod compiler;
mod database;

pub use compiler::{
    compile_stage_database, parse_stage_defs, ContentCompileError, ContentErrorCode,
    SourceLocation,
};
pub use database::{BossBehaviorKind, StageDatabase, StageDef};
