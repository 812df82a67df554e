//! Score capture after a boss defeat: the name prompt, the persisted score
//! board and the scene that ties them together.

mod name_prompt;
mod scene;
mod scores;

pub(crate) use name_prompt::validate_name;
pub(crate) use scene::{HighScoreScene, HIGH_SCORE_SCENE};
pub(crate) use scores::ScoreBoard;
