use engine::{Body, InputAction, InputSnapshot, InputSource, SceneKey, SceneWorld};

use super::encounter::{BOSS_BODY_NAME, ENCOUNTER_SCENE, PLAYER_BODY_NAME};
use super::high_score::HIGH_SCORE_SCENE;

const JUMP_TRIGGER_DISTANCE: f32 = 220.0;
const RETREAT_TICKS: u32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptStep {
    Type,
    Submit,
    Done,
}

/// Scripted input for headless runs: walks the player into the boss, backs
/// off after each strike, then types the configured name at the prompt.
pub(crate) struct Autopilot {
    player_name: String,
    retreat_ticks: u32,
    prompt_step: PromptStep,
}

impl Autopilot {
    pub(crate) fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            retreat_ticks: 0,
            prompt_step: PromptStep::Type,
        }
    }

    fn encounter_input(&mut self, world: &SceneWorld) -> InputSnapshot {
        let Some(player) = find_named(world, PLAYER_BODY_NAME) else {
            return InputSnapshot::empty();
        };
        let Some(boss) = find_named(world, BOSS_BODY_NAME) else {
            return InputSnapshot::empty();
        };

        let toward = if boss.position.x >= player.position.x {
            InputAction::MoveRight
        } else {
            InputAction::MoveLeft
        };
        let away = match toward {
            InputAction::MoveRight => InputAction::MoveLeft,
            _ => InputAction::MoveRight,
        };

        if player.overlaps(boss) && self.retreat_ticks == 0 {
            self.retreat_ticks = RETREAT_TICKS;
        }
        if self.retreat_ticks > 0 {
            self.retreat_ticks -= 1;
            return InputSnapshot::empty().with_action_down(away, true);
        }

        let close = (boss.position.x - player.position.x).abs() < JUMP_TRIGGER_DISTANCE;
        InputSnapshot::empty()
            .with_action_down(toward, true)
            .with_action_down(InputAction::Jump, close && player.grounded)
    }

    fn prompt_input(&mut self) -> InputSnapshot {
        match self.prompt_step {
            PromptStep::Type => {
                self.prompt_step = PromptStep::Submit;
                InputSnapshot::empty().with_typed_text(self.player_name.clone())
            }
            PromptStep::Submit => {
                self.prompt_step = PromptStep::Done;
                InputSnapshot::empty().with_action_down(InputAction::Submit, true)
            }
            PromptStep::Done => InputSnapshot::empty().with_quit_requested(true),
        }
    }
}

fn find_named<'a>(world: &'a SceneWorld, name: &str) -> Option<&'a Body> {
    world.bodies().iter().find(|body| body.debug_name == name)
}

impl InputSource for Autopilot {
    fn snapshot_for_tick(&mut self, scene: SceneKey, world: &SceneWorld) -> InputSnapshot {
        if scene == ENCOUNTER_SCENE {
            self.encounter_input(world)
        } else if scene == HIGH_SCORE_SCENE {
            self.prompt_input()
        } else {
            InputSnapshot::empty()
        }
    }
}
