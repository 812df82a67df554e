use engine::{InputAction, InputSnapshot, Scene, SceneCommand, SceneKey, ScenePayload, SceneWorld};
use tracing::{debug, info, warn};

use super::name_prompt::{NamePrompt, PromptOutcome};
use super::scores::{format_leaderboard_line, ScoreBoard, ScoreRecord};

pub(crate) const HIGH_SCORE_SCENE: SceneKey = SceneKey("high_score");

#[derive(Debug, Clone, PartialEq)]
struct PendingScore {
    elapsed_seconds: f64,
    stage: u32,
    character: Option<String>,
}

/// Collects a name for the score captured at boss defeat, appends it, then
/// logs the stage leaderboard and quits.
pub(crate) struct HighScoreScene {
    board: ScoreBoard,
    prompt: NamePrompt,
    pending: Option<PendingScore>,
}

impl HighScoreScene {
    pub(crate) fn new(board: ScoreBoard) -> Self {
        Self {
            board,
            prompt: NamePrompt::new(),
            pending: None,
        }
    }

    fn save(&mut self, name: String, pending: &PendingScore) {
        let record = ScoreRecord {
            name,
            score: pending.elapsed_seconds,
            stage: pending.stage,
        };
        match self.board.append_score(record.clone()) {
            Ok(stored) => info!(
                name = %record.name,
                score = record.score,
                stage = record.stage,
                character = pending.character.as_deref().unwrap_or("unknown"),
                stored = stored.len(),
                "score_saved"
            ),
            Err(error) => warn!(error = %error, "score_save_failed"),
        }

        for (index, entry) in self.board.leaderboard(Some(pending.stage)).iter().enumerate() {
            info!(
                stage = pending.stage,
                line = %format_leaderboard_line(index + 1, entry),
                "leaderboard"
            );
        }
    }
}

impl Scene for HighScoreScene {
    fn key(&self) -> SceneKey {
        HIGH_SCORE_SCENE
    }

    fn load(&mut self, payload: &ScenePayload, _world: &mut SceneWorld) {
        self.prompt = NamePrompt::new();
        self.pending = match (payload.elapsed_seconds, payload.stage) {
            (Some(elapsed_seconds), Some(stage)) => Some(PendingScore {
                elapsed_seconds,
                stage,
                character: payload.character_key.clone(),
            }),
            _ => {
                warn!("high_score_without_captured_score");
                None
            }
        };
        if let Some(pending) = &self.pending {
            info!(
                stage = pending.stage,
                elapsed_seconds = pending.elapsed_seconds,
                "name_prompt_opened"
            );
        }
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(pending) = self.pending.clone() else {
            return SceneCommand::Quit;
        };

        if !input.typed_text().is_empty() {
            self.prompt.input_text(input.typed_text());
        }
        if !input.is_down(InputAction::Submit) {
            return SceneCommand::None;
        }

        match self.prompt.submit() {
            PromptOutcome::Accepted(name) => {
                self.save(name, &pending);
                self.pending = None;
                SceneCommand::Quit
            }
            PromptOutcome::Rejected(reason) => {
                debug!(reason = %reason, value = self.prompt.value(), "name_rejected");
                SceneCommand::None
            }
        }
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.pending = None;
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        self.pending.as_ref().map(|pending| {
            format!(
                "Enter your name: {} | Time: {:.2}s",
                self.prompt.value(),
                pending.elapsed_seconds
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use engine::{KeyValueStore, MemoryKeyValueStore, StoreError};

    use super::*;

    /// Memory store whose contents stay observable after the scene takes ownership.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryKeyValueStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.borrow_mut().set(key, value)
        }
    }

    fn captured(elapsed_seconds: f64, stage: u32) -> ScenePayload {
        ScenePayload {
            character_key: Some("violet".to_string()),
            elapsed_seconds: Some(elapsed_seconds),
            stage: Some(stage),
        }
    }

    fn submit() -> InputSnapshot {
        InputSnapshot::empty().with_action_down(InputAction::Submit, true)
    }

    #[test]
    fn accepted_name_appends_record_and_quits() {
        let store = SharedStore::default();
        store
            .0
            .borrow_mut()
            .set("highScores", r#"[{"name":"B","score":50.0,"stage":1}]"#)
            .expect("seed");
        let mut scene = HighScoreScene::new(ScoreBoard::new(Box::new(store.clone())));
        let mut world = SceneWorld::default();
        scene.load(&captured(45.67, 1), &mut world);

        let typed = InputSnapshot::empty().with_typed_text("a-b-c");
        assert_eq!(scene.update(0.016, &typed, &mut world), SceneCommand::None);
        assert_eq!(scene.update(0.016, &submit(), &mut world), SceneCommand::Quit);

        let stored = store.get("highScores").expect("get").expect("value");
        assert_eq!(
            stored,
            r#"[{"name":"ABC","score":45.67,"stage":1},{"name":"B","score":50.0,"stage":1}]"#
        );
    }

    #[test]
    fn short_name_is_rejected_and_prompt_stays_open() {
        let store = SharedStore::default();
        let mut scene = HighScoreScene::new(ScoreBoard::new(Box::new(store.clone())));
        let mut world = SceneWorld::default();
        scene.load(&captured(30.0, 2), &mut world);

        let typed_and_submitted = submit().with_typed_text("z!");
        assert_eq!(
            scene.update(0.016, &typed_and_submitted, &mut world),
            SceneCommand::None
        );
        assert_eq!(store.get("highScores").expect("get"), None);
        assert_eq!(
            scene.debug_title(&world).as_deref(),
            Some("Enter your name: Z | Time: 30.00s")
        );

        let rest = submit().with_typed_text("9q");
        assert_eq!(scene.update(0.016, &rest, &mut world), SceneCommand::Quit);
        assert!(store
            .get("highScores")
            .expect("get")
            .expect("value")
            .contains(r#""name":"Z9Q""#));
    }

    #[test]
    fn missing_capture_quits_without_writing() {
        let store = SharedStore::default();
        let mut scene = HighScoreScene::new(ScoreBoard::new(Box::new(store.clone())));
        let mut world = SceneWorld::default();
        scene.load(&ScenePayload::default(), &mut world);

        assert_eq!(scene.update(0.016, &submit(), &mut world), SceneCommand::Quit);
        assert_eq!(store.get("highScores").expect("get"), None);
    }
}
