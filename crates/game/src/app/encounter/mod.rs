use std::time::Duration;

use engine::{
    BodyDesc, BossBehaviorKind, Contact, EntityId, InputAction, InputSnapshot, Scene,
    SceneCommand, SceneKey, ScenePayload, SceneWorld, Scheduler, StageDatabase, StageDef, TimerId,
    Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::high_score::HIGH_SCORE_SCENE;

pub(crate) const ENCOUNTER_SCENE: SceneKey = SceneKey("encounter");
pub(crate) const PLAYER_BODY_NAME: &str = "player";
pub(crate) const BOSS_BODY_NAME: &str = "boss";
pub(crate) const DEFAULT_CHARACTER: &str = "lily";
pub(crate) const CHARACTERS: [&str; 2] = ["lily", "violet"];
const SLIP_BODY_NAME: &str = "detention_slip";

const PLAYER_SPEED: f32 = 200.0;
const PLAYER_JUMP_VELOCITY_Y: f32 = -400.0;
const PLAYER_SPAWN_X: f32 = 100.0;
const PLAYER_SPAWN_HEIGHT_ABOVE_BOTTOM: f32 = 120.0;
const PLAYER_HALF_EXTENTS: Vec2 = Vec2::new(40.0, 70.0);
const PLAYER_HIT_SHAKE: ShakeRequest = ShakeRequest {
    duration: Duration::from_millis(100),
    intensity: 0.01,
};
const PLAYER_HIT_TINT: u32 = 0xff0000;
const PLAYER_HIT_TINT_DURATION: Duration = Duration::from_millis(200);
const PLAYER_INVULNERABILITY: Duration = Duration::from_millis(1000);

const BOSS_HALF_EXTENTS: Vec2 = Vec2::new(60.0, 80.0);
const BOSS_BOUNCE_VELOCITY_Y: f32 = -300.0;
const BOSS_JUMP_VELOCITY_Y: f32 = -400.0;
const PATROL_REVERSE_INTERVAL: Duration = Duration::from_millis(2500);
const SLIP_VOLLEY_INTERVAL: Duration = Duration::from_millis(1500);
const BEHAVIOR_TICK_INTERVAL: Duration = Duration::from_millis(2000);
const JUMP_COOLDOWN: Duration = Duration::from_millis(2000);
const JUMP_CHANCE_PERCENT: u32 = 20;
const CHARGE_MULTIPLIER: f32 = 1.5;
const CHARGE_DURATION: Duration = Duration::from_millis(500);

const SLIP_HALF_EXTENTS: Vec2 = Vec2::new(16.0, 12.0);
const SLIP_VELOCITY_X: f32 = -600.0;

const DEFEAT_SHAKE: ShakeRequest = ShakeRequest {
    duration: Duration::from_millis(500),
    intensity: 0.01,
};
const DEFEAT_FALL_DELAY: Duration = Duration::from_millis(100);
const DEFEAT_FALL_VELOCITY_Y: f32 = 100.0;
const DEFEAT_FINISH_DELAY: Duration = Duration::from_millis(1500);

include!("types.rs");
include!("resolver.rs");
include!("behavior.rs");
include!("orchestrator.rs");
include!("scene_impl.rs");

pub(crate) fn build_encounter_scene(stages: StageDatabase, rng_seed: Option<u64>) -> Box<dyn Scene> {
    Box::new(EncounterScene::new(stages, rng_seed))
}
