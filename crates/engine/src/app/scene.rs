use std::time::Duration;

use super::input::{ActionStates, InputAction};
use super::loop_runner::AppError;
use super::physics::{self, Body, BodyDesc, Contact, WorldConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneKey(pub &'static str);

impl SceneKey {
    pub fn name(self) -> &'static str {
        self.0
    }
}

/// Data handed to a scene when it is (re)started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePayload {
    pub character_key: Option<String>,
    pub elapsed_seconds: Option<f64>,
    pub stage: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    None,
    SwitchTo {
        scene: SceneKey,
        payload: ScenePayload,
    },
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    typed_text: String,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Raw characters typed during this tick, unsanitized.
    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_typed_text(mut self, text: impl Into<String>) -> Self {
        self.typed_text = text.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        Vec2::new(other.x - self.x, other.y - self.y).length()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraShake {
    pub duration: Duration,
    pub intensity: f32,
    pub remaining: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Camera2D {
    pub position: Vec2,
    shake: Option<CameraShake>,
    shake_count: u32,
}

impl Camera2D {
    /// Starts a shake, replacing any shake still in progress.
    pub fn shake(&mut self, duration: Duration, intensity: f32) {
        self.shake = Some(CameraShake {
            duration,
            intensity,
            remaining: duration,
        });
        self.shake_count = self.shake_count.saturating_add(1);
    }

    pub fn active_shake(&self) -> Option<CameraShake> {
        self.shake
    }

    pub fn shake_count(&self) -> u32 {
        self.shake_count
    }

    fn tick(&mut self, dt: Duration) {
        if let Some(shake) = &mut self.shake {
            shake.remaining = shake.remaining.saturating_sub(dt);
            if shake.remaining.is_zero() {
                self.shake = None;
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    bodies: Vec<Body>,
    pending_spawns: Vec<Body>,
    pending_despawns: Vec<EntityId>,
    camera: Camera2D,
    config: WorldConfig,
}

impl SceneWorld {
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn spawn_body(&mut self, desc: BodyDesc) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Body::from_desc(id, desc));
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.bodies.iter().any(|body| body.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|body| body.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    /// True while the body exists (or is queued to) and has no despawn pending.
    pub fn is_alive(&self, id: EntityId) -> bool {
        let known = self.bodies.iter().any(|body| body.id == id)
            || self.pending_spawns.iter().any(|body| body.id == id);
        known && !self.pending_despawns.contains(&id)
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_by_key(|id| id.0);
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            self.bodies
                .retain(|body| pending.binary_search_by_key(&body.id.0, |id| id.0).is_err());
            self.pending_spawns
                .retain(|body| pending.binary_search_by_key(&body.id.0, |id| id.0).is_err());
            self.pending_despawns.clear();
        }

        self.bodies.append(&mut self.pending_spawns);
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.camera = Camera2D::default();
    }

    /// Integrates every enabled body and advances camera effects by one fixed step.
    pub fn step(&mut self, fixed_dt_seconds: f32) {
        physics::step_bodies(&mut self.bodies, &self.config, fixed_dt_seconds);
        self.camera
            .tick(Duration::from_secs_f32(fixed_dt_seconds.max(0.0)));
    }

    pub fn collect_contacts(&self) -> Vec<Contact> {
        physics::collect_contacts(&self.bodies, &self.config)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn find_body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.id == id)
    }

    pub fn find_body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.id == id)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: WorldConfig) {
        self.config = config;
    }
}

pub trait Scene {
    fn key(&self) -> SceneKey;
    fn load(&mut self, payload: &ScenePayload, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

/// Owns every registered scene; exactly one is active at a time.
/// Switching unloads the current scene and starts the target from scratch.
pub(crate) struct SceneMachine {
    runtimes: Vec<SceneRuntime>,
    active: usize,
}

impl SceneMachine {
    pub(crate) fn new(scenes: Vec<Box<dyn Scene>>) -> Result<Self, AppError> {
        let mut runtimes = Vec::<SceneRuntime>::with_capacity(scenes.len());
        for scene in scenes {
            let key = scene.key();
            if runtimes.iter().any(|runtime| runtime.scene.key() == key) {
                return Err(AppError::DuplicateScene(key.name()));
            }
            runtimes.push(SceneRuntime {
                scene,
                world: SceneWorld::default(),
                is_loaded: false,
            });
        }
        Ok(Self {
            runtimes,
            active: 0,
        })
    }

    pub(crate) fn start(&mut self, key: SceneKey, payload: &ScenePayload) -> Result<(), AppError> {
        let index = self
            .index_of(key)
            .ok_or(AppError::UnknownScene(key.name()))?;
        self.active = index;
        self.load_active(payload);
        Ok(())
    }

    pub(crate) fn active_key(&self) -> SceneKey {
        self.runtimes[self.active].scene.key()
    }

    pub(crate) fn update_active(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
    ) -> SceneCommand {
        let runtime = &mut self.runtimes[self.active];
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.update(fixed_dt_seconds, input, world)
    }

    pub(crate) fn apply_pending_active(&mut self) {
        self.runtimes[self.active].world.apply_pending();
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.runtimes[self.active].world
    }

    #[cfg(test)]
    pub(crate) fn active_world_mut(&mut self) -> &mut SceneWorld {
        &mut self.runtimes[self.active].world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = &self.runtimes[self.active];
        runtime.scene.debug_title(&runtime.world)
    }

    pub(crate) fn switch_to(
        &mut self,
        next_scene: SceneKey,
        payload: &ScenePayload,
    ) -> Result<(), AppError> {
        let index = self
            .index_of(next_scene)
            .ok_or(AppError::UnknownScene(next_scene.name()))?;
        self.unload_active();
        self.active = index;
        self.load_active(payload);
        Ok(())
    }

    pub(crate) fn shutdown_all(&mut self) {
        for runtime in &mut self.runtimes {
            if runtime.is_loaded {
                let (scene, world) = (&mut runtime.scene, &mut runtime.world);
                scene.unload(world);
                runtime.world.clear();
                runtime.is_loaded = false;
            }
        }
    }

    fn load_active(&mut self, payload: &ScenePayload) {
        let runtime = &mut self.runtimes[self.active];
        if runtime.is_loaded {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.unload(world);
        }
        runtime.world.clear();
        {
            let (scene, world) = (&mut runtime.scene, &mut runtime.world);
            scene.load(payload, world);
        }
        runtime.world.apply_pending();
        runtime.is_loaded = true;
    }

    fn unload_active(&mut self) {
        let runtime = &mut self.runtimes[self.active];
        if !runtime.is_loaded {
            return;
        }
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        scene.unload(world);
        runtime.world.clear();
        runtime.is_loaded = false;
    }

    fn index_of(&self, key: SceneKey) -> Option<usize> {
        self.runtimes
            .iter()
            .position(|runtime| runtime.scene.key() == key)
    }
}
