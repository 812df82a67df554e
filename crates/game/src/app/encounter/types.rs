#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BossPhase {
    Active,
    DefeatedFalling,
    Destroyed,
}

impl BossPhase {
    fn as_token(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::DefeatedFalling => "defeated_falling",
            Self::Destroyed => "destroyed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectilePhase {
    Alive,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ShakeRequest {
    duration: Duration,
    intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct PlayerState {
    body: EntityId,
    position: Vec2,
    velocity: Vec2,
    grounded: bool,
    invulnerable_until: Duration,
    character: String,
}

impl PlayerState {
    fn new(body: EntityId, position: Vec2, character: String) -> Self {
        Self {
            body,
            position,
            velocity: Vec2::default(),
            grounded: false,
            invulnerable_until: Duration::ZERO,
            character,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RoamingBounds {
    min: f32,
    max: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct BossState {
    body: EntityId,
    position: Vec2,
    velocity: Vec2,
    /// Remaining strikes; unsigned so it can never go below zero.
    hit_counter: u32,
    behavior: BossBehaviorKind,
    attack_range: f32,
    roaming: RoamingBounds,
    patrol_speed: f32,
    can_jump: bool,
    throws_slips: bool,
    phase: BossPhase,
    timers: Vec<TimerId>,
}

impl BossState {
    fn from_stage(body: EntityId, stage: &StageDef) -> Self {
        Self {
            body,
            position: stage.boss_spawn,
            velocity: Vec2::new(stage.boss_speed, 0.0),
            hit_counter: stage.boss_hit_counter,
            behavior: stage.behavior,
            attack_range: stage.attack_range,
            roaming: RoamingBounds {
                min: stage.roaming_min,
                max: stage.roaming_max,
            },
            patrol_speed: stage.boss_speed,
            can_jump: stage.can_jump,
            throws_slips: stage.throws_slips,
            phase: BossPhase::Active,
            timers: Vec::new(),
        }
    }

    fn is_active(&self) -> bool {
        self.phase == BossPhase::Active
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ProjectileState {
    body: EntityId,
    position: Vec2,
    velocity_x: f32,
    phase: ProjectilePhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CollisionEffect {
    Ignored,
    BossStruck {
        remaining: u32,
        bounce_velocity_y: f32,
    },
    BossDefeated {
        bounce_velocity_y: f32,
    },
    ProjectileDestroyed {
        projectile: EntityId,
    },
    PlayerHit {
        projectile: EntityId,
        shake: ShakeRequest,
        tint: u32,
        tint_duration: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EncounterTimer {
    PatrolReverse,
    SlipVolley,
    BehaviorTick,
    JumpCooldownReset,
    ChargeRevert { base_speed: f32 },
    DefeatFall,
    DefeatFinish,
    ClearPlayerTint,
}

impl EncounterTimer {
    fn is_repeating(self) -> bool {
        matches!(
            self,
            Self::PatrolReverse | Self::SlipVolley | Self::BehaviorTick
        )
    }
}

/// What a behavior timer asks the orchestrator to do beyond mutating boss state.
#[derive(Debug, Clone, Default, PartialEq)]
struct BehaviorOutcome {
    spawn_projectile_at: Option<Vec2>,
    schedule: Vec<(Duration, EncounterTimer)>,
    cancel_self: bool,
}

impl BehaviorOutcome {
    fn cancelled() -> Self {
        Self {
            cancel_self: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DefeatRecord {
    elapsed_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EncounterEvent {
    BossStruck { remaining: u32 },
    BossDefeated { elapsed_seconds: f64 },
    DefeatFallStarted,
    BossDestroyed,
    ProjectileSpawned { projectile: EntityId },
    ProjectileDestroyed { projectile: EntityId },
    PlayerHit,
    CameraShake { duration: Duration },
    ScoreCaptured { elapsed_seconds: f64, stage: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncounterEventKind {
    BossStruck,
    BossDefeated,
    DefeatFallStarted,
    BossDestroyed,
    ProjectileSpawned,
    ProjectileDestroyed,
    PlayerHit,
    CameraShake,
    ScoreCaptured,
}

impl EncounterEvent {
    fn kind(self) -> EncounterEventKind {
        match self {
            Self::BossStruck { .. } => EncounterEventKind::BossStruck,
            Self::BossDefeated { .. } => EncounterEventKind::BossDefeated,
            Self::DefeatFallStarted => EncounterEventKind::DefeatFallStarted,
            Self::BossDestroyed => EncounterEventKind::BossDestroyed,
            Self::ProjectileSpawned { .. } => EncounterEventKind::ProjectileSpawned,
            Self::ProjectileDestroyed { .. } => EncounterEventKind::ProjectileDestroyed,
            Self::PlayerHit => EncounterEventKind::PlayerHit,
            Self::CameraShake { .. } => EncounterEventKind::CameraShake,
            Self::ScoreCaptured { .. } => EncounterEventKind::ScoreCaptured,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EncounterEventCounts {
    total: u32,
    boss_struck: u32,
    boss_defeated: u32,
    defeat_fall_started: u32,
    boss_destroyed: u32,
    projectile_spawned: u32,
    projectile_destroyed: u32,
    player_hit: u32,
    camera_shake: u32,
    score_captured: u32,
}

impl EncounterEventCounts {
    fn record(&mut self, kind: EncounterEventKind) {
        self.total = self.total.saturating_add(1);
        let slot = match kind {
            EncounterEventKind::BossStruck => &mut self.boss_struck,
            EncounterEventKind::BossDefeated => &mut self.boss_defeated,
            EncounterEventKind::DefeatFallStarted => &mut self.defeat_fall_started,
            EncounterEventKind::BossDestroyed => &mut self.boss_destroyed,
            EncounterEventKind::ProjectileSpawned => &mut self.projectile_spawned,
            EncounterEventKind::ProjectileDestroyed => &mut self.projectile_destroyed,
            EncounterEventKind::PlayerHit => &mut self.player_hit,
            EncounterEventKind::CameraShake => &mut self.camera_shake,
            EncounterEventKind::ScoreCaptured => &mut self.score_captured,
        };
        *slot = slot.saturating_add(1);
    }
}

#[derive(Debug, Default)]
struct EncounterEventBus {
    current_tick_events: Vec<EncounterEvent>,
    last_tick_counts: EncounterEventCounts,
    lifetime_counts: EncounterEventCounts,
}

impl EncounterEventBus {
    fn clear_current_tick(&mut self) {
        self.current_tick_events.clear();
    }

    fn emit(&mut self, event: EncounterEvent) {
        self.lifetime_counts.record(event.kind());
        self.current_tick_events.push(event);
    }

    fn finish_tick_rollover(&mut self) {
        let mut counts = EncounterEventCounts::default();
        for event in &self.current_tick_events {
            counts.record(event.kind());
        }
        self.last_tick_counts = counts;
        self.current_tick_events.clear();
    }

    fn last_tick_counts(&self) -> EncounterEventCounts {
        self.last_tick_counts
    }

    fn lifetime_counts(&self) -> EncounterEventCounts {
        self.lifetime_counts
    }
}
