/// Owns one running encounter: entity state, the timer queue and the defeat sequence.
struct EncounterContext {
    stage: StageDef,
    player: PlayerState,
    boss: BossState,
    projectiles: Vec<ProjectileState>,
    scheduler: Scheduler<EncounterTimer>,
    rng: StdRng,
    player_touching_boss: bool,
    defeat: Option<DefeatRecord>,
    tint_timer: Option<TimerId>,
    events: EncounterEventBus,
}

impl EncounterContext {
    fn new(stage: StageDef, character: String, world: &mut SceneWorld, rng: StdRng) -> Self {
        let config = *world.config();
        let player_spawn = Vec2::new(
            PLAYER_SPAWN_X,
            config.height - PLAYER_SPAWN_HEIGHT_ABOVE_BOTTOM,
        );
        let player_body = world.spawn_body(BodyDesc {
            collide_world_bounds: true,
            collide_ground: true,
            ..BodyDesc::new(PLAYER_BODY_NAME, player_spawn, PLAYER_HALF_EXTENTS)
        });
        let boss_body = world.spawn_body(BodyDesc {
            velocity: Vec2::new(stage.boss_speed, 0.0),
            collide_world_bounds: true,
            collide_ground: true,
            ..BodyDesc::new(BOSS_BODY_NAME, stage.boss_spawn, BOSS_HALF_EXTENTS)
        });

        let mut scheduler = Scheduler::new();
        let mut boss = BossState::from_stage(boss_body, &stage);
        arm_boss_behavior(&mut boss, &mut scheduler);

        Self {
            player: PlayerState::new(player_body, player_spawn, character),
            boss,
            projectiles: Vec::new(),
            scheduler,
            rng,
            player_touching_boss: false,
            defeat: None,
            tint_timer: None,
            events: EncounterEventBus::default(),
            stage,
        }
    }

    fn elapsed_seconds(&self) -> f64 {
        match self.defeat {
            Some(record) => record.elapsed_seconds,
            None => self.scheduler.now().as_secs_f64(),
        }
    }

    fn tick(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        self.events.clear_current_tick();

        self.pull_from_world(world);
        let player_enabled = world
            .find_body(self.player.body)
            .is_some_and(|body| body.enabled);
        if player_enabled {
            self.apply_movement_input(input);
        }
        self.push_to_world(world);

        world.step(fixed_dt_seconds);
        self.pull_from_world(world);

        let contacts = world.collect_contacts();
        self.resolve_contacts(&contacts, world);

        self.scheduler
            .advance(Duration::from_secs_f32(fixed_dt_seconds.max(0.0)));
        let command = self.run_due_timers(world);
        self.push_to_world(world);

        self.projectiles
            .retain(|projectile| projectile.phase == ProjectilePhase::Alive);
        self.events.finish_tick_rollover();
        command
    }

    fn pull_from_world(&mut self, world: &SceneWorld) {
        if let Some(body) = world.find_body(self.player.body) {
            self.player.position = body.position;
            self.player.velocity = body.velocity;
            self.player.grounded = body.grounded;
        }

        if self.boss.phase != BossPhase::Destroyed {
            if let Some(body) = world.find_body(self.boss.body) {
                self.boss.position = body.position;
                self.boss.velocity = body.velocity;
            }
        }

        for projectile in &mut self.projectiles {
            if projectile.phase != ProjectilePhase::Alive {
                continue;
            }
            match world.find_body(projectile.body) {
                Some(body) => projectile.position = body.position,
                None if !world.is_alive(projectile.body) => {
                    projectile.phase = ProjectilePhase::Destroyed;
                }
                None => {}
            }
        }
    }

    fn push_to_world(&self, world: &mut SceneWorld) {
        if let Some(body) = world.find_body_mut(self.player.body) {
            body.velocity = self.player.velocity;
        }

        if self.boss.phase != BossPhase::Destroyed {
            if let Some(body) = world.find_body_mut(self.boss.body) {
                body.velocity = self.boss.velocity;
            }
        }

        for projectile in &self.projectiles {
            if projectile.phase != ProjectilePhase::Alive {
                continue;
            }
            if let Some(body) = world.find_body_mut(projectile.body) {
                body.velocity = Vec2::new(projectile.velocity_x, 0.0);
            }
        }
    }

    fn apply_movement_input(&mut self, input: &InputSnapshot) {
        self.player.velocity.x = if input.is_down(InputAction::MoveLeft) {
            -PLAYER_SPEED
        } else if input.is_down(InputAction::MoveRight) {
            PLAYER_SPEED
        } else {
            0.0
        };

        if input.is_down(InputAction::Jump) && self.player.grounded {
            self.player.velocity.y = PLAYER_JUMP_VELOCITY_Y;
            self.player.grounded = false;
        }
    }

    fn projectile_index(&self, id: EntityId) -> Option<usize> {
        self.projectiles
            .iter()
            .position(|projectile| projectile.body == id)
    }

    fn resolve_contacts(&mut self, contacts: &[Contact], world: &mut SceneWorld) {
        let mut touching_boss = false;

        for contact in contacts {
            match *contact {
                Contact::Overlap(a, b) => {
                    let other = if a == self.player.body {
                        b
                    } else if b == self.player.body {
                        a
                    } else {
                        continue;
                    };

                    if other == self.boss.body {
                        touching_boss = true;
                        // A strike lands when contact begins, not on every tick it persists.
                        if !self.player_touching_boss {
                            let effect = on_player_boss_overlap(&mut self.player, &mut self.boss);
                            self.apply_effect(effect, world);
                        }
                    } else if let Some(index) = self.projectile_index(other) {
                        let now = self.scheduler.now();
                        let effect =
                            on_player_projectile(&mut self.player, &mut self.projectiles[index], now);
                        self.apply_effect(effect, world);
                    }
                }
                Contact::Ground(id) | Contact::LeftWorld(id) => {
                    if let Some(index) = self.projectile_index(id) {
                        let effect = on_projectile_ground(&mut self.projectiles[index]);
                        self.apply_effect(effect, world);
                    }
                }
            }
        }

        self.player_touching_boss = touching_boss;
    }

    fn apply_effect(&mut self, effect: CollisionEffect, world: &mut SceneWorld) {
        match effect {
            CollisionEffect::Ignored => {}
            CollisionEffect::BossStruck {
                remaining,
                bounce_velocity_y,
            } => {
                self.events.emit(EncounterEvent::BossStruck { remaining });
                info!(
                    stage = self.stage.stage,
                    remaining,
                    bounce_velocity_y,
                    "boss_struck"
                );
            }
            CollisionEffect::BossDefeated { bounce_velocity_y } => {
                self.events.emit(EncounterEvent::BossStruck { remaining: 0 });
                debug!(bounce_velocity_y, "final_strike");
                self.begin_defeat_sequence(world);
            }
            CollisionEffect::ProjectileDestroyed { projectile } => {
                world.despawn(projectile);
                self.events
                    .emit(EncounterEvent::ProjectileDestroyed { projectile });
            }
            CollisionEffect::PlayerHit {
                projectile,
                shake,
                tint,
                tint_duration,
            } => {
                world.despawn(projectile);
                self.events
                    .emit(EncounterEvent::ProjectileDestroyed { projectile });

                world.camera_mut().shake(shake.duration, shake.intensity);
                self.events.emit(EncounterEvent::CameraShake {
                    duration: shake.duration,
                });

                if let Some(body) = world.find_body_mut(self.player.body) {
                    body.tint = Some(tint);
                }
                if let Some(previous) = self.tint_timer.take() {
                    self.scheduler.cancel(previous);
                }
                self.tint_timer = Some(
                    self.scheduler
                        .delayed_call(tint_duration, EncounterTimer::ClearPlayerTint),
                );

                self.events.emit(EncounterEvent::PlayerHit);
                info!(stage = self.stage.stage, "player_hit");
            }
        }
    }

    /// Freezes the boss, shakes the camera and queues the fall and finish steps.
    /// Runs at most once per encounter.
    fn begin_defeat_sequence(&mut self, world: &mut SceneWorld) {
        if self.defeat.is_some() {
            return;
        }

        for timer in self.boss.timers.drain(..) {
            self.scheduler.cancel(timer);
        }

        self.boss.velocity = Vec2::default();
        if let Some(body) = world.find_body_mut(self.boss.body) {
            body.velocity = Vec2::default();
            body.allow_gravity = false;
        }

        world
            .camera_mut()
            .shake(DEFEAT_SHAKE.duration, DEFEAT_SHAKE.intensity);
        self.events.emit(EncounterEvent::CameraShake {
            duration: DEFEAT_SHAKE.duration,
        });

        let elapsed_seconds = self.scheduler.now().as_secs_f64();
        self.scheduler
            .delayed_call(DEFEAT_FALL_DELAY, EncounterTimer::DefeatFall);
        self.scheduler
            .delayed_call(DEFEAT_FINISH_DELAY, EncounterTimer::DefeatFinish);
        self.defeat = Some(DefeatRecord { elapsed_seconds });

        self.events
            .emit(EncounterEvent::BossDefeated { elapsed_seconds });
        info!(
            stage = self.stage.stage,
            elapsed_seconds,
            phase = self.boss.phase.as_token(),
            "boss_defeated"
        );
    }

    fn run_due_timers(&mut self, world: &mut SceneWorld) -> SceneCommand {
        let mut command = SceneCommand::None;

        while let Some(fired) = self.scheduler.pop_due() {
            match fired.event {
                EncounterTimer::DefeatFall => self.start_defeat_fall(world),
                EncounterTimer::DefeatFinish => {
                    if let Some(next) = self.finish_defeat(world) {
                        command = next;
                    }
                }
                EncounterTimer::ClearPlayerTint => {
                    self.tint_timer = None;
                    if let Some(body) = world.find_body_mut(self.player.body) {
                        body.tint = None;
                    }
                }
                timer => self.run_behavior(fired.id, timer, world),
            }
        }

        command
    }

    fn run_behavior(&mut self, id: TimerId, timer: EncounterTimer, world: &mut SceneWorld) {
        if !timer.is_repeating() {
            self.boss.timers.retain(|pending| *pending != id);
        }

        let jump_roll = if timer == EncounterTimer::BehaviorTick {
            self.rng.gen_range(1..=100)
        } else {
            0
        };
        let outcome = run_behavior_timer(&mut self.boss, timer, self.player.position, jump_roll);

        if outcome.cancel_self {
            self.scheduler.cancel(id);
            return;
        }

        for (delay, follow_up) in outcome.schedule {
            let timer_id = self.scheduler.delayed_call(delay, follow_up);
            self.boss.timers.push(timer_id);
        }

        if let Some(position) = outcome.spawn_projectile_at {
            self.spawn_projectile(world, position);
        }

        debug!(
            stage = self.stage.stage,
            timer = ?timer,
            velocity_x = self.boss.velocity.x,
            velocity_y = self.boss.velocity.y,
            "boss_behavior_tick"
        );
    }

    fn spawn_projectile(&mut self, world: &mut SceneWorld, position: Vec2) -> EntityId {
        let body = world.spawn_body(BodyDesc {
            velocity: Vec2::new(SLIP_VELOCITY_X, 0.0),
            allow_gravity: false,
            collide_ground: true,
            ..BodyDesc::new(SLIP_BODY_NAME, position, SLIP_HALF_EXTENTS)
        });
        self.projectiles.push(ProjectileState {
            body,
            position,
            velocity_x: SLIP_VELOCITY_X,
            phase: ProjectilePhase::Alive,
        });
        self.events
            .emit(EncounterEvent::ProjectileSpawned { projectile: body });
        debug!(
            projectile = body.0,
            x = position.x,
            y = position.y,
            "projectile_spawned"
        );
        body
    }

    fn start_defeat_fall(&mut self, world: &mut SceneWorld) {
        if self.boss.phase != BossPhase::DefeatedFalling {
            return;
        }
        self.boss.velocity.y = DEFEAT_FALL_VELOCITY_Y;
        if let Some(body) = world.find_body_mut(self.boss.body) {
            body.allow_gravity = true;
            body.velocity.y = DEFEAT_FALL_VELOCITY_Y;
        }
        self.events.emit(EncounterEvent::DefeatFallStarted);
        info!(stage = self.stage.stage, "boss_fall_started");
    }

    fn finish_defeat(&mut self, world: &mut SceneWorld) -> Option<SceneCommand> {
        if self.boss.phase != BossPhase::DefeatedFalling {
            return None;
        }
        let record = self.defeat?;

        self.boss.phase = BossPhase::Destroyed;
        world.despawn(self.boss.body);
        self.events.emit(EncounterEvent::BossDestroyed);
        info!(stage = self.stage.stage, "boss_destroyed");

        let mut cleared = 0usize;
        for projectile in &mut self.projectiles {
            if projectile.phase != ProjectilePhase::Alive {
                continue;
            }
            projectile.phase = ProjectilePhase::Destroyed;
            world.despawn(projectile.body);
            self.events.emit(EncounterEvent::ProjectileDestroyed {
                projectile: projectile.body,
            });
            cleared += 1;
        }

        self.events.emit(EncounterEvent::ScoreCaptured {
            elapsed_seconds: record.elapsed_seconds,
            stage: self.stage.stage,
        });
        info!(
            stage = self.stage.stage,
            elapsed_seconds = record.elapsed_seconds,
            projectiles_cleared = cleared,
            character = %self.player.character,
            "score_captured"
        );

        Some(SceneCommand::SwitchTo {
            scene: HIGH_SCORE_SCENE,
            payload: ScenePayload {
                character_key: Some(self.player.character.clone()),
                elapsed_seconds: Some(record.elapsed_seconds),
                stage: Some(self.stage.stage),
            },
        })
    }

    fn debug_title(&self) -> String {
        format!(
            "{} | Time: {:.2}s | Boss hits left: {}",
            self.stage.label,
            self.elapsed_seconds(),
            self.boss.hit_counter
        )
    }
}
