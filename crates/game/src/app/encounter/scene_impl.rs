pub(crate) struct EncounterScene {
    stages: StageDatabase,
    rng_seed: Option<u64>,
    context: Option<EncounterContext>,
}

impl EncounterScene {
    pub(crate) fn new(stages: StageDatabase, rng_seed: Option<u64>) -> Self {
        Self {
            stages,
            rng_seed,
            context: None,
        }
    }

    fn resolve_stage(&self, requested: Option<u32>) -> Option<StageDef> {
        if let Some(stage) = requested {
            if let Some(def) = self.stages.stage(stage) {
                return Some(def.clone());
            }
            warn!(stage, "unknown_stage_falling_back");
        }
        self.stages.first_stage().cloned()
    }
}

fn resolve_character(requested: Option<&str>) -> String {
    match requested {
        Some(key) if CHARACTERS.contains(&key) => key.to_string(),
        Some(key) => {
            warn!(character = key, fallback = DEFAULT_CHARACTER, "unknown_character");
            DEFAULT_CHARACTER.to_string()
        }
        None => DEFAULT_CHARACTER.to_string(),
    }
}

impl Scene for EncounterScene {
    fn key(&self) -> SceneKey {
        ENCOUNTER_SCENE
    }

    fn load(&mut self, payload: &ScenePayload, world: &mut SceneWorld) {
        let Some(stage) = self.resolve_stage(payload.stage) else {
            warn!("encounter_has_no_stages");
            self.context = None;
            return;
        };
        let character = resolve_character(payload.character_key.as_deref());
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            stage = stage.stage,
            label = %stage.label,
            background = %stage.background,
            behavior = stage.behavior.as_token(),
            boss_hit_counter = stage.boss_hit_counter,
            character = %character,
            "stage_loaded"
        );
        self.context = Some(EncounterContext::new(stage, character, world, rng));
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(context) = self.context.as_mut() else {
            return SceneCommand::Quit;
        };

        let command = context.tick(fixed_dt_seconds, input, world);
        let counts = context.events.last_tick_counts();
        if counts.total > 0 {
            debug!(
                events = counts.total,
                boss_struck = counts.boss_struck,
                projectiles_spawned = counts.projectile_spawned,
                projectiles_destroyed = counts.projectile_destroyed,
                player_hit = counts.player_hit,
                "encounter_tick_events"
            );
        }
        command
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        if let Some(context) = self.context.take() {
            let lifetime = context.events.lifetime_counts();
            info!(
                stage = context.stage.stage,
                boss_phase = context.boss.phase.as_token(),
                events = lifetime.total,
                strikes = lifetime.boss_struck,
                defeats = lifetime.boss_defeated,
                defeat_falls = lifetime.defeat_fall_started,
                bosses_destroyed = lifetime.boss_destroyed,
                player_hits = lifetime.player_hit,
                camera_shakes = lifetime.camera_shake,
                projectiles_spawned = lifetime.projectile_spawned,
                projectiles_destroyed = lifetime.projectile_destroyed,
                scores_captured = lifetime.score_captured,
                "encounter_unloaded"
            );
        }
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        self.context.as_ref().map(EncounterContext::debug_title)
    }
}
