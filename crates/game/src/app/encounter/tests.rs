use super::*;

const DT: f32 = 1.0 / 60.0;

fn patrol_stage() -> StageDef {
    StageDef {
        stage: 1,
        label: "Detention Hall".to_string(),
        background: "hallway".to_string(),
        behavior: BossBehaviorKind::Patrol,
        boss_hit_counter: 5,
        boss_spawn: Vec2::new(1500.0, 300.0),
        boss_speed: 100.0,
        attack_range: 0.0,
        roaming_min: 0.0,
        roaming_max: 0.0,
        can_jump: false,
        throws_slips: true,
    }
}

fn jump_charge_stage() -> StageDef {
    StageDef {
        stage: 2,
        label: "Gymnasium".to_string(),
        background: "gym".to_string(),
        behavior: BossBehaviorKind::PatrolJumpCharge,
        boss_hit_counter: 8,
        boss_spawn: Vec2::new(1500.0, 568.0),
        boss_speed: 250.0,
        attack_range: 400.0,
        roaming_min: 800.0,
        roaming_max: 2200.0,
        can_jump: true,
        throws_slips: false,
    }
}

fn player_state() -> PlayerState {
    PlayerState::new(EntityId(100), Vec2::new(100.0, 648.0), "lily".to_string())
}

fn projectile_state(id: u64) -> ProjectileState {
    ProjectileState {
        body: EntityId(id),
        position: Vec2::new(1500.0, 300.0),
        velocity_x: SLIP_VELOCITY_X,
        phase: ProjectilePhase::Alive,
    }
}

fn new_context(stage: StageDef) -> (EncounterContext, SceneWorld) {
    let mut world = SceneWorld::default();
    let context = EncounterContext::new(
        stage,
        "lily".to_string(),
        &mut world,
        StdRng::seed_from_u64(7),
    );
    world.apply_pending();
    (context, world)
}

fn tick(context: &mut EncounterContext, world: &mut SceneWorld) -> SceneCommand {
    let command = context.tick(DT, &InputSnapshot::empty(), world);
    world.apply_pending();
    command
}

fn defeat_now(context: &mut EncounterContext, world: &mut SceneWorld) {
    context.boss.hit_counter = 1;
    let effect = on_player_boss_overlap(&mut context.player, &mut context.boss);
    assert!(matches!(effect, CollisionEffect::BossDefeated { .. }));
    context.apply_effect(effect, world);
}

#[test]
fn five_strikes_defeat_the_boss_and_a_sixth_is_ignored() {
    let mut player = player_state();
    let mut boss = BossState::from_stage(EntityId(1), &patrol_stage());

    for expected_remaining in (1..=4).rev() {
        let effect = on_player_boss_overlap(&mut player, &mut boss);
        assert_eq!(
            effect,
            CollisionEffect::BossStruck {
                remaining: expected_remaining,
                bounce_velocity_y: BOSS_BOUNCE_VELOCITY_Y,
            }
        );
        assert_eq!(boss.phase, BossPhase::Active);
    }

    let fifth = on_player_boss_overlap(&mut player, &mut boss);
    assert!(matches!(fifth, CollisionEffect::BossDefeated { .. }));
    assert_eq!(boss.hit_counter, 0);
    assert_eq!(boss.phase, BossPhase::DefeatedFalling);

    let sixth = on_player_boss_overlap(&mut player, &mut boss);
    assert_eq!(sixth, CollisionEffect::Ignored);
    assert_eq!(boss.hit_counter, 0);
    assert_eq!(boss.phase, BossPhase::DefeatedFalling);
}

#[test]
fn strike_bounces_player_upward() {
    let mut player = player_state();
    player.velocity.y = 50.0;
    let mut boss = BossState::from_stage(EntityId(1), &patrol_stage());

    on_player_boss_overlap(&mut player, &mut boss);

    assert_eq!(player.velocity.y, -300.0);
}

#[test]
fn overlap_with_inactive_boss_is_a_no_op() {
    let mut player = player_state();
    let mut boss = BossState::from_stage(EntityId(1), &patrol_stage());
    boss.phase = BossPhase::Destroyed;

    assert_eq!(
        on_player_boss_overlap(&mut player, &mut boss),
        CollisionEffect::Ignored
    );
    assert_eq!(boss.hit_counter, 5);
    assert_eq!(player.velocity.y, 0.0);
}

#[test]
fn slip_hit_destroys_slip_and_grants_invulnerability() {
    let mut player = player_state();
    let mut first = projectile_state(10);
    let mut second = projectile_state(11);
    let now = Duration::from_millis(3000);

    let effect = on_player_projectile(&mut player, &mut first, now);
    assert_eq!(
        effect,
        CollisionEffect::PlayerHit {
            projectile: EntityId(10),
            shake: ShakeRequest {
                duration: Duration::from_millis(100),
                intensity: 0.01,
            },
            tint: 0xff0000,
            tint_duration: Duration::from_millis(200),
        }
    );
    assert_eq!(first.phase, ProjectilePhase::Destroyed);
    assert_eq!(player.invulnerable_until, Duration::from_millis(4000));

    let during_invulnerability =
        on_player_projectile(&mut player, &mut second, Duration::from_millis(3500));
    assert_eq!(
        during_invulnerability,
        CollisionEffect::ProjectileDestroyed {
            projectile: EntityId(11)
        }
    );
    assert_eq!(second.phase, ProjectilePhase::Destroyed);
    assert_eq!(player.invulnerable_until, Duration::from_millis(4000));

    assert_eq!(
        on_player_projectile(&mut player, &mut first, Duration::from_millis(5000)),
        CollisionEffect::Ignored
    );
}

#[test]
fn ground_contact_destroys_slip_once() {
    let mut slip = projectile_state(12);

    assert_eq!(
        on_projectile_ground(&mut slip),
        CollisionEffect::ProjectileDestroyed {
            projectile: EntityId(12)
        }
    );
    assert_eq!(slip.phase, ProjectilePhase::Destroyed);
    assert_eq!(on_projectile_ground(&mut slip), CollisionEffect::Ignored);
}

#[test]
fn patrol_arms_reverse_and_volley_timers() {
    let mut scheduler = Scheduler::new();
    let mut boss = BossState::from_stage(EntityId(1), &patrol_stage());
    arm_boss_behavior(&mut boss, &mut scheduler);
    assert_eq!(boss.timers.len(), 2);
    assert_eq!(scheduler.pending_count(), 2);

    let mut no_slips = patrol_stage();
    no_slips.throws_slips = false;
    let mut quiet_boss = BossState::from_stage(EntityId(2), &no_slips);
    let mut quiet_scheduler = Scheduler::new();
    arm_boss_behavior(&mut quiet_boss, &mut quiet_scheduler);
    assert_eq!(quiet_boss.timers.len(), 1);
}

#[test]
fn patrol_reverse_flips_velocity_and_volley_spawns_at_boss() {
    let mut boss = BossState::from_stage(EntityId(1), &patrol_stage());
    boss.position = Vec2::new(1620.0, 685.0);

    let reverse = run_behavior_timer(&mut boss, EncounterTimer::PatrolReverse, Vec2::default(), 0);
    assert_eq!(reverse, BehaviorOutcome::default());
    assert_eq!(boss.velocity.x, -100.0);

    let volley = run_behavior_timer(&mut boss, EncounterTimer::SlipVolley, Vec2::default(), 0);
    assert_eq!(volley.spawn_projectile_at, Some(Vec2::new(1620.0, 685.0)));
    assert!(!volley.cancel_self);
}

#[test]
fn behavior_timers_cancel_themselves_once_boss_is_not_active() {
    let mut boss = BossState::from_stage(EntityId(1), &patrol_stage());
    boss.phase = BossPhase::DefeatedFalling;

    for timer in [
        EncounterTimer::PatrolReverse,
        EncounterTimer::SlipVolley,
        EncounterTimer::BehaviorTick,
    ] {
        let outcome = run_behavior_timer(&mut boss, timer, Vec2::default(), 1);
        assert_eq!(outcome, BehaviorOutcome::cancelled());
    }
    assert_eq!(boss.velocity.x, 100.0);
    assert_eq!(boss.velocity.y, 0.0);
}

#[test]
fn player_within_attack_range_triggers_charge_and_revert() {
    let mut boss = BossState::from_stage(EntityId(1), &jump_charge_stage());
    boss.position = Vec2::new(1000.0, 688.0);
    boss.can_jump = false;
    let player = Vec2::new(1300.0, 688.0);

    let outcome = run_behavior_timer(&mut boss, EncounterTimer::BehaviorTick, player, 100);
    assert_eq!(boss.velocity.x, 375.0);
    assert_eq!(
        outcome.schedule,
        vec![(
            Duration::from_millis(500),
            EncounterTimer::ChargeRevert { base_speed: 250.0 }
        )]
    );

    run_behavior_timer(
        &mut boss,
        EncounterTimer::ChargeRevert { base_speed: 250.0 },
        player,
        0,
    );
    assert_eq!(boss.velocity.x, -250.0);
}

#[test]
fn player_exactly_at_attack_range_does_not_trigger_charge() {
    let mut boss = BossState::from_stage(EntityId(1), &jump_charge_stage());
    boss.position = Vec2::new(1000.0, 688.0);
    boss.can_jump = false;

    let outcome = run_behavior_timer(
        &mut boss,
        EncounterTimer::BehaviorTick,
        Vec2::new(1400.0, 688.0),
        100,
    );
    assert!(outcome.schedule.is_empty());
    assert_eq!(boss.velocity.x, 250.0);
}

#[test]
fn jump_roll_at_threshold_jumps_and_starts_cooldown() {
    let far_player = Vec2::new(100.0, 688.0);
    let mut boss = BossState::from_stage(EntityId(1), &jump_charge_stage());
    boss.position = Vec2::new(1500.0, 688.0);

    let outcome = run_behavior_timer(&mut boss, EncounterTimer::BehaviorTick, far_player, 20);
    assert_eq!(boss.velocity.y, -400.0);
    assert!(!boss.can_jump);
    assert_eq!(
        outcome.schedule,
        vec![(Duration::from_millis(2000), EncounterTimer::JumpCooldownReset)]
    );

    boss.velocity.y = 0.0;
    let cooling = run_behavior_timer(&mut boss, EncounterTimer::BehaviorTick, far_player, 1);
    assert!(cooling.schedule.is_empty());
    assert_eq!(boss.velocity.y, 0.0);

    run_behavior_timer(&mut boss, EncounterTimer::JumpCooldownReset, far_player, 0);
    assert!(boss.can_jump);
}

#[test]
fn jump_roll_above_threshold_does_not_jump() {
    assert!(rolls_jump(1));
    assert!(rolls_jump(20));
    assert!(!rolls_jump(21));

    let mut boss = BossState::from_stage(EntityId(1), &jump_charge_stage());
    boss.position = Vec2::new(1500.0, 688.0);
    let outcome = run_behavior_timer(
        &mut boss,
        EncounterTimer::BehaviorTick,
        Vec2::new(100.0, 688.0),
        21,
    );
    assert!(outcome.schedule.is_empty());
    assert!(boss.can_jump);
    assert_eq!(boss.velocity.y, 0.0);
}

#[test]
fn roaming_bounds_steer_boss_back_inside() {
    let far_player = Vec2::new(3100.0, 100.0);
    let mut boss = BossState::from_stage(EntityId(1), &jump_charge_stage());
    boss.can_jump = false;

    boss.position = Vec2::new(790.0, 688.0);
    boss.velocity.x = -250.0;
    run_behavior_timer(&mut boss, EncounterTimer::BehaviorTick, far_player, 100);
    assert_eq!(boss.velocity.x, 250.0);

    boss.position = Vec2::new(2210.0, 688.0);
    run_behavior_timer(&mut boss, EncounterTimer::BehaviorTick, far_player, 100);
    assert_eq!(boss.velocity.x, -250.0);

    boss.position = Vec2::new(1500.0, 688.0);
    boss.velocity.x = 250.0;
    run_behavior_timer(&mut boss, EncounterTimer::BehaviorTick, far_player, 100);
    assert_eq!(boss.velocity.x, 250.0);
}

#[test]
fn context_spawns_player_and_boss_bodies() {
    let (context, world) = new_context(patrol_stage());

    assert_eq!(world.body_count(), 2);
    let player = world.find_body(context.player.body).expect("player body");
    assert_eq!(player.debug_name, PLAYER_BODY_NAME);
    assert_eq!(player.position, Vec2::new(100.0, 648.0));
    let boss = world.find_body(context.boss.body).expect("boss body");
    assert_eq!(boss.debug_name, BOSS_BODY_NAME);
    assert_eq!(boss.velocity.x, 100.0);
    assert_eq!(context.scheduler.pending_count(), 2);
}

#[test]
fn movement_input_drives_player_and_jump_needs_ground() {
    let (mut context, mut world) = new_context(patrol_stage());
    for _ in 0..120 {
        tick(&mut context, &mut world);
    }
    assert!(context.player.grounded);

    let right = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
    context.tick(DT, &right, &mut world);
    assert_eq!(context.player.velocity.x, 200.0);

    let jump = InputSnapshot::empty().with_action_down(InputAction::Jump, true);
    context.tick(DT, &jump, &mut world);
    assert!(context.player.velocity.y < 0.0);
    assert!(!context.player.grounded);
    let airborne_velocity = context.player.velocity.y;

    context.tick(DT, &jump, &mut world);
    assert!(context.player.velocity.y > airborne_velocity);
}

#[test]
fn slip_travels_six_hundred_pixels_in_one_second() {
    let (mut context, mut world) = new_context(patrol_stage());
    let slip = context.spawn_projectile(&mut world, Vec2::new(1500.0, 300.0));
    world.apply_pending();

    for _ in 0..60 {
        tick(&mut context, &mut world);
    }

    let body = world.find_body(slip).expect("slip body");
    assert!((body.position.x - 900.0).abs() < 0.01);
    assert_eq!(body.position.y, 300.0);
}

#[test]
fn slip_leaving_the_world_is_destroyed() {
    let (mut context, mut world) = new_context(patrol_stage());
    let slip = context.spawn_projectile(&mut world, Vec2::new(40.0, 300.0));
    world.apply_pending();

    for _ in 0..10 {
        tick(&mut context, &mut world);
    }

    assert!(!world.is_alive(slip));
    assert!(context.projectile_index(slip).is_none());
}

#[test]
fn patrol_boss_reverses_after_interval_and_throws_slips() {
    let (mut context, mut world) = new_context(patrol_stage());

    for _ in 0..100 {
        tick(&mut context, &mut world);
    }
    assert!(context.boss.velocity.x > 0.0);
    assert_eq!(context.events.lifetime_counts().projectile_spawned, 1);

    for _ in 0..60 {
        tick(&mut context, &mut world);
    }
    assert!(context.boss.velocity.x < 0.0);
}

#[test]
fn defeat_sequence_runs_in_order_and_captures_score_once() {
    let (mut context, mut world) = new_context(patrol_stage());
    for _ in 0..30 {
        tick(&mut context, &mut world);
    }
    context.spawn_projectile(&mut world, Vec2::new(1500.0, 300.0));
    world.apply_pending();

    let defeated_at = context.scheduler.now().as_secs_f64();
    defeat_now(&mut context, &mut world);

    assert_eq!(context.boss.phase, BossPhase::DefeatedFalling);
    assert!(context.boss.timers.is_empty());
    assert_eq!(context.scheduler.pending_count(), 2);
    let boss_body = world.find_body(context.boss.body).expect("boss body");
    assert_eq!(boss_body.velocity, Vec2::default());
    assert!(!boss_body.allow_gravity);
    let shake = world.camera().active_shake().expect("defeat shake");
    assert_eq!(shake.duration, Duration::from_millis(500));
    assert_eq!(shake.intensity, 0.01);

    // A repeated trigger must not queue a second sequence.
    context.begin_defeat_sequence(&mut world);
    assert_eq!(context.scheduler.pending_count(), 2);
    assert_eq!(context.events.lifetime_counts().boss_defeated, 1);

    for _ in 0..5 {
        assert_eq!(tick(&mut context, &mut world), SceneCommand::None);
    }
    assert_eq!(context.events.lifetime_counts().defeat_fall_started, 0);

    for _ in 0..2 {
        assert_eq!(tick(&mut context, &mut world), SceneCommand::None);
    }
    assert_eq!(context.events.lifetime_counts().defeat_fall_started, 1);
    assert!(world
        .find_body(context.boss.body)
        .expect("boss body")
        .allow_gravity);

    let mut switched = None;
    for tick_index in 8..=95 {
        let command = tick(&mut context, &mut world);
        if command != SceneCommand::None {
            switched = Some((tick_index, command));
            break;
        }
    }
    let (tick_index, command) = switched.expect("defeat finished");
    assert!((88..=92).contains(&tick_index), "finished at tick {tick_index}");
    assert_eq!(
        command,
        SceneCommand::SwitchTo {
            scene: HIGH_SCORE_SCENE,
            payload: ScenePayload {
                character_key: Some("lily".to_string()),
                elapsed_seconds: Some(defeated_at),
                stage: Some(1),
            },
        }
    );

    assert_eq!(context.boss.phase, BossPhase::Destroyed);
    assert!(!world.is_alive(context.boss.body));
    assert!(context.projectiles.is_empty());
    assert_eq!(world.body_count(), 1);

    let counts = context.events.lifetime_counts();
    assert_eq!(counts.boss_destroyed, 1);
    assert_eq!(counts.score_captured, 1);
    assert_eq!(context.scheduler.pending_count(), 0);
}

#[test]
fn no_patrol_or_volley_after_defeat() {
    let (mut context, mut world) = new_context(patrol_stage());
    for _ in 0..30 {
        tick(&mut context, &mut world);
    }
    defeat_now(&mut context, &mut world);
    let spawned_before = context.events.lifetime_counts().projectile_spawned;

    for _ in 0..80 {
        tick(&mut context, &mut world);
    }

    assert_eq!(
        context.events.lifetime_counts().projectile_spawned,
        spawned_before
    );
    assert_eq!(context.boss.velocity.x, 0.0);
}

#[test]
fn stale_defeat_timers_are_no_ops_after_destroy() {
    let (mut context, mut world) = new_context(patrol_stage());
    defeat_now(&mut context, &mut world);
    for _ in 0..100 {
        tick(&mut context, &mut world);
    }
    assert_eq!(context.boss.phase, BossPhase::Destroyed);

    context.start_defeat_fall(&mut world);
    assert!(context.finish_defeat(&mut world).is_none());
    let counts = context.events.lifetime_counts();
    assert_eq!(counts.defeat_fall_started, 1);
    assert_eq!(counts.boss_destroyed, 1);
}

#[test]
fn touching_boss_counts_one_strike_per_contact() {
    let (mut context, mut world) = new_context(patrol_stage());
    for _ in 0..90 {
        tick(&mut context, &mut world);
    }
    let boss_position = world.find_body(context.boss.body).expect("boss").position;
    if let Some(player) = world.find_body_mut(context.player.body) {
        player.position = Vec2::new(boss_position.x - 50.0, boss_position.y);
    }

    tick(&mut context, &mut world);
    assert_eq!(context.boss.hit_counter, 4);
    assert!(context.player_touching_boss);
    assert_eq!(context.player.velocity.y, -300.0);

    if let Some(player) = world.find_body_mut(context.player.body) {
        player.position = Vec2::new(boss_position.x - 50.0, boss_position.y);
    }
    tick(&mut context, &mut world);
    assert_eq!(context.boss.hit_counter, 4);
}

#[test]
fn player_hit_tints_red_and_clears_after_delay() {
    let (mut context, mut world) = new_context(patrol_stage());
    for _ in 0..60 {
        tick(&mut context, &mut world);
    }
    let player_position = world.find_body(context.player.body).expect("player").position;
    let slip = context.spawn_projectile(&mut world, player_position);
    world.apply_pending();

    tick(&mut context, &mut world);
    assert!(!world.is_alive(slip));
    assert_eq!(
        world.find_body(context.player.body).expect("player").tint,
        Some(0xff0000)
    );
    assert_eq!(context.events.lifetime_counts().player_hit, 1);
    let shake = world.camera().active_shake().expect("hit shake");
    assert_eq!(shake.duration, Duration::from_millis(100));

    for _ in 0..13 {
        tick(&mut context, &mut world);
    }
    assert_eq!(
        world.find_body(context.player.body).expect("player").tint,
        None
    );
}

#[test]
fn debug_title_shows_stage_time_and_hits() {
    let (mut context, mut world) = new_context(patrol_stage());
    for _ in 0..60 {
        tick(&mut context, &mut world);
    }
    assert_eq!(
        context.debug_title(),
        "Detention Hall | Time: 1.00s | Boss hits left: 5"
    );
}

#[test]
fn scene_falls_back_to_first_stage_and_default_character() {
    let stages = StageDatabase::from_stage_defs(vec![jump_charge_stage(), patrol_stage()]);
    let mut scene = EncounterScene::new(stages, Some(3));
    let mut world = SceneWorld::default();

    scene.load(
        &ScenePayload {
            character_key: Some("nobody".to_string()),
            stage: Some(9),
            elapsed_seconds: None,
        },
        &mut world,
    );

    let context = scene.context.as_ref().expect("context");
    assert_eq!(context.stage.stage, 1);
    assert_eq!(context.player.character, DEFAULT_CHARACTER);
}

#[test]
fn scene_without_stages_quits() {
    let mut scene = EncounterScene::new(StageDatabase::default(), None);
    let mut world = SceneWorld::default();
    scene.load(&ScenePayload::default(), &mut world);

    assert_eq!(
        scene.update(DT, &InputSnapshot::empty(), &mut world),
        SceneCommand::Quit
    );
}
