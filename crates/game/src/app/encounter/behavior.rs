fn arm_boss_behavior(boss: &mut BossState, scheduler: &mut Scheduler<EncounterTimer>) {
    match boss.behavior {
        BossBehaviorKind::Patrol => {
            boss.timers.push(
                scheduler.repeating(PATROL_REVERSE_INTERVAL, EncounterTimer::PatrolReverse),
            );
        }
        BossBehaviorKind::PatrolJumpCharge => {
            boss.timers.push(
                scheduler.repeating(BEHAVIOR_TICK_INTERVAL, EncounterTimer::BehaviorTick),
            );
        }
    }
    if boss.throws_slips {
        boss.timers
            .push(scheduler.repeating(SLIP_VOLLEY_INTERVAL, EncounterTimer::SlipVolley));
    }
}

fn rolls_jump(jump_roll: u32) -> bool {
    jump_roll <= JUMP_CHANCE_PERCENT
}

/// Runs one fired behavior timer against the boss.
///
/// `jump_roll` is the 1..=100 draw for this firing; only the behavior tick
/// reads it. Once the boss has left `Active` every timer asks to be cancelled
/// and touches nothing.
fn run_behavior_timer(
    boss: &mut BossState,
    timer: EncounterTimer,
    player_position: Vec2,
    jump_roll: u32,
) -> BehaviorOutcome {
    if !boss.is_active() {
        return BehaviorOutcome::cancelled();
    }

    let mut outcome = BehaviorOutcome::default();
    match timer {
        EncounterTimer::PatrolReverse => {
            boss.velocity.x = -boss.velocity.x;
        }
        EncounterTimer::SlipVolley => {
            outcome.spawn_projectile_at = Some(boss.position);
        }
        EncounterTimer::BehaviorTick => {
            behavior_tick(boss, player_position, jump_roll, &mut outcome);
        }
        EncounterTimer::JumpCooldownReset => {
            boss.can_jump = true;
        }
        EncounterTimer::ChargeRevert { base_speed } => {
            let direction = if boss.velocity.x < 0.0 { 1.0 } else { -1.0 };
            boss.velocity.x = direction * base_speed;
        }
        EncounterTimer::DefeatFall
        | EncounterTimer::DefeatFinish
        | EncounterTimer::ClearPlayerTint => {}
    }
    outcome
}

fn behavior_tick(
    boss: &mut BossState,
    player_position: Vec2,
    jump_roll: u32,
    outcome: &mut BehaviorOutcome,
) {
    if boss.can_jump && rolls_jump(jump_roll) {
        boss.velocity.y = BOSS_JUMP_VELOCITY_Y;
        boss.can_jump = false;
        outcome
            .schedule
            .push((JUMP_COOLDOWN, EncounterTimer::JumpCooldownReset));
    }

    let distance = boss.position.distance(player_position);
    if distance < boss.attack_range {
        let base_speed = boss.velocity.x.abs();
        boss.velocity.x *= CHARGE_MULTIPLIER;
        outcome
            .schedule
            .push((CHARGE_DURATION, EncounterTimer::ChargeRevert { base_speed }));
    } else if boss.position.x <= boss.roaming.min {
        boss.velocity.x = boss.patrol_speed;
    } else if boss.position.x >= boss.roaming.max {
        boss.velocity.x = -boss.patrol_speed;
    }
}
