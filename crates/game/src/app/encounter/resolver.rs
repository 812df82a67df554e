// Collision handlers. Each one checks liveness first so a callback that lands
// after its target left the live state is a no-op.

fn on_player_boss_overlap(player: &mut PlayerState, boss: &mut BossState) -> CollisionEffect {
    if !boss.is_active() || boss.hit_counter == 0 {
        return CollisionEffect::Ignored;
    }

    boss.hit_counter -= 1;
    player.velocity.y = BOSS_BOUNCE_VELOCITY_Y;

    if boss.hit_counter == 0 {
        boss.phase = BossPhase::DefeatedFalling;
        return CollisionEffect::BossDefeated {
            bounce_velocity_y: BOSS_BOUNCE_VELOCITY_Y,
        };
    }

    CollisionEffect::BossStruck {
        remaining: boss.hit_counter,
        bounce_velocity_y: BOSS_BOUNCE_VELOCITY_Y,
    }
}

fn on_player_projectile(
    player: &mut PlayerState,
    projectile: &mut ProjectileState,
    now: Duration,
) -> CollisionEffect {
    if projectile.phase != ProjectilePhase::Alive {
        return CollisionEffect::Ignored;
    }
    projectile.phase = ProjectilePhase::Destroyed;

    if now < player.invulnerable_until {
        return CollisionEffect::ProjectileDestroyed {
            projectile: projectile.body,
        };
    }

    player.invulnerable_until = now + PLAYER_INVULNERABILITY;
    CollisionEffect::PlayerHit {
        projectile: projectile.body,
        shake: PLAYER_HIT_SHAKE,
        tint: PLAYER_HIT_TINT,
        tint_duration: PLAYER_HIT_TINT_DURATION,
    }
}

/// Also used when a slip leaves the world horizontally.
fn on_projectile_ground(projectile: &mut ProjectileState) -> CollisionEffect {
    if projectile.phase != ProjectilePhase::Alive {
        return CollisionEffect::Ignored;
    }
    projectile.phase = ProjectilePhase::Destroyed;
    CollisionEffect::ProjectileDestroyed {
        projectile: projectile.body,
    }
}
