/// A hostile character plus its patrol/aim state. Enemies patrol until a
/// raycast spots the player, then stand and shoot.
#[derive(Debug, Clone, PartialEq)]
struct Enemy {
    id: EnemyId,
    ch: Character,
    aim: Vec2,
    player_spotted: bool,
    patrol_dir: f32,
}

impl Enemy {
    fn new(id: EnemyId, ch: Character) -> Self {
        Self {
            id,
            ch,
            aim: Vec2::new(1.0, 0.0),
            player_spotted: false,
            patrol_dir: 1.0,
        }
    }
}

/// Side effects a combat event fans out into. Owned by the scene and passed
/// to the systems so death handling stays in one place.
struct CombatFx<'a> {
    impacts: &'a mut Vec<Impact>,
    pickups: &'a mut Vec<PickUp>,
    shake: &'a mut Vec<u32>,
}

impl CombatFx<'_> {
    fn shake_screen(&mut self, duration: u32) {
        self.shake.push(duration);
    }
}

/// Killing-hit fallout, fired exactly once per death: particle burst,
/// camera shake, and the held weapon dropped as a pickup.
fn on_death(ch: &mut Character, fx: &mut CombatFx<'_>) {
    impact_burst(
        fx.impacts,
        ch.body.center(),
        DEATH_BURST_COUNT,
        8.0,
        BLOOD_COLOR,
    );
    fx.shake_screen(DEATH_SHAKE_DURATION);
    if let Some(weapon) = ch.drop_weapon() {
        fx.pickups.push(spawn_dropped_pickup(&ch.body, weapon));
    }
}

/// Dropped weapons fly opposite the dropper's motion, or to a fixed side
/// when it stands still.
fn spawn_dropped_pickup(body: &Body, weapon: Weapon) -> PickUp {
    let dir = if body.vel.x > 0.0 { -1.0 } else { 1.0 };
    let vel = Vec2::new(PICKUP_DROP_VEL.x * dir, PICKUP_DROP_VEL.y);
    PickUp::new(body.pos, vel, weapon, PICKUP_IMMUNITY_TICKS)
}

/// Below the lethal depth is instant death, not gradual damage.
fn check_out_of_bounds(ch: &mut Character, map: &TileMap, fx: &mut CombatFx<'_>) {
    if ch.alive() && ch.body.rect().top() > map.bottom_bound() && ch.take_hit(ch.max_hp) {
        on_death(ch, fx);
    }
}

fn player_control(
    player: &mut Character,
    block: &mut BlockState,
    input: &InputSnapshot,
    assets: &AssetIndex,
) {
    block.tick();

    if block.blocking {
        // A ledge ends the block; blocking is a grounded stance.
        if !input.is_down(InputAction::Block) || !player.body.grounded() {
            block.stop();
            player.set_status(Status::Idle, assets);
        }
        return;
    }

    if input.is_down(InputAction::Block) && block.can_block(player.body.grounded(), player.status)
    {
        block.start();
        player.set_status(Status::Crouching, assets);
        return;
    }

    if input.is_down(InputAction::MoveLeft) {
        player.body.move_sideways(-1.0);
    }
    if input.is_down(InputAction::MoveRight) {
        player.body.move_sideways(1.0);
    }
    if input.is_down(InputAction::Jump) {
        player.body.jump();
    }
}

/// Unit vector from the player toward the cursor, or the previous aim when
/// the cursor is unavailable or sits exactly on the player.
fn player_aim(player: &Character, previous: Vec2, cursor_world: Option<Vec2>) -> Vec2 {
    cursor_world
        .and_then(|cursor| (cursor - player.body.center()).normalized())
        .unwrap_or(previous)
}

fn player_shoot(player: &mut Character, aim: Vec2, bullets: &mut Vec<Bullet>) {
    let Some(weapon) = player.weapon.as_mut() else {
        return;
    };
    let damage = weapon.kind.damage();
    if weapon.try_shoot() {
        let start = player.body.center() + aim * BULLET_MUZZLE_OFFSET;
        bullets.push(Bullet::new(
            start,
            aim * BULLET_SPEED,
            BulletOwner::Player,
            damage,
        ));
    }
}

/// Samples along the ray toward `target` in 0.8-tile steps; true once the
/// steps have covered the distance without crossing a collidable tile.
fn line_of_sight(map: &TileMap, from: Vec2, target: Vec2, dir: Vec2) -> bool {
    let diff_x = (target.x - from.x).abs();
    let diff_y = (target.y - from.y).abs();
    for i in 0..ENEMY_SIGHT_STEPS {
        let step = dir * (i as f32 * TILE_SIZE_F * ENEMY_SIGHT_STEP_FRACTION);
        if step.x.abs() >= diff_x && step.y.abs() >= diff_y {
            return true;
        }
        let probe = from + step;
        if map
            .tile_at_world(probe)
            .is_some_and(|tile| tile.is_collidable())
        {
            return false;
        }
    }
    false
}

fn enemy_tick(
    enemy: &mut Enemy,
    player: &Character,
    map: &TileMap,
    bullets: &mut Vec<Bullet>,
    assets: &AssetIndex,
    game_speed: f32,
) {
    if let Some(weapon) = enemy.ch.weapon.as_mut() {
        weapon.tick();
    }

    enemy.ch.refresh_status(assets);

    enemy.player_spotted = false;
    if player.alive() {
        let from = enemy.ch.body.center();
        let target = player.body.center();
        if let Some(dir) = (target - from).normalized() {
            if line_of_sight(map, from, target, dir) {
                enemy.aim = dir;
                enemy.player_spotted = true;
            }
        }
    }

    if enemy.player_spotted {
        if let Some(weapon) = enemy.ch.weapon.as_mut() {
            let damage = weapon.kind.damage();
            if weapon.try_shoot() {
                let start = enemy.ch.body.center() + enemy.aim * BULLET_MUZZLE_OFFSET;
                bullets.push(Bullet::new(
                    start,
                    enemy.aim * BULLET_SPEED,
                    BulletOwner::Enemy(enemy.id),
                    damage,
                ));
            }
        }
        enemy.ch.flip = enemy.aim.x < 0.0;
    } else {
        patrol(enemy, map);
        enemy.ch.flip = enemy.patrol_dir < 0.0;
    }

    enemy.ch.body.step(map, game_speed);
}

/// Ledge and wall turnaround. Both probes go by `tile_type`; decorative
/// tiles neither hold the enemy up nor stop it.
fn patrol(enemy: &mut Enemy, map: &TileMap) {
    let body = &enemy.ch.body;
    if body.grounded() {
        let rect = body.rect();
        let front_x = if enemy.patrol_dir > 0.0 {
            rect.right() + 1.0
        } else {
            rect.left() - 1.0
        };
        let floor_ahead = map
            .tile_at_world(Vec2::new(front_x, body.pos.y + 1.0))
            .is_some_and(|tile| tile.is_collidable());
        if !floor_ahead {
            enemy.patrol_dir = -enemy.patrol_dir;
        }
    }
    if body.collisions.left {
        enemy.patrol_dir = 1.0;
    } else if body.collisions.right {
        enemy.patrol_dir = -1.0;
    }
    enemy.ch.body.move_sideways(enemy.patrol_dir * ENEMY_PATROL_SPEED);
}

/// Per-bullet resolution, first match wins:
/// tile hit, then player-owned vs enemies, then enemy-owned vs the player's
/// parry window, plain block, and finally the player's body.
fn resolve_bullet(
    bullet: &mut Bullet,
    map: &TileMap,
    enemies: &mut [Enemy],
    player: &mut Character,
    block: &BlockState,
    clock: &mut SimClock,
    fx: &mut CombatFx<'_>,
) {
    if bullet.spent || bullet.expired() {
        bullet.spent = true;
        return;
    }

    if map
        .tile_at_world(bullet.pos)
        .is_some_and(|tile| tile.is_collidable())
    {
        impact_burst(fx.impacts, bullet.pos, IMPACT_BURST_COUNT, 4.0, IMPACT_COLOR);
        bullet.spent = true;
        return;
    }

    match bullet.owner {
        BulletOwner::Player => {
            for enemy in enemies.iter_mut() {
                if !enemy.ch.alive() {
                    continue;
                }
                if enemy.ch.body.rect().contains_point(bullet.pos) {
                    if enemy.ch.take_hit(bullet.damage) {
                        on_death(&mut enemy.ch, fx);
                    }
                    impact_burst(fx.impacts, bullet.pos, IMPACT_BURST_COUNT, 5.0, BLOOD_COLOR);
                    bullet.spent = true;
                    return;
                }
            }
        }
        BulletOwner::Enemy(_) => {
            let within_guard = bullet.pos.distance_to(player.body.center()) <= PARRY_RADIUS;
            if block.in_parry_window() && within_guard {
                bullet.reflect();
                fx.shake_screen(PARRY_SHAKE_DURATION);
                clock.enter_bullet_time();
                return;
            }
            if block.blocking && within_guard {
                impact_burst(fx.impacts, bullet.pos, IMPACT_BURST_COUNT, 3.0, IMPACT_COLOR);
                bullet.spent = true;
                return;
            }
            if player.alive() && player.body.rect().contains_point(bullet.pos) {
                if player.take_hit(bullet.damage) {
                    on_death(player, fx);
                }
                fx.shake_screen(HIT_SHAKE_DURATION);
                impact_burst(fx.impacts, bullet.pos, IMPACT_BURST_COUNT, 5.0, BLOOD_COLOR);
                bullet.spent = true;
            }
        }
    }
}

/// Player-pickup intersection. Swapping drops the held weapon as a fresh
/// pickup before the carried one transfers; exactly one owner at a time.
fn collect_pickups(player: &mut Character, pickups: &mut Vec<PickUp>) {
    if !player.alive() {
        return;
    }
    let player_rect = player.body.rect();
    let mut collected: Option<usize> = None;
    for (i, pickup) in pickups.iter().enumerate() {
        if pickup.collectable() && player_rect.intersects(&pickup.rect()) {
            collected = Some(i);
            break;
        }
    }
    let Some(i) = collected else {
        return;
    };
    let pickup = pickups.remove(i);
    if let Some(previous) = player.drop_weapon() {
        pickups.push(spawn_dropped_pickup(&player.body, previous));
    }
    player.set_weapon(pickup.content, BulletOwner::Player);
}
