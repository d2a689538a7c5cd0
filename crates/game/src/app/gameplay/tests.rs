use engine::{EnemySpawn, PlayerSpawn, TileIndex};

use super::*;

fn dirt(i: i32, j: i32) -> Tile {
    Tile {
        index: TileIndex(i, j),
        tile_type: "Dirt".to_string(),
        variant: 1,
        layer: 0,
    }
}

fn floor_map(from_i: i32, to_i: i32, j: i32) -> TileMap {
    let mut map = TileMap::new();
    for i in from_i..=to_i {
        map.set_tile(dirt(i, j));
    }
    map
}

fn player_at(pos: Vec2) -> Character {
    Character::new(CharacterName::Player, pos, PLAYER_MAX_HP, &AssetIndex::empty())
}

fn enemy_at(id: u64, pos: Vec2) -> Enemy {
    let mut ch = Character::new(CharacterName::Enemy, pos, ENEMY_MAX_HP, &AssetIndex::empty());
    ch.set_weapon(Weapon::new(WeaponKind::Ar), BulletOwner::Enemy(EnemyId(id)));
    Enemy::new(EnemyId(id), ch)
}

fn enemy_bullet(pos: Vec2, vel: Vec2) -> Bullet {
    Bullet::new(pos, vel, BulletOwner::Enemy(EnemyId(0)), 1)
}

#[test]
fn jump_is_grounded_only_and_sets_the_airtime_sentinel() {
    let mut body = Body::new(Vec2::new(18.0, 180.0), CHARACTER_SIZE);
    assert!(body.grounded());

    body.jump();
    assert_eq!(body.vel.y, JUMP_VEL_Y);
    assert_eq!(body.airtime, JUMP_AIRTIME_SENTINEL);

    // Airborne; a second jump must not re-trigger.
    body.jump();
    assert_eq!(body.vel.y, JUMP_VEL_Y);
    assert_eq!(body.airtime, JUMP_AIRTIME_SENTINEL);
}

#[test]
fn falling_body_lands_flush_on_the_tile_top() {
    let map = floor_map(-1, 1, 5);
    let mut body = Body::new(Vec2::new(18.0, 150.0), CHARACTER_SIZE);

    for _ in 0..120 {
        body.step(&map, 1.0);
    }

    assert!(body.grounded());
    assert_eq!(body.vel.y, 0.0);
    assert!(body.collisions.bottom);
    // Tile row 5 starts at 5 * 36 = 180 world pixels.
    assert_eq!(body.rect().bottom(), 180.0);
}

#[test]
fn sideways_speed_is_clamped_and_friction_never_overshoots() {
    let mut body = Body::new(Vec2::new(18.0, 180.0), CHARACTER_SIZE);
    body.move_sideways(10.0);
    assert_eq!(body.vel.x, CHARACTER_MAX_SPEED);

    body.vel.x = 0.3;
    body.step(&TileMap::new(), 1.0);
    assert_eq!(body.vel.x, 0.0);
}

#[test]
fn walking_into_a_wall_stops_flush_against_it() {
    let mut map = floor_map(-1, 3, 5);
    // Wall column at i = 2, reaching up to head height.
    map.set_tile(dirt(2, 4));
    map.set_tile(dirt(2, 3));

    let mut body = Body::new(Vec2::new(18.0, 180.0), CHARACTER_SIZE);
    for _ in 0..60 {
        body.move_sideways(CHARACTER_MAX_SPEED);
        body.step(&map, 1.0);
    }

    assert!(body.collisions.right);
    assert_eq!(body.vel.x, 0.0);
    assert_eq!(body.rect().right(), 72.0);
}

#[test]
fn weapon_cooldown_gates_every_shot() {
    let mut weapon = Weapon::new(WeaponKind::Pistol);
    assert!(weapon.try_shoot());
    assert!(!weapon.try_shoot());

    for _ in 0..WeaponKind::Pistol.fire_rate() {
        weapon.tick();
    }
    assert!(weapon.try_shoot());
}

#[test]
fn block_parry_window_opens_then_closes() {
    let mut block = BlockState::default();
    assert!(block.can_block(true, Status::Idle));
    assert!(!block.can_block(false, Status::Idle));
    assert!(!block.can_block(true, Status::Jumping));

    block.start();
    assert!(!block.in_parry_window());
    for frame in 1..PARRY_WINDOW_TICKS {
        block.tick();
        assert!(block.in_parry_window(), "frame {frame} must parry");
    }
    block.tick();
    assert!(!block.in_parry_window());
    assert!(block.blocking);
}

#[test]
fn releasing_a_block_starts_the_recovery_timer() {
    let mut block = BlockState::default();
    block.start();
    block.tick();
    block.stop();

    assert!(!block.can_block(true, Status::Idle));
    for _ in 0..BLOCK_RECOVERY_TICKS {
        block.tick();
    }
    assert!(block.can_block(true, Status::Idle));
}

#[test]
fn parry_reflects_the_bullet_and_enters_bullet_time() {
    let mut player = player_at(Vec2::new(100.0, 200.0));
    let mut block = BlockState::default();
    block.start();
    block.tick();

    let map = TileMap::new();
    let mut enemies: Vec<Enemy> = Vec::new();
    let mut clock = SimClock::default();
    let mut bullet = enemy_bullet(
        player.body.center() + Vec2::new(20.0, 0.0),
        Vec2::new(-BULLET_SPEED, 0.0),
    );

    let (mut impacts, mut pickups, mut shake) = (Vec::new(), Vec::new(), Vec::new());
    let mut fx = CombatFx {
        impacts: &mut impacts,
        pickups: &mut pickups,
        shake: &mut shake,
    };
    resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);

    assert!(!bullet.spent);
    assert_eq!(bullet.owner, BulletOwner::Player);
    assert_eq!(bullet.vel, Vec2::new(-BULLET_SPEED * REFLECT_SCALE, 0.0));
    assert_eq!(clock.speed, BULLET_TIME_SPEED);
    assert_eq!(shake, vec![PARRY_SHAKE_DURATION]);
    assert_eq!(player.hp, PLAYER_MAX_HP);
}

#[test]
fn late_block_absorbs_instead_of_reflecting() {
    let mut player = player_at(Vec2::new(100.0, 200.0));
    let mut block = BlockState::default();
    block.start();
    for _ in 0..PARRY_WINDOW_TICKS + 2 {
        block.tick();
    }

    let map = TileMap::new();
    let mut enemies: Vec<Enemy> = Vec::new();
    let mut clock = SimClock::default();
    let mut bullet = enemy_bullet(player.body.center(), Vec2::new(-BULLET_SPEED, 0.0));

    let (mut impacts, mut pickups, mut shake) = (Vec::new(), Vec::new(), Vec::new());
    let mut fx = CombatFx {
        impacts: &mut impacts,
        pickups: &mut pickups,
        shake: &mut shake,
    };
    resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);

    assert!(bullet.spent);
    assert_eq!(bullet.owner, BulletOwner::Enemy(EnemyId(0)));
    assert_eq!(clock.speed, 1.0);
    assert_eq!(player.hp, PLAYER_MAX_HP);
    assert_eq!(impacts.len(), IMPACT_BURST_COUNT as usize);
    assert!(shake.is_empty());
}

#[test]
fn third_unblocked_hit_kills_the_player_and_drops_the_weapon_once() {
    let mut player = player_at(Vec2::new(100.0, 200.0));
    player.set_weapon(Weapon::new(WeaponKind::Pistol), BulletOwner::Player);
    let block = BlockState::default();
    let map = TileMap::new();
    let mut enemies: Vec<Enemy> = Vec::new();
    let mut clock = SimClock::default();

    let (mut impacts, mut pickups, mut shake) = (Vec::new(), Vec::new(), Vec::new());
    let mut fx = CombatFx {
        impacts: &mut impacts,
        pickups: &mut pickups,
        shake: &mut shake,
    };
    for hit in 1..=3 {
        let mut bullet = enemy_bullet(player.body.center(), Vec2::new(-BULLET_SPEED, 0.0));
        resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);
        assert!(bullet.spent);
        assert_eq!(player.hp, PLAYER_MAX_HP - hit);
    }

    assert!(!player.alive());
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].content.kind, WeaponKind::Pistol);
    assert!(shake.contains(&DEATH_SHAKE_DURATION));
}

#[test]
fn reflected_bullet_scores_exactly_one_hit() {
    let mut player = player_at(Vec2::new(100.0, 200.0));
    let mut block = BlockState::default();
    block.start();
    block.tick();

    let map = TileMap::new();
    let mut enemies = vec![enemy_at(0, Vec2::new(300.0, 200.0))];
    let mut clock = SimClock::default();
    let mut bullet = enemy_bullet(
        player.body.center() + Vec2::new(20.0, 0.0),
        Vec2::new(-BULLET_SPEED, 0.0),
    );

    let (mut impacts, mut pickups, mut shake) = (Vec::new(), Vec::new(), Vec::new());
    let mut fx = CombatFx {
        impacts: &mut impacts,
        pickups: &mut pickups,
        shake: &mut shake,
    };
    resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);
    assert_eq!(bullet.owner, BulletOwner::Player);

    bullet.pos = enemies[0].ch.body.center();
    resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);
    assert!(bullet.spent);
    assert_eq!(enemies[0].ch.hp, ENEMY_MAX_HP - 1);

    // A spent bullet never resolves again.
    resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);
    assert_eq!(enemies[0].ch.hp, ENEMY_MAX_HP - 1);
}

#[test]
fn killing_an_enemy_drops_its_weapon_as_a_pickup() {
    let mut player = player_at(Vec2::new(100.0, 200.0));
    let block = BlockState::default();
    let map = TileMap::new();
    let mut enemies = vec![enemy_at(0, Vec2::new(300.0, 200.0))];
    let mut clock = SimClock::default();

    let (mut impacts, mut pickups, mut shake) = (Vec::new(), Vec::new(), Vec::new());
    let mut fx = CombatFx {
        impacts: &mut impacts,
        pickups: &mut pickups,
        shake: &mut shake,
    };
    for _ in 0..ENEMY_MAX_HP {
        let mut bullet = Bullet::new(
            enemies[0].ch.body.center(),
            Vec2::new(BULLET_SPEED, 0.0),
            BulletOwner::Player,
            1,
        );
        resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);
        assert!(bullet.spent);
    }

    assert!(!enemies[0].ch.alive());
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].content.kind, WeaponKind::Ar);
    assert!(!pickups[0].collectable());
    assert!(shake.contains(&DEATH_SHAKE_DURATION));
}

#[test]
fn bullets_stop_on_collidable_tiles_and_expire_by_age() {
    let map = floor_map(0, 0, 0);
    let mut player = player_at(Vec2::new(500.0, 500.0));
    let block = BlockState::default();
    let mut enemies: Vec<Enemy> = Vec::new();
    let mut clock = SimClock::default();
    let mut bullet = Bullet::new(Vec2::new(10.0, 10.0), Vec2::ZERO, BulletOwner::Player, 1);

    let (mut impacts, mut pickups, mut shake) = (Vec::new(), Vec::new(), Vec::new());
    let mut fx = CombatFx {
        impacts: &mut impacts,
        pickups: &mut pickups,
        shake: &mut shake,
    };
    resolve_bullet(&mut bullet, &map, &mut enemies, &mut player, &block, &mut clock, &mut fx);
    assert!(bullet.spent);
    assert_eq!(impacts.len(), IMPACT_BURST_COUNT as usize);

    let mut old = Bullet::new(Vec2::new(500.0, 500.0), Vec2::ZERO, BulletOwner::Player, 1);
    for _ in 0..=BULLET_MAX_DURATION {
        old.advance(1.0);
    }
    assert!(old.expired());
}

#[test]
fn collecting_a_pickup_swaps_the_held_weapon() {
    let mut player = player_at(Vec2::new(100.0, 200.0));
    player.set_weapon(Weapon::new(WeaponKind::Pistol), BulletOwner::Player);
    let mut pickups = vec![PickUp::new(
        player.body.pos,
        Vec2::ZERO,
        Weapon::new(WeaponKind::Ar),
        0,
    )];

    collect_pickups(&mut player, &mut pickups);

    let held = player.weapon.as_ref().expect("weapon");
    assert_eq!(held.kind, WeaponKind::Ar);
    assert_eq!(held.owner, Some(BulletOwner::Player));
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].content.kind, WeaponKind::Pistol);
    assert!(!pickups[0].collectable());
}

#[test]
fn fresh_drops_are_immune_until_the_timer_runs_out() {
    let mut player = player_at(Vec2::new(100.0, 200.0));
    player.set_weapon(Weapon::new(WeaponKind::Pistol), BulletOwner::Player);
    let mut pickups = vec![PickUp::new(
        player.body.pos,
        Vec2::ZERO,
        Weapon::new(WeaponKind::Ar),
        PICKUP_IMMUNITY_TICKS,
    )];

    collect_pickups(&mut player, &mut pickups);
    assert_eq!(player.weapon.as_ref().expect("weapon").kind, WeaponKind::Pistol);
    assert_eq!(pickups.len(), 1);

    let mut pickup = PickUp::new(Vec2::new(0.0, 0.0), Vec2::ZERO, Weapon::new(WeaponKind::Ar), 1);
    pickup.step(&TileMap::new(), 1.0);
    assert!(pickup.collectable());
}

#[test]
fn falling_out_of_the_level_is_instant_death() {
    let map = TileMap::new();
    let mut player = player_at(Vec2::new(100.0, map.bottom_bound() + 200.0));
    player.set_weapon(Weapon::new(WeaponKind::Pistol), BulletOwner::Player);

    let (mut impacts, mut pickups, mut shake) = (Vec::new(), Vec::new(), Vec::new());
    let mut fx = CombatFx {
        impacts: &mut impacts,
        pickups: &mut pickups,
        shake: &mut shake,
    };
    check_out_of_bounds(&mut player, &map, &mut fx);
    assert!(!player.alive());
    assert_eq!(fx.pickups.len(), 1);

    // The dead do not die twice.
    check_out_of_bounds(&mut player, &map, &mut fx);
    assert_eq!(pickups.len(), 1);
    assert_eq!(shake, vec![DEATH_SHAKE_DURATION]);
}

#[test]
fn status_follows_ground_speed_and_airtime() {
    let assets = AssetIndex::empty();
    let mut ch = player_at(Vec2::new(100.0, 200.0));
    assert_eq!(ch.status, Status::Idle);

    ch.body.vel.x = 2.0;
    ch.refresh_status(&assets);
    assert_eq!(ch.status, Status::Walking);
    assert_eq!(ch.animation.group, "characters/Player/Walking");

    ch.body.vel.x = 0.0;
    ch.refresh_status(&assets);
    assert_eq!(ch.status, Status::Idle);

    ch.body.airtime = JUMP_AIRTIME_SENTINEL;
    ch.refresh_status(&assets);
    assert_eq!(ch.status, Status::Jumping);

    // Crouching belongs to the block logic; refresh leaves it alone.
    ch.body.airtime = 0;
    ch.set_status(Status::Crouching, &assets);
    ch.refresh_status(&assets);
    assert_eq!(ch.status, Status::Crouching);
}

#[test]
fn sim_clock_recovers_linearly_from_bullet_time() {
    let mut clock = SimClock::default();
    assert_eq!(clock.shade_alpha(), 0);

    clock.enter_bullet_time();
    assert_eq!(clock.speed, BULLET_TIME_SPEED);
    assert!(clock.shade_alpha() > 0);

    for _ in 0..15 {
        clock.tick();
    }
    assert_eq!(clock.speed, 1.0);
    assert_eq!(clock.shade_alpha(), 0);
}

#[test]
fn transition_reloads_at_zero_and_finishes_at_the_far_edge() {
    let mut transition = Transition::start();
    for _ in 0..TRANSITION_HALF_TICKS - 1 {
        assert!(!transition.tick());
    }
    assert!(transition.tick());
    assert!(transition.is_active());

    for _ in 0..TRANSITION_HALF_TICKS - 1 {
        assert!(!transition.tick());
    }
    assert!(!transition.tick());
    assert_eq!(transition, Transition::Playing);
}

#[test]
fn wipe_radius_shrinks_to_zero_at_the_reload_tick() {
    let view = (800, 600);
    assert_eq!(Transition::start().wipe_radius(view), Some(500.0));
    assert_eq!(Transition::Wipe { counter: 0 }.wipe_radius(view), Some(0.0));
    assert_eq!(Transition::Playing.wipe_radius(view), None);
}

#[test]
fn line_of_sight_is_blocked_by_collidable_tiles() {
    let from = Vec2::new(18.0, 90.0);
    let target = Vec2::new(150.0, 90.0);
    let dir = Vec2::new(1.0, 0.0);

    let clear = TileMap::new();
    assert!(line_of_sight(&clear, from, target, dir));

    let mut walled = TileMap::new();
    walled.set_tile(dirt(2, 2));
    assert!(!line_of_sight(&walled, from, target, dir));
}

#[test]
fn patrol_turns_at_ledges_and_walls() {
    let mut map = TileMap::new();
    map.set_tile(dirt(0, 5));

    // Near the right edge of a one-tile platform: no floor ahead.
    let mut enemy = enemy_at(0, Vec2::new(30.0, 180.0));
    patrol(&mut enemy, &map);
    assert_eq!(enemy.patrol_dir, -1.0);
    assert!(enemy.ch.body.vel.x < 0.0);

    enemy.ch.body.collisions.left = true;
    patrol(&mut enemy, &map);
    assert_eq!(enemy.patrol_dir, 1.0);
}

#[test]
fn enemies_shoot_when_the_player_is_in_sight() {
    let map = TileMap::new();
    let mut enemy = enemy_at(3, Vec2::new(100.0, 200.0));
    let player = player_at(Vec2::new(180.0, 200.0));
    let mut bullets = Vec::new();

    enemy_tick(&mut enemy, &player, &map, &mut bullets, &AssetIndex::empty(), 1.0);

    assert!(enemy.player_spotted);
    assert_eq!(bullets.len(), 1);
    assert_eq!(bullets[0].owner, BulletOwner::Enemy(EnemyId(3)));
    assert!(!enemy.ch.flip);
}

#[test]
fn dead_players_are_not_targets() {
    let map = TileMap::new();
    let mut enemy = enemy_at(0, Vec2::new(100.0, 200.0));
    let mut player = player_at(Vec2::new(180.0, 200.0));
    player.take_hit(PLAYER_MAX_HP);
    let mut bullets = Vec::new();

    enemy_tick(&mut enemy, &player, &map, &mut bullets, &AssetIndex::empty(), 1.0);

    assert!(!enemy.player_spotted);
    assert!(bullets.is_empty());
}

#[test]
fn aim_falls_back_to_the_previous_direction() {
    let player = player_at(Vec2::new(100.0, 200.0));
    let previous = Vec2::new(0.0, -1.0);

    assert_eq!(player_aim(&player, previous, None), previous);
    assert_eq!(
        player_aim(&player, previous, Some(player.body.center())),
        previous
    );
    assert_eq!(
        player_aim(&player, previous, Some(player.body.center() + Vec2::new(50.0, 0.0))),
        Vec2::new(1.0, 0.0)
    );
}

#[test]
fn grass_leans_away_from_a_close_player() {
    let mut blade = GrassBlade::new(Vec2::new(100.0, 100.0), GRASS_SHADES[0]);

    blade.tick(Vec2::new(90.0, 100.0));
    assert!(blade.lean < 0.0);

    blade.tick(Vec2::new(110.0, 100.0));
    assert!(blade.lean > 0.0);

    blade.tick(Vec2::new(500.0, 100.0));
    assert_eq!(blade.lean, 0.0);
}

fn scene_world(with_enemy: bool) -> SceneWorld {
    let mut world = SceneWorld::new(AssetIndex::empty(), (800, 600));
    for i in 0..6 {
        world.tilemap_mut().set_tile(dirt(i, 10));
    }
    world.tilemap_mut().set_player_spawn(PlayerSpawn {
        coord: Vec2::new(54.0, 360.0),
    });
    if with_enemy {
        world.tilemap_mut().set_enemy_spawn(EnemySpawn {
            index: TileIndex(4, 9),
            coord: Vec2::new(162.0, 360.0),
            variant: 2,
        });
    }
    world
}

#[test]
fn play_scene_spawns_everything_from_the_map() {
    let mut world = scene_world(true);
    let mut scene = PlayScene::new();
    scene.load(&mut world);

    let player = scene.player.as_ref().expect("player");
    assert_eq!(player.body.pos, Vec2::new(54.0, 360.0));
    assert_eq!(player.weapon.as_ref().expect("weapon").kind, WeaponKind::Pistol);

    assert_eq!(scene.enemies.len(), 1);
    // Spawn variant 2 and above carries the rifle.
    assert_eq!(
        scene.enemies[0].ch.weapon.as_ref().expect("weapon").kind,
        WeaponKind::Ar
    );
    assert_eq!(scene.clouds.len(), CLOUD_COUNT);
}

#[test]
fn play_scene_switches_to_the_editor_on_request() {
    let mut world = scene_world(true);
    let mut scene = PlayScene::new();
    scene.load(&mut world);

    let input = InputSnapshot::empty().with_action_pressed(InputAction::SwitchScene);
    assert_eq!(
        scene.update(&input, &mut world),
        SceneCommand::SwitchTo(SceneKey::Editor)
    );
}

#[test]
fn holding_fire_shoots_at_the_weapon_rate() {
    let mut world = scene_world(false);
    let mut scene = PlayScene::new();
    scene.load(&mut world);

    let input = InputSnapshot::empty()
        .with_cursor_view_px(Some(Vec2::new(700.0, 300.0)))
        .with_left_mouse_down(true);
    scene.update(&input, &mut world);
    assert_eq!(scene.bullets.len(), 1);

    // Still inside the pistol cooldown.
    scene.update(&input, &mut world);
    assert_eq!(scene.bullets.len(), 1);
}

#[test]
fn blocking_suppresses_fire() {
    let mut world = scene_world(false);
    let mut scene = PlayScene::new();
    scene.load(&mut world);

    let input = InputSnapshot::empty()
        .with_action_down(InputAction::Block, true)
        .with_cursor_view_px(Some(Vec2::new(700.0, 300.0)))
        .with_left_mouse_down(true);
    scene.update(&input, &mut world);

    assert!(scene.block.blocking);
    assert!(scene.bullets.is_empty());
    assert_eq!(scene.player.as_ref().expect("player").status, Status::Crouching);
}

#[test]
fn clearing_the_level_runs_the_wipe_and_reloads() {
    let mut world = scene_world(false);
    let mut scene = PlayScene::new();
    scene.load(&mut world);
    assert!(scene.enemies.is_empty());

    let input = InputSnapshot::empty();
    scene.update(&input, &mut world);
    assert!(scene.transition.is_active());

    // Up to the reload tick the player survives untouched.
    for _ in 0..TRANSITION_HALF_TICKS - 1 {
        scene.update(&input, &mut world);
    }
    assert!(scene.transition.is_active());
    assert!(scene.player.as_ref().expect("player").alive());

    // The second wipe half plays out after the respawn.
    for _ in 0..TRANSITION_HALF_TICKS {
        scene.update(&input, &mut world);
    }
    assert_eq!(scene.transition, Transition::Playing);
    assert_eq!(
        scene.player.as_ref().expect("player").body.pos,
        Vec2::new(54.0, 360.0)
    );
}

#[test]
fn render_clears_to_sky_and_draws_the_world() {
    let mut world = scene_world(true);
    let mut scene = PlayScene::new();
    scene.load(&mut world);
    scene.render(&mut world);

    let commands = world.frame_commands();
    assert_eq!(commands[0], DrawCommand::Clear { color: SKY_COLOR });
    assert!(commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Sprite { group, .. } if group == "tiles/Dirt")));
    // The alive player draws an aim line.
    assert!(commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Line { .. })));
}

#[test]
fn unload_clears_all_entities_and_the_camera() {
    let mut world = scene_world(true);
    let mut scene = PlayScene::new();
    scene.load(&mut world);
    scene.update(&InputSnapshot::empty(), &mut world);

    scene.unload(&mut world);
    assert!(scene.player.is_none());
    assert!(scene.enemies.is_empty());
    assert_eq!(*world.viewport(), ViewportState::default());
}
