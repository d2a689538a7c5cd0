const PLAYER_FALLBACK_SPAWN: Vec2 = Vec2 { x: 100.0, y: 352.0 };
const CLOUD_COUNT: usize = 8;

/// The simulation scene: owns every live entity collection and advances one
/// tick per update in a fixed order. Transient collections are pruned only
/// at the end of the tick, so removal never skips a neighbor mid-iteration.
pub(crate) struct PlayScene {
    player: Option<Character>,
    block: BlockState,
    aim: Vec2,
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet>,
    impacts: Vec<Impact>,
    pickups: Vec<PickUp>,
    grass: Vec<GrassBlade>,
    clouds: Vec<Cloud>,
    clock: SimClock,
    transition: Transition,
    next_enemy_id: u64,
    shake_requests: Vec<u32>,
}

impl PlayScene {
    pub(crate) fn new() -> Self {
        Self {
            player: None,
            block: BlockState::default(),
            aim: Vec2::new(1.0, 0.0),
            enemies: Vec::new(),
            bullets: Vec::new(),
            impacts: Vec::new(),
            pickups: Vec::new(),
            grass: Vec::new(),
            clouds: Vec::new(),
            clock: SimClock::default(),
            transition: Transition::Playing,
            next_enemy_id: 0,
            shake_requests: Vec::new(),
        }
    }

    fn alloc_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        id
    }

    /// Fresh entities from the current map: player at its spawn, one enemy
    /// per spawn record, grass on its anchors, and a recentered camera.
    fn spawn_from_map(&mut self, world: &mut SceneWorld) {
        use rand::Rng;

        let assets = world.assets().clone();
        let view_size = world.view_size();

        let player_pos = world
            .tilemap()
            .player_spawn()
            .map(|spawn| spawn.coord)
            .unwrap_or(PLAYER_FALLBACK_SPAWN);
        let mut player = Character::new(CharacterName::Player, player_pos, PLAYER_MAX_HP, &assets);
        player.set_weapon(Weapon::new(WeaponKind::Pistol), BulletOwner::Player);

        self.enemies.clear();
        let spawns: Vec<_> = world.tilemap().enemy_spawns().cloned().collect();
        for spawn in spawns {
            let id = self.alloc_enemy_id();
            let mut ch = Character::new(CharacterName::Enemy, spawn.coord, ENEMY_MAX_HP, &assets);
            let kind = if spawn.variant >= 2 {
                WeaponKind::Ar
            } else {
                WeaponKind::Pistol
            };
            ch.set_weapon(Weapon::new(kind), BulletOwner::Enemy(id));
            self.enemies.push(Enemy::new(id, ch));
        }

        let mut rng = rand::thread_rng();
        self.grass = world
            .tilemap()
            .grass_anchors()
            .map(|anchor| {
                let shade = GRASS_SHADES[rng.gen_range(0..GRASS_SHADES.len())];
                GrassBlade::new(anchor.coord, shade)
            })
            .collect();

        self.clouds = (0..CLOUD_COUNT)
            .map(|_| Cloud {
                pos: Vec2::new(
                    rng.gen_range(0.0..view_size.0 as f32),
                    rng.gen_range(0.0..view_size.1 as f32),
                ),
                depth: rng.gen_range(0.2..0.8),
                speed: rng.gen_range(0.2..0.6),
            })
            .collect();

        self.bullets.clear();
        self.impacts.clear();
        self.pickups.clear();
        self.shake_requests.clear();
        self.block = BlockState::default();
        self.aim = Vec2::new(1.0, 0.0);
        self.clock = SimClock::default();
        self.transition = Transition::Playing;

        let viewport = world.viewport_mut();
        viewport.reset();
        viewport.set_offset(Vec2::new(
            player.body.center().x - view_size.0 as f32 / 2.0,
            player.body.center().y - view_size.1 as f32 / 2.0,
        ));
        self.player = Some(player);
    }

    fn reload_level(&mut self, world: &mut SceneWorld) {
        if let Some(path) = world.level_path().map(|path| path.to_path_buf()) {
            match world.tilemap_mut().load_level(&path) {
                Ok(()) => info!(level = %path.display(), "level_reloaded"),
                Err(error) => {
                    warn!(level = %path.display(), error = %error, "level_reload_failed")
                }
            }
        }
        self.spawn_from_map(world);
    }

    fn tick(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        let assets = world.assets().clone();
        let view_size = world.view_size();
        self.shake_requests.clear();

        let cursor_world = input
            .cursor_view_px()
            .map(|cursor| world.viewport().screen_to_world(cursor));

        // Player: controls, aim, physics.
        if let Some(player) = self.player.as_mut() {
            if let Some(weapon) = player.weapon.as_mut() {
                weapon.tick();
            }
            if player.alive() {
                player_control(player, &mut self.block, input, &assets);
                self.aim = player_aim(player, self.aim, cursor_world);
                player.flip = self.aim.x < 0.0;
                if !self.block.blocking && input.left_mouse_down() {
                    player_shoot(player, self.aim, &mut self.bullets);
                }
            }
            player.refresh_status(&assets);
            player.animation.tick();
            player.body.step(world.tilemap(), self.clock.speed);
        }

        // Enemies, over this tick's snapshot; the dead leave next tick.
        if let Some(player) = self.player.as_ref().cloned() {
            for enemy in self.enemies.iter_mut() {
                if !enemy.ch.alive() {
                    continue;
                }
                enemy_tick(
                    enemy,
                    &player,
                    world.tilemap(),
                    &mut self.bullets,
                    &assets,
                    self.clock.speed,
                );
                enemy.ch.animation.tick();
            }
        }

        // Combat resolution and out-of-bounds checks.
        if let Some(player) = self.player.as_mut() {
            let mut fx = CombatFx {
                impacts: &mut self.impacts,
                pickups: &mut self.pickups,
                shake: &mut self.shake_requests,
            };
            for bullet in self.bullets.iter_mut() {
                bullet.advance(self.clock.speed);
                resolve_bullet(
                    bullet,
                    world.tilemap(),
                    &mut self.enemies,
                    player,
                    &self.block,
                    &mut self.clock,
                    &mut fx,
                );
            }
            check_out_of_bounds(player, world.tilemap(), &mut fx);
            for enemy in self.enemies.iter_mut() {
                check_out_of_bounds(&mut enemy.ch, world.tilemap(), &mut fx);
            }
        }

        // Pickups.
        for pickup in self.pickups.iter_mut() {
            pickup.step(world.tilemap(), self.clock.speed);
        }
        if let Some(player) = self.player.as_mut() {
            collect_pickups(player, &mut self.pickups);
        }
        let bottom_bound = world.tilemap().bottom_bound();
        self.pickups.retain(|pickup| pickup.pos.y < bottom_bound);

        // End-of-tick pruning; removals only ever take effect here.
        self.bullets.retain(|bullet| !bullet.spent && !bullet.expired());
        self.enemies.retain(|enemy| enemy.ch.alive());

        // Cosmetics.
        for impact in self.impacts.iter_mut() {
            impact.tick(self.clock.speed);
        }
        self.impacts.retain(Impact::active);
        if let Some(player) = self.player.as_ref() {
            for blade in self.grass.iter_mut() {
                blade.tick(player.body.center());
            }
        }
        for cloud in self.clouds.iter_mut() {
            cloud.tick();
        }

        // Camera: follow, then shake; all writes land before any draw.
        if let Some(player) = self.player.as_ref().filter(|player| player.alive()) {
            let center = player.body.center();
            world.viewport_mut().follow(center, view_size);
        }
        if let Some(&duration) = self.shake_requests.iter().max() {
            world.viewport_mut().shake_screen(duration);
        }
        world.viewport_mut().tick_shake();
        self.clock.tick();

        // Level transition: everything dead or everything cleared.
        let player_dead = self.player.as_ref().is_some_and(|player| !player.alive());
        if !self.transition.is_active() && (self.enemies.is_empty() || player_dead) {
            self.transition = Transition::start();
            info!(
                enemies = self.enemies.len(),
                player_dead, "transition_started"
            );
        }
        if self.transition.tick() {
            self.reload_level(world);
            self.transition = Transition::Wipe { counter: 0 };
        }
    }
}

impl Scene for PlayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.spawn_from_map(world);
        info!(
            enemies = self.enemies.len(),
            grass = self.grass.len(),
            "play_scene_loaded"
        );
    }

    fn update(&mut self, input: &InputSnapshot, world: &mut SceneWorld) -> SceneCommand {
        if input.was_pressed(InputAction::SwitchScene) {
            return SceneCommand::SwitchTo(SceneKey::Editor);
        }
        self.tick(input, world);
        SceneCommand::None
    }

    fn render(&mut self, world: &mut SceneWorld) {
        let viewport = *world.viewport();
        let view_size = world.view_size();

        world.push_draw(DrawCommand::Clear { color: SKY_COLOR });

        for cloud in &self.clouds {
            let top_left = cloud.view_pos(viewport.offset(), view_size);
            world.push_draw(DrawCommand::RectFill {
                rect: Rect::new(top_left.x, top_left.y, CLOUD_SIZE.x, CLOUD_SIZE.y),
                color: CLOUD_COLOR,
            });
        }

        // Tiles in the visible window, back layers first.
        let mut visible = visible_tiles(world.tilemap(), viewport.offset(), view_size);
        visible.sort_by_key(|tile| (tile.layer, tile.index));
        for tile in visible {
            world.push_draw(DrawCommand::Sprite {
                group: format!("tiles/{}", tile.tile_type),
                frame: tile.variant.saturating_sub(1) as usize,
                top_left: viewport.world_to_screen(tile.index.world_origin()),
                flip_x: false,
            });
        }

        for blade in &self.grass {
            world.push_draw(DrawCommand::Triangle {
                points: blade.triangle().map(|point| viewport.world_to_screen(point)),
                color: blade.shade,
            });
        }

        for pickup in &self.pickups {
            let rect = pickup.rect();
            world.push_draw(DrawCommand::Sprite {
                group: pickup.content.kind.sprite_group().to_string(),
                frame: 0,
                top_left: viewport.world_to_screen(Vec2::new(rect.x, rect.y)),
                flip_x: false,
            });
        }

        for enemy in &self.enemies {
            push_character_draws(world, &viewport, &enemy.ch);
        }
        if let Some(player) = self.player.as_ref().filter(|player| player.alive()) {
            push_character_draws(world, &viewport, player);
            let start = player.body.center();
            world.push_draw(DrawCommand::Line {
                from: viewport.world_to_screen(start),
                to: viewport.world_to_screen(start + self.aim * 100.0),
                color: AIM_LINE_COLOR,
            });
        }

        for bullet in &self.bullets {
            world.push_draw(DrawCommand::Circle {
                center: viewport.world_to_screen(bullet.pos),
                radius: 2.0,
                color: BULLET_COLOR,
            });
        }

        for impact in &self.impacts {
            world.push_draw(DrawCommand::Triangle {
                points: impact
                    .triangle()
                    .map(|point| viewport.world_to_screen(point)),
                color: impact.color,
            });
        }

        let shade_alpha = self.clock.shade_alpha();
        if shade_alpha > 0 {
            world.push_draw(DrawCommand::Shade { alpha: shade_alpha });
        }
        if let Some(radius) = self.transition.wipe_radius(view_size) {
            world.push_draw(DrawCommand::Wipe { radius });
        }
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        world.viewport_mut().reset();
        self.player = None;
        self.enemies.clear();
        self.bullets.clear();
        self.impacts.clear();
        self.pickups.clear();
        self.grass.clear();
        self.clouds.clear();
        info!("play_scene_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let player = self.player.as_ref()?;
        Some(format!(
            "Platformer | hp {}/{} | enemies {} | bullets {}",
            player.hp,
            player.max_hp,
            self.enemies.len(),
            self.bullets.len()
        ))
    }
}

fn push_character_draws(world: &mut SceneWorld, viewport: &ViewportState, ch: &Character) {
    let rect = ch.body.rect();
    world.push_draw(DrawCommand::Sprite {
        group: ch.animation.group.clone(),
        frame: ch.animation.current_index(),
        top_left: viewport.world_to_screen(Vec2::new(rect.x, rect.y)),
        flip_x: ch.flip,
    });
}

/// Tiles whose cells fall inside the view window, one cell of slack on
/// every side. Cloned out so the caller can keep pushing draws while
/// iterating.
fn visible_tiles(map: &TileMap, offset: Vec2, view_size: (u32, u32)) -> Vec<Tile> {
    let start_i = (offset.x / TILE_SIZE_F).floor() as i32 - 1;
    let start_j = (offset.y / TILE_SIZE_F).floor() as i32 - 1;
    let end_i = start_i + view_size.0 as i32 / TILE_SIZE + 3;
    let end_j = start_j + view_size.1 as i32 / TILE_SIZE + 3;
    map.tiles()
        .filter(|tile| {
            tile.index.0 >= start_i
                && tile.index.0 <= end_i
                && tile.index.1 >= start_j
                && tile.index.1 <= end_j
        })
        .cloned()
        .collect()
}
