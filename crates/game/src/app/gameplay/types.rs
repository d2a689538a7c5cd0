/// Global time-dilation pair. `speed` scales gravity, bullet travel and
/// impact motion; `shade` drives the slow-motion overlay. Both recover
/// linearly toward 1.0 every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SimClock {
    speed: f32,
    shade: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            speed: 1.0,
            shade: 1.0,
        }
    }
}

impl SimClock {
    fn enter_bullet_time(&mut self) {
        self.speed = BULLET_TIME_SPEED;
        self.shade = BULLET_TIME_SPEED;
    }

    fn tick(&mut self) {
        self.speed = (self.speed + SIM_SPEED_RECOVERY).min(1.0);
        self.shade = (self.shade + SIM_SPEED_RECOVERY).min(1.0);
    }

    fn shade_alpha(&self) -> u8 {
        ((1.0 - self.shade) * 160.0) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Idle,
    Walking,
    Jumping,
    Crouching,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "Idle",
            Status::Walking => "Walking",
            Status::Jumping => "Jumping",
            Status::Crouching => "Crouching",
        }
    }

    /// Per-status playback timing, in ticks per sprite frame.
    fn frame_duration(self) -> u32 {
        match self {
            Status::Idle => 30,
            Status::Walking => 5,
            Status::Jumping => 20,
            Status::Crouching => 30,
        }
    }

    fn looped(self) -> bool {
        !matches!(self, Status::Jumping)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Collisions {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

/// Gravity-affected kinematic body anchored at its bottom-center point.
/// Collision resolution is axis-separated and tests the map's surrounding
/// tiles in their fixed scan order; the first collidable overlap wins.
#[derive(Debug, Clone, PartialEq)]
struct Body {
    pos: Vec2,
    size: Vec2,
    vel: Vec2,
    collisions: Collisions,
    airtime: u32,
    slow_down: f32,
    max_speed: f32,
}

impl Body {
    fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            collisions: Collisions::default(),
            airtime: 0,
            slow_down: CHARACTER_SLOW_DOWN,
            max_speed: CHARACTER_MAX_SPEED,
        }
    }

    fn rect(&self) -> Rect {
        Rect::from_bottom_center(self.pos, self.size.x, self.size.y)
    }

    fn center(&self) -> Vec2 {
        self.rect().center()
    }

    fn grounded(&self) -> bool {
        self.airtime == 0
    }

    fn jump(&mut self) {
        if self.airtime == 0 {
            self.vel.y = JUMP_VEL_Y;
            self.airtime = JUMP_AIRTIME_SENTINEL;
        }
    }

    fn move_sideways(&mut self, dv: f32) {
        self.vel.x = (self.vel.x + dv).clamp(-self.max_speed, self.max_speed);
    }

    fn step(&mut self, map: &TileMap, gravity_scale: f32) {
        self.collisions = Collisions::default();
        self.airtime += 1;

        // Horizontal friction decays toward zero without overshooting.
        if self.vel.x < 0.0 {
            self.vel.x = (self.vel.x + self.slow_down).min(0.0);
        } else {
            self.vel.x = (self.vel.x - self.slow_down).max(0.0);
        }

        self.vel.y = (self.vel.y + GRAVITY * gravity_scale).min(MAX_FALL_SPEED);

        self.pos.y += self.vel.y;
        if let Some(tile_rect) = first_collidable_overlap(map, self.pos, self.rect()) {
            let mut rect = self.rect();
            if self.vel.y > 0.0 {
                rect.y = tile_rect.top() - rect.h;
                self.collisions.bottom = true;
                self.airtime = 0;
            } else {
                rect.y = tile_rect.bottom();
                self.collisions.top = true;
            }
            self.vel.y = 0.0;
            self.pos = rect.bottom_center();
        }

        self.pos.x += self.vel.x;
        if let Some(tile_rect) = first_collidable_overlap(map, self.pos, self.rect()) {
            let mut rect = self.rect();
            if self.vel.x > 0.0 {
                rect.x = tile_rect.left() - rect.w;
                self.collisions.right = true;
            } else {
                rect.x = tile_rect.right();
                self.collisions.left = true;
            }
            self.vel.x = 0.0;
            self.pos = rect.bottom_center();
        }
    }
}

/// First collidable tile overlapping `rect`, scanning the neighborhood of
/// `pos` in the map's fixed offset order. Deliberately first-hit, not
/// nearest-hit; replays depend on the order.
fn first_collidable_overlap(map: &TileMap, pos: Vec2, rect: Rect) -> Option<Rect> {
    map.surrounding_tiles(pos)
        .into_iter()
        .filter(|tile| tile.is_collidable())
        .map(|tile| tile.world_rect())
        .find(|tile_rect| rect.intersects(tile_rect))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeaponKind {
    Pistol,
    Ar,
}

impl WeaponKind {
    fn fire_rate(self) -> u32 {
        match self {
            WeaponKind::Pistol => 45,
            WeaponKind::Ar => 10,
        }
    }

    fn damage(self) -> i32 {
        match self {
            WeaponKind::Pistol => 1,
            WeaponKind::Ar => 1,
        }
    }

    fn sprite_group(self) -> &'static str {
        match self {
            WeaponKind::Pistol => "weapons/pistol",
            WeaponKind::Ar => "weapons/ar",
        }
    }
}

/// Fire-rate-gated projectile factory. Exactly one owner or none; a weapon
/// with no owner only exists inside a [`PickUp`].
#[derive(Debug, Clone, PartialEq)]
struct Weapon {
    kind: WeaponKind,
    cool_down: u32,
    owner: Option<BulletOwner>,
}

impl Weapon {
    fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            cool_down: 0,
            owner: None,
        }
    }

    fn set_owner(&mut self, owner: BulletOwner) {
        self.owner = Some(owner);
    }

    fn clear_owner(&mut self) {
        self.owner = None;
    }

    /// The sole rate-limiting gate: true reloads the cooldown, false fires
    /// nothing.
    fn try_shoot(&mut self) -> bool {
        if self.cool_down == 0 {
            self.cool_down = self.kind.fire_rate();
            return true;
        }
        false
    }

    fn tick(&mut self) {
        self.cool_down = self.cool_down.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct EnemyId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulletOwner {
    Player,
    Enemy(EnemyId),
}

#[derive(Debug, Clone, PartialEq)]
struct Bullet {
    pos: Vec2,
    vel: Vec2,
    owner: BulletOwner,
    frame: u32,
    max_duration: u32,
    damage: i32,
    spent: bool,
}

impl Bullet {
    fn new(pos: Vec2, vel: Vec2, owner: BulletOwner, damage: i32) -> Self {
        Self {
            pos,
            vel,
            owner,
            frame: 0,
            max_duration: BULLET_MAX_DURATION,
            damage,
            spent: false,
        }
    }

    fn expired(&self) -> bool {
        self.frame > self.max_duration
    }

    fn advance(&mut self, game_speed: f32) {
        self.pos = self.pos + self.vel * game_speed;
        self.frame += 1;
    }

    /// Turns an enemy bullet back on its sender. The hit state resets so the
    /// reflected bullet can score exactly one hit of its own.
    fn reflect(&mut self) {
        self.vel = self.vel * REFLECT_SCALE;
        self.owner = BulletOwner::Player;
        self.spent = false;
    }
}

/// Player-only block/parry counters. The first ticks of a block are the
/// parry window; afterwards it is a plain absorb until released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BlockState {
    blocking: bool,
    blocking_frame: u32,
    recovery: u32,
}

impl BlockState {
    fn can_block(&self, grounded: bool, status: Status) -> bool {
        grounded && !self.blocking && self.recovery == 0 && status != Status::Jumping
    }

    fn start(&mut self) {
        self.blocking = true;
        self.blocking_frame = 0;
    }

    fn stop(&mut self) {
        self.blocking = false;
        self.blocking_frame = 0;
        self.recovery = BLOCK_RECOVERY_TICKS;
    }

    fn tick(&mut self) {
        self.recovery = self.recovery.saturating_sub(1);
        if self.blocking {
            self.blocking_frame += 1;
        }
    }

    fn in_parry_window(&self) -> bool {
        self.blocking && self.blocking_frame > 0 && self.blocking_frame < PARRY_WINDOW_TICKS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharacterName {
    Player,
    Enemy,
}

impl CharacterName {
    fn as_str(self) -> &'static str {
        match self {
            CharacterName::Player => "Player",
            CharacterName::Enemy => "Enemy",
        }
    }
}

/// A controllable or hostile character: body, health, facing, status-driven
/// animation and an optionally held weapon.
#[derive(Debug, Clone, PartialEq)]
struct Character {
    name: CharacterName,
    body: Body,
    hp: i32,
    max_hp: i32,
    flip: bool,
    status: Status,
    animation: Animation,
    weapon: Option<Weapon>,
}

impl Character {
    fn new(name: CharacterName, pos: Vec2, max_hp: i32, assets: &AssetIndex) -> Self {
        let status = Status::Idle;
        Self {
            name,
            body: Body::new(pos, CHARACTER_SIZE),
            hp: max_hp,
            max_hp,
            flip: false,
            status,
            animation: status_animation(name, status, assets),
            weapon: None,
        }
    }

    fn alive(&self) -> bool {
        self.hp > 0
    }

    /// Floors hp at zero; true exactly when this hit was the killing one.
    fn take_hit(&mut self, damage: i32) -> bool {
        let was_alive = self.alive();
        self.hp = (self.hp - damage).max(0);
        was_alive && !self.alive()
    }

    fn set_status(&mut self, status: Status, assets: &AssetIndex) {
        if self.status != status {
            self.status = status;
            // Always restart at frame zero; never resume a stale animation.
            self.animation = status_animation(self.name, status, assets);
        }
    }

    /// Automatic status rule. Crouching is owned by block/unblock and is
    /// never entered or left here.
    fn refresh_status(&mut self, assets: &AssetIndex) {
        if self.status == Status::Crouching {
            return;
        }
        if self.body.grounded() && self.body.vel.x.abs() > WALK_ANIMATION_THRESHOLD {
            self.set_status(Status::Walking, assets);
        } else if self.body.grounded() {
            self.set_status(Status::Idle, assets);
        }
        if self.body.airtime >= JUMP_AIRTIME_SENTINEL {
            self.set_status(Status::Jumping, assets);
        }
    }

    fn set_weapon(&mut self, mut weapon: Weapon, owner: BulletOwner) {
        weapon.set_owner(owner);
        self.weapon = Some(weapon);
    }

    fn drop_weapon(&mut self) -> Option<Weapon> {
        let mut weapon = self.weapon.take()?;
        weapon.clear_owner();
        Some(weapon)
    }
}

fn status_animation(name: CharacterName, status: Status, assets: &AssetIndex) -> Animation {
    let group = format!("characters/{}/{}", name.as_str(), status.as_str());
    let frame_count = assets.frame_count(&group) as u32;
    Animation::new(group, frame_count, status.frame_duration(), status.looped())
}

/// Falling, bouncing weapon carrier. The immunity timer stops the entity
/// that just dropped it from scooping it straight back up.
#[derive(Debug, Clone, PartialEq)]
struct PickUp {
    pos: Vec2,
    vel: Vec2,
    content: Weapon,
    pickup_frame: u32,
}

impl PickUp {
    fn new(pos: Vec2, vel: Vec2, content: Weapon, pickup_frame: u32) -> Self {
        Self {
            pos,
            vel,
            content,
            pickup_frame,
        }
    }

    fn rect(&self) -> Rect {
        Rect::from_bottom_center(self.pos, PICKUP_SIZE.x, PICKUP_SIZE.y)
    }

    fn collectable(&self) -> bool {
        self.pickup_frame == 0
    }

    fn step(&mut self, map: &TileMap, gravity_scale: f32) {
        self.pickup_frame = self.pickup_frame.saturating_sub(1);

        self.vel.y = (self.vel.y + GRAVITY * gravity_scale).min(MAX_FALL_SPEED);
        self.pos.y += self.vel.y;
        if let Some(tile_rect) = first_collidable_overlap(map, self.pos, self.rect()) {
            let mut rect = self.rect();
            if self.vel.y > 0.0 {
                rect.y = tile_rect.top() - rect.h;
            } else {
                rect.y = tile_rect.bottom();
            }
            self.pos = rect.bottom_center();
            self.vel.y *= PICKUP_BOUNCE_DAMPING;
            if self.vel.y.abs() <= PICKUP_BOUNCE_DEAD_ZONE {
                self.vel.y = 0.0;
            }
        }

        if self.vel.x != 0.0 {
            self.vel.x += if self.vel.x < 0.0 { 0.1 } else { -0.1 };
            if self.vel.x.abs() < 0.01 {
                self.vel.x = 0.0;
            }
        }
        self.pos.x += self.vel.x;
        if let Some(tile_rect) = first_collidable_overlap(map, self.pos, self.rect()) {
            let mut rect = self.rect();
            if self.vel.x > 0.0 {
                rect.x = tile_rect.left() - rect.w;
            } else {
                rect.x = tile_rect.right();
            }
            self.pos = rect.bottom_center();
            self.vel.x = -self.vel.x;
        }
    }
}

/// Triangle particle for bullet strikes and death bursts. The base shrinks
/// while the tip stretches, so the particle thins out as it dies.
#[derive(Debug, Clone, PartialEq)]
struct Impact {
    pos: Vec2,
    size: f32,
    base_size: f32,
    angle: f32,
    speed: f32,
    dissipation: f32,
    color: Rgba,
}

impl Impact {
    fn new(pos: Vec2, size: f32, base_size: f32, angle: f32, speed: f32, color: Rgba) -> Self {
        Self {
            pos,
            size,
            base_size,
            angle,
            speed,
            dissipation: IMPACT_DISSIPATION,
            color,
        }
    }

    fn active(&self) -> bool {
        self.base_size > 0.0
    }

    fn tick(&mut self, game_speed: f32) {
        if !self.active() {
            return;
        }
        self.pos.x += self.angle.cos() * self.speed * game_speed;
        self.pos.y += self.angle.sin() * self.speed * game_speed;
        self.base_size = (self.base_size - self.dissipation).max(0.0);
        self.size += self.dissipation;
    }

    fn triangle(&self) -> [Vec2; 3] {
        let tip = Vec2 {
            x: self.pos.x + self.angle.cos() * self.size,
            y: self.pos.y + self.angle.sin() * self.size,
        };
        let base_angle = self.angle + PI / 2.0;
        let base = Vec2 {
            x: base_angle.cos() * self.base_size,
            y: base_angle.sin() * self.base_size,
        };
        [tip, self.pos + base, self.pos - base]
    }
}

/// Even ring of impact particles around `pos`.
fn impact_burst(impacts: &mut Vec<Impact>, pos: Vec2, count: u32, size: f32, color: Rgba) {
    for i in 0..count {
        let angle = i as f32 / count as f32 * 2.0 * PI;
        impacts.push(Impact::new(pos, size, size / 2.0, angle, 2.0, color));
    }
}

/// Decorative blade anchored to a grass cell; leans away from the player
/// when close. The shade is picked once, at spawn.
#[derive(Debug, Clone, PartialEq)]
struct GrassBlade {
    anchor: Vec2,
    lean: f32,
    shade: Rgba,
}

const GRASS_SHADES: [Rgba; 3] = [
    [0, 100, 0, 255],
    [0, 150, 0, 255],
    [0, 200, 0, 255],
];

impl GrassBlade {
    fn new(anchor: Vec2, shade: Rgba) -> Self {
        Self {
            anchor,
            lean: 0.0,
            shade,
        }
    }

    fn tick(&mut self, source: Vec2) {
        let dist = self.anchor.distance_to(source);
        let proximity = (TILE_SIZE_F - dist).max(0.0) / TILE_SIZE_F;
        let side = if source.x < self.anchor.x { -1.0 } else { 1.0 };
        self.lean = 40.0 * proximity * side;
    }

    fn triangle(&self) -> [Vec2; 3] {
        let height = TILE_SIZE_F * 0.6;
        let sway = self.lean / 40.0 * 8.0;
        [
            Vec2::new(self.anchor.x - 3.0, self.anchor.y),
            Vec2::new(self.anchor.x + 3.0, self.anchor.y),
            Vec2::new(self.anchor.x + sway, self.anchor.y - height),
        ]
    }
}

/// Background cloud with depth-scaled parallax; wraps across the view.
#[derive(Debug, Clone, PartialEq)]
struct Cloud {
    pos: Vec2,
    depth: f32,
    speed: f32,
}

impl Cloud {
    fn tick(&mut self) {
        self.pos.x += self.speed;
    }

    fn view_pos(&self, offset: Vec2, view_size: (u32, u32)) -> Vec2 {
        let span_x = view_size.0 as f32 + CLOUD_SIZE.x;
        let span_y = view_size.1 as f32 + CLOUD_SIZE.y;
        Vec2 {
            x: (self.pos.x - offset.x * self.depth).rem_euclid(span_x) - CLOUD_SIZE.x,
            y: (self.pos.y - offset.y * self.depth).rem_euclid(span_y) - CLOUD_SIZE.y,
        }
    }
}

/// Level-transition machine. The counter runs -60..=60; the level reloads at
/// zero and the wipe visual follows the counter's magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Playing,
    Wipe { counter: i32 },
}

impl Transition {
    fn is_active(&self) -> bool {
        matches!(self, Transition::Wipe { .. })
    }

    fn start() -> Self {
        Transition::Wipe {
            counter: -TRANSITION_HALF_TICKS,
        }
    }

    /// Advances one tick; true exactly on the reload tick (counter zero).
    fn tick(&mut self) -> bool {
        match self {
            Transition::Playing => false,
            Transition::Wipe { counter } => {
                *counter += 1;
                if *counter >= TRANSITION_HALF_TICKS {
                    *self = Transition::Playing;
                    return false;
                }
                *counter == 0
            }
        }
    }

    fn wipe_radius(&self, view_size: (u32, u32)) -> Option<f32> {
        match self {
            Transition::Playing => None,
            Transition::Wipe { counter } => {
                let max_radius = Vec2::new(view_size.0 as f32, view_size.1 as f32).length() / 2.0;
                let fraction = counter.abs() as f32 / TRANSITION_HALF_TICKS as f32;
                Some(max_radius * fraction)
            }
        }
    }
}
