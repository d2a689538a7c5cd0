use rand::Rng;

use super::geometry::Vec2;

/// Camera context shared by the play and editor scenes. One writer per tick;
/// everything that draws reads `world_to_screen` through this.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
    offset: Vec2,
    shake: (i32, i32),
    shake_frames: u32,
    shake_amplitude: i32,
}

impl ViewportState {
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset = self.offset + delta;
    }

    pub fn shake(&self) -> (i32, i32) {
        self.shake
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2 {
            x: world.x - self.offset.x + self.shake.0 as f32,
            y: world.y - self.offset.y + self.shake.1 as f32,
        }
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2 {
            x: screen.x + self.offset.x - self.shake.0 as f32,
            y: screen.y + self.offset.y - self.shake.1 as f32,
        }
    }

    /// Eased follow: each tick the offset closes a tenth of the distance to
    /// the centered target, truncated to whole pixels.
    pub fn follow(&mut self, target: Vec2, view_size: (u32, u32)) {
        let goal_x = target.x - view_size.0 as f32 / 2.0;
        let goal_y = target.y - view_size.1 as f32 / 2.0;
        self.offset.x += ((goal_x - self.offset.x) * 0.1).trunc();
        self.offset.y += ((goal_y - self.offset.y) * 0.1).trunc();
    }

    pub fn shake_screen(&mut self, duration: u32) {
        self.shake_frames = duration;
        self.shake_amplitude = duration as i32;
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_frames > 0
    }

    pub fn tick_shake(&mut self) {
        self.tick_shake_with(&mut rand::thread_rng());
    }

    pub fn tick_shake_with<R: Rng>(&mut self, rng: &mut R) {
        if self.shake_frames == 0 {
            self.shake = (0, 0);
            return;
        }
        self.shake = (
            sample_shake_axis(self.shake_amplitude, rng),
            sample_shake_axis(self.shake_amplitude, rng),
        );
        self.shake_frames -= 1;
        if self.shake_frames == 0 {
            self.shake = (0, 0);
            self.shake_amplitude = 0;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn sample_shake_axis<R: Rng>(amplitude: i32, rng: &mut R) -> i32 {
    match rng.gen_range(0..3u8) {
        0 => -amplitude,
        1 => 0,
        _ => amplitude,
    }
}
