use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::app::frame::{DrawCommand, Rgba};
use crate::app::geometry::{Rect, Vec2};
use crate::content::{SpriteImage, SpriteLibrary};

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    sprites: SpriteLibrary,
}

impl Renderer {
    pub fn new(window: Arc<Window>, sprites: SpriteLibrary) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width.max(1), size.height.max(1))?;
        Ok(Self {
            window,
            pixels,
            sprites,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        Ok(())
    }

    /// The pixel buffer stays at the internal view size; the surface scales
    /// and letterboxes it into the window.
    fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(VIEW_WIDTH, VIEW_HEIGHT, surface)
    }

    pub fn present(&mut self, commands: &[DrawCommand]) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        for command in commands {
            match command {
                DrawCommand::Clear { color } => fill_clear(frame, *color),
                DrawCommand::Sprite {
                    group,
                    frame: sprite_frame,
                    top_left,
                    flip_x,
                } => {
                    if let Some(sprite) = self.sprites.frame(group, *sprite_frame) {
                        blit_sprite(
                            frame,
                            sprite,
                            top_left.x.round() as i32,
                            top_left.y.round() as i32,
                            *flip_x,
                        );
                    }
                }
                DrawCommand::RectFill { rect, color } => fill_rect(frame, rect, *color),
                DrawCommand::RectOutline { rect, color } => outline_rect(frame, rect, *color),
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => fill_circle(frame, *center, *radius, *color),
                DrawCommand::Triangle { points, color } => fill_triangle(frame, points, *color),
                DrawCommand::Line { from, to, color } => draw_line(frame, *from, *to, *color),
                DrawCommand::Shade { alpha } => shade(frame, *alpha),
                DrawCommand::Wipe { radius } => wipe(frame, *radius),
            }
        }
        self.pixels.render()
    }
}

fn blend_pixel(frame: &mut [u8], x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 || x >= VIEW_WIDTH as i32 || y >= VIEW_HEIGHT as i32 {
        return;
    }
    let offset = (y as usize * VIEW_WIDTH as usize + x as usize) * 4;
    let end = offset + 4;
    if end > frame.len() {
        return;
    }
    let alpha = color[3] as u32;
    if alpha == 0 {
        return;
    }
    if alpha == 255 {
        frame[offset..end].copy_from_slice(&color);
        return;
    }
    for channel in 0..3 {
        let src = color[channel] as u32;
        let dst = frame[offset + channel] as u32;
        frame[offset + channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
    }
    frame[offset + 3] = 255;
}

fn fill_clear(frame: &mut [u8], color: Rgba) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

fn blit_sprite(frame: &mut [u8], sprite: &SpriteImage, left: i32, top: i32, flip_x: bool) {
    let expected = sprite.width as usize * sprite.height as usize * 4;
    if sprite.rgba.len() < expected {
        return;
    }
    for src_y in 0..sprite.height as i32 {
        for src_x in 0..sprite.width as i32 {
            let sample_x = if flip_x {
                sprite.width as i32 - 1 - src_x
            } else {
                src_x
            };
            let src_offset = (src_y as usize * sprite.width as usize + sample_x as usize) * 4;
            let color = [
                sprite.rgba[src_offset],
                sprite.rgba[src_offset + 1],
                sprite.rgba[src_offset + 2],
                sprite.rgba[src_offset + 3],
            ];
            blend_pixel(frame, left + src_x, top + src_y, color);
        }
    }
}

fn fill_rect(frame: &mut [u8], rect: &Rect, color: Rgba) {
    let left = rect.left().round() as i32;
    let right = rect.right().round() as i32;
    let top = rect.top().round() as i32;
    let bottom = rect.bottom().round() as i32;
    for y in top..bottom {
        for x in left..right {
            blend_pixel(frame, x, y, color);
        }
    }
}

fn outline_rect(frame: &mut [u8], rect: &Rect, color: Rgba) {
    let left = rect.left().round() as i32;
    let right = rect.right().round() as i32 - 1;
    let top = rect.top().round() as i32;
    let bottom = rect.bottom().round() as i32 - 1;
    if right < left || bottom < top {
        return;
    }
    for x in left..=right {
        blend_pixel(frame, x, top, color);
        blend_pixel(frame, x, bottom, color);
    }
    for y in top..=bottom {
        blend_pixel(frame, left, y, color);
        blend_pixel(frame, right, y, color);
    }
}

fn fill_circle(frame: &mut [u8], center: Vec2, radius: f32, color: Rgba) {
    if radius <= 0.0 {
        return;
    }
    let r = radius.ceil() as i32;
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    let radius_sq = radius * radius;
    for y in (cy - r)..=(cy + r) {
        for x in (cx - r)..=(cx + r) {
            let dx = x as f32 - center.x;
            let dy = y as f32 - center.y;
            if dx * dx + dy * dy <= radius_sq {
                blend_pixel(frame, x, y, color);
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn fill_triangle(frame: &mut [u8], points: &[Vec2; 3], color: Rgba) {
    let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor() as i32;
    let max_x = points
        .iter()
        .map(|p| p.x)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil() as i32;
    let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor() as i32;
    let max_y = points
        .iter()
        .map(|p| p.y)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil() as i32;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(points[0], points[1], p);
            let w1 = edge(points[1], points[2], p);
            let w2 = edge(points[2], points[0], p);
            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if inside {
                blend_pixel(frame, x, y, color);
            }
        }
    }
}

fn draw_line(frame: &mut [u8], from: Vec2, to: Vec2, color: Rgba) {
    let mut x = from.x.round() as i32;
    let mut y = from.y.round() as i32;
    let x_end = to.x.round() as i32;
    let y_end = to.y.round() as i32;
    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let step_x = if x < x_end { 1 } else { -1 };
    let step_y = if y < y_end { 1 } else { -1 };
    let mut error = dx + dy;

    loop {
        blend_pixel(frame, x, y, color);
        if x == x_end && y == y_end {
            break;
        }
        let doubled = 2 * error;
        if doubled >= dy {
            error += dy;
            x += step_x;
        }
        if doubled <= dx {
            error += dx;
            y += step_y;
        }
    }
}

fn shade(frame: &mut [u8], alpha: u8) {
    if alpha == 0 {
        return;
    }
    for y in 0..VIEW_HEIGHT as i32 {
        for x in 0..VIEW_WIDTH as i32 {
            blend_pixel(frame, x, y, [0, 0, 0, alpha]);
        }
    }
}

fn wipe(frame: &mut [u8], radius: f32) {
    let center = Vec2::new(VIEW_WIDTH as f32 / 2.0, VIEW_HEIGHT as f32 / 2.0);
    let radius_sq = radius.max(0.0) * radius.max(0.0);
    for y in 0..VIEW_HEIGHT as i32 {
        for x in 0..VIEW_WIDTH as i32 {
            let dx = x as f32 - center.x;
            let dy = y as f32 - center.y;
            if dx * dx + dy * dy > radius_sq {
                blend_pixel(frame, x, y, [0, 0, 0, 255]);
            }
        }
    }
}
