use super::geometry::{Rect, Vec2};

pub type Rgba = [u8; 4];

/// One retained draw op. Scenes push these during `render`; the renderer
/// rasterizes the whole queue in order and the loop clears it per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgba,
    },
    Sprite {
        group: String,
        frame: usize,
        top_left: Vec2,
        flip_x: bool,
    },
    RectFill {
        rect: Rect,
        color: Rgba,
    },
    RectOutline {
        rect: Rect,
        color: Rgba,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    Triangle {
        points: [Vec2; 3],
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
    },
    /// Full-view black overlay with the given alpha.
    Shade {
        alpha: u8,
    },
    /// Black outside a circle centered on the view; radius in view pixels.
    Wipe {
        radius: f32,
    },
}

#[derive(Debug, Default)]
pub struct FrameQueue {
    commands: Vec<DrawCommand>,
}

impl FrameQueue {
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
