/// Frame-counter animation over a named sprite group. Timing is in sim ticks;
/// the renderer only reads `group` and `current_index`.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub group: String,
    pub frame_count: u32,
    pub frame_duration: u32,
    pub looped: bool,
    frame: u32,
    current_index: usize,
    active: bool,
}

impl Animation {
    pub fn new(group: impl Into<String>, frame_count: u32, frame_duration: u32, looped: bool) -> Self {
        Self {
            group: group.into(),
            frame_count: frame_count.max(1),
            frame_duration: frame_duration.max(1),
            looped,
            frame: 0,
            current_index: 0,
            active: true,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn restart(&mut self) {
        self.frame = 0;
        self.current_index = 0;
        self.active = true;
    }

    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        let total = self.frame_duration * self.frame_count;
        self.frame += 1;
        if self.frame >= total {
            if self.looped {
                self.frame = 0;
            } else {
                self.frame = total - 1;
                self.active = false;
            }
        }
        self.current_index = (self.frame / self.frame_duration) as usize;
    }
}
