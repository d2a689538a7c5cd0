#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn normalized(self) -> Option<Vec2> {
        let length = self.length();
        if length == 0.0 {
            return None;
        }
        Some(Vec2 {
            x: self.x / length,
            y: self.y / length,
        })
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        Vec2 {
            x: other.x - self.x,
            y: other.y - self.y,
        }
        .length()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Axis-aligned box in world pixels. `x`/`y` are the top-left corner; the
/// bottom-center anchor convention used by bodies lives in the constructors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_bottom_center(anchor: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: anchor.x - w / 2.0,
            y: anchor.y - h,
            w,
            h,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w / 2.0,
            y: self.y + self.h / 2.0,
        }
    }

    pub fn bottom_center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w / 2.0,
            y: self.y + self.h,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_zero_vector_is_none() {
        assert_eq!(Vec2::ZERO.normalized(), None);
    }

    #[test]
    fn normalized_has_unit_length() {
        let unit = Vec2::new(3.0, 4.0).normalized().expect("unit");
        assert!((unit.length() - 1.0).abs() < 0.0001);
        assert!((unit.x - 0.6).abs() < 0.0001);
        assert!((unit.y - 0.8).abs() < 0.0001);
    }

    #[test]
    fn rect_from_bottom_center_places_anchor_on_bottom_edge() {
        let rect = Rect::from_bottom_center(Vec2::new(100.0, 352.0), 30.0, 64.0);
        assert_eq!(rect.left(), 85.0);
        assert_eq!(rect.right(), 115.0);
        assert_eq!(rect.bottom(), 352.0);
        assert_eq!(rect.top(), 288.0);
        assert_eq!(rect.bottom_center(), Vec2::new(100.0, 352.0));
    }

    #[test]
    fn rect_intersection_is_exclusive_on_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
        assert!(overlapping.intersects(&a));
    }

    #[test]
    fn contains_point_half_open_bounds() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(9.9, 9.9)));
        assert!(!rect.contains_point(Vec2::new(10.0, 5.0)));
        assert!(!rect.contains_point(Vec2::new(5.0, 10.0)));
    }
}
