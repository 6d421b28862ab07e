/// Which picture the renderer should use for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteId {
    Ship,
    Bullet,
    Alien,
}

/// Axis-aligned box. Origin is the top-left corner, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
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

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// AABB overlap. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// State shared by everything the simulation moves
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub bounds: Rect,
    /// Dead entities are skipped by collision and rendering and may be reused
    pub alive: bool,
    pub sprite: SpriteId,
}

impl Entity {
    pub fn new(bounds: Rect, sprite: SpriteId) -> Self {
        Self {
            bounds,
            alive: true,
            sprite,
        }
    }

    /// Overlap test that ignores dead entities on either side
    pub fn collides_with(&self, other: &Entity) -> bool {
        self.alive && other.alive && self.bounds.overlaps(&other.bounds)
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}
