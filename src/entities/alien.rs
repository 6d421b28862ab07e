use super::entity::{Entity, Rect, SpriteId};

/// One member of the fleet. Row and column are fixed at spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Alien {
    pub entity: Entity,
    pub grid_row: usize,
    pub grid_col: usize,
}

impl Alien {
    pub fn new(bounds: Rect, grid_row: usize, grid_col: usize) -> Self {
        Self {
            entity: Entity::new(bounds, SpriteId::Alien),
            grid_row,
            grid_col,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.entity.alive
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.entity.bounds.x += dx;
        self.entity.bounds.y += dy;
    }
}
