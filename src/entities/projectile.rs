use super::entity::{Entity, Rect, SpriteId};

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub entity: Entity,
    /// Upward speed in units per second
    pub velocity_y: f32,
}

impl Projectile {
    pub fn new(x: f32, y: f32, width: f32, height: f32, velocity_y: f32) -> Self {
        Self {
            entity: Entity::new(Rect::new(x, y, width, height), SpriteId::Bullet),
            velocity_y,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.entity.alive
    }

    pub fn update(&mut self, dt: f32) {
        self.entity.bounds.y -= self.velocity_y * dt;
    }

    /// True once the whole bullet has left through the top of the play area
    pub fn is_out_of_bounds(&self, top: f32) -> bool {
        self.entity.bounds.bottom() <= top
    }
}

/// Fixed-capacity arena for the player's bullets.
///
/// Slots are reused instead of removed, so a bullet keeps its slot index for
/// as long as it is alive.
#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    max_concurrent: usize,
}

impl ProjectilePool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_concurrent),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_alive()).count()
    }

    pub fn has_capacity(&self) -> bool {
        self.alive_count() < self.max_concurrent
    }

    /// Store a bullet in the first free slot. Returns the slot, or `None`
    /// (dropping the bullet) when the cap is reached.
    pub fn spawn(&mut self, projectile: Projectile) -> Option<usize> {
        if !self.has_capacity() {
            log::debug!("Projectile pool full ({} alive)", self.max_concurrent);
            return None;
        }

        if let Some(slot) = self.slots.iter().position(|p| !p.is_alive()) {
            self.slots[slot] = projectile;
            Some(slot)
        } else {
            self.slots.push(projectile);
            Some(self.slots.len() - 1)
        }
    }

    /// Move every live bullet and retire the ones that left the play area
    pub fn update(&mut self, dt: f32, top: f32) {
        for projectile in self.slots.iter_mut().filter(|p| p.is_alive()) {
            projectile.update(dt);
            if projectile.is_out_of_bounds(top) {
                projectile.entity.kill();
            }
        }
    }

    /// Drop trailing dead slots. Live bullets keep their slot index.
    pub fn sweep(&mut self) {
        while self.slots.last().is_some_and(|p| !p.is_alive()) {
            self.slots.pop();
        }
    }

    /// Kill every bullet
    pub fn clear(&mut self) {
        for projectile in &mut self.slots {
            projectile.entity.kill();
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Projectile> {
        self.slots.get(slot)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|p| p.is_alive())
    }

    pub fn iter_alive_mut(&mut self) -> impl Iterator<Item = &mut Projectile> {
        self.slots.iter_mut().filter(|p| p.is_alive())
    }
}
