use super::entity::{Entity, Rect, SpriteId};
use super::projectile::{Projectile, ProjectilePool};
use crate::input::InputSnapshot;
use crate::settings::ValidatedSettings;

/// What happened to the ship after a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Lives remain; the ship is back at its spawn point
    Respawned,
    /// That was the last life
    Destroyed,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub entity: Entity,
    pub speed: f32,
    pub cooldown_remaining: f32,
    pub lives_remaining: u32,
    fire_interval: f32,
    spawn: (f32, f32),
    min_x: f32,
    max_x: f32,
    bullet_size: (f32, f32),
    bullet_speed: f32,
}

impl Player {
    pub fn new(settings: &ValidatedSettings) -> Self {
        let spawn = settings.ship_spawn();
        Self {
            entity: Entity::new(
                Rect::new(spawn.0, spawn.1, settings.ship_width, settings.ship_height),
                SpriteId::Ship,
            ),
            speed: settings.ship_speed,
            cooldown_remaining: 0.0,
            lives_remaining: settings.starting_lives,
            fire_interval: settings.fire_cooldown,
            spawn,
            min_x: 0.0,
            max_x: settings.screen_width,
            bullet_size: (settings.bullet_width, settings.bullet_height),
            bullet_speed: settings.bullet_speed,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.entity.alive
    }

    pub fn spawn_point(&self) -> (f32, f32) {
        self.spawn
    }

    /// Move sideways for one tick and run down the fire cooldown.
    /// Holding both directions cancels out; the ship clamps silently at the edges.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) {
        let direction = match (input.move_left, input.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };

        let bounds = &mut self.entity.bounds;
        let max_left = self.max_x - bounds.w;
        bounds.x = (bounds.x + direction * self.speed * dt).clamp(self.min_x, max_left);

        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
    }

    pub fn can_fire(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    /// Create a bullet at the ship's nose if the cooldown has elapsed and the
    /// pool has room. Otherwise nothing changes.
    pub fn fire(&mut self, pool: &ProjectilePool) -> Option<Projectile> {
        if !self.is_alive() || !self.can_fire() || !pool.has_capacity() {
            return None;
        }

        self.cooldown_remaining = self.fire_interval;
        let (width, height) = self.bullet_size;
        let bounds = &self.entity.bounds;
        Some(Projectile::new(
            bounds.center_x() - width / 2.0,
            bounds.top(),
            width,
            height,
            self.bullet_speed,
        ))
    }

    /// Lose a life. With lives left the ship goes back to its spawn point and
    /// every bullet in flight is cleared.
    pub fn take_hit(&mut self, pool: &mut ProjectilePool) -> HitOutcome {
        self.lives_remaining = self.lives_remaining.saturating_sub(1);

        if self.lives_remaining > 0 {
            self.entity.bounds.x = self.spawn.0;
            self.entity.bounds.y = self.spawn.1;
            self.cooldown_remaining = 0.0;
            pool.clear();
            log::debug!("Ship hit, {} lives left", self.lives_remaining);
            HitOutcome::Respawned
        } else {
            self.entity.kill();
            log::debug!("Ship destroyed");
            HitOutcome::Destroyed
        }
    }
}
