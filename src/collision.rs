//! Collision detection and resolution between the entity groups.
//!
//! Runs once per tick after every entity has moved. All tests are pairwise
//! AABB overlaps over living entities only.

use serde::{Deserialize, Serialize};

use crate::entities::{Alien, Entity, Fleet, HitOutcome, Player, ProjectilePool};
use crate::game_loop::SessionState;

/// Which alien a bullet takes out when it overlaps several at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First overlapping alien in fleet spawn order
    #[default]
    InsertionOrder,
    /// Overlapping alien with the lowest bottom edge; spawn order among equals
    Lowest,
}

/// Everything the resolver changed during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Grid cells (row, col) of aliens shot down, in the order they were hit
    pub destroyed: Vec<(usize, usize)>,
    /// Aliens that crashed into the ship. They do not score.
    pub rammed: u32,
    pub score_gained: u32,
    pub player_hit: Option<HitOutcome>,
    /// An alien got past the player's row
    pub boundary_breached: bool,
}

impl CollisionReport {
    pub fn aliens_destroyed(&self) -> u32 {
        self.destroyed.len() as u32
    }

    /// Either loss condition was met this tick
    pub fn is_game_over(&self) -> bool {
        self.boundary_breached || self.player_hit == Some(HitOutcome::Destroyed)
    }
}

/// Stateless apart from its scoring and tie-break policy
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    pub alien_points: u32,
    pub tie_break: TieBreak,
}

impl CollisionResolver {
    pub fn new(alien_points: u32, tie_break: TieBreak) -> Self {
        Self {
            alien_points,
            tie_break,
        }
    }

    pub fn resolve(
        &self,
        player: &mut Player,
        pool: &mut ProjectilePool,
        fleet: &mut Fleet,
        session: &mut SessionState,
    ) -> CollisionReport {
        let mut report = CollisionReport::default();

        // Bullets against aliens: one alien per bullet per tick
        for projectile in pool.iter_alive_mut() {
            if let Some(index) = self.pick_target(&projectile.entity, fleet.aliens()) {
                projectile.entity.kill();
                let alien = &mut fleet.aliens_mut()[index];
                alien.entity.kill();
                report.destroyed.push((alien.grid_row, alien.grid_col));
            }
        }
        report.score_gained = self.alien_points.saturating_mul(report.aliens_destroyed());
        session.score = session.score.saturating_add(report.score_gained);

        // Aliens against the ship: at most one life per tick.
        // Rammers are removed so the respawned ship is not hit again next
        // tick. They score nothing: only aliens shot down count.
        if player.is_alive() {
            let mut rammed = 0;
            for alien in fleet.aliens_mut() {
                if alien.entity.collides_with(&player.entity) {
                    alien.entity.kill();
                    rammed += 1;
                }
            }
            if rammed > 0 {
                report.rammed = rammed;
                report.player_hit = Some(player.take_hit(pool));
            }
        }

        // Aliens reaching the player's row end the game outright
        let (_, spawn_y) = player.spawn_point();
        let player_row = spawn_y + player.entity.bounds.h;
        report.boundary_breached = fleet
            .lowest_bottom()
            .is_some_and(|bottom| bottom > player_row);

        report
    }

    fn pick_target(&self, projectile: &Entity, aliens: &[Alien]) -> Option<usize> {
        let mut candidates = aliens
            .iter()
            .enumerate()
            .filter(|(_, alien)| projectile.collides_with(&alien.entity));

        match self.tie_break {
            TieBreak::InsertionOrder => candidates.next().map(|(index, _)| index),
            TieBreak::Lowest => candidates
                .fold(None, |best: Option<(usize, f32)>, (index, alien)| {
                    let bottom = alien.entity.bounds.bottom();
                    match best {
                        Some((_, best_bottom)) if best_bottom >= bottom => best,
                        _ => Some((index, bottom)),
                    }
                })
                .map(|(index, _)| index),
        }
    }
}
