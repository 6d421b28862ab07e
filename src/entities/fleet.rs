use super::alien::Alien;
use super::entity::Rect;
use crate::settings::ValidatedSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// What the fleet did on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetStep {
    /// Moved sideways
    Moved,
    /// Would have crossed a margin: stayed put, flipped direction, drop pending
    EdgeContact,
    /// Moved down by the drop step
    Dropped,
    /// Nothing alive to move
    Idle,
}

/// Grid geometry and motion tuning for a fleet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleetLayout {
    pub rows: usize,
    pub cols: usize,
    pub alien_width: f32,
    pub alien_height: f32,
    pub gap: f32,
    pub top: f32,
    pub left_margin: f32,
    pub right_margin: f32,
    /// Sideways speed in units per second
    pub speed: f32,
    pub drop_step: f32,
    pub thinning_boost: f32,
}

impl FleetLayout {
    /// Layout for a level. Each level past the first is `speedup_scale` times faster.
    pub fn for_level(settings: &ValidatedSettings, level: u32) -> Self {
        let (left_margin, right_margin) = settings.fleet_bounds();
        let levels_in = level.saturating_sub(1) as i32;
        Self {
            rows: settings.fleet_rows,
            cols: settings.fleet_cols,
            alien_width: settings.alien_width,
            alien_height: settings.alien_height,
            gap: settings.alien_gap,
            top: settings.fleet_top,
            left_margin,
            right_margin,
            speed: settings.fleet_speed * settings.speedup_scale.powi(levels_in),
            drop_step: settings.drop_step,
            thinning_boost: settings.thinning_boost,
        }
    }
}

/// The alien formation for the current level.
///
/// Aliens are never removed; destroyed ones stay in their slot with
/// `alive == false`, so insertion order is spawn order for the whole level.
#[derive(Debug, Clone)]
pub struct Fleet {
    aliens: Vec<Alien>,
    pub direction: Direction,
    pub drop_pending: bool,
    layout: FleetLayout,
}

impl Fleet {
    /// Spawn a full grid, row by row, moving right
    pub fn spawn(layout: FleetLayout) -> Self {
        let mut aliens = Vec::with_capacity(layout.rows * layout.cols);
        let step_x = layout.alien_width + layout.gap;
        let step_y = layout.alien_height + layout.gap;

        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let bounds = Rect::new(
                    layout.left_margin + layout.gap + col as f32 * step_x,
                    layout.top + row as f32 * step_y,
                    layout.alien_width,
                    layout.alien_height,
                );
                aliens.push(Alien::new(bounds, row, col));
            }
        }

        Self {
            aliens,
            direction: Direction::Right,
            drop_pending: false,
            layout,
        }
    }

    pub fn layout(&self) -> &FleetLayout {
        &self.layout
    }

    pub fn aliens(&self) -> &[Alien] {
        &self.aliens
    }

    pub fn aliens_mut(&mut self) -> &mut [Alien] {
        &mut self.aliens
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = &Alien> {
        self.aliens.iter().filter(|a| a.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.iter_alive().count()
    }

    /// True iff every alien has been destroyed
    pub fn is_cleared(&self) -> bool {
        self.aliens.iter().all(|a| !a.is_alive())
    }

    /// Bottom edge of the lowest living alien
    pub fn lowest_bottom(&self) -> Option<f32> {
        self.iter_alive()
            .map(|a| a.entity.bounds.bottom())
            .reduce(f32::max)
    }

    /// Current sideways speed. Grows as the fleet thins out.
    pub fn speed(&self) -> f32 {
        let total = self.aliens.len();
        if total == 0 {
            return self.layout.speed;
        }
        let destroyed = (total - self.alive_count()) as f32 / total as f32;
        self.layout.speed * (1.0 + self.layout.thinning_boost * destroyed)
    }

    /// Advance the formation one tick.
    ///
    /// A pending drop always consumes the tick. Otherwise the fleet moves
    /// sideways, unless any living alien would cross a margin, in which case
    /// nothing moves, the direction flips and a drop is queued for next tick.
    pub fn update(&mut self, dt: f32) -> FleetStep {
        if self.is_cleared() {
            return FleetStep::Idle;
        }

        if self.drop_pending {
            let dy = self.layout.drop_step;
            for alien in self.aliens.iter_mut().filter(|a| a.is_alive()) {
                alien.translate(0.0, dy);
            }
            self.drop_pending = false;
            return FleetStep::Dropped;
        }

        let dx = self.speed() * dt * self.direction.sign();
        let (left, right) = (self.layout.left_margin, self.layout.right_margin);
        let hits_edge = self.iter_alive().any(|a| {
            let bounds = &a.entity.bounds;
            bounds.left() + dx < left || bounds.right() + dx > right
        });

        if hits_edge {
            self.direction = self.direction.flipped();
            self.drop_pending = true;
            log::debug!("Fleet reached edge, now heading {:?}", self.direction);
            return FleetStep::EdgeContact;
        }

        for alien in self.aliens.iter_mut().filter(|a| a.is_alive()) {
            alien.translate(dx, 0.0);
        }
        FleetStep::Moved
    }
}
