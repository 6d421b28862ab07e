mod alien;
mod entity;
mod fleet;
mod player;
mod projectile;

// Re-export all public types
pub use alien::Alien;
pub use entity::{Entity, Rect, SpriteId};
pub use fleet::{Direction, Fleet, FleetLayout, FleetStep};
pub use player::{HitOutcome, Player};
pub use projectile::{Projectile, ProjectilePool};
