// Library exports for the binary and integration tests
pub use collision::{CollisionReport, CollisionResolver, TieBreak};
pub use entities::{
    Alien, Direction, Entity, Fleet, FleetLayout, FleetStep, HitOutcome, Player, Projectile,
    ProjectilePool, Rect, SpriteId,
};
pub use game_loop::{FrameReport, GameEvent, GameLoop, GamePhase, SessionState};
pub use input::{InputManager, InputSnapshot, InputSource};
pub use renderer::{DrawItem, GameRenderer, RenderFrame, RenderSurface, TerminalSurface};
pub use settings::{Settings, SettingsError, ValidatedSettings};
pub use telemetry::{PerformanceMonitor, PerformanceSummary, TelemetrySink, TickSample};

pub mod app;
#[cfg(feature = "audio")]
pub mod audio;
pub mod collision;
pub mod entities;
pub mod game_loop;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod telemetry;
