//! Fixed-timestep simulation loop.
//!
//! Every tick runs the same pipeline in the same order:
//! poll input, move the ship, move bullets, move the fleet, resolve
//! collisions. Frames hand the loop wall-clock time; an accumulator turns
//! that into whole ticks so the simulation stays deterministic however the
//! frames arrive. Each frame ends with exactly one render.

use color_eyre::Result;
use std::time::Instant;

use crate::collision::CollisionResolver;
use crate::entities::{Fleet, FleetLayout, Player, ProjectilePool, SpriteId};
use crate::renderer::{DrawItem, RenderFrame};
use crate::settings::ValidatedSettings;
use crate::telemetry::TickSample;

pub use crate::input::{InputSnapshot, InputSource};
pub use crate::renderer::RenderSurface;
pub use crate::telemetry::TelemetrySink;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Running,
    Paused,
    /// Fleet destroyed; the next one arrives after a short pause
    LevelClear,
    /// Terminal until an explicit restart
    GameOver,
}

/// Per-session counters owned by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub score: u32,
    pub level: u32,
    pub lives: u32,
}

impl SessionState {
    pub fn new(settings: &ValidatedSettings) -> Self {
        Self {
            score: 0,
            level: 1,
            lives: settings.starting_lives,
        }
    }
}

/// Something noteworthy that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ShotFired,
    AlienDestroyed { row: usize, col: usize },
    PlayerHit { lives_remaining: u32 },
    LevelCleared { level: u32 },
    GameOver { score: u32 },
    Paused,
    Resumed,
    Restarted,
}

/// What happened during one call to [`GameLoop::advance`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub ticks: u32,
    pub quit: bool,
    pub events: Vec<GameEvent>,
}

pub struct GameLoop<I, R, T> {
    settings: ValidatedSettings,
    resolver: CollisionResolver,
    player: Player,
    pool: ProjectilePool,
    fleet: Fleet,
    session: SessionState,
    phase: GamePhase,
    /// Ticks left in LEVEL_CLEAR
    transition_ticks: u32,
    accumulator: f32,
    tick_count: u64,
    /// Input sequence whose one-shot intents were already handled
    last_sequence: u64,
    quit_requested: bool,
    show_fps: bool,
    events: Vec<GameEvent>,
    draw_items: Vec<DrawItem>,
    // Collaborators, acquired in this order
    input: I,
    renderer: R,
    telemetry: T,
}

impl<I, R, T> GameLoop<I, R, T>
where
    I: InputSource,
    R: RenderSurface,
    T: TelemetrySink,
{
    pub fn new(settings: ValidatedSettings, input: I, renderer: R, telemetry: T) -> Self {
        let capacity = 1 + settings.projectile_cap + settings.fleet_rows * settings.fleet_cols;
        log::info!(
            "Session started: {}x{} fleet, {} lives, {} Hz",
            settings.fleet_rows,
            settings.fleet_cols,
            settings.starting_lives,
            settings.tick_rate
        );
        Self {
            resolver: CollisionResolver::new(settings.alien_points, settings.tie_break),
            player: Player::new(&settings),
            pool: ProjectilePool::new(settings.projectile_cap),
            fleet: Fleet::spawn(FleetLayout::for_level(&settings, 1)),
            session: SessionState::new(&settings),
            phase: GamePhase::Running,
            transition_ticks: 0,
            accumulator: 0.0,
            tick_count: 0,
            last_sequence: 0,
            quit_requested: false,
            show_fps: settings.show_fps,
            events: Vec::new(),
            draw_items: Vec::with_capacity(capacity),
            settings,
            input,
            renderer,
            telemetry,
        }
    }

    /// Feed one frame's worth of wall-clock time into the simulation.
    ///
    /// Runs as many whole ticks as the accumulated time allows, capped at
    /// `max_substeps`, then renders once. Time beyond the cap is dropped
    /// rather than carried into the next frame.
    pub fn advance(&mut self, frame_secs: f32) -> Result<FrameReport> {
        let mut frame_secs = if frame_secs.is_finite() {
            frame_secs.max(0.0)
        } else {
            0.0
        };
        if frame_secs > self.settings.max_frame_secs {
            log::warn!(
                "Frame took {:.3}s, clamping to {:.3}s",
                frame_secs,
                self.settings.max_frame_secs
            );
            frame_secs = self.settings.max_frame_secs;
        }
        self.telemetry.record_frame(frame_secs);

        let dt = self.settings.tick_dt();
        self.accumulator += frame_secs;

        let mut ticks = 0;
        while self.accumulator >= dt && ticks < self.settings.max_substeps {
            self.tick()?;
            self.accumulator -= dt;
            ticks += 1;
            if self.quit_requested {
                break;
            }
        }
        if self.accumulator >= dt {
            // Spiral-of-death guard
            self.accumulator = self.accumulator.rem_euclid(dt);
        }

        self.render()?;

        Ok(FrameReport {
            ticks,
            quit: self.quit_requested,
            events: self.take_events(),
        })
    }

    /// Run exactly one simulation tick
    pub fn tick(&mut self) -> Result<()> {
        let started = Instant::now();

        let input = self.input.poll()?;
        if input.sequence != self.last_sequence {
            self.last_sequence = input.sequence;
            self.handle_oneshots(&input);
        }

        match self.phase {
            GamePhase::Running => self.simulate(&input),
            GamePhase::LevelClear => {
                self.transition_ticks = self.transition_ticks.saturating_sub(1);
                if self.transition_ticks == 0 {
                    self.next_level();
                }
            }
            GamePhase::Paused | GamePhase::GameOver => {}
        }

        let sample = TickSample {
            tick: self.tick_count,
            duration: started.elapsed(),
            aliens_alive: self.fleet.alive_count(),
            projectiles_alive: self.pool.alive_count(),
            score: self.session.score,
            lives: self.session.lives,
            level: self.session.level,
            phase: self.phase,
        };
        self.telemetry.record_tick(&sample);
        self.tick_count += 1;
        Ok(())
    }

    fn handle_oneshots(&mut self, input: &InputSnapshot) {
        if input.quit {
            log::info!("Quit requested at tick {}", self.tick_count);
            self.quit_requested = true;
        }

        if input.toggle_fps {
            self.show_fps = !self.show_fps;
        }

        if input.export_report {
            if let Err(err) = self.telemetry.export() {
                log::warn!("Failed to export performance report: {err}");
            }
        }

        if input.pause {
            match self.phase {
                GamePhase::Running => {
                    self.phase = GamePhase::Paused;
                    self.events.push(GameEvent::Paused);
                }
                GamePhase::Paused => {
                    self.phase = GamePhase::Running;
                    self.events.push(GameEvent::Resumed);
                }
                GamePhase::LevelClear | GamePhase::GameOver => {}
            }
        }

        if input.restart && self.phase == GamePhase::GameOver {
            self.restart();
        }
    }

    fn simulate(&mut self, input: &InputSnapshot) {
        let dt = self.settings.tick_dt();

        self.player.update(dt, input);
        if input.fire {
            if let Some(projectile) = self.player.fire(&self.pool) {
                if self.pool.spawn(projectile).is_some() {
                    self.events.push(GameEvent::ShotFired);
                }
            }
        }

        self.pool.update(dt, 0.0);
        self.fleet.update(dt);

        let report = self.resolver.resolve(
            &mut self.player,
            &mut self.pool,
            &mut self.fleet,
            &mut self.session,
        );

        self.events.extend(
            report
                .destroyed
                .iter()
                .map(|&(row, col)| GameEvent::AlienDestroyed { row, col }),
        );
        if report.player_hit.is_some() {
            self.session.lives = self.player.lives_remaining;
            self.events.push(GameEvent::PlayerHit {
                lives_remaining: self.session.lives,
            });
        }

        // Losing outranks clearing the fleet in the same tick
        if report.is_game_over() {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver {
                score: self.session.score,
            });
            log::info!(
                "Game over on level {} with score {}",
                self.session.level,
                self.session.score
            );
        } else if self.fleet.is_cleared() {
            self.phase = GamePhase::LevelClear;
            self.transition_ticks = self.settings.level_transition_ticks();
            self.pool.clear();
            self.events.push(GameEvent::LevelCleared {
                level: self.session.level,
            });
            log::info!(
                "Level {} cleared, score {}",
                self.session.level,
                self.session.score
            );
        }

        self.pool.sweep();
    }

    fn next_level(&mut self) {
        self.session.level += 1;
        self.fleet = Fleet::spawn(FleetLayout::for_level(&self.settings, self.session.level));
        self.pool.clear();
        self.phase = GamePhase::Running;
        log::info!(
            "Level {} started, fleet speed {:.1}",
            self.session.level,
            self.fleet.speed()
        );
    }

    /// Start a fresh session with the current settings
    pub fn restart(&mut self) {
        self.player = Player::new(&self.settings);
        self.pool = ProjectilePool::new(self.settings.projectile_cap);
        self.fleet = Fleet::spawn(FleetLayout::for_level(&self.settings, 1));
        self.session = SessionState::new(&self.settings);
        self.phase = GamePhase::Running;
        self.transition_ticks = 0;
        self.events.push(GameEvent::Restarted);
        log::info!("Session restarted");
    }

    /// Start a fresh session with a newly loaded settings bundle
    pub fn restart_with(&mut self, settings: ValidatedSettings) {
        self.resolver = CollisionResolver::new(settings.alien_points, settings.tie_break);
        self.show_fps = settings.show_fps;
        self.accumulator = 0.0;
        self.settings = settings;
        self.restart();
    }

    fn render(&mut self) -> Result<()> {
        self.draw_items.clear();
        self.draw_items
            .extend(self.fleet.iter_alive().map(|alien| DrawItem {
                sprite: alien.entity.sprite,
                bounds: alien.entity.bounds,
            }));
        self.draw_items
            .extend(self.pool.iter_alive().map(|projectile| DrawItem {
                sprite: projectile.entity.sprite,
                bounds: projectile.entity.bounds,
            }));
        if self.player.is_alive() {
            self.draw_items.push(DrawItem {
                sprite: SpriteId::Ship,
                bounds: self.player.entity.bounds,
            });
        }

        let frame = RenderFrame {
            items: &self.draw_items,
            world_width: self.settings.screen_width,
            world_height: self.settings.screen_height,
            phase: self.phase,
            session: self.session,
            aliens_alive: self.fleet.alive_count(),
            fps: self.telemetry.fps(),
            show_fps: self.show_fps,
        };
        self.renderer.draw(&frame)
    }

    /// Events recorded since the last call, in the order they happened
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn settings(&self) -> &ValidatedSettings {
        &self.settings
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn fleet_mut(&mut self) -> &mut Fleet {
        &mut self.fleet
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn show_fps(&self) -> bool {
        self.show_fps
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    /// Export the final report, then release collaborators newest first
    pub fn shutdown(self) -> Result<()> {
        let Self {
            input,
            renderer,
            mut telemetry,
            tick_count,
            session,
            ..
        } = self;

        let exported = telemetry.export();
        drop(telemetry);
        drop(renderer);
        drop(input);

        log::info!(
            "Session ended after {tick_count} ticks: level {}, score {}",
            session.level,
            session.score
        );
        exported
    }
}
