//! Scripted collaborators shared by the integration tests
#![allow(dead_code)]

use alien_invasion::{
    DrawItem, GameLoop, GamePhase, InputSnapshot, InputSource, RenderFrame, RenderSurface,
    Settings, TelemetrySink, TickSample, ValidatedSettings,
};
use color_eyre::Result;

/// Input whose held keys and one-shot presses are set by the test
#[derive(Debug, Default)]
pub struct ScriptedInput {
    snapshot: InputSnapshot,
    pub polls: usize,
}

impl ScriptedInput {
    pub fn hold(&mut self, left: bool, right: bool, fire: bool) {
        self.snapshot.move_left = left;
        self.snapshot.move_right = right;
        self.snapshot.fire = fire;
    }

    /// A new device event carrying whichever one-shots `set` turns on
    pub fn press(&mut self, set: impl FnOnce(&mut InputSnapshot)) {
        let snapshot = &mut self.snapshot;
        snapshot.pause = false;
        snapshot.quit = false;
        snapshot.restart = false;
        snapshot.toggle_fps = false;
        snapshot.export_report = false;
        snapshot.sequence += 1;
        set(snapshot);
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Result<InputSnapshot> {
        self.polls += 1;
        Ok(self.snapshot)
    }
}

/// One frame as the renderer received it
#[derive(Debug, Clone)]
pub struct RecordedFrame {
    pub items: Vec<DrawItem>,
    pub phase: GamePhase,
    pub score: u32,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<RecordedFrame>,
}

impl RenderSurface for RecordingRenderer {
    fn draw(&mut self, frame: &RenderFrame<'_>) -> Result<()> {
        self.frames.push(RecordedFrame {
            items: frame.items.to_vec(),
            phase: frame.phase,
            score: frame.session.score,
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    pub samples: Vec<TickSample>,
    pub exports: usize,
}

impl TelemetrySink for RecordingTelemetry {
    fn record_tick(&mut self, sample: &TickSample) {
        self.samples.push(*sample);
    }

    fn export(&mut self) -> Result<()> {
        self.exports += 1;
        Ok(())
    }
}

pub type TestGame = GameLoop<ScriptedInput, RecordingRenderer, RecordingTelemetry>;

pub fn validated(settings: Settings) -> ValidatedSettings {
    settings.validate().unwrap()
}

pub fn game_with(settings: Settings) -> TestGame {
    GameLoop::new(
        validated(settings),
        ScriptedInput::default(),
        RecordingRenderer::default(),
        RecordingTelemetry::default(),
    )
}

/// Default settings without the thinning speed-up, so fleet motion is constant
pub fn steady_settings() -> Settings {
    Settings {
        thinning_boost: 0.0,
        ..Settings::default()
    }
}

pub fn ticks(game: &mut TestGame, count: usize) {
    for _ in 0..count {
        game.tick().unwrap();
    }
}

/// Park every listed alien just above the ship so it overlaps it
pub fn ram_player(game: &mut TestGame, aliens: &[usize]) {
    let ship = game.player().entity.bounds;
    for &index in aliens {
        let alien = &mut game.fleet_mut().aliens_mut()[index].entity.bounds;
        alien.x = ship.x;
        alien.y = ship.y - 20.0;
    }
}
