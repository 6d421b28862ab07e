use color_eyre::Result;
use ratatui::{Terminal, backend::Backend};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[cfg(feature = "audio")]
use crate::audio::AudioManager;
use crate::game_loop::{GameLoop, InputSource, RenderSurface};
use crate::input::InputManager;
use crate::renderer::TerminalSurface;
use crate::settings::ValidatedSettings;
use crate::telemetry::PerformanceMonitor;

/// Where the performance report goes on F2 and at exit
pub const REPORT_PATH: &str = "performance_report.txt";

/// The real-time driver: feeds wall-clock time into the game loop and
/// paces frames to the tick rate.
pub struct App<I, R> {
    game: GameLoop<I, R, PerformanceMonitor>,
    #[cfg(feature = "audio")]
    audio: Option<AudioManager>,
    /// Target wall-clock length of one frame
    frame_budget: Duration,
}

impl<B: Backend> App<InputManager, TerminalSurface<B>> {
    /// Construct a new instance of [`App`] drawing to `terminal`.
    pub fn new(settings: ValidatedSettings, terminal: Terminal<B>, report_path: PathBuf) -> Self {
        #[cfg(feature = "audio")]
        let volume = settings.sound_volume;
        let telemetry = PerformanceMonitor::default().with_report_path(report_path);
        let game = GameLoop::new(
            settings,
            InputManager::new(),
            TerminalSurface::new(terminal),
            telemetry,
        );

        #[cfg_attr(not(feature = "audio"), allow(unused_mut))]
        let mut app = Self::from_game(game);
        #[cfg(feature = "audio")]
        {
            app.audio = AudioManager::try_new(volume);
        }
        app
    }
}

impl<I: InputSource, R: RenderSurface> App<I, R> {
    /// Drive an already assembled game loop. No audio.
    pub fn from_game(game: GameLoop<I, R, PerformanceMonitor>) -> Self {
        Self {
            frame_budget: Duration::from_secs_f32(game.settings().tick_dt()),
            game,
            #[cfg(feature = "audio")]
            audio: None,
        }
    }

    /// Run the application's main loop until the player quits.
    ///
    /// Shutdown runs even when a frame fails; the frame's error wins.
    pub fn run(mut self) -> Result<()> {
        let outcome = self.play();
        let shutdown = self.shutdown();
        outcome.and(shutdown)
    }

    fn play(&mut self) -> Result<()> {
        let mut last_frame = Instant::now();

        loop {
            let frame_start = Instant::now();
            let frame_secs = frame_start.duration_since(last_frame).as_secs_f32();
            last_frame = frame_start;

            let report = self.game.advance(frame_secs)?;

            #[cfg(feature = "audio")]
            if let Some(audio) = &self.audio {
                for event in &report.events {
                    audio.play(event);
                }
            }

            if report.quit {
                return Ok(());
            }

            // Sleep off whatever is left of the frame to avoid spinning
            if let Some(rest) = self.frame_budget.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    /// Release audio first, then the game loop's collaborators
    fn shutdown(self) -> Result<()> {
        #[cfg(feature = "audio")]
        drop(self.audio);
        self.game.shutdown()
    }
}
