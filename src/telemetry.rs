//! Per-tick measurements and a rolling performance monitor.
//!
//! The core only hands out plain [`TickSample`]s; what happens to them is up
//! to the [`TelemetrySink`].

use color_eyre::Result;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::game_loop::GamePhase;

/// Frame-time samples kept for FPS averaging
pub const DEFAULT_MAX_SAMPLES: usize = 60;
/// Average FPS below this raises a warning
pub const FPS_WARNING_THRESHOLD: f32 = 30.0;

/// Measurements for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSample {
    pub tick: u64,
    /// Wall-clock time spent inside the tick
    pub duration: Duration,
    pub aliens_alive: usize,
    pub projectiles_alive: usize,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub phase: GamePhase,
}

/// Receives telemetry from the game loop
pub trait TelemetrySink {
    fn record_tick(&mut self, sample: &TickSample);

    /// Called once per rendered frame with the (clamped) frame delta
    fn record_frame(&mut self, _frame_secs: f32) {}

    /// Recent frames per second, if the sink tracks it
    fn fps(&self) -> f32 {
        0.0
    }

    /// Write out whatever report the sink keeps
    fn export(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Aggregate figures over the monitor's lifetime and recent window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSummary {
    pub fps: f32,
    pub avg_frame_time_ms: f32,
    pub slowest_tick_ms: f32,
    pub total_frames: u64,
    pub total_ticks: u64,
    pub runtime_secs: f32,
}

/// Rolling window of frame times plus the latest tick sample
#[derive(Debug)]
pub struct PerformanceMonitor {
    frame_times: VecDeque<f32>,
    max_samples: usize,
    total_frames: u64,
    total_ticks: u64,
    runtime_secs: f32,
    slowest_tick: Duration,
    last_sample: Option<TickSample>,
    active_warnings: Vec<String>,
    report_path: Option<PathBuf>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl PerformanceMonitor {
    pub fn new(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            total_frames: 0,
            total_ticks: 0,
            runtime_secs: 0.0,
            slowest_tick: Duration::ZERO,
            last_sample: None,
            active_warnings: Vec::new(),
            report_path: None,
        }
    }

    /// Where [`TelemetrySink::export`] writes its report
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    pub fn average_frame_time(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    pub fn last_sample(&self) -> Option<&TickSample> {
        self.last_sample.as_ref()
    }

    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary {
            fps: self.fps(),
            avg_frame_time_ms: self.average_frame_time() * 1000.0,
            slowest_tick_ms: self.slowest_tick.as_secs_f32() * 1000.0,
            total_frames: self.total_frames,
            total_ticks: self.total_ticks,
            runtime_secs: self.runtime_secs,
        }
    }

    /// Current warnings. Only raised while a level is being played.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let running = self
            .last_sample
            .is_some_and(|sample| sample.phase == GamePhase::Running);
        let fps = self.fps();
        if running && self.frame_times.len() == self.max_samples && fps < FPS_WARNING_THRESHOLD {
            warnings.push(format!(
                "Low FPS detected: {fps:.1} (target: {FPS_WARNING_THRESHOLD:.0}+)"
            ));
        }
        warnings
    }

    pub fn write_report<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        let summary = self.summary();
        writeln!(out, "Alien Invasion Performance Report")?;
        writeln!(out, "{}", "=".repeat(40))?;
        writeln!(out)?;
        writeln!(out, "Fps: {:.2}", summary.fps)?;
        writeln!(out, "Avg Frame Time Ms: {:.2}", summary.avg_frame_time_ms)?;
        writeln!(out, "Slowest Tick Ms: {:.2}", summary.slowest_tick_ms)?;
        writeln!(out, "Total Frames: {}", summary.total_frames)?;
        writeln!(out, "Total Ticks: {}", summary.total_ticks)?;
        writeln!(out, "Runtime Seconds: {:.2}", summary.runtime_secs)?;

        if let Some(sample) = &self.last_sample {
            writeln!(out)?;
            writeln!(out, "Last Tick:")?;
            writeln!(out, "- Level: {}", sample.level)?;
            writeln!(out, "- Score: {}", sample.score)?;
            writeln!(out, "- Lives: {}", sample.lives)?;
            writeln!(out, "- Aliens Alive: {}", sample.aliens_alive)?;
            writeln!(out, "- Projectiles Alive: {}", sample.projectiles_alive)?;
        }

        writeln!(out)?;
        writeln!(out, "Performance Warnings:")?;
        let warnings = self.warnings();
        if warnings.is_empty() {
            writeln!(out, "No performance issues detected.")?;
        }
        for warning in warnings {
            writeln!(out, "- {warning}")?;
        }
        Ok(())
    }

    fn refresh_warnings(&mut self) {
        let warnings = self.warnings();
        if warnings != self.active_warnings {
            for warning in &warnings {
                log::warn!("{warning}");
            }
            self.active_warnings = warnings;
        }
    }
}

impl TelemetrySink for PerformanceMonitor {
    fn record_tick(&mut self, sample: &TickSample) {
        self.total_ticks += 1;
        self.slowest_tick = self.slowest_tick.max(sample.duration);
        self.last_sample = Some(*sample);
    }

    fn record_frame(&mut self, frame_secs: f32) {
        if self.frame_times.len() == self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_secs);
        self.total_frames += 1;
        self.runtime_secs += frame_secs;

        // Re-check once per full window
        if self.total_frames % self.max_samples as u64 == 0 {
            self.refresh_warnings();
        }
    }

    fn fps(&self) -> f32 {
        let average = self.average_frame_time();
        if average > 0.0 { 1.0 / average } else { 0.0 }
    }

    fn export(&mut self) -> Result<()> {
        let Some(path) = &self.report_path else {
            return Ok(());
        };
        let mut out = BufWriter::new(File::create(path)?);
        self.write_report(&mut out)?;
        out.flush()?;
        log::info!("Performance report exported to {}", path.display());
        Ok(())
    }
}
