use color_eyre::Result;
use rodio::source::{Buffered, SineWave};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::game_loop::GameEvent;

/// Directory the sound effects are loaded from
pub const SOUND_DIR: &str = "assets/sounds";

type Clip = Buffered<Decoder<BufReader<File>>>;

/// Sound effects for game events.
///
/// Clips that fail to load fall back to a short synthesized tone.
pub struct AudioManager {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    fire: Option<Clip>,
    explosion: Option<Clip>,
    hit: Option<Clip>,
    volume: f32,
}

impl AudioManager {
    /// Open the default output device and pre-load clips from `sound_dir`.
    /// Volume is clamped to 0.0..=1.0.
    pub fn new(sound_dir: impl AsRef<Path>, volume: f32) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()?;
        let dir = sound_dir.as_ref();

        Ok(Self {
            _stream: stream,
            stream_handle,
            fire: load_clip(&dir.join("fire.wav")),
            explosion: load_clip(&dir.join("explosion.wav")),
            hit: load_clip(&dir.join("hit.wav")),
            volume: volume.clamp(0.0, 1.0),
        })
    }

    /// Audio is optional: without a usable device the game runs silently
    pub fn try_new(volume: f32) -> Option<Self> {
        match Self::new(SOUND_DIR, volume) {
            Ok(audio) => Some(audio),
            Err(err) => {
                log::warn!("Failed to initialize audio, continuing without sound: {err}");
                None
            }
        }
    }

    pub fn play(&self, event: &GameEvent) {
        match event {
            GameEvent::ShotFired => self.play_clip(self.fire.as_ref(), 880.0),
            GameEvent::AlienDestroyed { .. } => self.play_clip(self.explosion.as_ref(), 220.0),
            GameEvent::PlayerHit { .. } | GameEvent::GameOver { .. } => {
                self.play_clip(self.hit.as_ref(), 110.0)
            }
            _ => {}
        }
    }

    fn play_clip(&self, clip: Option<&Clip>, fallback_hz: f32) {
        // Playback errors never stop the game
        let Ok(sink) = Sink::try_new(&self.stream_handle) else {
            return;
        };
        sink.set_volume(self.volume);
        match clip {
            // Cloning a buffered source only clones references
            Some(clip) => sink.append(clip.clone()),
            None => sink.append(
                SineWave::new(fallback_hz)
                    .take_duration(Duration::from_millis(60))
                    .amplify(0.2),
            ),
        }
        sink.detach();
    }
}

fn load_clip(path: &Path) -> Option<Clip> {
    let load = || -> Result<Clip> {
        let file = File::open(path)?;
        Ok(Decoder::new(BufReader::new(file))?.buffered())
    };
    match load() {
        Ok(clip) => Some(clip),
        Err(err) => {
            log::debug!("No sound at {}: {err}", path.display());
            None
        }
    }
}
