use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// What the player wants right now.
///
/// Movement and fire are held state. The one-shot intents (pause, quit,
/// restart, toggle_fps, export_report) belong to the batch of device events
/// numbered by `sequence`; consumers act on them once per new sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub move_left: bool,
    pub move_right: bool,
    pub fire: bool,
    pub pause: bool,
    pub quit: bool,
    pub restart: bool,
    pub toggle_fps: bool,
    pub export_report: bool,
    /// Number of device events seen so far
    pub sequence: u64,
}

/// Non-blocking source of input snapshots
pub trait InputSource {
    /// Return immediately with the current intent. Without a new device
    /// event, repeated calls return identical snapshots.
    fn poll(&mut self) -> color_eyre::Result<InputSnapshot>;
}

/// Reads crossterm key events and folds them into an [`InputSnapshot`]
#[derive(Debug, Default)]
pub struct InputManager {
    snapshot: InputSnapshot,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> InputSnapshot {
        self.snapshot
    }

    /// Fold a batch of device events into the snapshot. An empty batch
    /// changes nothing.
    pub fn apply_events(&mut self, events: impl IntoIterator<Item = Event>) {
        let mut first = true;
        for event in events {
            // Auto-repeat is not a new event: held keys were latched on Press
            if matches!(
                event,
                Event::Key(KeyEvent {
                    kind: KeyEventKind::Repeat,
                    ..
                })
            ) {
                continue;
            }
            if first {
                self.clear_oneshots();
                first = false;
            }
            self.snapshot.sequence += 1;

            // Mouse, resize and focus events carry no game intent
            if let Event::Key(key_event) = event {
                self.handle_key_event(key_event);
            }
        }
    }

    fn clear_oneshots(&mut self) {
        let snapshot = &mut self.snapshot;
        snapshot.pause = false;
        snapshot.quit = false;
        snapshot.restart = false;
        snapshot.toggle_fps = false;
        snapshot.export_report = false;
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event),
            KeyEventKind::Release => self.handle_key_release(key_event.code),
            KeyEventKind::Repeat => {}
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent) {
        let snapshot = &mut self.snapshot;

        // Quit works from any state
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            snapshot.quit = true;
            return;
        }

        match key_event.code {
            KeyCode::Char('p') | KeyCode::Char('P') => snapshot.pause = true,
            KeyCode::Char('r') | KeyCode::Char('R') => snapshot.restart = true,
            KeyCode::F(1) => snapshot.toggle_fps = true,
            KeyCode::F(2) => snapshot.export_report = true,
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                snapshot.move_left = true;
                snapshot.move_right = false;
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                snapshot.move_right = true;
                snapshot.move_left = false;
            }
            KeyCode::Char(' ') => snapshot.fire = true,
            // Unknown keys mean "no action"
            _ => {}
        }
    }

    fn handle_key_release(&mut self, code: KeyCode) {
        let snapshot = &mut self.snapshot;
        match code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => snapshot.move_left = false,
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                snapshot.move_right = false
            }
            KeyCode::Char(' ') => snapshot.fire = false,
            _ => {}
        }
    }
}

impl InputSource for InputManager {
    fn poll(&mut self) -> color_eyre::Result<InputSnapshot> {
        // Drain everything queued without blocking
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            events.push(event::read()?);
        }
        self.apply_events(events);
        Ok(self.snapshot)
    }
}
