use rand::Rng;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    buffer::Buffer,
    layout::{Alignment, Rect as CellRect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::entities::{Rect, SpriteId};
use crate::game_loop::{GamePhase, SessionState};

/// One living entity as the renderer sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub sprite: SpriteId,
    pub bounds: Rect,
}

/// Everything needed to draw one frame. Only living entities are listed.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub items: &'a [DrawItem],
    pub world_width: f32,
    pub world_height: f32,
    pub phase: GamePhase,
    pub session: SessionState,
    pub aliens_alive: usize,
    pub fps: f32,
    pub show_fps: bool,
}

/// Draws frames. Called once per rendered frame, after the frame's ticks.
pub trait RenderSurface {
    fn draw(&mut self, frame: &RenderFrame<'_>) -> color_eyre::Result<()>;
}

const SHIP_SPRITE: [&str; 3] = [" /^\\ ", "<|||>", " ||| "];
const ALIEN_SPRITE: [&str; 3] = ["\\|/", "{=}", "/_\\"];
const BULLET_SPRITE: [&str; 1] = ["|"];
const STAR_COUNT: usize = 40;

/// Maps world coordinates onto terminal cells and draws with ratatui
pub struct GameRenderer {
    /// Star positions as fractions of the play area
    stars: Vec<(f32, f32)>,
}

impl Default for GameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRenderer {
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let stars = (0..STAR_COUNT)
            .map(|_| (rng.random::<f32>(), rng.random::<f32>()))
            .collect();
        Self { stars }
    }

    /// Main render method that dispatches to state-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderFrame) {
        match view.phase {
            GamePhase::Running => self.render_game(frame, view),
            GamePhase::Paused => {
                self.render_game(frame, view);
                self.render_banner(frame, "PAUSED", "Press P to resume", Color::Yellow);
            }
            GamePhase::LevelClear => {
                self.render_game(frame, view);
                let title = format!("LEVEL {} CLEARED", view.session.level);
                self.render_banner(frame, &title, "Get ready...", Color::Green);
            }
            GamePhase::GameOver => self.render_game_over(frame, view),
        }
    }

    /// Play area inside the side borders, below the HUD and above the controls line
    fn play_area(area: CellRect) -> CellRect {
        CellRect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        }
    }

    /// Terminal cells covered by a world-space box, clipped to the play area
    fn to_cells(bounds: &Rect, view: &RenderFrame, area: CellRect) -> Option<CellRect> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let sx = area.width as f32 / view.world_width;
        let sy = area.height as f32 / view.world_height;

        let x0 = (bounds.left() * sx).floor().max(0.0);
        let y0 = (bounds.top() * sy).floor().max(0.0);
        let x1 = (bounds.right() * sx).ceil().min(area.width as f32).max(x0 + 1.0);
        let y1 = (bounds.bottom() * sy).ceil().min(area.height as f32).max(y0 + 1.0);
        if x0 >= area.width as f32 || y0 >= area.height as f32 {
            return None;
        }

        Some(CellRect {
            x: area.x + x0 as u16,
            y: area.y + y0 as u16,
            width: (x1 - x0) as u16,
            height: (y1 - y0) as u16,
        })
    }

    /// Nearest-neighbour scale an ASCII sprite into `cells`
    fn draw_sprite(buffer: &mut Buffer, cells: CellRect, sprite: &[&str], style: Style) {
        let rows: Vec<Vec<char>> = sprite.iter().map(|line| line.chars().collect()).collect();
        for dy in 0..cells.height {
            let row = &rows[dy as usize * rows.len() / cells.height as usize];
            for dx in 0..cells.width {
                let ch = row[dx as usize * row.len() / cells.width as usize];
                if ch != ' ' {
                    buffer.set_string(cells.x + dx, cells.y + dy, ch.to_string(), style);
                }
            }
        }
    }

    /// Renders the active gameplay screen
    fn render_game(&self, frame: &mut Frame, view: &RenderFrame) {
        let area = frame.area();

        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(block, area);

        let play_area = Self::play_area(area);
        let buffer = frame.buffer_mut();

        // Background stars
        for (fx, fy) in &self.stars {
            let x = play_area.x + (fx * play_area.width as f32) as u16;
            let y = play_area.y + (fy * play_area.height as f32) as u16;
            if x < play_area.right() && y < play_area.bottom() {
                buffer.set_string(x, y, ".", Style::default().fg(Color::DarkGray));
            }
        }

        for item in view.items {
            let Some(cells) = Self::to_cells(&item.bounds, view, play_area) else {
                continue;
            };
            let (sprite, color): (&[&str], Color) = match item.sprite {
                SpriteId::Ship => (&SHIP_SPRITE[..], Color::Green),
                SpriteId::Alien => (&ALIEN_SPRITE[..], Color::Red),
                SpriteId::Bullet => (&BULLET_SPRITE[..], Color::Yellow),
            };
            Self::draw_sprite(
                buffer,
                cells,
                sprite,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
        }

        // Stats overlay at the top
        let label = Style::default().fg(Color::DarkGray);
        let mut stats = vec![
            Span::styled("Score: ", label),
            Span::styled(
                view.session.score.to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Lives: ", label),
            Span::styled(
                view.session.lives.to_string(),
                if view.session.lives > 1 {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                },
            ),
            Span::styled("  Level: ", label),
            Span::styled(
                view.session.level.to_string(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Aliens: ", label),
            Span::styled(
                view.aliens_alive.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if view.show_fps {
            stats.push(Span::styled("  FPS: ", label));
            stats.push(Span::styled(
                format!("{:.0}", view.fps),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let stats_area = CellRect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: 1.min(area.height),
        };
        frame.render_widget(Paragraph::new(Line::from(stats)), stats_area);

        // Controls hint at bottom
        let controls = Line::from(vec![Span::styled(
            "[A/D/Arrows: Move] [Space: Fire] [P: Pause] [F1: FPS] [F2: Report] [Q: Quit]",
            label,
        )]);
        let controls_area = CellRect {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(1),
            width: area.width.saturating_sub(2),
            height: 1.min(area.height),
        };
        frame.render_widget(Paragraph::new(controls).centered(), controls_area);
    }

    /// Boxed message in the middle of the screen
    fn render_banner(&self, frame: &mut Frame, title: &str, hint: &str, color: Color) {
        let area = frame.area();
        let text = vec![
            Line::from(""),
            Line::from(title.to_string()).centered().bold().fg(color),
            Line::from(""),
            Line::from(hint.to_string()).centered().white(),
        ];

        let width = 30.min(area.width);
        let height = 6.min(area.height);
        let banner_area = CellRect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        frame.render_widget(
            Paragraph::new(text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(color)),
                )
                .alignment(Alignment::Center),
            banner_area,
        );
    }

    /// Renders the game over screen
    fn render_game_over(&self, frame: &mut Frame, view: &RenderFrame) {
        let game_over_text = vec![
            Line::from(""),
            Line::from("╔═══════════════════════════╗").centered().red(),
            Line::from("║        GAME OVER!         ║")
                .centered()
                .red()
                .bold(),
            Line::from("╚═══════════════════════════╝").centered().red(),
            Line::from(""),
            Line::from(format!("Final Score: {}", view.session.score))
                .centered()
                .yellow()
                .bold(),
            Line::from(format!("Reached Level: {}", view.session.level))
                .centered()
                .cyan()
                .bold(),
            Line::from(""),
            Line::from("Press R to restart").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];

        frame.render_widget(
            Paragraph::new(game_over_text)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            frame.area(),
        );
    }
}

/// A ratatui terminal plus the renderer that draws into it
pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    renderer: GameRenderer,
}

impl<B: Backend> TerminalSurface<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            renderer: GameRenderer::new(),
        }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B: Backend> RenderSurface for TerminalSurface<B> {
    fn draw(&mut self, view: &RenderFrame<'_>) -> color_eyre::Result<()> {
        let renderer = &self.renderer;
        self.terminal.draw(|frame| renderer.render(frame, view))?;
        Ok(())
    }
}
