use std::time::{Duration, Instant};

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Stylize},
    text::Text,
    widgets::{Block, Paragraph},
};

use minesweep::{Cell, CellContent, Difficulty, GameConfig, GameReport, Pos, Session, Status};

#[derive(Parser, Debug)]
#[command(name = "minesweep", about = "Terminal minesweeper", version)]
struct Args {
    /// Difficulty preset
    #[arg(long, short, value_enum, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,
    /// Board rows (custom board, overrides the preset)
    #[arg(long, requires = "cols", requires = "mines")]
    rows: Option<usize>,
    /// Board columns
    #[arg(long, requires = "rows", requires = "mines")]
    cols: Option<usize>,
    /// Mine count
    #[arg(long, requires = "rows", requires = "cols")]
    mines: Option<usize>,
    /// Mine layout seed, for reproducible boards
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let (config, difficulty) = match (args.rows, args.cols, args.mines) {
        (Some(rows), Some(cols), Some(mines)) => {
            (GameConfig::new(rows, cols, mines)?, "custom".to_string())
        }
        _ => (
            GameConfig::from(args.difficulty),
            args.difficulty.label().to_string(),
        ),
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let terminal = ratatui::init();
    let result = App::new(config, difficulty, rng).run(terminal);
    ratatui::restore();

    // Hand the finished game to whoever collects stats.
    if let Ok(Some(report)) = &result {
        println!("{}", serde_json::to_string(report)?);
    }
    result.map(|_| ())
}

enum CursorDirection {
    Up,
    Left,
    Right,
    Down,
}

struct App {
    config: GameConfig,
    difficulty: String,
    rng: StdRng,
    session: Session,
    cursor: Pos,
    started: Option<Instant>,
    finished: Option<Duration>,
    running: bool,
}

impl App {
    fn new(config: GameConfig, difficulty: String, rng: StdRng) -> Self {
        Self {
            config,
            difficulty,
            rng,
            session: Session::new(config),
            cursor: (0, 0),
            started: None,
            finished: None,
            running: false,
        }
    }

    fn run(mut self, mut terminal: DefaultTerminal) -> Result<Option<GameReport>> {
        self.running = true;
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        Ok(self.report())
    }

    fn report(&self) -> Option<GameReport> {
        if !self.session.is_over() {
            return None;
        }
        let took = self.finished.unwrap_or_default();
        Some(GameReport::new(&self.session, &self.difficulty, took))
    }

    fn elapsed(&self) -> Duration {
        match (self.started, self.finished) {
            (_, Some(took)) => took,
            (Some(started), None) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let [header_area, board_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(frame.area());

        let status = match self.session.status() {
            Status::InProgress => "space: reveal  f: flag  n: new  q: quit",
            Status::Won => "cleared!  n: new game  q: quit",
            Status::Lost => "boom!  n: new game  q: quit",
        };
        let mines_left =
            self.session.total_mines() as i64 - self.session.count_flagged() as i64;
        let header = format!(
            "mines: {mines_left}  time: {}s  {status}",
            self.elapsed().as_secs()
        );
        frame.render_widget(Paragraph::new(header), header_area);

        let rows = Layout::vertical(
            (0..self.session.rows()).map(|_| Constraint::Length(1)),
        )
        .split(board_area);
        for (row, row_area) in rows.iter().enumerate() {
            let cols = Layout::horizontal(
                (0..self.session.cols()).map(|_| Constraint::Length(3)),
            )
            .split(*row_area);
            for (col, cell_area) in cols.iter().enumerate() {
                let cell = self
                    .session
                    .cell((row, col))
                    .expect("layout follows board dimensions");
                let bg = if (row, col) == self.cursor {
                    Color::Blue
                } else if row % 2 == col % 2 {
                    Color::DarkGray
                } else {
                    Color::Gray
                };
                frame.render_widget(
                    Paragraph::new(cell_text(cell)).block(Block::new().bg(bg)),
                    *cell_area,
                );
            }
        }
    }

    fn handle_crossterm_events(&mut self) -> Result<()> {
        // Poll so the timer keeps refreshing between key presses.
        if !event::poll(Duration::from_millis(250))? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
            Event::Mouse(_) => {}
            Event::Resize(_, _) => {}
            _ => {}
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Up | KeyCode::Char('k')) => self.move_cursor(CursorDirection::Up),
            (_, KeyCode::Down | KeyCode::Char('j')) => self.move_cursor(CursorDirection::Down),
            (_, KeyCode::Left | KeyCode::Char('h')) => self.move_cursor(CursorDirection::Left),
            (_, KeyCode::Right | KeyCode::Char('l')) => self.move_cursor(CursorDirection::Right),
            (_, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r')) => self.reveal(),
            (_, KeyCode::Char('f')) => self.flag(),
            (_, KeyCode::Char('n')) => self.restart(),
            _ => {}
        }
    }

    fn move_cursor(&mut self, direction: CursorDirection) {
        match direction {
            CursorDirection::Up => self.cursor.0 = self.cursor.0.saturating_sub(1),
            CursorDirection::Down => {
                self.cursor.0 = (self.cursor.0 + 1).min(self.session.rows() - 1)
            }
            CursorDirection::Left => self.cursor.1 = self.cursor.1.saturating_sub(1),
            CursorDirection::Right => {
                self.cursor.1 = (self.cursor.1 + 1).min(self.session.cols() - 1)
            }
        }
    }

    fn reveal(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        self.session = self.session.reveal_with(self.cursor, &mut self.rng);
        if self.session.is_over() && self.finished.is_none() {
            self.finished = Some(self.elapsed());
        }
    }

    fn flag(&mut self) {
        self.session = self.session.toggle_flag(self.cursor);
    }

    fn restart(&mut self) {
        self.session = Session::new(self.config);
        self.cursor = (0, 0);
        self.started = None;
        self.finished = None;
    }

    fn quit(&mut self) {
        self.running = false;
    }
}

fn cell_text(cell: &Cell) -> Text<'static> {
    let ch = if cell.is_flagged() {
        "F".to_string()
    } else if !cell.is_opened() {
        "-".to_string()
    } else {
        match cell.content {
            CellContent::Mine => "*".to_string(),
            CellContent::Adjacent(0) => " ".to_string(),
            CellContent::Adjacent(n) => n.to_string(),
        }
    };
    Text::raw(ch)
}
