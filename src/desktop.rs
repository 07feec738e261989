use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::Color;
use log::{debug, info};

use crate::audio::{self, Player, Speaker};
use crate::canvas::{Canvas, Rect, Style};
use crate::config::Config;
use crate::console::{Console, ConsoleEffect};
use crate::error::{Error, Result};
use crate::game::{GameEvent, GameState, SnakeGame};
use crate::screen::{self, Screen};
use crate::snake::Direction;
use crate::window::{Hit, Lifecycle, Window, WindowId, WindowManager};
use crate::{Coords, TermInt};

const MIN_COLS: TermInt = 64;
const MIN_ROWS: TermInt = 20;
const CLOCK_REFRESH: Duration = Duration::from_secs(1);

const DESKTOP_BG: Color = Color::Rgb { r: 0x2d, g: 0x1b, b: 0x4e };
const DESKTOP_FG: Color = Color::Rgb { r: 0xb8, g: 0xa9, b: 0xd9 };
const TASKBAR_BG: Color = Color::Rgb { r: 0x12, g: 0x12, b: 0x20 };
const TASKBAR_FG: Color = Color::Rgb { r: 0xdc, g: 0xe6, b: 0xea };
const ACCENT: Color = Color::Rgb { r: 0xd4, g: 0xaf, b: 0x37 };
const WINDOW_BG: Color = Color::Rgb { r: 0x1b, g: 0x1e, b: 0x23 };
const WINDOW_FG: Color = Color::Rgb { r: 0xe7, g: 0xe2, b: 0xd2 };
const FRAME_INACTIVE: Color = Color::Rgb { r: 0x5a, g: 0x5f, b: 0x66 };

const ICONS: [(WindowId, &str); 5] = [
    (WindowId::Terminal, "[>_] Terminal"),
    (WindowId::SnakeGame, "[~@] Snake"),
    (WindowId::FileManager, "[==] Files"),
    (WindowId::QaDashboard, "[QA] Dashboard"),
    (WindowId::Settings, "[**] Settings"),
];

const FILES: &[&str] = &[
    "/home/cocobot",
    "  bugs/",
    "    bug_001.txt",
    "  tests/",
    "    test_login_user.py",
    "    test_checkout_flow.py",
    "    test_payment_gateway.py",
    "  cat_pics/",
    "    nap_on_keyboard.jpg",
    "  resume.pdf",
];

const DASHBOARD: &[(&str, u16)] = &[
    ("Tests passed", 94),
    ("Coverage", 91),
    ("Bugs fixed", 78),
    ("Naps taken", 100),
];

enum Drag {
    Move { id: WindowId, last: Coords },
    Resize { id: WindowId },
}

/// All desktop state: windows, the apps inside them and the timers that
/// drive them. Input comes in as crossterm events, output goes to a canvas.
pub struct Desktop {
    wm: WindowManager,
    console: Console,
    game: SnakeGame,
    speaker: Speaker,
    tick: Duration,
    next_tick: Instant,
    clock: String,
    next_clock: Instant,
    drag: Option<Drag>,
    size: Coords,
    quit: bool,
}

impl Desktop {
    pub fn new(config: &Config, size: Coords, player: Box<dyn Player>, now: Instant) -> Self {
        let game = SnakeGame::new(config.grid, config.seed);
        let mut wm = WindowManager::new(desktop_area(size));
        let (board_w, board_h) = game.board_size();
        let (frame_w, frame_h) = (board_w + 2, board_h + 2);
        let snake = wm.window(WindowId::SnakeGame).rect;
        let bounds = desktop_area(size);
        if snake.x.saturating_add(frame_w) > bounds.right()
            || snake.y.saturating_add(frame_h) > bounds.bottom()
        {
            // Too big for the usual spot; open it in the top left corner.
            wm.drag_by(WindowId::SnakeGame, -(snake.x as i32), -(snake.y as i32));
        }
        wm.resize_to(WindowId::SnakeGame, frame_w, frame_h);

        Desktop {
            wm,
            console: Console::new(config.seed),
            game,
            speaker: Speaker::new(player, config.sound),
            tick: config.tick,
            next_tick: now + config.tick,
            clock: clock_text(),
            next_clock: now + CLOCK_REFRESH,
            drag: None,
            size,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    #[cfg(test)]
    pub fn windows(&self) -> &WindowManager {
        &self.wm
    }

    #[cfg(test)]
    pub fn game(&self) -> &SnakeGame {
        &self.game
    }

    #[cfg(test)]
    pub fn console(&self) -> &Console {
        &self.console
    }

    #[cfg(test)]
    pub fn sound_enabled(&self) -> bool {
        self.speaker.enabled()
    }

    /// The smallest terminal the desktop can be drawn in.
    pub fn min_size(config: &Config) -> Coords {
        let (grid_w, grid_h) = config.grid;
        (MIN_COLS.max(grid_w * 2 + 2), MIN_ROWS.max(grid_h + 4))
    }

    /// Earliest moment something needs to happen without user input.
    pub fn next_deadline(&self) -> Instant {
        let mut deadline = self.next_clock;
        if self.game.state() == GameState::Running {
            deadline = deadline.min(self.next_tick);
        }
        if let Some(due) = self.console.next_due() {
            deadline = deadline.min(due);
        }
        deadline
    }

    /// Runs every timer that has come due by `now`.
    pub fn update(&mut self, now: Instant) {
        if self.game.state() == GameState::Running && now >= self.next_tick {
            self.next_tick = now + self.tick;
            match self.game.tick() {
                Some(GameEvent::Ate) => self.speaker.meow(),
                Some(GameEvent::Over { score, mice, won }) => {
                    debug!("game over shown: score {} mice {} won {}", score, mice, won)
                }
                None => {}
            }
        }

        self.console.poll(now);

        if now >= self.next_clock {
            self.clock = clock_text();
            self.next_clock = now + CLOCK_REFRESH;
        }
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Resize(width, height) => self.resize((width, height)),
            _ => {}
        }
    }

    pub fn resize(&mut self, size: Coords) {
        self.size = size;
        self.wm.set_bounds(desktop_area(size));
        self.drag = None;
    }

    fn apply(&mut self, lifecycle: Option<Lifecycle>, now: Instant) {
        match lifecycle {
            Some(Lifecycle::SnakeResumed) => {
                if self.game.state() == GameState::Paused {
                    self.next_tick = now + self.tick;
                }
                self.game.resume();
            }
            Some(Lifecycle::SnakePaused) => self.game.pause(),
            Some(Lifecycle::ConsoleFocused) => debug!("console has the keyboard"),
            None => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                info!("quit requested");
                self.quit = true;
                return;
            }
            KeyCode::F(n @ 1..=5) => {
                let lifecycle = self.wm.open(WindowId::ALL[n as usize - 1]);
                self.apply(lifecycle, now);
                return;
            }
            KeyCode::Tab => {
                let lifecycle = self.wm.cycle_focus();
                self.apply(lifecycle, now);
                return;
            }
            KeyCode::Esc => {
                if let Some(id) = self.wm.focused() {
                    let lifecycle = self.wm.close(id);
                    self.apply(lifecycle, now);
                }
                return;
            }
            _ => {}
        }

        match self.wm.focused() {
            Some(WindowId::Terminal) => self.console_key(key, ctrl, now),
            Some(WindowId::SnakeGame) => self.snake_key(key, now),
            Some(WindowId::Settings) => {
                if matches!(key.code, KeyCode::Char('s') | KeyCode::Char(' ') | KeyCode::Enter) {
                    self.speaker.toggle();
                }
            }
            _ => {}
        }
    }

    fn console_key(&mut self, key: KeyEvent, ctrl: bool, now: Instant) {
        match key.code {
            KeyCode::Char(ch) if !ctrl => self.console.insert(ch),
            KeyCode::Backspace => self.console.backspace(),
            KeyCode::Up => self.console.history_prev(),
            KeyCode::Down => self.console.history_next(),
            KeyCode::Enter => {
                for effect in self.console.submit(now) {
                    match effect {
                        ConsoleEffect::Meow => self.speaker.meow(),
                    }
                }
            }
            _ => {}
        }
    }

    fn snake_key(&mut self, key: KeyEvent, now: Instant) {
        if let GameState::Over { .. } = self.game.state() {
            self.game.restart();
            self.next_tick = now + self.tick;
            return;
        }

        match key.code {
            KeyCode::Char('w') | KeyCode::Up => self.game.steer(Direction::Up),
            KeyCode::Char('a') | KeyCode::Left => self.game.steer(Direction::Left),
            KeyCode::Char('s') | KeyCode::Down => self.game.steer(Direction::Down),
            KeyCode::Char('d') | KeyCode::Right => self.game.steer(Direction::Right),
            KeyCode::Char('p') | KeyCode::Char(' ') => {
                if self.game.state() == GameState::Paused {
                    self.next_tick = now + self.tick;
                }
                self.game.toggle_pause();
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let pos = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(pos, now),
            MouseEventKind::Drag(MouseButton::Left) => self.drag_to(pos),
            MouseEventKind::Up(MouseButton::Left) => self.drag = None,
            _ => {}
        }
    }

    fn click(&mut self, pos: Coords, now: Instant) {
        if pos.1 == self.taskbar_row() {
            let button = taskbar_buttons()
                .into_iter()
                .find(|(_, x, width)| pos.0 >= *x && pos.0 < x + width);
            if let Some((id, _, _)) = button {
                let lifecycle = self.wm.open(id);
                self.apply(lifecycle, now);
            }
            return;
        }

        let lifecycle = match self.wm.hit(pos) {
            Hit::Close(id) => self.wm.close(id),
            Hit::TitleBar(id) => {
                self.drag = Some(Drag::Move { id, last: pos });
                self.wm.focus(id)
            }
            Hit::ResizeGrip(id) => {
                self.drag = Some(Drag::Resize { id });
                self.wm.focus(id)
            }
            Hit::Body(id) => self.wm.focus(id),
            Hit::Background => match icon_at(pos) {
                Some(id) => self.wm.open(id),
                None => self.wm.click_background(),
            },
        };
        self.apply(lifecycle, now);
    }

    fn drag_to(&mut self, pos: Coords) {
        match self.drag {
            Some(Drag::Move { id, last }) => {
                let dx = pos.0 as i32 - last.0 as i32;
                let dy = pos.1 as i32 - last.1 as i32;
                self.wm.drag_by(id, dx, dy);
                self.drag = Some(Drag::Move { id, last: pos });
            }
            Some(Drag::Resize { id }) => {
                let rect = self.wm.window(id).rect;
                let width = (pos.0 + 1).saturating_sub(rect.x);
                let height = (pos.1 + 1).saturating_sub(rect.y);
                self.wm.resize_to(id, width, height);
            }
            None => {}
        }
    }

    fn taskbar_row(&self) -> TermInt {
        self.size.1.saturating_sub(1)
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let (width, height) = canvas.size();
        canvas.clear(Style::new(DESKTOP_FG, DESKTOP_BG));
        if width == 0 || height == 0 {
            return;
        }

        self.draw_wallpaper(canvas);
        for window in self.wm.visible_in_z_order() {
            self.draw_window(canvas, window);
        }
        self.draw_taskbar(canvas);
    }

    fn draw_wallpaper(&self, canvas: &mut Canvas) {
        let area = desktop_area(canvas.size());
        let style = Style::new(DESKTOP_FG, DESKTOP_BG);
        for (i, (_, label)) in ICONS.iter().enumerate() {
            canvas.print((1, 1 + 2 * i as TermInt), label, style.bold(), area);
        }

        let logo = ["=^.^=", "Cocobot OS", "click an icon or press F1-F5"];
        let y0 = area.bottom().saturating_sub(logo.len() as TermInt + 1);
        for (i, line) in logo.iter().enumerate() {
            let x = area.right().saturating_sub(line.chars().count() as TermInt + 2);
            canvas.print((x, y0 + i as TermInt), line, style, area);
        }
    }

    fn draw_window(&self, canvas: &mut Canvas, window: &Window) {
        let focused = self.wm.focused() == Some(window.id);
        let frame = if focused {
            Style::new(Color::Black, ACCENT).bold()
        } else {
            Style::new(WINDOW_FG, FRAME_INACTIVE)
        };
        let body = Style::new(WINDOW_FG, WINDOW_BG);
        let rect = window.rect;

        canvas.fill(rect, ' ', body);
        canvas.draw_borders(rect, frame);
        canvas.fill(Rect::new(rect.x, rect.y, rect.width, 1), ' ', frame);
        canvas.print((rect.x + 1, rect.y), &format!(" {} ", window.id.title()), frame, rect);
        canvas.print(window.close_button(), "[x]", frame, rect);
        canvas.put(window.resize_grip(), '#', frame);

        let content = window.content();
        match window.id {
            WindowId::Terminal => self.console.draw(canvas, content, focused),
            WindowId::SnakeGame => self.game.draw(canvas, content),
            WindowId::FileManager => {
                for (i, line) in FILES.iter().enumerate() {
                    canvas.print((content.x + 1, content.y + i as TermInt), line, body, content);
                }
            }
            WindowId::QaDashboard => draw_dashboard(canvas, content, body),
            WindowId::Settings => self.draw_settings(canvas, content, body),
        }
    }

    fn draw_settings(&self, canvas: &mut Canvas, content: Rect, style: Style) {
        let sound = if self.speaker.enabled() { "[on] " } else { "[off]" };
        let lines = [
            format!("Sound      {}  (S to toggle)", sound),
            "Theme      Cocobot Gold".to_string(),
            "Version    Cocobot OS v1.0".to_string(),
        ];
        for (i, line) in lines.iter().enumerate() {
            canvas.print((content.x + 1, content.y + 1 + i as TermInt), line, style, content);
        }
    }

    fn draw_taskbar(&self, canvas: &mut Canvas) {
        let (width, _) = canvas.size();
        let row = Rect::new(0, self.taskbar_row(), width, 1);
        let bar = Style::new(TASKBAR_FG, TASKBAR_BG);
        canvas.fill(row, ' ', bar);

        for (id, x, _) in taskbar_buttons() {
            let style = if self.wm.focused() == Some(id) {
                Style::new(Color::Black, ACCENT).bold()
            } else if self.wm.is_visible(id) {
                bar.bold()
            } else {
                bar
            };
            canvas.print((x, row.y), &taskbar_label(id), style, row);
        }

        let clock = format!(" {} ", self.clock);
        let x = width.saturating_sub(clock.chars().count() as TermInt);
        canvas.print((x, row.y), &clock, bar.bold(), row);
    }
}

fn desktop_area((width, height): Coords) -> Rect {
    Rect::new(0, 0, width, height.saturating_sub(1))
}

fn clock_text() -> String {
    Local::now().format("%H:%M").to_string()
}

fn taskbar_label(id: WindowId) -> String {
    let key = WindowId::ALL.iter().position(|w| *w == id).unwrap_or(0) + 1;
    format!("[F{} {}]", key, id.title())
}

/// Each window's button on the taskbar: id, first column and width.
fn taskbar_buttons() -> Vec<(WindowId, TermInt, TermInt)> {
    let mut x = 1;
    WindowId::ALL
        .iter()
        .map(|id| {
            let width = taskbar_label(*id).chars().count() as TermInt;
            let button = (*id, x, width);
            x += width + 1;
            button
        })
        .collect()
}

fn icon_at(pos: Coords) -> Option<WindowId> {
    ICONS.iter().enumerate().find_map(|(i, (id, label))| {
        let y = 1 + 2 * i as TermInt;
        let hit = pos.1 == y && pos.0 >= 1 && pos.0 < 1 + label.chars().count() as TermInt;
        hit.then_some(*id)
    })
}

fn draw_dashboard(canvas: &mut Canvas, content: Rect, style: Style) {
    canvas.print((content.x + 1, content.y), "Sprint 42 - quality report", style.bold(), content);

    let bar_width = content.width.saturating_sub(24) as u32;
    for (i, (label, pct)) in DASHBOARD.iter().enumerate() {
        let y = content.y + 2 + i as TermInt * 2;
        let filled = (bar_width * *pct as u32 / 100) as usize;
        let bar: String = "█".repeat(filled) + &"░".repeat(bar_width as usize - filled);
        let line = format!("{:<13} {:>3}% {}", label, pct, bar);
        canvas.print((content.x + 1, y), &line, style, content);
    }
}

/// Takes over the terminal and runs the desktop until the user quits.
pub fn run(config: &Config) -> Result<()> {
    let mut screen = Screen::new()?;
    let (width, height) = screen.size();
    let (min_width, min_height) = Desktop::min_size(config);
    if width < min_width || height < min_height {
        return Err(Error::TerminalTooSmall { width, height, min_width, min_height });
    }

    screen.setup()?;
    let mut desktop = Desktop::new(config, (width, height), audio::default_player(), Instant::now());
    info!("desktop started at {}x{}", width, height);

    let result = event_loop(&mut screen, &mut desktop);
    screen.restore()?;
    result
}

fn event_loop(screen: &mut Screen, desktop: &mut Desktop) -> Result<()> {
    let mut frame = Canvas::new(0, 0);

    while !desktop.should_quit() {
        let now = Instant::now();
        desktop.update(now);

        let (width, height) = screen.size();
        if frame.size() != (width, height) {
            frame = Canvas::new(width, height);
        }
        desktop.draw(&mut frame);
        screen.present(&frame)?;

        let timeout = desktop.next_deadline().saturating_duration_since(Instant::now());
        for event in screen::read_events(timeout)? {
            if let Event::Resize(width, height) = event {
                screen.resize(width, height)?;
            }
            desktop.handle_event(event, Instant::now());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Sweep;
    use std::{cell::RefCell, rc::Rc};

    const SIZE: Coords = (100, 30);

    struct Counter(Rc<RefCell<u32>>);

    impl Player for Counter {
        fn play(&mut self, _sweep: &Sweep) {
            *self.0.borrow_mut() += 1;
        }
    }

    fn desktop() -> (Desktop, Rc<RefCell<u32>>, Instant) {
        let plays = Rc::new(RefCell::new(0));
        let config = Config { seed: Some(5), ..Config::default() };
        let now = Instant::now();
        let desktop = Desktop::new(&config, SIZE, Box::new(Counter(Rc::clone(&plays))), now);
        (desktop, plays, now)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, (column, row): Coords) -> Event {
        Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
    }

    fn type_command(d: &mut Desktop, text: &str, now: Instant) {
        for ch in text.chars() {
            d.handle_event(key(KeyCode::Char(ch)), now);
        }
        d.handle_event(key(KeyCode::Enter), now);
    }

    #[test]
    fn typing_goes_to_the_console() {
        let (mut d, plays, now) = desktop();
        type_command(&mut d, "meow", now);
        assert_eq!(*plays.borrow(), 1);
        assert!(d.console().lines().any(|l| l == "root@cocobot:~# meow"));
    }

    #[test]
    fn snake_runs_only_while_its_window_is_open() {
        let (mut d, _, now) = desktop();
        assert_eq!(d.game().state(), GameState::Paused);

        d.handle_event(key(KeyCode::F(2)), now);
        assert_eq!(d.game().state(), GameState::Running);
        assert_eq!(d.windows().focused(), Some(WindowId::SnakeGame));

        d.update(now + Duration::from_millis(150));
        assert_eq!(d.game().snake().head(), (11, 10));

        d.handle_event(key(KeyCode::Esc), now);
        assert_eq!(d.game().state(), GameState::Paused);
        d.update(now + Duration::from_secs(5));
        assert_eq!(d.game().snake().head(), (11, 10));
    }

    #[test]
    fn catching_a_mouse_meows_unless_muted() {
        let (mut d, plays, now) = desktop();
        d.handle_event(key(KeyCode::F(2)), now);
        let mut t = now;
        for _ in 0..5 {
            t += Duration::from_millis(150);
            d.update(t);
        }
        assert_eq!(d.game().score(), 10);
        assert_eq!(*plays.borrow(), 1);

        d.handle_event(key(KeyCode::F(5)), t);
        d.handle_event(key(KeyCode::Char('s')), t);
        assert!(!d.sound_enabled());
        d.handle_event(key(KeyCode::F(1)), t);
        type_command(&mut d, "meow", t);
        assert_eq!(*plays.borrow(), 1);
    }

    #[test]
    fn any_key_restarts_after_game_over() {
        let (mut d, _, now) = desktop();
        d.handle_event(key(KeyCode::F(2)), now);
        d.handle_event(key(KeyCode::Up), now);
        let mut t = now;
        for _ in 0..12 {
            t += Duration::from_millis(150);
            d.update(t);
        }
        assert_eq!(d.game().state(), GameState::Over { won: false });
        d.handle_event(key(KeyCode::Char('x')), t);
        assert_eq!(d.game().state(), GameState::Running);
        assert_eq!(d.game().score(), 0);
    }

    #[test]
    fn clicks_on_background_hide_windows() {
        let (mut d, _, now) = desktop();
        d.handle_event(key(KeyCode::F(2)), now);
        d.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), (98, 27)), now);
        assert_eq!(d.windows().visible_in_z_order().count(), 0);
        assert_eq!(d.game().state(), GameState::Paused);
    }

    #[test]
    fn icons_and_taskbar_open_windows() {
        let (mut d, _, now) = desktop();
        d.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), (70, 25)), now);
        // Icon row 5 is Files (third icon), now uncovered.
        d.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), (2, 5)), now);
        assert_eq!(d.windows().focused(), Some(WindowId::FileManager));

        let (_, x, _) = taskbar_buttons()[4];
        d.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), (x + 1, SIZE.1 - 1)), now);
        assert_eq!(d.windows().focused(), Some(WindowId::Settings));
    }

    #[test]
    fn title_bar_drag_moves_the_window() {
        let (mut d, _, now) = desktop();
        let before = d.windows().window(WindowId::Terminal).rect;
        let grab = (before.x + 3, before.y);
        d.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), grab), now);
        d.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), (grab.0 + 5, grab.1 + 2)), now);
        d.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), (grab.0 + 5, grab.1 + 2)), now);
        let after = d.windows().window(WindowId::Terminal).rect;
        assert_eq!((after.x, after.y), (before.x + 5, before.y + 2));
    }

    #[test]
    fn grip_drag_resizes_the_window() {
        let (mut d, _, now) = desktop();
        let w = *d.windows().window(WindowId::Terminal);
        d.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), w.resize_grip()), now);
        let target = (w.rect.x + 29, w.rect.y + 9);
        d.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), target), now);
        let rect = d.windows().window(WindowId::Terminal).rect;
        assert_eq!((rect.width, rect.height), (30, 10));
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut d, _, now) = desktop();
        d.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), now);
        assert!(d.should_quit());
    }

    #[test]
    fn deadline_tracks_pending_work() {
        let (mut d, _, now) = desktop();
        assert_eq!(d.next_deadline(), now + CLOCK_REFRESH);
        type_command(&mut d, "hunt", now);
        d.handle_event(key(KeyCode::F(2)), now);
        assert_eq!(d.next_deadline(), now + Duration::from_millis(150));
    }

    #[test]
    fn draw_shows_windows_and_taskbar() {
        let (mut d, _, now) = desktop();
        d.handle_event(key(KeyCode::F(4)), now);
        let mut canvas = Canvas::new(SIZE.0, SIZE.1);
        d.draw(&mut canvas);
        let taskbar = canvas.row_text(SIZE.1 - 1);
        assert!(taskbar.contains("[F1 Terminal]"));
        assert!(taskbar.contains("[F4 QA Dashboard]"));
        let qa = d.windows().window(WindowId::QaDashboard).rect;
        assert!(canvas.row_text(qa.y).contains("QA Dashboard"));
        assert!(canvas.row_text(qa.y).contains("[x]"));
    }

    #[test]
    fn min_size_grows_with_the_board() {
        let config = Config { grid: (40, 25), ..Config::default() };
        assert_eq!(Desktop::min_size(&config), (82, 29));
        assert_eq!(Desktop::min_size(&Config::default()), (64, 20));
    }

    #[test]
    fn big_board_fits_at_min_size() {
        let config = Config { grid: (40, 25), seed: Some(1), ..Config::default() };
        let size = Desktop::min_size(&config);
        let now = Instant::now();
        let mut d = Desktop::new(&config, size, Box::new(audio::Bell::new(Vec::new())), now);
        d.handle_event(key(KeyCode::F(2)), now);

        let content = d.windows().window(WindowId::SnakeGame).content();
        let (board_w, board_h) = d.game().board_size();
        assert!(content.width >= board_w);
        assert!(content.height >= board_h);

        let mut canvas = Canvas::new(size.0, size.1);
        d.draw(&mut canvas);
        assert!(canvas.row_text(content.y + board_h - 1).contains("Score: 0"));
    }
}
