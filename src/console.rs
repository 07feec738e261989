use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::style::Color;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::canvas::{Canvas, Rect, Style};
use crate::TermInt;

pub const PROMPT: &str = "root@cocobot:~#";

const SCROLLBACK: usize = 500;
const HISTORY: usize = 50;
const HUNT_DELAY: Duration = Duration::from_millis(1500);
const TEST_DELAY: Duration = Duration::from_millis(2000);

const CONSOLE_BG: Color = Color::Rgb { r: 0x0c, g: 0x0c, b: 0x0c };
const CONSOLE_FG: Color = Color::Rgb { r: 0x33, g: 0xff, b: 0x66 };

const WELCOME: &[&str] = &[
    "Cocobot OS v1.0",
    "Type 'help' to see what Cocobot can do.",
    "",
];

const HELP: &[&str] = &[
    "Available commands:",
    "  help       - Show this menu",
    "  hunt       - Start a bug hunt",
    "  test       - Run the automated tests",
    "  meow       - Make Cocobot meow",
    "  status     - Show system status",
    "  clear      - Clear the terminal",
];

/// Something a command asks of the rest of the desktop.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleEffect {
    Meow,
}

#[derive(Debug)]
struct Pending {
    due: Instant,
    text: String,
}

/// The fake shell: a line editor, canned command output and a queue of
/// lines that show up later to make the work look slow.
pub struct Console {
    input: String,
    lines: VecDeque<String>,
    pending: VecDeque<Pending>,
    history: Vec<String>,
    history_pos: Option<usize>,
    rng: StdRng,
}

impl Console {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Console {
            input: String::new(),
            lines: WELCOME.iter().map(|l| l.to_string()).collect(),
            pending: VecDeque::new(),
            history: Vec::new(),
            history_pos: None,
            rng,
        }
    }

    #[cfg(test)]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[cfg(test)]
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn insert(&mut self, ch: char) {
        self.input.push(ch);
        self.history_pos = None;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Steps back through submitted commands (Up arrow).
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            None => self.history.len() - 1,
            Some(p) => p.saturating_sub(1),
        };
        self.history_pos = Some(pos);
        self.input = self.history[pos].clone();
    }

    /// Steps forward again (Down arrow); past the newest entry the input
    /// is emptied.
    pub fn history_next(&mut self) {
        match self.history_pos {
            None => {}
            Some(p) if p + 1 < self.history.len() => {
                self.history_pos = Some(p + 1);
                self.input = self.history[p + 1].clone();
            }
            Some(_) => {
                self.history_pos = None;
                self.input.clear();
            }
        }
    }

    /// When the next delayed line is due, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|p| p.due)
    }

    /// Runs the line being edited.
    pub fn submit(&mut self, now: Instant) -> Vec<ConsoleEffect> {
        let command = self.input.trim().to_lowercase();
        self.input.clear();
        self.history_pos = None;

        self.push(format!("{} {}", PROMPT, command));
        if command.is_empty() {
            return vec![];
        }

        debug!("console command: {}", command);
        if self.history.last() != Some(&command) {
            self.history.push(command.clone());
            if self.history.len() > HISTORY {
                self.history.remove(0);
            }
        }

        self.run(&command, now)
    }

    fn run(&mut self, command: &str, now: Instant) -> Vec<ConsoleEffect> {
        match command {
            "help" => {
                for line in HELP {
                    self.push(*line);
                }
            }
            "hunt" => {
                self.push("[..] Hunting for bugs in the code...");
                self.later(now + HUNT_DELAY, "[ok] Found one! A bug hiding on line 42.");
                self.later(now + HUNT_DELAY, "[>>] Report written: /home/cocobot/bugs/bug_001.txt");
            }
            "test" => {
                self.push("[..] Running the test suite...");
                let coverage = self.rng.gen_range(85..=97);
                let due = now + TEST_DELAY;
                self.later(due, "[ok] test_login_user (0.2s)");
                self.later(due, "[ok] test_checkout_flow (0.5s)");
                self.later(due, "[!!] test_payment_gateway (1.2s) - Timeout");
                self.later(due, "[ok] test_product_search (0.1s)");
                self.later(due, "");
                self.later(due, format!("[##] Coverage: {}%", coverage));
            }
            "meow" => {
                self.push("=^.^= Meow~");
                return vec![ConsoleEffect::Meow];
            }
            "status" => {
                let memory = self.rng.gen_range(40..60);
                self.push("[>>] Cocobot OS v1.0 - Running");
                self.push(format!("[..] Local time: {}", Local::now().format("%H:%M:%S")));
                self.push(format!("[##] Memory: {}% used", memory));
                self.push("[~~] Network: connected (WiFi: CocoNet_5G)");
            }
            "clear" => self.lines.clear(),
            other => self.push(format!("bash: {}: command not found", other)),
        }
        vec![]
    }

    /// Delivers every delayed line that is due by `now`, oldest first.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut delivered = false;
        while self.pending.front().map_or(false, |p| p.due <= now) {
            if let Some(p) = self.pending.pop_front() {
                self.push(p.text);
                delivered = true;
            }
        }
        delivered
    }

    fn push(&mut self, text: impl Into<String>) {
        self.lines.push_back(text.into());
        while self.lines.len() > SCROLLBACK {
            self.lines.pop_front();
        }
    }

    fn later(&mut self, due: Instant, text: impl Into<String>) {
        // Keep the queue ordered by due time; equal times keep insertion order.
        let at = self.pending.iter().position(|p| p.due > due).unwrap_or(self.pending.len());
        self.pending.insert(at, Pending { due, text: text.into() });
    }

    /// Output scrolled to the bottom, followed by the prompt line.
    pub fn draw(&self, canvas: &mut Canvas, area: Rect, focused: bool) {
        let style = Style::new(CONSOLE_FG, CONSOLE_BG);
        canvas.fill(area, ' ', style);
        if area.is_empty() {
            return;
        }

        let rows = area.height as usize - 1;
        let skip = self.lines.len().saturating_sub(rows);
        for (i, line) in self.lines.iter().skip(skip).enumerate() {
            canvas.print((area.x, area.y + i as TermInt), line, style, area);
        }

        let cursor = if focused { "█" } else { "" };
        let prompt = format!("{} {}{}", PROMPT, self.input, cursor);
        // Long input scrolls left so the cursor stays visible.
        let width = area.width as usize;
        let shown: String = {
            let count = prompt.chars().count();
            prompt.chars().skip(count.saturating_sub(width)).collect()
        };
        let y = area.y + (self.lines.len() - skip) as TermInt;
        canvas.print((area.x, y), &shown, style.bold(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console {
        let mut c = Console::new(Some(9));
        c.lines.clear();
        c
    }

    fn type_line(c: &mut Console, text: &str, now: Instant) -> Vec<ConsoleEffect> {
        for ch in text.chars() {
            c.insert(ch);
        }
        c.submit(now)
    }

    fn output(c: &Console) -> Vec<&str> {
        c.lines().collect()
    }

    #[test]
    fn echo_comes_before_output() {
        let mut c = console();
        type_line(&mut c, "  HeLp ", Instant::now());
        let out = output(&c);
        assert_eq!(out[0], "root@cocobot:~# help");
        assert_eq!(out[1], "Available commands:");
        assert_eq!(out.len(), 1 + HELP.len());
        assert_eq!(c.input(), "");
    }

    #[test]
    fn unknown_command() {
        let mut c = console();
        type_line(&mut c, "sudo rm -rf /", Instant::now());
        assert_eq!(output(&c)[1], "bash: sudo rm -rf /: command not found");
    }

    #[test]
    fn empty_line_only_echoes() {
        let mut c = console();
        type_line(&mut c, "   ", Instant::now());
        assert_eq!(output(&c), vec!["root@cocobot:~# "]);
    }

    #[test]
    fn hunt_finishes_later() {
        let mut c = console();
        let start = Instant::now();
        type_line(&mut c, "hunt", start);
        assert_eq!(output(&c).len(), 2);
        assert_eq!(c.next_due(), Some(start + HUNT_DELAY));

        assert!(!c.poll(start + Duration::from_millis(1499)));
        assert!(c.poll(start + HUNT_DELAY));
        let out = output(&c);
        assert_eq!(out.len(), 4);
        assert!(out[2].contains("line 42"));
        assert!(out[3].contains("bug_001.txt"));
        assert_eq!(c.next_due(), None);
    }

    #[test]
    fn test_reports_coverage_in_range() {
        let mut c = console();
        let start = Instant::now();
        type_line(&mut c, "test", start);
        c.poll(start + TEST_DELAY);
        let out = output(&c);
        assert_eq!(out.len(), 8);
        let last = out[7];
        let pct: u32 = last
            .trim_start_matches("[##] Coverage: ")
            .trim_end_matches('%')
            .parse()
            .unwrap();
        assert!((85..=97).contains(&pct));
    }

    #[test]
    fn delayed_lines_keep_schedule_order() {
        let mut c = console();
        let start = Instant::now();
        type_line(&mut c, "test", start);
        type_line(&mut c, "hunt", start);
        c.poll(start + TEST_DELAY);
        let out = output(&c);
        // hunt was due first even though it was typed second.
        assert!(out[4].contains("line 42"));
        assert!(out[6].contains("test_login_user"));
    }

    #[test]
    fn meow_asks_for_sound() {
        let mut c = console();
        assert_eq!(type_line(&mut c, "meow", Instant::now()), vec![ConsoleEffect::Meow]);
    }

    #[test]
    fn status_lines() {
        let mut c = console();
        type_line(&mut c, "status", Instant::now());
        let out = output(&c);
        assert_eq!(out.len(), 5);
        let pct: u32 = out[3]
            .trim_start_matches("[##] Memory: ")
            .trim_end_matches("% used")
            .parse()
            .unwrap();
        assert!((40..60).contains(&pct));
    }

    #[test]
    fn clear_keeps_pending_lines() {
        let mut c = console();
        let start = Instant::now();
        type_line(&mut c, "hunt", start);
        type_line(&mut c, "clear", start);
        assert!(output(&c).is_empty());
        c.poll(start + HUNT_DELAY);
        assert_eq!(output(&c).len(), 2);
    }

    #[test]
    fn history_walks_both_ways() {
        let mut c = console();
        let now = Instant::now();
        type_line(&mut c, "help", now);
        type_line(&mut c, "status", now);
        c.history_prev();
        assert_eq!(c.input(), "status");
        c.history_prev();
        assert_eq!(c.input(), "help");
        c.history_prev();
        assert_eq!(c.input(), "help");
        c.history_next();
        assert_eq!(c.input(), "status");
        c.history_next();
        assert_eq!(c.input(), "");
    }

    #[test]
    fn scrollback_is_bounded() {
        let mut c = console();
        for _ in 0..SCROLLBACK {
            type_line(&mut c, "nope", Instant::now());
        }
        assert_eq!(output(&c).len(), SCROLLBACK);
    }

    #[test]
    fn draw_shows_prompt_at_bottom_of_output() {
        let mut c = console();
        type_line(&mut c, "meow", Instant::now());
        c.insert('h');
        let mut canvas = Canvas::new(30, 4);
        let area = canvas.area();
        c.draw(&mut canvas, area, true);
        assert!(canvas.row_text(0).starts_with("root@cocobot:~# meow"));
        assert!(canvas.row_text(2).starts_with("root@cocobot:~# h█"));
    }
}
