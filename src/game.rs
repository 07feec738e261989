use crossterm::style::Color;
use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::canvas::{Canvas, Rect, Style};
use crate::snake::{Direction, GridPos, MoveResult, Snake};
use crate::TermInt;

const POINTS_PER_MOUSE: u32 = 10;

const BOARD_BG: Color = Color::Rgb { r: 0x1a, g: 0x1a, b: 0x2e };
const GRID_FG: Color = Color::Rgb { r: 0x3a, g: 0x3a, b: 0x4e };
const SNAKE_GOLD: Color = Color::Rgb { r: 0xd4, g: 0xaf, b: 0x37 };
const MOUSE_RED: Color = Color::Rgb { r: 0xe7, g: 0x4c, b: 0x3c };
const DEAD_GRAY: Color = Color::Rgb { r: 0x70, g: 0x70, b: 0x70 };

const SNAKE_BODY: &str = "██";
const MOUSE: &str = "~@";
const DEAD_SNAKE: &str = "XX";
const GRID_DOT: &str = " ·";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Running,
    Paused,
    Over { won: bool },
}

#[derive(Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A mouse was caught; the desktop answers with a meow.
    Ate,
    Over { score: u32, mice: u32, won: bool },
}

pub struct SnakeGame {
    width: i16,
    height: i16,
    snake: Snake,
    food: GridPos,
    score: u32,
    mice_eaten: u32,
    state: GameState,
    rng: StdRng,
}

impl SnakeGame {
    /// A paused game on a `width` x `height` board. It starts moving once
    /// the snake window is opened.
    pub fn new((width, height): (TermInt, TermInt), seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (width, height) = (width as i16, height as i16);
        let start = start_pos(width, height);

        SnakeGame {
            width,
            height,
            snake: Snake::new(start, 1, Direction::Right),
            food: first_food(width, start),
            score: 0,
            mice_eaten: 0,
            state: GameState::Paused,
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn mice_eaten(&self) -> u32 {
        self.mice_eaten
    }

    #[cfg(test)]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    #[cfg(test)]
    pub fn food(&self) -> GridPos {
        self.food
    }

    /// Terminal columns and rows the board needs, status line included.
    pub fn board_size(&self) -> (TermInt, TermInt) {
        (self.width as TermInt * 2, self.height as TermInt + 1)
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Running {
            debug!("snake paused at score {}", self.score);
            self.state = GameState::Paused;
        }
    }

    /// Resumes a paused game. A finished game stays finished until
    /// `restart`.
    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            debug!("snake resumed");
            self.state = GameState::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Running => self.pause(),
            GameState::Paused => self.resume(),
            GameState::Over { .. } => {}
        }
    }

    pub fn steer(&mut self, dir: Direction) {
        if self.state == GameState::Running {
            self.snake.set_direction(dir);
        }
    }

    /// Back to a single segment at the start cell, score zeroed, running.
    pub fn restart(&mut self) {
        let start = start_pos(self.width, self.height);
        self.snake = Snake::new(start, 1, Direction::Right);
        self.score = 0;
        self.mice_eaten = 0;
        self.food = self.spawn_food().unwrap_or_else(|| first_food(self.width, start));
        self.state = GameState::Running;
        info!("snake restarted");
    }

    /// One fixed-interval update. Does nothing unless the game is running.
    pub fn tick(&mut self) -> Option<GameEvent> {
        if self.state != GameState::Running {
            return None;
        }

        match self.snake.move_step(self.width, self.height, self.food) {
            MoveResult::Crashed => Some(self.game_over(false)),
            MoveResult::Moved { ate: false, .. } => None,
            MoveResult::Moved { ate: true, .. } => {
                self.score += POINTS_PER_MOUSE;
                self.mice_eaten += 1;
                debug!("mouse caught, score {}", self.score);

                match self.spawn_food() {
                    Some(food) => {
                        self.food = food;
                        Some(GameEvent::Ate)
                    }
                    // No free cell left for another mouse.
                    None => Some(self.game_over(true)),
                }
            }
        }
    }

    fn game_over(&mut self, won: bool) -> GameEvent {
        self.state = GameState::Over { won };
        info!(
            "snake game over (won: {}), score {}, mice {}",
            won, self.score, self.mice_eaten
        );
        GameEvent::Over { score: self.score, mice: self.mice_eaten, won }
    }

    fn spawn_food(&mut self) -> Option<GridPos> {
        let choices: Vec<GridPos> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|pos| !self.snake.occupies(*pos))
            .collect();
        choices.choose(&mut self.rng).copied()
    }

    pub fn draw(&self, canvas: &mut Canvas, area: Rect) {
        let board = Style::new(GRID_FG, BOARD_BG);
        canvas.fill(area, ' ', board);

        for y in 0..self.height {
            for x in 0..self.width {
                self.draw_cell(canvas, area, (x, y), GRID_DOT, board);
            }
        }

        self.draw_cell(canvas, area, self.food, MOUSE, Style::new(MOUSE_RED, BOARD_BG).bold());

        let dead = matches!(self.state, GameState::Over { won: false });
        for (i, pos) in self.snake.body().iter().enumerate() {
            if dead {
                self.draw_cell(canvas, area, *pos, DEAD_SNAKE, Style::new(DEAD_GRAY, BOARD_BG));
            } else if i == 0 {
                let head: String = [self.snake.head_char(); 2].iter().collect();
                self.draw_cell(canvas, area, *pos, &head, Style::new(Color::White, SNAKE_GOLD).bold());
            } else {
                self.draw_cell(canvas, area, *pos, SNAKE_BODY, Style::new(SNAKE_GOLD, BOARD_BG));
            }
        }

        let status = format!(" Score: {}   Mice: {}", self.score(), self.mice_eaten());
        let status_y = area.y + self.height as TermInt;
        canvas.print((area.x, status_y), &status, Style::new(Color::White, BOARD_BG).bold(), area);

        let overlay = Style::new(Color::Black, SNAKE_GOLD);
        match self.state {
            GameState::Running => {}
            GameState::Paused => canvas.show_message(
                &["Paused", "Arrows or WASD to move", "P to resume"],
                area,
                overlay,
            ),
            GameState::Over { won } => {
                let title = if won { "You won!" } else { "GAME OVER!" };
                let score = format!("Final score: {}", self.score());
                let mice = format!("Mice eaten: {}", self.mice_eaten());
                canvas.show_message(
                    &[title, "", &score, &mice, "", "Press any key to play again"],
                    area,
                    overlay,
                );
            }
        }
    }

    fn draw_cell(&self, canvas: &mut Canvas, area: Rect, (x, y): GridPos, glyph: &str, style: Style) {
        let pos = (area.x + x as TermInt * 2, area.y + y as TermInt);
        canvas.print(pos, glyph, style, area);
    }
}

fn start_pos(width: i16, height: i16) -> GridPos {
    (width / 2, height * 2 / 3)
}

fn first_food(width: i16, start: GridPos) -> GridPos {
    (width * 3 / 4, start.1)
}
