use std::collections::VecDeque;

use Direction::*;
use MoveResult::*;

/// A cell on the snake board. Signed so a step past the left or top wall is
/// representable and can be reported as a crash.
pub type GridPos = (i16, i16);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: GridPos, ate: bool, old_tail: Option<GridPos> },
    Crashed,
}

#[derive(Debug, Clone)]
pub struct Snake {
    // Head first.
    body: VecDeque<GridPos>,
    direction: Direction,
    queued: Option<Direction>,
}

impl Snake {
    pub fn new(pos: GridPos, size: i16, direction: Direction) -> Self {
        let diff = direction.delta();

        let body = (0..size.max(1))
            .map(|i| (pos.0 - diff.0 * i, pos.1 - diff.1 * i))
            .collect();
        Snake { body, direction, queued: None }
    }

    pub fn body(&self) -> &VecDeque<GridPos> {
        &self.body
    }

    pub fn head(&self) -> GridPos {
        // The body is never empty: `new` creates at least one segment and
        // `move_step` pushes before it pops.
        self.body[0]
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, pos: GridPos) -> bool {
        self.body.contains(&pos)
    }

    /// Advances one cell inside a `width` x `height` board. Landing on `food`
    /// keeps the tail, so the snake grows by one segment.
    pub fn move_step(&mut self, width: i16, height: i16, food: GridPos) -> MoveResult {
        if let Some(dir) = self.queued.take() {
            self.direction = dir;
        }

        let old_head = self.head();
        let (dx, dy) = self.direction.delta();
        let new_head = (old_head.0 + dx, old_head.1 + dy);

        // The tail still counts: it only moves after the head has.
        if new_head.0 < 0 || new_head.1 < 0 || new_head.0 >= width ||
           new_head.1 >= height || self.occupies(new_head) {
               return Crashed;
           }

        self.body.push_front(new_head);

        if new_head == food {
            Moved { new_head, ate: true, old_tail: None }
        } else {
            let old_tail = self.body.pop_back();
            Moved { new_head, ate: false, old_tail }
        }
    }

    /// Queues a turn for the next step. Only turns perpendicular to the
    /// current heading are taken; a later call before the step replaces an
    /// earlier one, so two quick presses can never reverse the snake.
    pub fn set_direction(&mut self, new_direction: Direction) {
        if new_direction.is_vertical() != self.direction.is_vertical() {
            self.queued = Some(new_direction);
        } else if new_direction == self.direction {
            self.queued = None;
        }
    }

    #[cfg(test)]
    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}
