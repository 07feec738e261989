use crossterm::style::Color;

use crate::{Coords, TermInt};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: TermInt,
    pub y: TermInt,
    pub width: TermInt,
    pub height: TermInt,
}

impl Rect {
    pub const fn new(x: TermInt, y: TermInt, width: TermInt, height: TermInt) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> TermInt {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> TermInt {
        self.y.saturating_add(self.height)
    }

    pub fn contains(&self, (x, y): Coords) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Style {
    pub const fn new(fg: Color, bg: Color) -> Self {
        Style { fg, bg, bold: false }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Style::new(Color::Reset, Color::Reset)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell { ch: ' ', style: Style::default() }
    }
}

/// An off-screen frame. Everything is drawn here first; the screen then
/// writes out only the cells that changed since the last frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: TermInt,
    height: TermInt,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: TermInt, height: TermInt) -> Self {
        Canvas { width, height, cells: vec![Cell::default(); width as usize * height as usize] }
    }

    pub fn size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[cfg(test)]
    pub fn get(&self, (x, y): Coords) -> Option<&Cell> {
        if x < self.width && y < self.height {
            self.cells.get(self.width as usize * y as usize + x as usize)
        } else {
            None
        }
    }

    pub fn clear(&mut self, style: Style) {
        self.cells.fill(Cell { ch: ' ', style });
    }

    /// Writes one cell. Points outside the canvas are dropped.
    pub fn put(&mut self, (x, y): Coords, ch: char, style: Style) {
        if x < self.width && y < self.height {
            self.cells[self.width as usize * y as usize + x as usize] = Cell { ch, style };
        }
    }

    /// Prints `text` starting at `pos`, cut off at the right edge of `clip`.
    pub fn print(&mut self, pos: Coords, text: &str, style: Style, clip: Rect) {
        if pos.1 < clip.y || pos.1 >= clip.bottom() {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let x = pos.0 as usize + i;
            if x >= clip.right() as usize {
                break;
            }
            if x >= clip.x as usize {
                self.put((x as TermInt, pos.1), ch, style);
            }
        }
    }

    pub fn fill(&mut self, rect: Rect, ch: char, style: Style) {
        let rect = rect.intersect(&self.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.put((x, y), ch, style);
            }
        }
    }

    pub fn draw_borders(&mut self, rect: Rect, style: Style) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }

        let end_x = rect.right() - 1;
        let end_y = rect.bottom() - 1;

        for x in rect.x..=end_x {
            let ch = if x == rect.x || x == end_x {'+'} else {'-'};
            self.put((x, rect.y), ch, style);
            self.put((x, end_y), ch, style);
        }

        for y in rect.y + 1..end_y {
            self.put((rect.x, y), '|', style);
            self.put((end_x, y), '|', style);
        }
    }

    /// Draws a centered box with one line of text per entry of `lines`,
    /// padded by a blank row above and below.
    pub fn show_message(&mut self, lines: &[&str], area: Rect, style: Style) {
        if lines.is_empty() || area.is_empty() {
            return;
        }

        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let msg_width = ((longest + 4) as TermInt).min(area.width);
        let msg_height = ((lines.len() + 2) as TermInt).min(area.height);
        let top_left = (
            area.x + (area.width - msg_width) / 2,
            area.y + (area.height - msg_height) / 2,
        );
        let msg = Rect::new(top_left.0, top_left.1, msg_width, msg_height);

        self.fill(msg, ' ', style);
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            self.print((top_left.0, y), &padded_line, style, msg);
        }
    }

    /// Cells of `self` that differ from `prev`. A canvas of another size
    /// differs everywhere.
    pub fn diff<'a>(&'a self, prev: &'a Canvas) -> impl Iterator<Item = (Coords, Cell)> + 'a {
        let same_size = self.size() == prev.size();
        let width = self.width as usize;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            if same_size && prev.cells[i] == *cell {
                return None;
            }
            Some((((i % width) as TermInt, (i / width) as TermInt), *cell))
        })
    }

    /// The characters of row `y`, for tests and debugging.
    #[cfg(test)]
    pub fn row_text(&self, y: TermInt) -> String {
        (0..self.width)
            .filter_map(|x| self.get((x, y)).map(|c| c.ch))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_is_clipped() {
        let mut canvas = Canvas::new(10, 3);
        let clip = Rect::new(2, 0, 4, 3);
        canvas.print((0, 1), "abcdefgh", Style::default(), clip);
        assert_eq!(canvas.row_text(1), "  cdef    ");
        canvas.print((3, 5), "zz", Style::default(), clip);
        assert_eq!(canvas.row_text(2), "          ");
    }

    #[test]
    fn borders() {
        let mut canvas = Canvas::new(5, 3);
        canvas.draw_borders(canvas.area(), Style::default());
        assert_eq!(canvas.row_text(0), "+---+");
        assert_eq!(canvas.row_text(1), "|   |");
        assert_eq!(canvas.row_text(2), "+---+");
    }

    #[test]
    fn message_is_centered() {
        let mut canvas = Canvas::new(12, 5);
        canvas.show_message(&["hi"], canvas.area(), Style::default());
        assert_eq!(canvas.row_text(2), "     hi     ");
        assert_eq!(canvas.row_text(0), "            ");
    }

    #[test]
    fn diff_only_reports_changes() {
        let prev = Canvas::new(4, 2);
        let mut next = prev.clone();
        next.put((3, 1), 'x', Style::default());
        let changes: Vec<_> = next.diff(&prev).collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, (3, 1));
        assert_eq!(changes[0].1.ch, 'x');

        let resized = Canvas::new(2, 2);
        assert_eq!(resized.diff(&prev).count(), 4);
    }

    #[test]
    fn rect_helpers() {
        let r = Rect::new(2, 3, 10, 5);
        assert!(r.contains((2, 3)));
        assert!(!r.contains((12, 3)));
        assert_eq!(r.intersect(&Rect::new(0, 0, 4, 4)), Rect::new(2, 3, 2, 1));
    }
}
