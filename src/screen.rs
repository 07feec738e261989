use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, event, execute, queue, style, terminal};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::style::{Attribute, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use log::{debug, warn};

use crate::canvas::{Canvas, Style};
use crate::error::Result;
use crate::{Coords, TermInt};

/// Owns the terminal while the desktop runs. Frames are drawn into a
/// `Canvas` and only the cells that changed are written out.
pub struct Screen<W: Write = Stdout> {
    out: W,
    size: Coords,
    // What the terminal currently shows. Empty until the first frame.
    front: Canvas,
    active: bool,
}

impl Screen<Stdout> {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Screen::with_writer(stdout(), (width, height)))
    }
}

impl<W: Write> Screen<W> {
    pub fn with_writer(out: W, size: Coords) -> Self {
        Screen { out, size, front: Canvas::new(0, 0), active: false }
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen, EnableMouseCapture)?;
        self.active = true;
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            cursor::Hide,
            cursor::DisableBlinking,
            terminal::Clear(ClearType::All)
        )?;
        debug!("terminal set up, {:?}", self.size);
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        // Fine if raw mode never got switched on.
        let raw = terminal::disable_raw_mode();
        execute!(
            self.out,
            style::ResetColor,
            cursor::Show,
            cursor::EnableBlinking,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        raw?;
        debug!("terminal restored");
        Ok(())
    }

    pub fn size(&self) -> Coords {
        self.size
    }

    /// Forgets what is on screen so the next `present` repaints everything.
    pub fn resize(&mut self, width: TermInt, height: TermInt) -> Result<()> {
        self.size = (width, height);
        self.front = Canvas::new(0, 0);
        queue!(self.out, style::ResetColor, terminal::Clear(ClearType::All))?;
        Ok(())
    }

    /// Writes the cells of `frame` that differ from the previous frame.
    pub fn present(&mut self, frame: &Canvas) -> Result<()> {
        let mut last_style: Option<Style> = None;
        let mut cursor_at: Option<Coords> = None;

        for ((x, y), cell) in frame.diff(&self.front) {
            if cursor_at != Some((x, y)) {
                queue!(self.out, cursor::MoveTo(x, y))?;
            }
            if last_style != Some(cell.style) {
                let attr = if cell.style.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                queue!(
                    self.out,
                    SetAttribute(attr),
                    SetForegroundColor(cell.style.fg),
                    SetBackgroundColor(cell.style.bg)
                )?;
                last_style = Some(cell.style);
            }
            queue!(self.out, style::Print(cell.ch))?;
            cursor_at = Some((x + 1, y));
        }

        self.out.flush()?;
        self.front = frame.clone();
        Ok(())
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("could not restore the terminal: {}", e);
        }
    }
}

/// Everything the terminal has queued up, waiting at most `timeout` for
/// the first event.
pub fn read_events(timeout: Duration) -> Result<Vec<Event>> {
    let mut events = vec![];

    if !event::poll(timeout)? {
        return Ok(events);
    }
    events.push(event::read()?);

    while event::poll(Duration::ZERO)? {
        events.push(event::read()?);
    }

    Ok(events)
}
