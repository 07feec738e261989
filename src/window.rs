use log::debug;

use crate::canvas::Rect;
use crate::{Coords, TermInt};

pub const MIN_WIDTH: TermInt = 16;
pub const MIN_HEIGHT: TermInt = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WindowId {
    Terminal,
    SnakeGame,
    FileManager,
    QaDashboard,
    Settings,
}

impl WindowId {
    pub const ALL: [WindowId; 5] = [
        WindowId::Terminal,
        WindowId::SnakeGame,
        WindowId::FileManager,
        WindowId::QaDashboard,
        WindowId::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            WindowId::Terminal => "Terminal",
            WindowId::SnakeGame => "Snake",
            WindowId::FileManager => "Files",
            WindowId::QaDashboard => "QA Dashboard",
            WindowId::Settings => "Settings",
        }
    }

    fn index(self) -> usize {
        match self {
            WindowId::Terminal => 0,
            WindowId::SnakeGame => 1,
            WindowId::FileManager => 2,
            WindowId::QaDashboard => 3,
            WindowId::Settings => 4,
        }
    }

    fn default_rect(self) -> Rect {
        match self {
            WindowId::Terminal => Rect::new(2, 1, 60, 18),
            WindowId::SnakeGame => Rect::new(10, 2, 42, 18),
            WindowId::FileManager => Rect::new(6, 3, 40, 14),
            WindowId::QaDashboard => Rect::new(14, 4, 44, 14),
            WindowId::Settings => Rect::new(20, 5, 34, 10),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub id: WindowId,
    pub rect: Rect,
    pub visible: bool,
}

impl Window {
    /// Inside of the frame, below the title bar.
    pub fn content(&self) -> Rect {
        Rect::new(
            self.rect.x + 1,
            self.rect.y + 1,
            self.rect.width.saturating_sub(2),
            self.rect.height.saturating_sub(2),
        )
    }

    pub fn close_button(&self) -> Coords {
        (self.rect.right().saturating_sub(4), self.rect.y)
    }

    pub fn resize_grip(&self) -> Coords {
        (self.rect.right().saturating_sub(1), self.rect.bottom().saturating_sub(1))
    }
}

/// Side effects the rest of the desktop has to carry out after a window
/// operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    SnakeResumed,
    SnakePaused,
    ConsoleFocused,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Hit {
    Close(WindowId),
    TitleBar(WindowId),
    ResizeGrip(WindowId),
    Body(WindowId),
    Background,
}

pub struct WindowManager {
    windows: [Window; 5],
    // Back to front.
    z_order: Vec<WindowId>,
    focused: Option<WindowId>,
    bounds: Rect,
}

impl WindowManager {
    /// Every window exists up front; only the terminal starts open.
    pub fn new(bounds: Rect) -> Self {
        let windows = WindowId::ALL.map(|id| Window {
            id,
            rect: id.default_rect(),
            visible: id == WindowId::Terminal,
        });
        let mut wm = WindowManager {
            windows,
            z_order: WindowId::ALL.iter().rev().copied().collect(),
            focused: Some(WindowId::Terminal),
            bounds,
        };
        wm.set_bounds(bounds);
        wm
    }

    pub fn window(&self, id: WindowId) -> &Window {
        &self.windows[id.index()]
    }

    fn window_mut(&mut self, id: WindowId) -> &mut Window {
        &mut self.windows[id.index()]
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn is_visible(&self, id: WindowId) -> bool {
        self.window(id).visible
    }

    pub fn visible_in_z_order(&self) -> impl Iterator<Item = &Window> {
        self.z_order.iter().map(|id| self.window(*id)).filter(|w| w.visible)
    }

    pub fn open(&mut self, id: WindowId) -> Option<Lifecycle> {
        self.window_mut(id).visible = true;
        self.raise(id);
        debug!("open {:?}", id);

        match id {
            WindowId::SnakeGame => Some(Lifecycle::SnakeResumed),
            WindowId::Terminal => Some(Lifecycle::ConsoleFocused),
            _ => None,
        }
    }

    pub fn close(&mut self, id: WindowId) -> Option<Lifecycle> {
        if !self.is_visible(id) {
            return None;
        }
        self.window_mut(id).visible = false;
        debug!("close {:?}", id);

        if self.focused == Some(id) {
            self.focused = None;
            let next = self.z_order.iter().rev().copied().find(|w| self.is_visible(*w));
            if let Some(next) = next {
                self.raise(next);
            }
        }

        match id {
            WindowId::SnakeGame => Some(Lifecycle::SnakePaused),
            _ => None,
        }
    }

    /// Brings an already open window to the front. Hidden windows are left
    /// alone; use `open` for those.
    pub fn focus(&mut self, id: WindowId) -> Option<Lifecycle> {
        if !self.is_visible(id) {
            return None;
        }
        self.raise(id);
        match id {
            WindowId::Terminal => Some(Lifecycle::ConsoleFocused),
            _ => None,
        }
    }

    /// Focuses the open window after the current one, wrapping around.
    pub fn cycle_focus(&mut self) -> Option<Lifecycle> {
        let open: Vec<WindowId> = WindowId::ALL.iter().copied().filter(|w| self.is_visible(*w)).collect();
        if open.is_empty() {
            return None;
        }
        let next = match self.focused.and_then(|f| open.iter().position(|w| *w == f)) {
            Some(i) => open[(i + 1) % open.len()],
            None => open[0],
        };
        self.focus(next)
    }

    /// A click on the bare desktop hides every window.
    pub fn click_background(&mut self) -> Option<Lifecycle> {
        let snake_was_open = self.is_visible(WindowId::SnakeGame);
        for w in self.windows.iter_mut() {
            w.visible = false;
        }
        self.focused = None;
        debug!("desktop cleared");
        snake_was_open.then_some(Lifecycle::SnakePaused)
    }

    pub fn window_at(&self, pos: Coords) -> Option<WindowId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.window(*id).visible && self.window(*id).rect.contains(pos))
    }

    pub fn hit(&self, pos: Coords) -> Hit {
        let Some(id) = self.window_at(pos) else {
            return Hit::Background;
        };
        let w = self.window(id);
        let close = w.close_button();

        if pos.1 == w.rect.y && pos.0 >= close.0 && pos.0 < close.0 + 3 {
            Hit::Close(id)
        } else if pos.1 == w.rect.y {
            Hit::TitleBar(id)
        } else if pos == w.resize_grip() {
            Hit::ResizeGrip(id)
        } else {
            Hit::Body(id)
        }
    }

    /// Moves a window, keeping it entirely on the desktop.
    pub fn drag_by(&mut self, id: WindowId, dx: i32, dy: i32) {
        let bounds = self.bounds;
        let rect = &mut self.window_mut(id).rect;
        let max_x = bounds.right().saturating_sub(rect.width).max(bounds.x);
        let max_y = bounds.bottom().saturating_sub(rect.height).max(bounds.y);
        rect.x = (rect.x as i32 + dx).clamp(bounds.x as i32, max_x as i32) as TermInt;
        rect.y = (rect.y as i32 + dy).clamp(bounds.y as i32, max_y as i32) as TermInt;
    }

    /// Resizes a window, never below the minimum size nor past the desktop
    /// edge.
    pub fn resize_to(&mut self, id: WindowId, width: TermInt, height: TermInt) {
        let bounds = self.bounds;
        let rect = &mut self.window_mut(id).rect;
        let max_w = bounds.right().saturating_sub(rect.x).max(MIN_WIDTH);
        let max_h = bounds.bottom().saturating_sub(rect.y).max(MIN_HEIGHT);
        rect.width = width.clamp(MIN_WIDTH, max_w);
        rect.height = height.clamp(MIN_HEIGHT, max_h);
    }

    /// Fits every window into new desktop bounds, shrinking the ones that
    /// no longer fit and pulling the rest back on screen.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        for w in self.windows.iter_mut() {
            w.rect.width = w.rect.width.min(bounds.width).max(MIN_WIDTH);
            w.rect.height = w.rect.height.min(bounds.height).max(MIN_HEIGHT);
        }
        for id in WindowId::ALL {
            self.drag_by(id, 0, 0);
        }
    }

    fn raise(&mut self, id: WindowId) {
        self.z_order.retain(|w| *w != id);
        self.z_order.push(id);
        self.focused = Some(id);
    }
}
