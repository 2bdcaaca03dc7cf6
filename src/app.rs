//! Application state management for the imgdock viewer
//!
//! This module contains the main application state: the list of images and
//! where each one resolved to, keyboard and mouse handling, and the floating
//! dock panel's drag state.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use std::time::Duration;

use crate::cache::{CacheStats, LOCAL_SCHEME};
use crate::dock::{Bounds, DockAlignment, FloatingDock, Margins, Point, Size};
use crate::loader::LoadMessage;

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Initial batch of URLs is still resolving
    Loading,
    /// Every URL has been resolved at least once
    Browsing,
}

/// Where an image will be loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Not resolved yet
    Pending,
    /// Served from the local cache file at this path
    Cached(String),
    /// Not cacheable or download failed; loaded from the original URL
    Remote,
}

/// One image in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub url: String,
    pub status: EntryStatus,
}

impl ImageEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: EntryStatus::Pending,
        }
    }

    /// The string a renderer would load: local path or the original URL
    pub fn source(&self) -> &str {
        match &self.status {
            EntryStatus::Cached(path) => path,
            EntryStatus::Pending | EntryStatus::Remote => &self.url,
        }
    }
}

/// Work the main loop should hand to the background loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Resolve the entry at this index again
    Reload(usize),
    /// Delete every cached file
    ClearCache,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Images being shown
    pub entries: Vec<ImageEntry>,
    /// Index of currently selected entry
    pub selected_index: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Whether the floating dock panel is visible
    pub show_dock: bool,
    /// Floating dock panel geometry
    pub dock: FloatingDock,
    /// Latest cache statistics
    pub stats: Option<CacheStats>,
    /// Transient message shown in the footer
    pub status_message: Option<String>,
    /// When the initial batch finished resolving
    pub last_refresh: Option<DateTime<Local>>,
    /// Host whitelist substring, shown in the dock
    pub allowed_host: String,
    /// Mouse position where the current dock drag started
    drag_origin: Option<Point>,
    /// Actions waiting for the main loop
    actions: Vec<AppAction>,
}

/// Margin between the dock panel and the screen edge, in cells
const DOCK_MARGIN: f64 = 1.0;

impl App {
    /// Creates a new App showing `urls`
    pub fn new(urls: Vec<String>, allowed_host: impl Into<String>) -> Self {
        Self {
            state: AppState::Loading,
            entries: urls.into_iter().map(ImageEntry::new).collect(),
            selected_index: 0,
            should_quit: false,
            show_help: false,
            show_dock: true,
            dock: FloatingDock::new(
                Bounds::screen(80.0, 24.0),
                DockAlignment::BottomEnd,
                Margins::uniform(DOCK_MARGIN),
            ),
            stats: None,
            status_message: None,
            last_refresh: None,
            allowed_host: allowed_host.into(),
            drag_origin: None,
            actions: Vec::new(),
        }
    }

    /// Returns the currently selected entry, if any
    pub fn selected_entry(&self) -> Option<&ImageEntry> {
        self.entries.get(self.selected_index)
    }

    /// Counts entries as (cached, remote, pending)
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.entries
            .iter()
            .fold((0, 0, 0), |(cached, remote, pending), entry| match entry.status {
                EntryStatus::Cached(_) => (cached + 1, remote, pending),
                EntryStatus::Remote => (cached, remote + 1, pending),
                EntryStatus::Pending => (cached, remote, pending + 1),
            })
    }

    /// Drains queued actions for the main loop
    pub fn take_actions(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.actions)
    }

    /// Whether the user is currently dragging the dock
    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Applies the frame size and the dock content size before drawing.
    ///
    /// The dock is placed the first time its size becomes known.
    pub fn layout(&mut self, width: u16, height: u16, dock_size: Size) {
        let bounds = Bounds::screen(f64::from(width), f64::from(height));
        if self.dock.bounds() != bounds {
            self.dock.set_bounds(bounds);
        }
        if self.dock.size() != Some(dock_size) {
            self.dock.measure(dock_size);
        }
    }

    /// Advances animations by `dt`
    pub fn tick(&mut self, dt: Duration) {
        self.dock.advance(dt);
    }

    /// Applies a result from the background loader
    pub fn apply(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::Resolved { index, source } => {
                if let Some(entry) = self.entries.get_mut(index) {
                    entry.status = status_for(&source);
                }
            }
            LoadMessage::Completed => {
                self.state = AppState::Browsing;
                self.last_refresh = Some(Local::now());
            }
            LoadMessage::Cleared(Ok(removed)) => {
                self.status_message = Some(format!("Removed {} cached files", removed));
                // Cached paths no longer exist; resolve them again
                for (index, entry) in self.entries.iter_mut().enumerate() {
                    if matches!(entry.status, EntryStatus::Cached(_)) {
                        entry.status = EntryStatus::Pending;
                        self.actions.push(AppAction::Reload(index));
                    }
                }
            }
            LoadMessage::Cleared(Err(e)) => {
                self.status_message = Some(format!("Clear failed: {}", e));
            }
            LoadMessage::Stats(stats) => {
                self.stats = Some(stats);
            }
        }
    }

    /// Handles keyboard input based on current state
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit (Esc closes the help overlay first)
    /// - `Up`/`k`, `Down`/`j`: Move selection, wrapping around
    /// - `g`/`G`: Jump to first/last entry
    /// - `r`: Resolve the selected image again
    /// - `c`: Clear the cache folder
    /// - `d`: Toggle the dock panel
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
            }
            KeyCode::Char('g') => {
                self.selected_index = 0;
            }
            KeyCode::Char('G') => {
                self.selected_index = self.entries.len().saturating_sub(1);
            }
            KeyCode::Char('r') => {
                if let Some(entry) = self.entries.get_mut(self.selected_index) {
                    entry.status = EntryStatus::Pending;
                    self.actions.push(AppAction::Reload(self.selected_index));
                }
            }
            KeyCode::Char('c') => {
                self.status_message = Some("Clearing cache...".to_string());
                self.actions.push(AppAction::ClearCache);
            }
            KeyCode::Char('d') => {
                self.show_dock = !self.show_dock;
                self.drag_origin = None;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Handles mouse input: left-button drags move the dock panel
    pub fn handle_mouse(&mut self, mouse_event: MouseEvent) {
        if !self.show_dock || self.show_help {
            return;
        }

        let point = Point::new(f64::from(mouse_event.column), f64::from(mouse_event.row));

        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.dock.contains(point) {
                    self.drag_origin = Some(point);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(origin) = self.drag_origin {
                    self.dock.drag_update(point - origin);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag_origin.take().is_some() {
                    self.dock.drag_end();
                }
            }
            _ => {}
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.entries.len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.entries.len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}

fn status_for(source: &str) -> EntryStatus {
    match source.strip_prefix(LOCAL_SCHEME) {
        Some(path) => EntryStatus::Cached(path.to_string()),
        None => EntryStatus::Remote,
    }
}
