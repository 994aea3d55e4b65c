use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// The regions that make up the TUI layout.
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub view_pane: Rect,
    pub input_pane: Rect,
    /// Shared bottom row: command bar when open, otherwise notices.
    pub bottom_bar: Rect,
}

impl AppLayout {
    /// Calculate layout regions from a `Rect` (terminal area).
    ///
    /// `input_height` differs by view: the chat draft is short, the editor
    /// buffer gets more room.
    pub fn compute(area: Rect, input_height: u16, bottom_visible: bool) -> Self {
        let status_height = 1u16;
        let bottom_height = if bottom_visible { 1u16 } else { 0u16 };

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(status_height),
                Constraint::Min(8),
                Constraint::Length(input_height),
                Constraint::Length(bottom_height),
            ])
            .split(area);

        AppLayout {
            status_bar: vertical[0],
            view_pane: vertical[1],
            input_pane: vertical[2],
            bottom_bar: vertical[3],
        }
    }

    /// Convenience wrapper — derive the area from the current frame.
    pub fn new(frame: &Frame, input_height: u16, bottom_visible: bool) -> Self {
        Self::compute(frame.area(), input_height, bottom_visible)
    }

    /// The number of text rows visible inside the view pane's border.
    /// (pane height minus the two border rows)
    pub fn view_inner_height(&self) -> u16 {
        self.view_pane.height.saturating_sub(2)
    }
}
