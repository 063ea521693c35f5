use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Clear, Paragraph, Widget},
};

use crate::core::process::ProcessSample;
use crate::core::snapshot::SharedSnapshot;

pub const PANEL_WIDTH: u16 = 36;

pub fn format_entry(sample: &ProcessSample) -> String {
    format!("{}: {:.1}%", sample.name, sample.cpu_usage)
}

/// Floating panel listing the current snapshot. Dragged around with the mouse.
pub struct OverlayWidget {
    snapshot: SharedSnapshot,
    rows: u16,
    position: Position,
    drag_offset: Option<Position>,
}

impl OverlayWidget {
    pub fn new(snapshot: SharedSnapshot, rows: usize) -> Self {
        Self {
            snapshot,
            rows: u16::try_from(rows).unwrap_or(u16::MAX),
            position: Position::new(2, 1),
            drag_offset: None,
        }
    }

    #[cfg(test)]
    pub fn with_position(mut self, x: u16, y: u16) -> Self {
        self.position = Position::new(x, y);
        self
    }

    #[cfg(test)]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Where the panel sits inside `bounds`, kept fully visible.
    pub fn panel_area(&self, bounds: Rect) -> Rect {
        let width = PANEL_WIDTH.min(bounds.width);
        let height = self.rows.saturating_add(2).min(bounds.height);
        let x = self.position.x.min(bounds.width - width);
        let y = self.position.y.min(bounds.height - height);
        Rect::new(bounds.x + x, bounds.y + y, width, height)
    }

    /// Starts a drag if the press landed on the panel.
    pub fn press(&mut self, column: u16, row: u16, bounds: Rect) -> bool {
        let panel = self.panel_area(bounds);
        if !panel.contains(Position::new(column, row)) {
            return false;
        }
        self.drag_offset = Some(Position::new(column - panel.x, row - panel.y));
        true
    }

    /// Moves the panel so the press point stays under the pointer.
    pub fn drag_to(&mut self, column: u16, row: u16, bounds: Rect) {
        let Some(offset) = self.drag_offset else {
            return;
        };
        self.position = Position::new(
            column.saturating_sub(offset.x).saturating_sub(bounds.x),
            row.saturating_sub(offset.y).saturating_sub(bounds.y),
        );
        let panel = self.panel_area(bounds);
        self.position = Position::new(panel.x - bounds.x, panel.y - bounds.y);
    }

    pub fn release(&mut self) {
        self.drag_offset = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }
}

impl Widget for &OverlayWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let panel = self.panel_area(area);
        if panel.is_empty() {
            return;
        }

        let snapshot = self.snapshot.current();
        let lines: Vec<Line> = snapshot
            .iter()
            .map(|sample| Line::from(format_entry(sample)))
            .collect();

        let border_color = if self.is_dragging() {
            Color::Cyan
        } else {
            Color::DarkGray
        };

        let paragraph = Paragraph::new(lines)
            .style(Style::new().fg(Color::White).bg(Color::Black))
            .block(
                Block::bordered()
                    .title(" CPU ")
                    .title_style(Style::new().bold().fg(Color::Cyan))
                    .border_type(BorderType::Rounded)
                    .border_style(Style::new().fg(border_color))
            );

        Clear.render(panel, buf);
        paragraph.render(panel, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::TopKSnapshot;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.x + buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    fn rendered(widget: &OverlayWidget, area: Rect) -> Buffer {
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf
    }

    #[test]
    fn entries_render_one_per_line_top_down() {
        let shared = SharedSnapshot::new();
        shared.publish(TopKSnapshot::new(
            vec![
                ProcessSample::new(40, "chrome.exe", 12.54),
                ProcessSample::new(7, "rustc", 3.0),
            ],
            3,
        ));
        let widget = OverlayWidget::new(shared, 5).with_position(0, 0);

        let buf = rendered(&widget, Rect::new(0, 0, 60, 20));

        assert!(row_text(&buf, 1).contains("chrome.exe: 12.5%"));
        assert!(row_text(&buf, 2).contains("rustc: 3.0%"));
        assert!(!row_text(&buf, 3).contains('%'));
    }

    #[test]
    fn empty_snapshot_draws_only_the_frame() {
        let widget = OverlayWidget::new(SharedSnapshot::new(), 5).with_position(0, 0);
        let buf = rendered(&widget, Rect::new(0, 0, 60, 20));

        assert!(row_text(&buf, 0).contains("CPU"));
        assert!((1..6).all(|y| !row_text(&buf, y).contains('%')));
    }

    #[test]
    fn drag_keeps_the_press_offset() {
        let bounds = Rect::new(0, 0, 80, 24);
        let mut widget = OverlayWidget::new(SharedSnapshot::new(), 5).with_position(2, 3);

        assert!(widget.press(5, 4, bounds));
        widget.drag_to(20, 10, bounds);
        assert_eq!(widget.position(), Position::new(17, 9));

        widget.release();
        widget.drag_to(0, 0, bounds);
        assert_eq!(widget.position(), Position::new(17, 9));
    }

    #[test]
    fn press_outside_the_panel_is_ignored() {
        let bounds = Rect::new(0, 0, 80, 24);
        let mut widget = OverlayWidget::new(SharedSnapshot::new(), 5).with_position(10, 10);

        assert!(!widget.press(0, 0, bounds));
        assert!(!widget.is_dragging());
    }

    #[test]
    fn drag_stays_inside_the_screen() {
        let bounds = Rect::new(0, 0, 80, 24);
        let mut widget = OverlayWidget::new(SharedSnapshot::new(), 5).with_position(0, 0);

        assert!(widget.press(0, 0, bounds));
        widget.drag_to(79, 23, bounds);

        assert_eq!(widget.position(), Position::new(80 - PANEL_WIDTH, 24 - 7));
    }

    #[test]
    fn entry_format_has_one_decimal() {
        let sample = ProcessSample::new(1, "explorer.exe", 7.06);
        assert_eq!(format_entry(&sample), "explorer.exe: 7.1%");
    }
}
