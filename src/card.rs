use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget},
};
use serde::{Deserialize, Serialize};

use crate::menu::MenuState;
use crate::money::format_money;
use crate::render::{ACCENT, DIM, ERROR, TEXT, TRACK};

/// Rows a card occupies, borders included.
pub const CARD_HEIGHT: u16 = 6;

const TRIGGER_SYMBOL: &str = "⋮";
const TRIGGER_W: u16 = 3;
const BAR_FILLED: &str = "█";
const BAR_EMPTY: &str = "░";

/// One budget category as handed to a card by its caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryDisplay {
    #[serde(rename = "name")]
    pub category_name: String,
    pub total: f64,
    pub spent: f64,
    #[serde(default = "default_time_frame")]
    pub time_frame: String,
}

fn default_time_frame() -> String {
    "Monthly".to_string()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Status {
    Left(f64),
    Exceeded(f64),
}

impl Status {
    pub fn text(&self) -> String {
        match self {
            Status::Left(amount) => format!("{} Left", format_money(*amount)),
            Status::Exceeded(amount) => format!("Limit Exceeded by {}", format_money(*amount)),
        }
    }

    pub fn is_exceeded(&self) -> bool {
        matches!(self, Status::Exceeded(_))
    }
}

impl CategoryDisplay {
    pub fn new(
        category_name: impl Into<String>,
        total: f64,
        spent: f64,
        time_frame: impl Into<String>,
    ) -> Self {
        Self {
            category_name: category_name.into(),
            total,
            spent,
            time_frame: time_frame.into(),
        }
    }

    pub fn remaining(&self) -> f64 {
        self.total - self.spent
    }

    /// Spend relative to `total`, unclamped. Zero when there is no budget.
    pub fn percentage(&self) -> f64 {
        if self.total > 0.0 {
            self.spent / self.total * 100.0
        } else {
            0.0
        }
    }

    /// The percentage the bar shows: `percentage` clamped to `0..=100`.
    pub fn fill_percentage(&self) -> f64 {
        let pct = self.percentage();
        if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) }
    }

    pub fn is_over_limit(&self) -> bool {
        self.percentage() > 100.0
    }

    pub fn status(&self) -> Status {
        let remaining = self.remaining();
        if remaining < 0.0 {
            Status::Exceeded(remaining.abs())
        } else {
            Status::Left(remaining)
        }
    }

    pub fn spent_of_total(&self) -> String {
        format!("{} of {}", format_money(self.spent), format_money(self.total))
    }
}

/// Number of filled bar cells for a track of `width` cells.
pub fn bar_cells(width: u16, fill_percentage: f64) -> u16 {
    let cells = (width as f64 * fill_percentage / 100.0).round();
    (cells.max(0.0) as u16).min(width)
}

/// Per-instance card state: the action menu plus hit areas from the last render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardState {
    pub menu: MenuState,
    pub area: Rect,
    pub trigger: Rect,
}

impl CardState {
    /// Screen position the action menu attaches to.
    pub fn trigger_anchor(&self) -> Position {
        Position::new(self.trigger.x + self.trigger.width / 2, self.trigger.y)
    }
}

/// Read-only summary of one category. Never mutates what it is given.
pub struct CategoryCard<'a> {
    display: &'a CategoryDisplay,
    selected: bool,
}

impl<'a> CategoryCard<'a> {
    pub fn new(display: &'a CategoryDisplay) -> Self {
        Self { display, selected: false }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl StatefulWidget for CategoryCard<'_> {
    type State = CardState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut CardState) {
        let display = self.display;
        let border_color = if self.selected { ACCENT } else { DIM };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        block.render(area, buf);

        state.area = area;
        state.trigger = Rect::default();
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        // Heading row: name on the left, menu trigger on the right.
        let trigger_w = TRIGGER_W.min(inner.width);
        let heading = Rect { height: 1, width: inner.width - trigger_w, ..inner };
        Paragraph::new(Line::from(Span::styled(
            display.category_name.as_str(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )))
        .render(heading, buf);

        state.trigger = Rect {
            x: heading.right(),
            y: inner.y,
            width: trigger_w,
            height: 1,
        };
        let trigger_style = if state.menu.is_open() {
            Style::default().fg(ACCENT).add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(TEXT)
        };
        Paragraph::new(Line::from(Span::styled(TRIGGER_SYMBOL, trigger_style)))
            .alignment(Alignment::Center)
            .render(state.trigger, buf);

        if inner.height > 1 {
            let row = Rect { y: inner.y + 1, height: 1, ..inner };
            Paragraph::new(Span::styled(display.time_frame.as_str(), Style::default().fg(DIM)))
                .render(row, buf);
        }

        if inner.height > 2 {
            let row = Rect { y: inner.y + 2, height: 1, ..inner };
            Paragraph::new(Span::styled(display.spent_of_total(), Style::default().fg(DIM)))
                .render(row, buf);

            let status = display.status();
            let color = if status.is_exceeded() { ERROR } else { ACCENT };
            Paragraph::new(Span::styled(
                status.text(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Right)
            .render(row, buf);
        }

        if inner.height > 3 {
            let row = Rect { y: inner.y + 3, height: 1, ..inner };
            let filled = bar_cells(row.width, display.fill_percentage());
            let fill_color = if display.is_over_limit() { ERROR } else { ACCENT };
            let line = Line::from(vec![
                Span::styled(BAR_FILLED.repeat(filled as usize), Style::default().fg(fill_color)),
                Span::styled(
                    BAR_EMPTY.repeat((row.width - filled) as usize),
                    Style::default().fg(TRACK),
                ),
            ]);
            Paragraph::new(line).render(row, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ratatui::style::Color;

    const WIDTH: u16 = 42;

    fn render_card(display: &CategoryDisplay) -> (Buffer, CardState) {
        let area = Rect::new(0, 0, WIDTH, CARD_HEIGHT);
        let mut buf = Buffer::empty(area);
        let mut state = CardState::default();
        CategoryCard::new(display).render(area, &mut buf, &mut state);
        (buf, state)
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn bar_row(buf: &Buffer) -> (usize, Option<Color>) {
        let y = CARD_HEIGHT - 2;
        let filled: Vec<u16> = (1..WIDTH - 1).filter(|&x| buf[(x, y)].symbol() == BAR_FILLED).collect();
        let color = filled.first().map(|&x| buf[(x, y)].fg);
        (filled.len(), color)
    }

    fn status_color(buf: &Buffer, text: &str) -> Color {
        let row = row_text(buf, 3);
        let start = row.find(text).expect("status text rendered");
        let x = row[..start].chars().count() as u16;
        buf[(x, 3)].fg
    }

    #[test]
    fn groceries_scenario() {
        let display = CategoryDisplay::new("Groceries", 500.0, 350.0, "Monthly");
        assert_eq!(display.percentage(), 70.0);
        assert_eq!(display.spent_of_total(), "$350 of $500");
        assert_eq!(display.status().text(), "$150 Left");

        let (buf, _) = render_card(&display);
        assert!(row_text(&buf, 1).contains("Groceries"));
        assert!(row_text(&buf, 2).contains("Monthly"));
        assert!(row_text(&buf, 3).contains("$350 of $500"));
        assert!(row_text(&buf, 3).contains("$150 Left"));
        assert_eq!(status_color(&buf, "$150 Left"), ACCENT);

        let (filled, color) = bar_row(&buf);
        assert_eq!(filled, bar_cells(WIDTH - 2, 70.0) as usize);
        assert_eq!(filled, 28);
        assert_eq!(color, Some(ACCENT));
    }

    #[test]
    fn rent_scenario_clamps_bar_and_uses_error_style() {
        let display = CategoryDisplay::new("Rent", 1000.0, 1200.0, "Monthly");
        assert_eq!(display.percentage(), 120.0);
        assert_eq!(display.fill_percentage(), 100.0);
        assert!(display.is_over_limit());
        assert_eq!(display.remaining(), -200.0);

        let (buf, _) = render_card(&display);
        assert!(row_text(&buf, 3).contains("$1,200 of $1,000"));
        assert!(row_text(&buf, 3).contains("Limit Exceeded by $200"));
        assert_eq!(status_color(&buf, "Limit Exceeded by $200"), ERROR);

        let (filled, color) = bar_row(&buf);
        assert_eq!(filled, (WIDTH - 2) as usize);
        assert_eq!(color, Some(ERROR));
    }

    #[test]
    fn misc_scenario_with_zero_total() {
        let display = CategoryDisplay::new("Misc", 0.0, 0.0, "Weekly");
        assert_eq!(display.percentage(), 0.0);

        let (buf, _) = render_card(&display);
        assert!(row_text(&buf, 2).contains("Weekly"));
        assert!(row_text(&buf, 3).contains("$0 of $0"));
        assert!(row_text(&buf, 3).contains("$0 Left"));
        assert_eq!(bar_row(&buf).0, 0);
    }

    #[test]
    fn zero_total_with_spend_reports_no_progress() {
        let display = CategoryDisplay::new("Gifts", 0.0, 40.0, "Yearly");
        assert_eq!(display.percentage(), 0.0);
        assert!(!display.is_over_limit());
        assert_eq!(display.status().text(), "Limit Exceeded by $40");
        let (buf, _) = render_card(&display);
        assert_eq!(bar_row(&buf).0, 0);
    }

    #[test]
    fn exactly_on_budget_is_not_exceeded() {
        let display = CategoryDisplay::new("Fuel", 200.0, 200.0, "Monthly");
        assert_eq!(display.status(), Status::Left(0.0));
        assert_eq!(display.status().text(), "$0 Left");
        assert!(!display.is_over_limit());
    }

    #[test]
    fn render_records_trigger_on_heading_row() {
        let display = CategoryDisplay::new("Groceries", 500.0, 350.0, "Monthly");
        let (buf, state) = render_card(&display);
        assert_eq!(state.area, Rect::new(0, 0, WIDTH, CARD_HEIGHT));
        assert_eq!(state.trigger, Rect::new(WIDTH - 1 - TRIGGER_W, 1, TRIGGER_W, 1));
        assert!(row_text(&buf, 1).contains(TRIGGER_SYMBOL));
        assert_eq!(state.trigger_anchor(), Position::new(WIDTH - 1 - TRIGGER_W + 1, 1));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let display = CategoryDisplay::new("Rent", 1000.0, 1200.0, "Monthly");
        for (w, h) in [(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (10, 5)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            let mut state = CardState::default();
            CategoryCard::new(&display).render(area, &mut buf, &mut state);
        }
    }

    #[test]
    fn bar_cells_rounds_and_clamps() {
        assert_eq!(bar_cells(40, 0.0), 0);
        assert_eq!(bar_cells(40, 50.0), 20);
        assert_eq!(bar_cells(40, 100.0), 40);
        assert_eq!(bar_cells(40, 250.0), 40);
        assert_eq!(bar_cells(0, 70.0), 0);
    }

    proptest! {
        #[test]
        fn percentage_matches_ratio(total in 0.01f64..1e9, spent in 0.0f64..1e9) {
            let display = CategoryDisplay::new("Any", total, spent, "Monthly");
            prop_assert_eq!(display.percentage(), spent / total * 100.0);
            prop_assert_eq!(display.fill_percentage(), display.percentage().min(100.0));
        }

        #[test]
        fn zero_total_is_always_zero_percent(spent in -1e9f64..1e9) {
            let display = CategoryDisplay::new("Any", 0.0, spent, "Monthly");
            prop_assert_eq!(display.percentage(), 0.0);
            prop_assert_eq!(display.fill_percentage(), 0.0);
        }

        #[test]
        fn overspend_reports_exceeded_magnitude(total in 0.0f64..1e6, extra in 0.01f64..1e6) {
            let display = CategoryDisplay::new("Any", total, total + extra, "Monthly");
            prop_assert!(display.remaining() < 0.0);
            prop_assert_eq!(display.status(), Status::Exceeded((total - (total + extra)).abs()));
            prop_assert!(display.status().text().starts_with("Limit Exceeded by $"));
        }

        #[test]
        fn within_budget_reports_left(total in 0.0f64..1e6, frac in 0.0f64..=1.0) {
            let display = CategoryDisplay::new("Any", total, total * frac, "Monthly");
            prop_assert!(display.status().text().ends_with(" Left"));
            prop_assert!(!display.status().is_exceeded());
        }
    }
}
