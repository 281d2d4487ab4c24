use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, FormField};
use crate::card::{CategoryCard, CARD_HEIGHT};
use crate::menu::{self, ActionMenu};

// ── Colors ─────────────────────────────────────────────────────────────────

pub(crate) const ACCENT: Color = Color::Rgb(55, 81, 61);
pub(crate) const ERROR: Color = Color::Rgb(211, 47, 47);
pub(crate) const TRACK: Color = Color::Rgb(217, 217, 217);
pub(crate) const DIM: Color = Color::Rgb(120, 120, 120);
pub(crate) const TEXT: Color = Color::Rgb(230, 230, 230);
const HIGHLIGHT: Color = Color::Rgb(158, 206, 106);

// ── Layout constants ────────────────────────────────────────────────────────

const CTRL_HEIGHT: u16 = 3;
const FORM_W: u16 = 48;
const FORM_LABEL_W: usize = 12;

// ── Main render entry point ─────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let size = f.area();
    app.area = size;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(CTRL_HEIGHT)])
        .split(size);

    render_cards_panel(f, app, chunks[0]);
    render_controls_panel(f, app, chunks[1]);

    // Overlays
    if let Some(index) = app.open_menu() {
        render_menu_overlay(f, app, index);
    }
    if app.focus == Focus::Edit {
        render_edit_form_overlay(f, app);
    }
}

// ── Cards ─────────────────────────────────────────────────────────────────────

fn render_cards_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM))
        .title(Span::styled("Budget", Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Cards not drawn this frame keep no hit areas.
    for card in &mut app.cards {
        card.area = Rect::default();
        card.trigger = Rect::default();
    }

    if app.categories.is_empty() {
        let p = Paragraph::new(Span::styled(
            "No categories yet. Press n to add one.",
            Style::default().fg(DIM),
        ));
        f.render_widget(p, inner);
        return;
    }

    let visible = (inner.height / CARD_HEIGHT).max(1) as usize;
    app.ensure_visible(visible);

    let end = (app.scroll + visible).min(app.categories.len());
    for (slot, index) in (app.scroll..end).enumerate() {
        let y = inner.y + slot as u16 * CARD_HEIGHT;
        let height = CARD_HEIGHT.min(inner.bottom().saturating_sub(y));
        if height == 0 {
            break;
        }
        let rect = Rect { y, height, ..inner };
        let card = CategoryCard::new(&app.categories[index]).selected(index == app.selected);
        f.render_stateful_widget(card, rect, &mut app.cards[index]);
    }
}

// ── Controls ──────────────────────────────────────────────────────────────────

fn render_controls_panel(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.focus {
        Focus::Cards => "↑↓ Select  m/Enter Menu  n New  Ctrl+S Save  q Quit",
        Focus::Menu => "↑↓ Move  Enter Select  e Edit  d Delete  Esc Close",
        Focus::Edit => "Tab Next field  Enter Save  Esc Cancel",
    };

    let mut spans = vec![Span::styled(hints, Style::default().fg(TEXT))];
    if !app.status_msg.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            app.status_msg.as_str(),
            Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM));
    let p = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn render_menu_overlay(f: &mut Frame, app: &App, index: usize) {
    let menu_state = &app.cards[index].menu;
    let (Some(anchor), Some(highlighted)) = (menu_state.anchor(), menu_state.highlighted()) else {
        return;
    };
    let area = menu::popup_area(anchor, f.area());
    f.render_widget(ActionMenu::new(highlighted), area);
}

fn render_edit_form_overlay(f: &mut Frame, app: &App) {
    let Some(form) = &app.form else {
        return;
    };
    let size = f.area();
    let w = FORM_W.min(size.width);
    let h = (FormField::ALL.len() as u16 + 4).min(size.height);
    let area = Rect {
        x: size.x + (size.width - w) / 2,
        y: size.y + (size.height - h) / 2,
        width: w,
        height: h,
    };
    f.render_widget(Clear, area);

    let title = if form.target.is_some() { "Edit Category" } else { "New Category" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(HIGHLIGHT))
        .title(Span::styled(title, Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)));

    let mut lines: Vec<Line> = Vec::new();
    for field in FormField::ALL {
        let active = field == form.field;
        let label_style = if active {
            Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DIM)
        };
        let cursor = if active { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<w$}", field.label(), w = FORM_LABEL_W), label_style),
            Span::styled(format!("{}{cursor}", form.value(field)), Style::default().fg(TEXT)),
        ]));
    }
    lines.push(Line::raw(""));
    if !app.status_msg.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" {}", app.status_msg),
            Style::default().fg(ERROR),
        )));
    }

    let p = Paragraph::new(Text::from(lines)).block(block);
    f.render_widget(p, area);
}
