use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};
use tracing::debug;

use crate::render::{ACCENT, DIM, ERROR, TEXT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardAction {
    Edit,
    Delete,
}

#[derive(Clone, Debug)]
pub struct MenuEntry {
    pub label: &'static str,
    pub action: CardAction,
    pub shortcut: char,
}

pub static CARD_MENU: &[MenuEntry] = &[
    MenuEntry { label: "Edit",   action: CardAction::Edit,   shortcut: 'e' },
    MenuEntry { label: "Delete", action: CardAction::Delete, shortcut: 'd' },
];

pub fn action_for_shortcut(ch: char) -> Option<CardAction> {
    CARD_MENU
        .iter()
        .find(|entry| entry.shortcut == ch.to_ascii_lowercase())
        .map(|entry| entry.action)
}

/// What a card's owner does when the user picks an entry.
///
/// Neither request carries a payload; implementors know which category the
/// card shows.
pub trait CardActions {
    type Error;

    fn request_edit(&mut self) -> Result<(), Self::Error>;
    fn request_delete(&mut self) -> Result<(), Self::Error>;
}

/// Adapts two closures to [`CardActions`].
pub struct Callbacks<E, D> {
    pub on_edit: E,
    pub on_delete: D,
}

impl<E, D, Err> CardActions for Callbacks<E, D>
where
    E: FnMut() -> Result<(), Err>,
    D: FnMut() -> Result<(), Err>,
{
    type Error = Err;

    fn request_edit(&mut self) -> Result<(), Err> {
        (self.on_edit)()
    }

    fn request_delete(&mut self) -> Result<(), Err> {
        (self.on_delete)()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open {
        anchor: Position,
        highlighted: usize,
    },
}

impl MenuState {
    pub fn open(&mut self, anchor: Position) {
        debug!(x = anchor.x, y = anchor.y, "card menu opened");
        *self = MenuState::Open { anchor, highlighted: 0 };
    }

    /// Closes without notifying anyone.
    pub fn dismiss(&mut self) {
        if self.is_open() {
            debug!("card menu dismissed");
        }
        *self = MenuState::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, MenuState::Open { .. })
    }

    pub fn anchor(&self) -> Option<Position> {
        match self {
            MenuState::Open { anchor, .. } => Some(*anchor),
            MenuState::Closed => None,
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        match self {
            MenuState::Open { highlighted, .. } => Some(*highlighted),
            MenuState::Closed => None,
        }
    }

    pub fn highlight_next(&mut self) {
        if let MenuState::Open { highlighted, .. } = self {
            *highlighted = (*highlighted + 1).min(CARD_MENU.len() - 1);
        }
    }

    pub fn highlight_prev(&mut self) {
        if let MenuState::Open { highlighted, .. } = self {
            *highlighted = highlighted.saturating_sub(1);
        }
    }

    /// Forwards `action` to `handler`, then closes.
    ///
    /// A handler error is returned as is and the menu stays open. Selecting
    /// from a closed menu does nothing.
    pub fn select<A: CardActions>(&mut self, action: CardAction, handler: &mut A) -> Result<(), A::Error> {
        if !self.is_open() {
            return Ok(());
        }
        debug!(?action, "card menu entry selected");
        match action {
            CardAction::Edit => handler.request_edit()?,
            CardAction::Delete => handler.request_delete()?,
        }
        *self = MenuState::Closed;
        Ok(())
    }

    pub fn highlighted_action(&self) -> Option<CardAction> {
        self.highlighted().and_then(|idx| CARD_MENU.get(idx)).map(|e| e.action)
    }
}

fn popup_size() -> (u16, u16) {
    let label_w = CARD_MENU.iter().map(|e| e.label.len()).max().unwrap_or(0) as u16;
    (label_w + 4, CARD_MENU.len() as u16 + 2)
}

/// Where the popup for `anchor` lands: just below the anchor, kept inside `bounds`.
/// Flips above the anchor when there is no room below.
pub fn popup_area(anchor: Position, bounds: Rect) -> Rect {
    let (w, h) = popup_size();
    let w = w.min(bounds.width);
    let h = h.min(bounds.height);

    let x = anchor.x.min(bounds.right().saturating_sub(w)).max(bounds.x);
    let below = anchor.y.saturating_add(1);
    let y = if below.saturating_add(h) <= bounds.bottom() {
        below
    } else if anchor.y >= bounds.y + h {
        anchor.y - h
    } else {
        bounds.bottom().saturating_sub(h).max(bounds.y)
    };

    Rect { x, y, width: w, height: h }
}

/// The entry under `pos` for a popup drawn at `area`.
pub fn entry_at(area: Rect, pos: Position) -> Option<CardAction> {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    if !inner.contains(pos) {
        return None;
    }
    CARD_MENU.get((pos.y - inner.y) as usize).map(|e| e.action)
}

/// The Edit/Delete popup. Draw it after the cards so it sits on top.
pub struct ActionMenu {
    highlighted: usize,
}

impl ActionMenu {
    pub fn new(highlighted: usize) -> Self {
        Self { highlighted }
    }
}

impl Widget for ActionMenu {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = CARD_MENU
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let color = match entry.action {
                    CardAction::Delete => ERROR,
                    CardAction::Edit => TEXT,
                };
                let mut style = Style::default().fg(color);
                if i == self.highlighted {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                Line::from(vec![
                    Span::styled(format!(" {:<w$}", entry.label, w = inner.width.saturating_sub(1) as usize), style),
                ])
            })
            .collect();

        Paragraph::new(lines)
            .style(Style::default().fg(DIM))
            .render(inner, buf);
    }
}
