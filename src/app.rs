use std::cell::Cell;
use std::path::PathBuf;

use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

use crate::card::{CardState, CategoryDisplay};
use crate::config;
use crate::error::{AppError, Result};
use crate::menu::{self, CardAction, Callbacks};
use crate::money::{format_amount_exact, parse_amount};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Cards,
    Menu,
    Edit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    Name,
    Total,
    Spent,
    TimeFrame,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Total,
        FormField::Spent,
        FormField::TimeFrame,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Total => "Total",
            FormField::Spent => "Spent",
            FormField::TimeFrame => "Time frame",
        }
    }

    fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Total,
            FormField::Total => FormField::Spent,
            FormField::Spent => FormField::TimeFrame,
            FormField::TimeFrame => FormField::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::TimeFrame,
            FormField::Total => FormField::Name,
            FormField::Spent => FormField::Total,
            FormField::TimeFrame => FormField::Spent,
        }
    }

    fn is_amount(self) -> bool {
        matches!(self, FormField::Total | FormField::Spent)
    }
}

/// Text-entry form for creating or editing a category.
#[derive(Clone, Debug, PartialEq)]
pub struct EditForm {
    /// Index being edited; `None` creates a new category.
    pub target: Option<usize>,
    pub name: String,
    pub total: String,
    pub spent: String,
    pub time_frame: String,
    pub field: FormField,
}

impl EditForm {
    pub fn for_category(index: usize, category: &CategoryDisplay) -> Self {
        Self {
            target: Some(index),
            name: category.category_name.clone(),
            total: format_amount_exact(category.total),
            spent: format_amount_exact(category.spent),
            time_frame: category.time_frame.clone(),
            field: FormField::Name,
        }
    }

    pub fn new_category() -> Self {
        Self {
            target: None,
            name: String::new(),
            total: String::new(),
            spent: "0".to_string(),
            time_frame: "Monthly".to_string(),
            field: FormField::Name,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Total => &self.total,
            FormField::Spent => &self.spent,
            FormField::TimeFrame => &self.time_frame,
        }
    }

    fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Total => &mut self.total,
            FormField::Spent => &mut self.spent,
            FormField::TimeFrame => &mut self.time_frame,
        }
    }

    pub fn next_field(&mut self) {
        self.field = self.field.next();
    }

    pub fn prev_field(&mut self) {
        self.field = self.field.prev();
    }

    pub fn handle_char_input(&mut self, ch: char) {
        if self.field.is_amount() && !matches!(ch, '0'..='9' | '.' | ',' | '$' | '-') {
            return;
        }
        let field = self.field;
        self.value_mut(field).push(ch);
    }

    pub fn backspace(&mut self) {
        let field = self.field;
        self.value_mut(field).pop();
    }

    /// Validates the form into a category.
    pub fn to_category(&self) -> Result<CategoryDisplay> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::EmptyName);
        }
        let total = parse_form_amount("total", &self.total)?;
        let spent = parse_form_amount("spent", &self.spent)?;
        Ok(CategoryDisplay::new(name, total, spent, self.time_frame.trim()))
    }
}

fn parse_form_amount(field: &'static str, input: &str) -> Result<f64> {
    match parse_amount(input) {
        Some(val) if val >= 0.0 => Ok(val),
        _ => Err(AppError::InvalidAmount {
            field,
            input: input.to_string(),
        }),
    }
}

/// Menu callbacks for the category at `index`. Each one checks the index and
/// records what was asked for; `App` applies it once the menu has closed.
pub fn category_callbacks<'a>(
    categories: &'a [CategoryDisplay],
    index: usize,
    requested: &'a Cell<Option<CardAction>>,
) -> Callbacks<impl FnMut() -> Result<()> + 'a, impl FnMut() -> Result<()> + 'a> {
    let request = move |action: CardAction| -> Result<()> {
        let category = categories.get(index).ok_or(AppError::UnknownCategory(index))?;
        info!(name = %category.category_name, ?action, "card action requested");
        requested.set(Some(action));
        Ok(())
    };
    Callbacks {
        on_edit: move || request(CardAction::Edit),
        on_delete: move || request(CardAction::Delete),
    }
}

pub struct App {
    pub categories: Vec<CategoryDisplay>,
    pub cards: Vec<CardState>,
    pub selected: usize,
    pub scroll: usize,
    pub focus: Focus,
    pub form: Option<EditForm>,
    pub status_msg: String,
    pub budget_path: PathBuf,
    pub area: Rect,
}

impl App {
    pub fn new(categories: Vec<CategoryDisplay>, budget_path: PathBuf) -> Self {
        let cards = vec![CardState::default(); categories.len()];
        App {
            categories,
            cards,
            selected: 0,
            scroll: 0,
            focus: Focus::Cards,
            form: None,
            status_msg: String::new(),
            budget_path,
            area: Rect::new(0, 0, 80, 24),
        }
    }

    /// Index of the card whose menu is open.
    pub fn open_menu(&self) -> Option<usize> {
        self.cards.iter().position(|c| c.menu.is_open())
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.categories.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keeps the selected card within a window of `visible` cards.
    pub fn ensure_visible(&mut self, visible: usize) {
        let visible = visible.max(1);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + visible {
            self.scroll = self.selected + 1 - visible;
        }
    }

    pub fn open_card_menu(&mut self, index: usize, anchor: Position) {
        if index >= self.cards.len() {
            return;
        }
        for card in &mut self.cards {
            card.menu.dismiss();
        }
        self.selected = index;
        self.cards[index].menu.open(anchor);
        self.focus = Focus::Menu;
    }

    /// Opens the selected card's menu at its trigger.
    pub fn open_selected_menu(&mut self) {
        if let Some(card) = self.cards.get(self.selected) {
            let anchor = card.trigger_anchor();
            self.open_card_menu(self.selected, anchor);
        }
    }

    pub fn dismiss_menu(&mut self) {
        for card in &mut self.cards {
            card.menu.dismiss();
        }
        self.focus = Focus::Cards;
    }

    pub fn menu_highlight_next(&mut self) {
        if let Some(idx) = self.open_menu() {
            self.cards[idx].menu.highlight_next();
        }
    }

    pub fn menu_highlight_prev(&mut self) {
        if let Some(idx) = self.open_menu() {
            self.cards[idx].menu.highlight_prev();
        }
    }

    /// Forwards `action` from the open menu to the category it belongs to.
    pub fn select_action(&mut self, action: CardAction) -> Result<()> {
        let Some(index) = self.open_menu() else {
            return Ok(());
        };
        let requested = Cell::new(None);
        {
            let mut callbacks = category_callbacks(&self.categories, index, &requested);
            self.cards[index].menu.select(action, &mut callbacks)?;
        }
        if let Some(action) = requested.get() {
            self.apply_action(action, index);
        }
        Ok(())
    }

    pub fn select_highlighted(&mut self) -> Result<()> {
        let Some(index) = self.open_menu() else {
            return Ok(());
        };
        match self.cards[index].menu.highlighted_action() {
            Some(action) => self.select_action(action),
            None => Ok(()),
        }
    }

    fn apply_action(&mut self, action: CardAction, index: usize) {
        match action {
            CardAction::Edit => {
                if let Some(category) = self.categories.get(index) {
                    self.form = Some(EditForm::for_category(index, category));
                }
            }
            CardAction::Delete => {
                if index < self.categories.len() {
                    let removed = self.categories.remove(index);
                    self.cards.remove(index);
                    info!(name = %removed.category_name, "category deleted");
                    if self.selected >= self.categories.len() {
                        self.selected = self.categories.len().saturating_sub(1);
                    }
                    self.status_msg = "Category deleted".to_string();
                }
            }
        }
        self.focus = if self.form.is_some() { Focus::Edit } else { Focus::Cards };
    }

    /// Mouse click at `pos`. An open menu swallows the click.
    pub fn handle_click(&mut self, pos: Position) -> Result<()> {
        if let Some(index) = self.open_menu() {
            let hit = self.cards[index]
                .menu
                .anchor()
                .map(|anchor| menu::popup_area(anchor, self.area))
                .and_then(|area| menu::entry_at(area, pos));
            return match hit {
                Some(action) => self.select_action(action),
                None => {
                    self.dismiss_menu();
                    Ok(())
                }
            };
        }

        if self.focus != Focus::Cards {
            return Ok(());
        }

        if let Some(index) = self.cards.iter().position(|c| c.trigger.contains(pos)) {
            let anchor = self.cards[index].trigger_anchor();
            self.open_card_menu(index, anchor);
        } else if let Some(index) = self.cards.iter().position(|c| c.area.contains(pos)) {
            self.selected = index;
        }
        Ok(())
    }

    pub fn begin_new_category(&mut self) {
        self.dismiss_menu();
        self.form = Some(EditForm::new_category());
        self.focus = Focus::Edit;
    }

    pub fn cancel_form(&mut self) {
        if self.form.take().is_some() {
            debug!("edit form cancelled");
        }
        self.focus = Focus::Cards;
    }

    /// Validates the form and writes it back. On error the form stays open.
    pub fn submit_form(&mut self) -> Result<()> {
        let Some(form) = &self.form else {
            return Ok(());
        };
        let category = form.to_category()?;
        let status = match form.target {
            Some(index) => {
                let slot = self
                    .categories
                    .get_mut(index)
                    .ok_or(AppError::UnknownCategory(index))?;
                info!(name = %category.category_name, "category updated");
                *slot = category;
                self.selected = index;
                "Category updated"
            }
            None => {
                info!(name = %category.category_name, "category created");
                self.categories.push(category);
                self.cards.push(CardState::default());
                self.selected = self.categories.len() - 1;
                "Category added"
            }
        };
        self.form = None;
        self.focus = Focus::Cards;
        // Not on disk until Ctrl+S.
        self.status_msg = status.to_string();
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        config::save(&self.budget_path, &self.categories)
    }
}
