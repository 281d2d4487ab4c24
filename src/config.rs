use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::card::CategoryDisplay;
use crate::error::Result;

/// On-disk layout of a budget file: a list of `[[category]]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BudgetFile {
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryDisplay>,
}

/// Reads categories from `path`. A missing file yields `None`.
pub fn load(path: &Path) -> Result<Option<Vec<CategoryDisplay>>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let file: BudgetFile = toml::from_str(&text)?;
    info!(path = %path.display(), count = file.categories.len(), "loaded budget file");
    Ok(Some(file.categories))
}

pub fn save(path: &Path, categories: &[CategoryDisplay]) -> Result<()> {
    let file = BudgetFile {
        categories: categories.to_vec(),
    };
    let text = toml::to_string_pretty(&file)?;
    std::fs::write(path, text)?;
    info!(path = %path.display(), count = categories.len(), "saved budget file");
    Ok(())
}

pub fn demo_categories() -> Vec<CategoryDisplay> {
    vec![
        CategoryDisplay::new("Groceries", 500.0, 350.0, "Monthly"),
        CategoryDisplay::new("Rent", 1000.0, 1200.0, "Monthly"),
        CategoryDisplay::new("Misc", 0.0, 0.0, "Weekly"),
    ]
}
