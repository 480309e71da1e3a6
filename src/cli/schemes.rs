use comfy_table::{Cell, Table};

use crate::cli::SCHEMES_FILE;
use crate::error::{Result, ScorecardError};
use crate::schemes::{SchemeCategory, SchemeCodeTable, ALL_CATEGORIES};
use crate::settings::resolve_data_dir;

fn parse_category(key: &str) -> Result<SchemeCategory> {
    SchemeCategory::from_key(key).ok_or_else(|| ScorecardError::UnknownCategory(key.to_string()))
}

pub fn list(data_dir: Option<String>) -> Result<()> {
    let path = resolve_data_dir(data_dir.as_deref()).join(SCHEMES_FILE);
    let table = SchemeCodeTable::load(&path)?;

    let mut out = Table::new();
    out.set_header(vec!["Key", "Category", "Sector", "Codes"]);
    for cat in ALL_CATEGORIES {
        let codes = table.codes(*cat);
        out.add_row(vec![
            Cell::new(cat.key()),
            Cell::new(cat.label()),
            Cell::new(format!("{:?}", cat.sector_gate())),
            Cell::new(if codes.is_empty() { "-".to_string() } else { codes.join(", ") }),
        ]);
    }
    println!("{out}");
    Ok(())
}

pub fn add(category: &str, codes: &[String], data_dir: Option<String>) -> Result<()> {
    let cat = parse_category(category)?;
    let path = resolve_data_dir(data_dir.as_deref()).join(SCHEMES_FILE);
    let mut table = SchemeCodeTable::load(&path)?;
    let added = table.add_codes(cat, codes);
    table.save(&path)?;
    println!("Added {added} code(s) to {}.", cat.key());
    Ok(())
}

pub fn remove(category: &str, codes: &[String], data_dir: Option<String>) -> Result<()> {
    let cat = parse_category(category)?;
    let path = resolve_data_dir(data_dir.as_deref()).join(SCHEMES_FILE);
    let mut table = SchemeCodeTable::load(&path)?;
    let removed = table.remove_codes(cat, codes);
    table.save(&path)?;
    println!("Removed {removed} code(s) from {}.", cat.key());
    Ok(())
}
