use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fields::normalize_code;
use crate::importer;
use crate::settings::resolve_data_dir;

pub fn list(region: Option<String>, data_dir: Option<String>) -> Result<()> {
    let dir = resolve_data_dir(data_dir.as_deref());
    let mut branches = importer::load_branches(&dir)?;
    if let Some(r) = region.as_deref().map(normalize_code) {
        branches.retain(|b| normalize_code(&b.region_code) == r);
    }

    if branches.is_empty() {
        println!("No branches found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Code", "Branch", "Region"]);
    for b in &branches {
        table.add_row(vec![
            Cell::new(&b.branch_code),
            Cell::new(&b.branch_name),
            Cell::new(&b.region_code),
        ]);
    }
    println!("{table}\n{} branch(es)", branches.len());
    Ok(())
}
