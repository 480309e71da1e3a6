use std::path::PathBuf;

use crate::cli::SCHEMES_FILE;
use crate::error::Result;
use crate::importer::DATASETS_DIR;
use crate::schemes::SchemeCodeTable;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(
    data_dir: Option<String>,
    ro_code: Option<String>,
    ro_name: Option<String>,
    region: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    if let Some(code) = ro_code {
        settings.ro_code = code.trim().to_string();
    }
    if let Some(name) = ro_name {
        settings.ro_name = name.trim().to_string();
    }
    if let Some(r) = region {
        settings.region = r.trim().to_string();
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(resolved.join(DATASETS_DIR))?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let schemes_path = resolved.join(SCHEMES_FILE);
    if !schemes_path.exists() {
        SchemeCodeTable::with_all_categories().save(&schemes_path)?;
    }

    println!("Initialized scorecard at {}", resolved.display());
    if settings.ro_code.is_empty() {
        println!("No RO code set; every branch row will count toward the totals. Use --ro-code to set one.");
    }
    Ok(())
}
