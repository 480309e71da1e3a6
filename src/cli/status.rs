use comfy_table::{Cell, Table};

use crate::cli::SCHEMES_FILE;
use crate::error::Result;
use crate::importer;
use crate::settings::{load_settings, resolve_data_dir, settings_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let settings = load_settings();
    let dir = resolve_data_dir(data_dir.as_deref());

    let not_set = |s: &str| if s.is_empty() { "(not set)".to_string() } else { s.to_string() };
    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", dir.display());
    println!("RO code:    {}", not_set(&settings.ro_code));
    println!("RO name:    {}", not_set(&settings.ro_name));
    println!("Region:     {}", not_set(&settings.region));

    if !dir.exists() {
        println!();
        println!("Data directory not found. Run `scorecard init` to set up.");
        return Ok(());
    }

    let branches = importer::load_branches(&dir)?;
    println!("Branches:   {}", branches.len());
    let schemes = dir.join(SCHEMES_FILE);
    println!(
        "Schemes:    {}",
        if schemes.exists() { schemes.display().to_string() } else { "(missing)".to_string() }
    );

    let (_, files) = importer::load_datasets(&dir)?;
    let mut table = Table::new();
    table.set_header(vec!["Dataset", "File", "Rows", "SHA-256"]);
    for f in &files {
        let file = f
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "-".to_string());
        let digest = f.checksum.as_deref().map(|c| &c[..12]).unwrap_or("");
        table.add_row(vec![
            Cell::new(f.kind.name()),
            Cell::new(file),
            Cell::new(f.rows),
            Cell::new(digest),
        ]);
    }
    println!();
    println!("{table}");
    Ok(())
}
