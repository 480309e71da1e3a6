use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::SCHEMES_FILE;
use crate::error::Result;
use crate::fmt::{figure, unit_label};
use crate::importer;
use crate::models::{ConsolidatedRow, Metrics};
use crate::reports::{self, ReportConfig, Scorecard};
use crate::schemes::{SchemeCodeTable, ALL_CATEGORIES};
use crate::settings::{load_settings, resolve_data_dir};

pub fn run(
    date: Option<String>,
    region: Option<String>,
    data_dir: Option<String>,
    export: Option<Option<String>>,
    json: bool,
) -> Result<()> {
    let settings = load_settings();
    let dir = resolve_data_dir(data_dir.as_deref());

    let branches = importer::load_branches(&dir)?;
    let (datasets, _) = importer::load_datasets(&dir)?;
    let schemes = SchemeCodeTable::load(&dir.join(SCHEMES_FILE))?;

    let config = ReportConfig {
        ro_code: settings.ro_code.clone(),
        ro_name: settings.ro_name.clone(),
        report_date: date.unwrap_or_else(|| chrono::Local::now().format("%d-%m-%Y").to_string()),
        region: region.or_else(|| settings.region_filter().map(str::to_string)),
    };
    let card = reports::build_scorecard(&branches, &datasets, &schemes, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&card.rows)?);
    } else {
        println!("{}", format_scorecard(&card));
    }

    if let Some(path) = export {
        let path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| default_export_path(&dir, &config.report_date));
        write_csv(&card, &path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn default_export_path(dir: &Path, report_date: &str) -> PathBuf {
    let stamp: String = report_date
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    dir.join("exports").join(format!("scorecard-{stamp}.csv"))
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Columns shown in the terminal table.
fn summary_columns(m: &Metrics) -> Vec<(&'static str, f64)> {
    vec![
        ("SB", m.sb),
        ("CD", m.cd),
        ("CASA", m.casa),
        ("TD", m.td),
        ("RTD", m.retail_td),
        ("Deposits", m.total_deposits),
        ("Advances", m.advances),
        ("Business", m.business),
        ("Core Agri", m.core_agri),
        ("Core Retail", m.core_retail),
        ("Core MSME", m.schemes.core_msme),
        ("Net Slip", m.net_slippage),
        ("Recovery", m.recovery),
        ("OTS", m.ots),
    ]
}

/// Every numeric column, in export order.
pub fn all_columns(m: &Metrics) -> Vec<(&'static str, f64)> {
    let mut cols = vec![
        ("SB", m.sb),
        ("CD", m.cd),
        ("CASA", m.casa),
        ("TD", m.td),
        ("Bulk Deposits", m.bulk_deposits),
        ("RTD", m.retail_td),
        ("Total Deposits", m.total_deposits),
        ("Advances", m.advances),
        ("Business", m.business),
        ("Core Agri", m.core_agri),
        ("SHG", m.shg),
        ("KCC", m.kcc),
        ("Total Cash", m.total_cash),
        ("Cash on Hand", m.cash_on_hand),
        ("ATM Cash", m.atm_cash),
        ("BNA Cash", m.bna_cash),
        ("Cash with BC", m.cash_with_bc),
        ("Slippage", m.slippage),
        ("Upgradation", m.upgradation),
        ("Net Slippage", m.net_slippage),
        ("Recovery", m.recovery),
        ("OTS", m.ots),
        ("Core Retail", m.core_retail),
    ];
    for cat in ALL_CATEGORIES {
        cols.push((cat.label(), m.schemes.get(*cat)));
    }
    cols.push(("Core MSME", m.schemes.core_msme));
    cols
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn figure_cell(val: f64, is_total: bool) -> Cell {
    let s = figure(val);
    match (val < 0.0, is_total) {
        (true, true) => Cell::new(s.red().bold()),
        (true, false) => Cell::new(s.red()),
        (false, true) => Cell::new(s.bold()),
        (false, false) => Cell::new(s),
    }
}

fn label_cell(row: &ConsolidatedRow) -> Cell {
    if row.is_total {
        Cell::new(format!("{} ({})", row.branch_name, unit_label(true)).bold())
    } else {
        Cell::new(&row.branch_name)
    }
}

pub fn format_scorecard(card: &Scorecard) -> String {
    let mut table = Table::new();
    let mut header = vec!["S.No".to_string(), "SOL".to_string(), "Branch".to_string()];
    header.extend(summary_columns(&Metrics::default()).into_iter().map(|(n, _)| n.to_string()));
    table.set_header(header);

    for row in &card.rows {
        let mut cells = vec![
            Cell::new(row.s_no),
            Cell::new(&row.branch_code),
            label_cell(row),
        ];
        cells.extend(
            summary_columns(&row.metrics)
                .into_iter()
                .map(|(_, v)| figure_cell(v, row.is_total)),
        );
        table.add_row(cells);
    }

    let date = card.totals().map(|r| r.report_date.as_str()).unwrap_or("");
    format!(
        "Branch Scorecard as on {date}  (totals in crores, branches in lakhs)\n{table}\n{} branch(es)",
        card.branches().count()
    )
}

pub fn write_csv(card: &Scorecard, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![
        "S.No".to_string(),
        "Branch Code".to_string(),
        "Branch Name".to_string(),
        "Report Date".to_string(),
        "Unit".to_string(),
    ];
    header.extend(all_columns(&Metrics::default()).into_iter().map(|(n, _)| n.to_string()));
    wtr.write_record(&header)?;

    for row in &card.rows {
        let mut record = vec![
            row.s_no.to_string(),
            row.branch_code.clone(),
            row.branch_name.clone(),
            row.report_date.clone(),
            if row.is_total { "crores" } else { "lakhs" }.to_string(),
        ];
        record.extend(all_columns(&row.metrics).into_iter().map(|(_, v)| format!("{v:.2}")));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
