use std::cmp::Ordering;

use crate::aggregator;
use crate::fields::{normalize_code, CRORE, LAKH};
use crate::models::{Branch, BranchAccumulator, ConsolidatedRow, Datasets, Metrics};
use crate::resolver::BranchResolver;
use crate::schemes::{classify_sanctions, SchemeCodeTable};

/// Per-run parameters for the branch scorecard.
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// The regional office's own branch code. Its row is listed but never
    /// summed into the totals.
    pub ro_code: String,
    pub ro_name: String,
    pub report_date: String,
    pub region: Option<String>,
}

pub struct Scorecard {
    /// Totals row first, then branches by ascending code.
    pub rows: Vec<ConsolidatedRow>,
}

impl Scorecard {
    pub fn totals(&self) -> Option<&ConsolidatedRow> {
        self.rows.iter().find(|r| r.is_total)
    }

    pub fn branches(&self) -> impl Iterator<Item = &ConsolidatedRow> {
        self.rows.iter().filter(|r| !r.is_total)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Build the scorecard from scratch. Pure: the same inputs always give the
/// same rows, and malformed cells only ever contribute zero.
pub fn build_scorecard(
    branches: &[Branch],
    datasets: &Datasets,
    schemes: &SchemeCodeTable,
    config: &ReportConfig,
) -> Scorecard {
    let mut resolver = BranchResolver::new(branches, config.region.as_deref(), &config.report_date);
    aggregator::aggregate(&mut resolver, datasets);
    log::info!("Consolidating {} branches", resolver.len());
    consolidate(resolver.into_accumulators(), schemes, config)
}

/// Raw-unit metrics for one branch, including the derived columns.
pub fn derive_metrics(acc: &BranchAccumulator, schemes: &SchemeCodeTable) -> Metrics {
    let s = classify_sanctions(&acc.sanction_rows, schemes);
    let casa = acc.savings_bank + acc.current_deposits;
    let total_deposits = acc
        .total_deposits
        .filter(|v| *v != 0.0)
        .unwrap_or(casa + acc.term_deposits);
    let business = acc
        .business
        .filter(|v| *v != 0.0)
        .unwrap_or(total_deposits + acc.advances);
    Metrics {
        sb: acc.savings_bank,
        cd: acc.current_deposits,
        casa,
        td: acc.term_deposits,
        bulk_deposits: acc.bulk_deposits,
        retail_td: acc.term_deposits - acc.bulk_deposits,
        total_deposits,
        advances: acc.advances,
        business,
        core_agri: acc.core_agri_total,
        shg: acc.shg,
        kcc: acc.kcc,
        total_cash: acc.total_cash,
        cash_on_hand: acc.cash_on_hand,
        atm_cash: acc.atm_cash,
        bna_cash: acc.bna_cash,
        cash_with_bc: acc.cash_with_bc,
        slippage: acc.slippage_amount,
        upgradation: acc.upgradation_amount,
        net_slippage: acc.slippage_amount - acc.upgradation_amount,
        recovery: acc.recovery_amount,
        ots: acc.ots_amount,
        core_retail: s.housing + s.vehicle + s.personal + s.mortgage + s.education + s.liquirent + s.other_retail,
        schemes: s,
    }
}

fn code_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

pub fn consolidate(
    accumulators: Vec<BranchAccumulator>,
    schemes: &SchemeCodeTable,
    config: &ReportConfig,
) -> Scorecard {
    let ro_key = normalize_code(&config.ro_code);

    let mut derived: Vec<(BranchAccumulator, Metrics)> = accumulators
        .into_iter()
        .map(|acc| {
            let m = derive_metrics(&acc, schemes);
            (acc, m)
        })
        .collect();
    derived.sort_by(|(a, _), (b, _)| code_order(&a.branch_code, &b.branch_code));

    let mut totals = Metrics::default();
    for (acc, m) in &derived {
        if !ro_key.is_empty() && normalize_code(&acc.branch_code) == ro_key {
            continue;
        }
        totals.add(m);
    }

    let mut rows = Vec::with_capacity(derived.len() + 1);
    rows.push(ConsolidatedRow {
        s_no: 0,
        branch_code: config.ro_code.clone(),
        branch_name: config.ro_name.clone(),
        report_date: config.report_date.clone(),
        is_total: true,
        metrics: totals.scaled(CRORE),
    });
    for (i, (acc, m)) in derived.into_iter().enumerate() {
        rows.push(ConsolidatedRow {
            s_no: i + 1,
            branch_code: acc.branch_code,
            branch_name: acc.display_name,
            report_date: acc.report_date,
            is_total: false,
            metrics: m.scaled(LAKH),
        });
    }
    Scorecard { rows }
}
