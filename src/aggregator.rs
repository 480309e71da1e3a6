use crate::fields::{self, lookup_amount, lookup_explicit, CRORE, LAKH};
use crate::models::{BranchAccumulator, Datasets, Row};
use crate::resolver::BranchResolver;

// ---------------------------------------------------------------------------
// Dataset kinds: enum dispatch, one accumulation rule per upstream file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    KeyParams,
    CoreAgri,
    BulkDeposit,
    Cash,
    Sanctions,
    Downgraded,
    Upgraded,
    Recovery,
    Ots,
}

pub const ALL_DATASETS: &[DatasetKind] = &[
    DatasetKind::KeyParams,
    DatasetKind::CoreAgri,
    DatasetKind::BulkDeposit,
    DatasetKind::Cash,
    DatasetKind::Sanctions,
    DatasetKind::Downgraded,
    DatasetKind::Upgraded,
    DatasetKind::Recovery,
    DatasetKind::Ots,
];

impl DatasetKind {
    /// File stem under `<data_dir>/datasets/`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::KeyParams => "key_params",
            Self::CoreAgri => "core_agri",
            Self::BulkDeposit => "bulk_deposit",
            Self::Cash => "cash",
            Self::Sanctions => "sanctions",
            Self::Downgraded => "downgraded",
            Self::Upgraded => "upgraded",
            Self::Recovery => "recovery",
            Self::Ots => "ots",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::KeyParams => "Key Parameters",
            Self::CoreAgri => "Core Agri",
            Self::BulkDeposit => "Bulk Deposits",
            Self::Cash => "Cash Position",
            Self::Sanctions => "Sanctions",
            Self::Downgraded => "Downgraded Accounts",
            Self::Upgraded => "Upgraded Accounts",
            Self::Recovery => "Recovery",
            Self::Ots => "OTS",
        }
    }

    pub fn rows<'a>(&self, datasets: &'a Datasets) -> &'a [Row] {
        match self {
            Self::KeyParams => &datasets.key_params,
            Self::CoreAgri => &datasets.core_agri,
            Self::BulkDeposit => &datasets.bulk_deposit,
            Self::Cash => &datasets.cash,
            Self::Sanctions => &datasets.sanctions,
            Self::Downgraded => &datasets.downgraded,
            Self::Upgraded => &datasets.upgraded,
            Self::Recovery => &datasets.recovery,
            Self::Ots => &datasets.ots,
        }
    }

    pub fn rows_mut<'a>(&self, datasets: &'a mut Datasets) -> &'a mut Vec<Row> {
        match self {
            Self::KeyParams => &mut datasets.key_params,
            Self::CoreAgri => &mut datasets.core_agri,
            Self::BulkDeposit => &mut datasets.bulk_deposit,
            Self::Cash => &mut datasets.cash,
            Self::Sanctions => &mut datasets.sanctions,
            Self::Downgraded => &mut datasets.downgraded,
            Self::Upgraded => &mut datasets.upgraded,
            Self::Recovery => &mut datasets.recovery,
            Self::Ots => &mut datasets.ots,
        }
    }

    pub fn accumulate(&self, acc: &mut BranchAccumulator, row: &Row) {
        match self {
            Self::KeyParams => accumulate_key_params(acc, row),
            Self::CoreAgri => accumulate_core_agri(acc, row),
            Self::BulkDeposit => acc.bulk_deposits += lookup_amount(row, fields::BULK_BALANCE),
            Self::Cash => accumulate_cash(acc, row),
            Self::Sanctions => acc.sanction_rows.push(row.clone()),
            Self::Downgraded => acc.slippage_amount += lookup_amount(row, fields::CLEAR_BALANCE).abs(),
            Self::Upgraded => acc.upgradation_amount += lookup_amount(row, fields::CLEAR_BALANCE).abs(),
            Self::Recovery => acc.recovery_amount += lookup_amount(row, fields::RECOVERY_AMOUNT),
            Self::Ots => acc.ots_amount += lookup_amount(row, fields::OTS_AMOUNT),
        }
    }
}

fn accumulate_key_params(acc: &mut BranchAccumulator, row: &Row) {
    acc.savings_bank += lookup_amount(row, fields::SAVINGS_BANK) * CRORE;
    acc.current_deposits += lookup_amount(row, fields::CURRENT_DEPOSITS) * CRORE;
    acc.term_deposits += lookup_amount(row, fields::TERM_DEPOSITS) * CRORE;
    acc.advances += lookup_amount(row, fields::ADVANCES) * CRORE;
    // A zero or unparsable override falls back to the derived figure.
    if let Some(dep) = lookup_explicit(row, fields::TOTAL_DEPOSITS).filter(|v| *v != 0.0) {
        *acc.total_deposits.get_or_insert(0.0) += dep * CRORE;
    }
    if let Some(bus) = lookup_explicit(row, fields::BUSINESS).filter(|v| *v != 0.0) {
        *acc.business.get_or_insert(0.0) += bus * CRORE;
    }
}

fn accumulate_core_agri(acc: &mut BranchAccumulator, row: &Row) {
    let amount = (lookup_amount(row, fields::AGRI_AMOUNT) * CRORE).abs();
    acc.core_agri_total += amount;
    let loan_type = fields::lookup_text(row, fields::AGRI_LOAN_TYPE).unwrap_or_default();
    if loan_type.eq_ignore_ascii_case(fields::SHG_LOAN_TYPE) {
        acc.shg += amount;
    } else if loan_type.eq_ignore_ascii_case(fields::KCC_LOAN_TYPE) {
        acc.kcc += amount;
    }
}

fn accumulate_cash(acc: &mut BranchAccumulator, row: &Row) {
    acc.total_cash += lookup_amount(row, fields::TOTAL_CASH) * LAKH;
    acc.cash_on_hand += lookup_amount(row, fields::CASH_ON_HAND) * LAKH;
    acc.atm_cash += lookup_amount(row, fields::ATM_CASH) * LAKH;
    acc.bna_cash += lookup_amount(row, fields::BNA_CASH) * LAKH;
    acc.cash_with_bc += lookup_amount(row, fields::CASH_WITH_BC) * LAKH;
}

/// Walk every dataset into the resolver's accumulators. Rows that cannot be
/// tied to a branch are skipped.
pub fn aggregate(resolver: &mut BranchResolver, datasets: &Datasets) {
    for kind in ALL_DATASETS {
        let rows = kind.rows(datasets);
        let mut dropped = 0usize;
        for row in rows {
            match resolver.resolve_row(row) {
                Some(acc) => kind.accumulate(acc, row),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            log::debug!("{}: {dropped} of {} rows had no resolvable branch", kind.name(), rows.len());
        }
    }
}
