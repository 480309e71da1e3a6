//! Field-name candidates for the loosely-typed spreadsheet rows, and the
//! parse-or-default helpers every dataset rule reads through.
//!
//! Each logical attribute owns an ordered list of the column spellings seen
//! across source files. Supporting a new export format means appending a
//! spelling here, not adding a branch somewhere in the aggregator.

use serde_json::Value;

use crate::models::Row;

pub const CRORE: f64 = 10_000_000.0;
pub const LAKH: f64 = 100_000.0;

// ---------------------------------------------------------------------------
// Candidate lists
// ---------------------------------------------------------------------------

pub const BRANCH_CODE: &[&str] = &["Branch Code", "SOL", "SOL ID", "SOL_ID", "Br Code", "sol", "Code"];
pub const BRANCH_NAME: &[&str] = &["Branch Name", "BRANCH NAME", "Branch", "SOL Name", "Name"];
pub const REGION_CODE: &[&str] = &["Region Code", "REGION CODE", "Region", "RO Code"];

// key params (crores)
pub const SAVINGS_BANK: &[&str] = &["Savings Bank", "SB", "Savings"];
pub const CURRENT_DEPOSITS: &[&str] = &["Current Deposits", "CD", "Current"];
pub const TERM_DEPOSITS: &[&str] = &["Term Deposits", "TD", "Term Deposit"];
pub const ADVANCES: &[&str] = &["Advances", "Total Advances", "ADV"];
pub const TOTAL_DEPOSITS: &[&str] = &["Deposits", "Total Deposits"];
pub const BUSINESS: &[&str] = &["Business", "Total Business"];

// bulk deposits (raw)
pub const BULK_BALANCE: &[&str] = &["BALANCE", "Balance", "Amount"];

// core agri (crores)
pub const AGRI_LOAN_TYPE: &[&str] = &["Loan Type", "LOAN TYPE", "Type"];
pub const AGRI_AMOUNT: &[&str] = &["Amount", "Balance", "Outstanding", "Total"];
pub const SHG_LOAN_TYPE: &str = "B.SHG LOANS";
pub const KCC_LOAN_TYPE: &str = "A.KCC-CROP LOANS";

// cash (lakhs)
pub const TOTAL_CASH: &[&str] = &["Total Cash", "TOTAL CASH", "Total"];
pub const CASH_ON_HAND: &[&str] = &["Cash on Hand", "Cash In Hand", "CASH ON HAND"];
pub const ATM_CASH: &[&str] = &["ATM Cash", "ATM", "ATM CASH"];
pub const BNA_CASH: &[&str] = &["BNA Cash", "BNA", "BNA CASH"];
pub const CASH_WITH_BC: &[&str] = &["Cash with BC", "BC Cash", "CASH WITH BC"];

// sanctions
pub const SCHEME_CODE: &[&str] = &["Scheme Code", "SCHM_CODE", "Schm Code", "Product Code"];
pub const SECTOR: &[&str] = &["Sector", "SECTOR", "Sector Code"];
pub const GL_SUB_HEAD: &[&str] = &["GL Sub Head Code", "GL_SUB_HEAD_CODE", "GL Code"];
pub const NPA_CODE: &[&str] = &["NPA Code", "NPA_CODE", "Asset Class"];
pub const SANCTION_AMOUNT: &[&str] = &["Sanction Amount", "Sanctioned Amount", "SANCT_LIM", "Limit", "Amount"];

// asset quality (raw)
pub const CLEAR_BALANCE: &[&str] = &["Clear Balance", "CLR_BAL_AMT", "Clear Bal"];
pub const RECOVERY_AMOUNT: &[&str] = &["Amount", "Recovery Amount"];
pub const OTS_AMOUNT: &[&str] = &["Amount", "OTS Amount"];

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// First candidate present in the row with a non-empty value.
pub fn lookup<'a>(row: &'a Row, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|name| row.get(*name))
        .find(|v| !is_blank(v))
}

/// Text form of the first non-empty candidate, trimmed.
pub fn lookup_text(row: &Row, candidates: &[&str]) -> Option<String> {
    lookup(row, candidates).map(value_text)
}

/// Numeric form of the first non-empty candidate; 0.0 when absent or unparsable.
pub fn lookup_amount(row: &Row, candidates: &[&str]) -> f64 {
    lookup(row, candidates).map(value_amount).unwrap_or(0.0)
}

/// Like `lookup_amount`, but distinguishes a missing column from a zero.
pub fn lookup_explicit(row: &Row, candidates: &[&str]) -> Option<f64> {
    lookup(row, candidates).map(value_amount)
}

pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        // 174.0 from a float-typed column is the same code as 174
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

pub fn value_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_amount(s),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    }
}

/// Parse a spreadsheet figure. Never fails: anything unparsable is 0.0.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw
        .replace(',', "")
        .replace('"', "")
        .replace('\u{20b9}', "")
        .replace("Rs.", "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -parse_finite(inner.trim());
    }
    parse_finite(s)
}

fn parse_finite(s: &str) -> f64 {
    s.parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// Canonical branch key: trimmed, leading zeros stripped. An all-zero code
/// keeps a single "0".
pub fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() && !trimmed.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}
