use serde::{Deserialize, Serialize};

use crate::fields::{self, value_amount};
use crate::schemes::SchemeTotals;

/// One spreadsheet row as ingested: column name to loosely-typed cell.
pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub branch_code: String,
    pub branch_name: String,
    #[serde(default)]
    pub region_code: String,
}

impl Branch {
    /// Build a directory entry from a loosely-typed row. Rows without a
    /// branch code are not directory entries.
    pub fn from_row(row: &Row) -> Option<Branch> {
        let code = fields::lookup_text(row, fields::BRANCH_CODE)?;
        Some(Branch {
            branch_code: code,
            branch_name: fields::lookup_text(row, fields::BRANCH_NAME).unwrap_or_default(),
            region_code: fields::lookup_text(row, fields::REGION_CODE).unwrap_or_default(),
        })
    }
}

/// The nine upstream datasets, already in memory.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub key_params: Vec<Row>,
    pub core_agri: Vec<Row>,
    pub bulk_deposit: Vec<Row>,
    pub cash: Vec<Row>,
    pub sanctions: Vec<Row>,
    pub downgraded: Vec<Row>,
    pub upgraded: Vec<Row>,
    pub recovery: Vec<Row>,
    pub ots: Vec<Row>,
}

/// Running per-branch sums, all in raw rupees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BranchAccumulator {
    pub branch_code: String,
    pub display_name: String,
    pub report_date: String,

    pub savings_bank: f64,
    pub current_deposits: f64,
    pub term_deposits: f64,
    pub bulk_deposits: f64,
    /// Sum of explicit `Deposits` columns; `None` when no row carried one.
    pub total_deposits: Option<f64>,
    pub advances: f64,
    /// Sum of explicit `Business` columns; `None` when no row carried one.
    pub business: Option<f64>,

    pub core_agri_total: f64,
    pub shg: f64,
    pub kcc: f64,

    pub total_cash: f64,
    pub cash_on_hand: f64,
    pub atm_cash: f64,
    pub bna_cash: f64,
    pub cash_with_bc: f64,

    pub slippage_amount: f64,
    pub upgradation_amount: f64,
    pub recovery_amount: f64,
    pub ots_amount: f64,

    pub sanction_rows: Vec<Row>,
}

impl BranchAccumulator {
    pub fn new(branch_code: &str, display_name: &str, report_date: &str) -> Self {
        Self {
            branch_code: branch_code.to_string(),
            display_name: display_name.to_string(),
            report_date: report_date.to_string(),
            ..Default::default()
        }
    }
}

/// Typed view over a sanctions row.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct SanctionRecord {
    pub scheme_code: String,
    pub sector: String,
    pub gl_sub_head: String,
    pub npa_code: String,
    pub amount: f64,
}

impl SanctionRecord {
    pub fn from_row(row: &Row) -> Self {
        Self {
            scheme_code: fields::lookup_text(row, fields::SCHEME_CODE).unwrap_or_default(),
            sector: fields::lookup_text(row, fields::SECTOR)
                .unwrap_or_default()
                .to_uppercase(),
            gl_sub_head: fields::lookup_text(row, fields::GL_SUB_HEAD).unwrap_or_default(),
            npa_code: fields::lookup_text(row, fields::NPA_CODE).unwrap_or_default(),
            amount: fields::lookup(row, fields::SANCTION_AMOUNT)
                .map(value_amount)
                .unwrap_or(0.0)
                .abs(),
        }
    }
}

/// Every numeric column of the scorecard. Raw rupees while consolidating,
/// lakhs or crores once scaled for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub sb: f64,
    pub cd: f64,
    pub casa: f64,
    pub td: f64,
    pub bulk_deposits: f64,
    pub retail_td: f64,
    pub total_deposits: f64,
    pub advances: f64,
    pub business: f64,
    pub core_agri: f64,
    pub shg: f64,
    pub kcc: f64,
    pub total_cash: f64,
    pub cash_on_hand: f64,
    pub atm_cash: f64,
    pub bna_cash: f64,
    pub cash_with_bc: f64,
    pub slippage: f64,
    pub upgradation: f64,
    pub net_slippage: f64,
    pub recovery: f64,
    pub ots: f64,
    pub core_retail: f64,
    pub schemes: SchemeTotals,
}

pub const METRIC_COUNT: usize = 23;

impl Metrics {
    fn own_values_mut(&mut self) -> [&mut f64; METRIC_COUNT] {
        [
            &mut self.sb,
            &mut self.cd,
            &mut self.casa,
            &mut self.td,
            &mut self.bulk_deposits,
            &mut self.retail_td,
            &mut self.total_deposits,
            &mut self.advances,
            &mut self.business,
            &mut self.core_agri,
            &mut self.shg,
            &mut self.kcc,
            &mut self.total_cash,
            &mut self.cash_on_hand,
            &mut self.atm_cash,
            &mut self.bna_cash,
            &mut self.cash_with_bc,
            &mut self.slippage,
            &mut self.upgradation,
            &mut self.net_slippage,
            &mut self.recovery,
            &mut self.ots,
            &mut self.core_retail,
        ]
    }

    fn own_values(&self) -> [f64; METRIC_COUNT] {
        let mut copy = *self;
        copy.own_values_mut().map(|v| *v)
    }

    pub fn add(&mut self, other: &Metrics) {
        for (mine, theirs) in self.own_values_mut().into_iter().zip(other.own_values()) {
            *mine += theirs;
        }
        self.schemes.add(&other.schemes);
    }

    pub fn scaled(&self, divisor: f64) -> Metrics {
        let mut out = *self;
        for v in out.own_values_mut() {
            *v /= divisor;
        }
        out.schemes = self.schemes.scaled(divisor);
        out
    }
}

/// One line of the finished scorecard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedRow {
    /// 0 for the totals row, 1-based for branches.
    pub s_no: usize,
    pub branch_code: String,
    pub branch_name: String,
    pub report_date: String,
    pub is_total: bool,
    pub metrics: Metrics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_branch_from_row() {
        let b = Branch::from_row(&row(json!({
            "Branch Code": "0174", "Branch Name": "Theni", "Region Code": "R1"
        })))
        .unwrap();
        assert_eq!(b.branch_code, "0174");
        assert_eq!(b.branch_name, "Theni");
        assert_eq!(b.region_code, "R1");
        assert!(Branch::from_row(&row(json!({"Branch Name": "Nowhere"}))).is_none());
    }

    #[test]
    fn test_sanction_record_takes_absolute_amount() {
        let r = SanctionRecord::from_row(&row(json!({
            "Scheme Code": "HL01", "Sector": "retail", "Sanction Amount": "-2,500"
        })));
        assert_eq!(r.scheme_code, "HL01");
        assert_eq!(r.sector, "RETAIL");
        assert_eq!(r.amount, 2500.0);
    }

    #[test]
    fn test_sanction_record_amount_falls_through_empty_fields() {
        let r = SanctionRecord::from_row(&row(json!({
            "Sanction Amount": "", "Limit": 400
        })));
        assert_eq!(r.amount, 400.0);
    }

    #[test]
    fn test_metrics_add_and_scale() {
        let mut a = Metrics { sb: 100.0, ots: 50.0, ..Default::default() };
        a.schemes.housing = 10.0;
        let b = Metrics { sb: 300.0, ..Default::default() };
        a.add(&b);
        assert_eq!(a.sb, 400.0);
        let s = a.scaled(100.0);
        assert_eq!(s.sb, 4.0);
        assert_eq!(s.ots, 0.5);
        assert_eq!(s.schemes.housing, 0.1);
        assert_eq!(a.sb, 400.0);
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let mut m = Metrics { retail_td: 1.0, ..Default::default() };
        m.schemes.core_msme = 2.0;
        let row = ConsolidatedRow {
            s_no: 0,
            branch_code: "4000".into(),
            branch_name: "RO".into(),
            report_date: "d".into(),
            is_total: true,
            metrics: m,
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["sNo"], 0);
        assert_eq!(v["isTotal"], true);
        assert_eq!(v["metrics"]["retailTd"], 1.0);
        assert_eq!(v["metrics"]["schemes"]["coreMsme"], 2.0);
        assert!(v["metrics"].get("retail_td").is_none());
    }
}
