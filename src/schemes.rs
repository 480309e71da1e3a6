use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorecardError};
use crate::models::{Row, SanctionRecord};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorGate {
    Any,
    Agri,
    Retail,
    Sme,
}

impl SectorGate {
    pub fn admits(&self, sector: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Agri => sector == "AGRI",
            Self::Retail => sector == "RETAIL",
            Self::Sme => matches!(sector, "SME" | "SME_NP" | "MSME"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemeCategory {
    Mudra,
    Housing,
    Vehicle,
    AgriJl,
    RetailJl,
    Jewel,
    Personal,
    Mortgage,
    Education,
    Liquirent,
    OtherRetail,
    TotalRetail,
    JlLoans,
    GovSchemes,
    OtherSchematic,
    Npa,
    TotalSme,
    Shg,
    Kcc,
}

pub const ALL_CATEGORIES: &[SchemeCategory] = &[
    SchemeCategory::Mudra,
    SchemeCategory::Housing,
    SchemeCategory::Vehicle,
    SchemeCategory::AgriJl,
    SchemeCategory::RetailJl,
    SchemeCategory::Jewel,
    SchemeCategory::Personal,
    SchemeCategory::Mortgage,
    SchemeCategory::Education,
    SchemeCategory::Liquirent,
    SchemeCategory::OtherRetail,
    SchemeCategory::TotalRetail,
    SchemeCategory::JlLoans,
    SchemeCategory::GovSchemes,
    SchemeCategory::OtherSchematic,
    SchemeCategory::Npa,
    SchemeCategory::TotalSme,
    SchemeCategory::Shg,
    SchemeCategory::Kcc,
];

impl SchemeCategory {
    /// Key used in the persisted code table.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Mudra => "mudra",
            Self::Housing => "housing",
            Self::Vehicle => "vehicle",
            Self::AgriJl => "agriJl",
            Self::RetailJl => "retailJl",
            Self::Jewel => "jewel",
            Self::Personal => "personal",
            Self::Mortgage => "mortgage",
            Self::Education => "education",
            Self::Liquirent => "liquirent",
            Self::OtherRetail => "otherRetail",
            Self::TotalRetail => "totalRetail",
            Self::JlLoans => "jlLoans",
            Self::GovSchemes => "govSchemes",
            Self::OtherSchematic => "otherSchematic",
            Self::Npa => "npa",
            Self::TotalSme => "totalSme",
            Self::Shg => "shg",
            Self::Kcc => "kcc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mudra => "MUDRA",
            Self::Housing => "Housing",
            Self::Vehicle => "Vehicle",
            Self::AgriJl => "Agri JL",
            Self::RetailJl => "Retail JL",
            Self::Jewel => "Jewel",
            Self::Personal => "Personal",
            Self::Mortgage => "Mortgage",
            Self::Education => "Education",
            Self::Liquirent => "Liquirent",
            Self::OtherRetail => "Other Retail",
            Self::TotalRetail => "Total Retail",
            Self::JlLoans => "JL Loans (SME)",
            Self::GovSchemes => "Govt Schemes",
            Self::OtherSchematic => "Other Schematic",
            Self::Npa => "NPA",
            Self::TotalSme => "Total SME",
            Self::Shg => "SHG",
            Self::Kcc => "KCC",
        }
    }

    pub fn sector_gate(&self) -> SectorGate {
        match self {
            Self::AgriJl => SectorGate::Agri,
            Self::RetailJl | Self::TotalRetail | Self::OtherRetail => SectorGate::Retail,
            Self::JlLoans | Self::TotalSme => SectorGate::Sme,
            _ => SectorGate::Any,
        }
    }

    /// NPA membership is decided by GL sub-head, every other category by
    /// scheme code.
    pub fn matches_gl_sub_head(&self) -> bool {
        matches!(self, Self::Npa)
    }

    pub fn from_key(key: &str) -> Option<SchemeCategory> {
        ALL_CATEGORIES
            .iter()
            .find(|c| c.key().eq_ignore_ascii_case(key.trim()))
            .copied()
    }
}

// ---------------------------------------------------------------------------
// Code table
// ---------------------------------------------------------------------------

/// Category key to product codes. Categories overlap freely: a code may sit
/// in several lists at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemeCodeTable {
    codes: BTreeMap<String, BTreeSet<String>>,
}

impl SchemeCodeTable {
    /// A table with every known category present and empty.
    pub fn with_all_categories() -> Self {
        let mut table = Self::default();
        for cat in ALL_CATEGORIES {
            table.codes.entry(cat.key().to_string()).or_default();
        }
        table
    }

    pub fn contains(&self, category: SchemeCategory, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty()
            && self
                .codes
                .get(category.key())
                .is_some_and(|set| set.contains(code))
    }

    pub fn codes(&self, category: SchemeCategory) -> Vec<&str> {
        self.codes
            .get(category.key())
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns how many codes were newly added.
    pub fn add_codes(&mut self, category: SchemeCategory, codes: &[String]) -> usize {
        let set = self.codes.entry(category.key().to_string()).or_default();
        codes
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .filter(|c| set.insert(c.to_string()))
            .count()
    }

    /// Returns how many codes were removed.
    pub fn remove_codes(&mut self, category: SchemeCategory, codes: &[String]) -> usize {
        let Some(set) = self.codes.get_mut(category.key()) else {
            return 0;
        };
        codes.iter().filter(|c| set.remove(c.trim())).count()
    }

    pub fn load(path: &Path) -> Result<SchemeCodeTable> {
        if !path.exists() {
            log::warn!("No scheme code table at {}; sanctions will not be classified", path.display());
            return Ok(Self::with_all_categories());
        }
        let content = std::fs::read_to_string(path)?;
        let mut table: SchemeCodeTable = serde_json::from_str(&content).map_err(|e| ScorecardError::Import {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;
        for key in table.codes.keys() {
            if SchemeCategory::from_key(key).is_none() {
                log::warn!("Ignoring unknown scheme category '{key}' in {}", path.display());
            }
        }
        for cat in ALL_CATEGORIES {
            table.codes.entry(cat.key().to_string()).or_default();
        }
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, format!("{json}\n"))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeTotals {
    pub mudra: f64,
    pub housing: f64,
    pub vehicle: f64,
    pub agri_jl: f64,
    pub retail_jl: f64,
    pub jewel: f64,
    pub personal: f64,
    pub mortgage: f64,
    pub education: f64,
    pub liquirent: f64,
    pub other_retail: f64,
    pub total_retail: f64,
    pub jl_loans: f64,
    pub gov_schemes: f64,
    pub other_schematic: f64,
    pub npa: f64,
    pub total_sme: f64,
    pub shg: f64,
    pub kcc: f64,
    /// `total_sme - jl_loans`; may go negative.
    pub core_msme: f64,
}

impl SchemeTotals {
    pub fn slot_mut(&mut self, category: SchemeCategory) -> &mut f64 {
        match category {
            SchemeCategory::Mudra => &mut self.mudra,
            SchemeCategory::Housing => &mut self.housing,
            SchemeCategory::Vehicle => &mut self.vehicle,
            SchemeCategory::AgriJl => &mut self.agri_jl,
            SchemeCategory::RetailJl => &mut self.retail_jl,
            SchemeCategory::Jewel => &mut self.jewel,
            SchemeCategory::Personal => &mut self.personal,
            SchemeCategory::Mortgage => &mut self.mortgage,
            SchemeCategory::Education => &mut self.education,
            SchemeCategory::Liquirent => &mut self.liquirent,
            SchemeCategory::OtherRetail => &mut self.other_retail,
            SchemeCategory::TotalRetail => &mut self.total_retail,
            SchemeCategory::JlLoans => &mut self.jl_loans,
            SchemeCategory::GovSchemes => &mut self.gov_schemes,
            SchemeCategory::OtherSchematic => &mut self.other_schematic,
            SchemeCategory::Npa => &mut self.npa,
            SchemeCategory::TotalSme => &mut self.total_sme,
            SchemeCategory::Shg => &mut self.shg,
            SchemeCategory::Kcc => &mut self.kcc,
        }
    }

    pub fn get(&self, category: SchemeCategory) -> f64 {
        let mut copy = *self;
        *copy.slot_mut(category)
    }

    pub fn add(&mut self, other: &SchemeTotals) {
        for cat in ALL_CATEGORIES {
            *self.slot_mut(*cat) += other.get(*cat);
        }
        self.core_msme += other.core_msme;
    }

    pub fn scaled(&self, divisor: f64) -> SchemeTotals {
        let mut out = *self;
        for cat in ALL_CATEGORIES {
            *out.slot_mut(*cat) /= divisor;
        }
        out.core_msme /= divisor;
        out
    }
}

/// Bucket a branch's sanction rows. Every category is tested independently,
/// so one record can land in several totals.
pub fn classify_sanctions(rows: &[Row], table: &SchemeCodeTable) -> SchemeTotals {
    let mut totals = SchemeTotals::default();
    for row in rows {
        let record = SanctionRecord::from_row(row);
        for cat in ALL_CATEGORIES {
            let code = if cat.matches_gl_sub_head() {
                &record.gl_sub_head
            } else {
                &record.scheme_code
            };
            if table.contains(*cat, code) && cat.sector_gate().admits(&record.sector) {
                *totals.slot_mut(*cat) += record.amount;
            }
        }
    }
    totals.core_msme = totals.total_sme - totals.jl_loans;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sanction(code: &str, sector: &str, amount: f64) -> Row {
        json!({"Scheme Code": code, "Sector": sector, "Sanction Amount": amount})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn table(entries: &[(SchemeCategory, &[&str])]) -> SchemeCodeTable {
        let mut t = SchemeCodeTable::with_all_categories();
        for (cat, codes) in entries {
            let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
            t.add_codes(*cat, &codes);
        }
        t
    }

    #[test]
    fn test_keys_round_trip_through_from_key() {
        for cat in ALL_CATEGORIES {
            assert_eq!(SchemeCategory::from_key(cat.key()), Some(*cat));
        }
        assert_eq!(SchemeCategory::from_key("AGRIJL"), Some(SchemeCategory::AgriJl));
        assert_eq!(SchemeCategory::from_key("bogus"), None);
    }

    #[test]
    fn test_code_counted_in_every_matching_category() {
        let t = table(&[
            (SchemeCategory::Jewel, &["JL01"]),
            (SchemeCategory::AgriJl, &["JL01"]),
        ]);
        let totals = classify_sanctions(&[sanction("JL01", "AGRI", 250.0)], &t);
        assert_eq!(totals.jewel, 250.0);
        assert_eq!(totals.agri_jl, 250.0);
    }

    #[test]
    fn test_sector_gate_blocks_wrong_sector() {
        let t = table(&[
            (SchemeCategory::Jewel, &["JL01"]),
            (SchemeCategory::AgriJl, &["JL01"]),
            (SchemeCategory::RetailJl, &["JL01"]),
        ]);
        let totals = classify_sanctions(&[sanction("JL01", "RETAIL", 100.0)], &t);
        assert_eq!(totals.jewel, 100.0);
        assert_eq!(totals.agri_jl, 0.0);
        assert_eq!(totals.retail_jl, 100.0);
    }

    #[test]
    fn test_sme_gate_accepts_all_sme_sectors() {
        let t = table(&[(SchemeCategory::TotalSme, &["SM1"])]);
        let rows = vec![
            sanction("SM1", "SME", 1.0),
            sanction("SM1", "sme_np", 2.0),
            sanction("SM1", "MSME", 4.0),
            sanction("SM1", "AGRI", 8.0),
        ];
        assert_eq!(classify_sanctions(&rows, &t).total_sme, 7.0);
    }

    #[test]
    fn test_core_msme_is_not_clamped() {
        let t = table(&[
            (SchemeCategory::TotalSme, &["SM1"]),
            (SchemeCategory::JlLoans, &["JLS"]),
        ]);
        let rows = vec![sanction("SM1", "SME", 100.0), sanction("JLS", "MSME", 150.0)];
        let totals = classify_sanctions(&rows, &t);
        assert_eq!(totals.total_sme, 100.0);
        assert_eq!(totals.jl_loans, 150.0);
        assert_eq!(totals.core_msme, -50.0);
    }

    #[test]
    fn test_npa_matches_gl_sub_head_not_scheme_code() {
        let t = table(&[(SchemeCategory::Npa, &["60010"])]);
        let by_gl = json!({"Scheme Code": "X1", "GL Sub Head Code": "60010", "Amount": "75"})
            .as_object()
            .cloned()
            .unwrap();
        let by_scheme = sanction("60010", "RETAIL", 30.0);
        let totals = classify_sanctions(&[by_gl, by_scheme], &t);
        assert_eq!(totals.npa, 75.0);
    }

    #[test]
    fn test_negative_amounts_count_as_absolute() {
        let t = table(&[(SchemeCategory::Housing, &["HL1"])]);
        let totals = classify_sanctions(&[sanction("HL1", "RETAIL", -40.0)], &t);
        assert_eq!(totals.housing, 40.0);
    }

    #[test]
    fn test_empty_code_never_matches() {
        let mut t = SchemeCodeTable::with_all_categories();
        assert_eq!(t.add_codes(SchemeCategory::Mudra, &["  ".to_string()]), 0);
        assert!(!t.contains(SchemeCategory::Mudra, ""));
    }

    #[test]
    fn test_add_and_remove_codes() {
        let mut t = SchemeCodeTable::with_all_categories();
        let codes = vec!["A1".to_string(), "A2".to_string(), "A1".to_string()];
        assert_eq!(t.add_codes(SchemeCategory::Vehicle, &codes), 2);
        assert_eq!(t.codes(SchemeCategory::Vehicle), vec!["A1", "A2"]);
        assert_eq!(t.remove_codes(SchemeCategory::Vehicle, &["A1".to_string(), "ZZ".to_string()]), 1);
        assert_eq!(t.codes(SchemeCategory::Vehicle), vec!["A2"]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemes.json");
        let t = table(&[(SchemeCategory::Kcc, &["KC1", "KC2"])]);
        t.save(&path).unwrap();
        let loaded = SchemeCodeTable::load(&path).unwrap();
        assert_eq!(loaded, t);
    }

    #[test]
    fn test_load_fills_missing_categories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schemes.json");
        std::fs::write(&path, r#"{"housing": ["HL1"]}"#).unwrap();
        let loaded = SchemeCodeTable::load(&path).unwrap();
        assert!(loaded.contains(SchemeCategory::Housing, "HL1"));
        assert!(loaded.codes(SchemeCategory::Kcc).is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SchemeCodeTable::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(loaded, SchemeCodeTable::with_all_categories());
    }
}
