use std::collections::BTreeMap;

use crate::fields::{self, normalize_code};
use crate::models::{Branch, BranchAccumulator, Row};

/// Maps loosely-keyed rows onto per-branch accumulators.
///
/// Branches from the directory are seeded up front (filtered by region when
/// one is given) so that idle branches still show up. Codes met later in the
/// data are added whatever their region.
pub struct BranchResolver {
    report_date: String,
    accumulators: BTreeMap<String, BranchAccumulator>,
}

impl BranchResolver {
    pub fn new(branches: &[Branch], region: Option<&str>, report_date: &str) -> Self {
        let mut resolver = Self {
            report_date: report_date.to_string(),
            accumulators: BTreeMap::new(),
        };
        let region = region.map(str::trim).filter(|r| !r.is_empty());
        for branch in branches {
            if let Some(r) = region {
                if normalize_code(&branch.region_code) != normalize_code(r) {
                    continue;
                }
            }
            resolver.resolve_code(&branch.branch_code, Some(&branch.branch_name));
        }
        log::debug!("Seeded {} branches from directory", resolver.accumulators.len());
        resolver
    }

    /// Accumulator for a raw identifier, created on first sight.
    pub fn resolve_code(&mut self, raw: &str, name: Option<&str>) -> Option<&mut BranchAccumulator> {
        let key = normalize_code(raw);
        if key.is_empty() {
            return None;
        }
        let report_date = &self.report_date;
        let acc = self.accumulators.entry(key.clone()).or_insert_with(|| {
            let display = name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Branch {key}"));
            BranchAccumulator::new(&key, &display, report_date)
        });
        Some(acc)
    }

    /// Accumulator for a dataset row. Rows with no identifier fall back to a
    /// display-name match against known branches; unmatched rows are dropped.
    pub fn resolve_row(&mut self, row: &Row) -> Option<&mut BranchAccumulator> {
        let name = fields::lookup_text(row, fields::BRANCH_NAME);
        if let Some(code) = fields::lookup_text(row, fields::BRANCH_CODE) {
            if !normalize_code(&code).is_empty() {
                return self.resolve_code(&code, name.as_deref());
            }
        }
        let Some(name) = name else {
            log::debug!("Dropping row with neither branch code nor name");
            return None;
        };
        let wanted = name.trim().to_lowercase();
        let hit = self
            .accumulators
            .values_mut()
            .find(|acc| acc.display_name.trim().to_lowercase() == wanted);
        if hit.is_none() {
            log::debug!("Dropping row for unknown branch name '{name}'");
        }
        hit
    }

    pub fn len(&self) -> usize {
        self.accumulators.len()
    }

    pub fn into_accumulators(self) -> Vec<BranchAccumulator> {
        self.accumulators.into_values().collect()
    }
}
