//! Side-by-side comparison of two reconciliation runs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::group_by_org_unit;
use crate::model::ReconciledDevice;
use crate::summary::{compute_summary, Summary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgUnitDelta {
    pub org_unit: String,
    pub before_pre_tax: f64,
    pub after_pre_tax: f64,
    pub delta_pre_tax: f64,
}

/// Figures for `after` minus figures for `before`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub before: Summary,
    pub after: Summary,
    pub delta_devices: i64,
    pub delta_impressions: i64,
    pub delta_pre_tax: f64,
    pub delta_inclusive: f64,
    pub by_org_unit: Vec<OrgUnitDelta>,
}

/// `after - before`, clamped to the `i64` range.
fn signed_delta(before: u64, after: u64) -> i64 {
    let delta = i128::from(after) - i128::from(before);
    i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX })
}

pub fn compare(before: &[ReconciledDevice], after: &[ReconciledDevice]) -> Comparison {
    let b = compute_summary(before);
    let a = compute_summary(after);

    let mut units: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for g in group_by_org_unit(before) {
        units.entry(g.key).or_default().0 = g.pre_tax_total;
    }
    for g in group_by_org_unit(after) {
        units.entry(g.key).or_default().1 = g.pre_tax_total;
    }

    let by_org_unit = units
        .into_iter()
        .map(|(org_unit, (before_pre_tax, after_pre_tax))| OrgUnitDelta {
            org_unit,
            before_pre_tax,
            after_pre_tax,
            delta_pre_tax: after_pre_tax - before_pre_tax,
        })
        .collect();

    Comparison {
        delta_devices: signed_delta(b.devices as u64, a.devices as u64),
        delta_impressions: signed_delta(b.impressions(), a.impressions()),
        delta_pre_tax: a.pre_tax_total - b.pre_tax_total,
        delta_inclusive: a.inclusive_total - b.inclusive_total,
        before: b,
        after: a,
        by_org_unit,
    }
}
