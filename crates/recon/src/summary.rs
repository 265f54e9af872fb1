use serde::Serialize;

use crate::model::ReconciledDevice;

/// Headline figures for a result table (or several concatenated).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub devices: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub mono: u64,
    pub color: u64,
    pub pre_tax_total: f64,
    pub tax_total: f64,
    pub inclusive_total: f64,
}

impl Summary {
    pub fn impressions(&self) -> u64 {
        self.mono.saturating_add(self.color)
    }
}

/// Compute summary statistics over reconciled rows.
pub fn compute_summary<'a, I>(rows: I) -> Summary
where
    I: IntoIterator<Item = &'a ReconciledDevice>,
{
    let mut s = Summary::default();
    for d in rows {
        s.devices += 1;
        if d.is_matched() {
            s.matched += 1;
        } else {
            s.unmatched += 1;
        }
        s.mono = s.mono.saturating_add(d.mono);
        s.color = s.color.saturating_add(d.color);
        s.pre_tax_total += d.cost.pre_tax_total;
        s.tax_total += d.cost.tax_total;
        s.inclusive_total += d.cost.inclusive_total;
    }
    s
}
