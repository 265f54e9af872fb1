use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::ReconciledDevice;

/// A reconciled row tagged with the run it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedDevice {
    pub document: String,
    pub date: String,
    #[serde(flatten)]
    pub device: ReconciledDevice,
}

/// Totals for one group of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupTotals {
    pub key: String,
    pub devices: usize,
    pub mono: u64,
    pub color: u64,
    pub pre_tax_total: f64,
    pub tax_total: f64,
    pub inclusive_total: f64,
    /// Date of the first row seen in the group (document grouping only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_date: Option<String>,
}

impl GroupTotals {
    fn new(key: String) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    fn add(&mut self, d: &ReconciledDevice) {
        self.devices += 1;
        self.mono = self.mono.saturating_add(d.mono);
        self.color = self.color.saturating_add(d.color);
        self.pre_tax_total += d.cost.pre_tax_total;
        self.tax_total += d.cost.tax_total;
        self.inclusive_total += d.cost.inclusive_total;
    }

    pub fn impressions(&self) -> u64 {
        self.mono.saturating_add(self.color)
    }

    pub fn impressions_per_device(&self) -> f64 {
        if self.devices == 0 {
            0.0
        } else {
            self.impressions() as f64 / self.devices as f64
        }
    }
}

/// Group rows by organizational unit, sorted by unit. A missing unit groups under "".
pub fn group_by_org_unit<'a, I>(rows: I) -> Vec<GroupTotals>
where
    I: IntoIterator<Item = &'a ReconciledDevice>,
{
    let mut groups: BTreeMap<String, GroupTotals> = BTreeMap::new();

    for d in rows {
        let key = d.org_unit.clone().unwrap_or_default();
        groups
            .entry(key.clone())
            .or_insert_with(|| GroupTotals::new(key))
            .add(d);
    }

    groups.into_values().collect()
}

/// Group tagged rows by document, in order of first appearance.
pub fn group_by_document(rows: &[TaggedDevice]) -> Vec<GroupTotals> {
    let mut groups: IndexMap<&str, GroupTotals> = IndexMap::new();

    for r in rows {
        let g = groups.entry(r.document.as_str()).or_insert_with(|| GroupTotals {
            first_date: Some(r.date.clone()),
            ..GroupTotals::new(r.document.clone())
        });
        g.add(&r.device);
    }

    groups.into_values().collect()
}

/// Row selection for device-detail listings. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFilter {
    pub org_unit: Option<String>,
    pub document: Option<String>,
}

impl DetailFilter {
    pub fn matches(&self, r: &TaggedDevice) -> bool {
        self.matches_device(&r.device)
            && self.document.as_deref().map_or(true, |doc| doc == r.document)
    }

    pub fn matches_device(&self, d: &ReconciledDevice) -> bool {
        self.org_unit
            .as_deref()
            .map_or(true, |org| d.org_unit.as_deref().unwrap_or("") == org)
    }

    pub fn apply<'a>(&self, rows: &'a [TaggedDevice]) -> Vec<&'a TaggedDevice> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}
