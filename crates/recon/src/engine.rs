use std::collections::HashSet;

use crate::costing::Pricing;
use crate::error::ReconError;
use crate::extract::extract_counters;
use crate::inventory::Inventory;
use crate::model::{
    CounterMap, DeviceCounters, DeviceStatus, ReconciledDevice, ReconciliationResult, SheetGrid,
    TableDocument, NOT_IN_INVENTORY, UNKNOWN_LOCATION,
};

/// Match inventory rows against extracted counters and cost every device.
///
/// Every inventory row whose serial appears in `counters` yields a `Matched`
/// row (duplicate inventory serials each yield one). Every serial never
/// matched is appended afterwards as `UnmatchedInInventory`, so the result
/// always covers all extracted counters.
pub fn reconcile(
    inventory: &Inventory,
    counters: &CounterMap,
    pricing: &Pricing,
) -> ReconciliationResult {
    let mut found: HashSet<&str> = HashSet::new();
    let mut result = Vec::with_capacity(counters.len());

    for row in &inventory.rows {
        let Some(serial) = row.serial.as_deref() else {
            continue;
        };
        let Some((key, c)) = counters.get_key_value(serial) else {
            continue;
        };
        found.insert(key.as_str());
        result.push(device(c, row.org_unit.clone(), row.location.clone(), DeviceStatus::Matched, pricing));
    }

    let mut unmatched = 0usize;
    for (serial, c) in counters {
        if found.contains(serial.as_str()) {
            continue;
        }
        unmatched += 1;
        result.push(device(
            c,
            Some(NOT_IN_INVENTORY.to_string()),
            Some(UNKNOWN_LOCATION.to_string()),
            DeviceStatus::UnmatchedInInventory,
            pricing,
        ));
    }

    if unmatched > 0 {
        log::warn!("{unmatched} billed device(s) not found in inventory");
    }

    result
}

/// Validate the workbook's sheets and reconcile them against `counters`.
pub fn reconcile_sheets(
    sheets: &[SheetGrid],
    counters: &CounterMap,
    pricing: &Pricing,
) -> Result<ReconciliationResult, ReconError> {
    let inventory = Inventory::from_sheets(sheets)?;
    Ok(reconcile(&inventory, counters, pricing))
}

/// Full pipeline over already-decoded inputs: extract, then reconcile.
pub fn run(
    document: &TableDocument,
    sheets: &[SheetGrid],
    pricing: &Pricing,
) -> Result<ReconciliationResult, ReconError> {
    let counters = extract_counters(document);
    reconcile_sheets(sheets, &counters, pricing)
}

fn device(
    c: &DeviceCounters,
    org_unit: Option<String>,
    location: Option<String>,
    status: DeviceStatus,
    pricing: &Pricing,
) -> ReconciledDevice {
    ReconciledDevice {
        serial: c.serial.clone(),
        org_unit,
        location,
        mono: c.mono,
        color: c.color,
        cost: pricing.cost(c.mono, c.color),
        status,
    }
}
