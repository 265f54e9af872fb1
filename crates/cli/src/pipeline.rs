use meterbill_io::{load_document, read_workbook};
use meterbill_recon::{run, Pricing, ReconciliationResult};

use crate::session::SessionError;

/// Invoice bytes + inventory workbook bytes → costed, reconciled rows.
pub fn reconcile_bytes(
    document: &[u8],
    inventory: &[u8],
    pricing: &Pricing,
) -> Result<ReconciliationResult, SessionError> {
    let doc = load_document(document)?;
    let sheets = read_workbook(inventory)?;
    let result = run(&doc, &sheets, pricing)?;
    log::info!(
        "reconciled {} device(s) from {} document row(s) and {} sheet(s)",
        result.len(),
        doc.row_count(),
        sheets.len()
    );
    Ok(result)
}
