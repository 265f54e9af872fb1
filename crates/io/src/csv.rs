// CSV export of reconciliation results

use std::io::Write;

use meterbill_recon::ReconciledDevice;

use crate::error::IoError;
use crate::RESULT_HEADERS;

/// Write result rows as comma-separated values with a header line.
pub fn export_result<W: Write>(rows: &[ReconciledDevice], out: W) -> Result<(), IoError> {
    export_with_delimiter(rows, out, b',')
}

pub fn export_result_tsv<W: Write>(rows: &[ReconciledDevice], out: W) -> Result<(), IoError> {
    export_with_delimiter(rows, out, b'\t')
}

fn export_with_delimiter<W: Write>(
    rows: &[ReconciledDevice],
    out: W,
    delimiter: u8,
) -> Result<(), IoError> {
    let err = |e: csv::Error| IoError::Export(e.to_string());
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(out);

    writer.write_record(RESULT_HEADERS).map_err(err)?;
    for d in rows {
        writer
            .write_record([
                d.serial.clone(),
                d.org_unit.clone().unwrap_or_default(),
                d.location.clone().unwrap_or_default(),
                d.mono.to_string(),
                d.color.to_string(),
                format!("{:.4}", d.cost.mono_cost),
                format!("{:.4}", d.cost.color_cost),
                format!("{:.4}", d.cost.pre_tax_total),
                format!("{:.4}", d.cost.tax_total),
                format!("{:.4}", d.cost.inclusive_total),
                d.status.to_string(),
            ])
            .map_err(err)?;
    }

    writer.flush()?;
    Ok(())
}
