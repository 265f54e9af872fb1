//! Excel workbooks: inventory import (calamine) and result export (rust_xlsxwriter).

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use meterbill_recon::summary::compute_summary;
use meterbill_recon::{CellValue, ReconciledDevice, SheetGrid};

use crate::error::IoError;
use crate::RESULT_HEADERS;

// ============================================================================
// Import
// ============================================================================

/// Read every sheet of an xlsx/xls/xlsb/ods workbook, in workbook order.
///
/// Grids are anchored at A1: when the used range starts further in, the
/// leading rows and columns are filled with `CellValue::Empty` so that row
/// numbers reported downstream match what the user sees in Excel.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<SheetGrid>, IoError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| IoError::Workbook(format!("failed to open workbook: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::Workbook("workbook contains no sheets".into()));
    }

    let mut grids = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| IoError::Workbook(format!("failed to read sheet '{name}': {e}")))?;

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];

        for row in range.rows() {
            let mut cells = vec![CellValue::Empty; start_col as usize];
            cells.extend(row.iter().map(cell_value));
            rows.push(cells);
        }

        log::debug!("workbook: sheet '{}' has {} row(s)", name, rows.len());
        grids.push(SheetGrid::new(name.as_str(), rows));
    }
    Ok(grids)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}

// ============================================================================
// Export
// ============================================================================

/// Render a reconciliation result as a single-sheet workbook.
///
/// One row per device in result order, followed by a bold totals row.
pub fn export_result(rows: &[ReconciledDevice]) -> Result<Vec<u8>, IoError> {
    let err = |e: rust_xlsxwriter::XlsxError| IoError::Export(e.to_string());

    let mut workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("#,##0.00");
    let money_bold = Format::new().set_num_format("#,##0.00").set_bold();

    let sheet = workbook.add_worksheet().set_name("Reconciliation").map_err(err)?;

    for (col, header) in RESULT_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(err)?;
    }

    for (i, d) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, &d.serial).map_err(err)?;
        sheet
            .write_string(r, 1, d.org_unit.as_deref().unwrap_or(""))
            .map_err(err)?;
        sheet
            .write_string(r, 2, d.location.as_deref().unwrap_or(""))
            .map_err(err)?;
        sheet.write_number(r, 3, d.mono as f64).map_err(err)?;
        sheet.write_number(r, 4, d.color as f64).map_err(err)?;
        let amounts = [
            d.cost.mono_cost,
            d.cost.color_cost,
            d.cost.pre_tax_total,
            d.cost.tax_total,
            d.cost.inclusive_total,
        ];
        for (j, v) in amounts.iter().enumerate() {
            sheet
                .write_number_with_format(r, 5 + j as u16, *v, &money)
                .map_err(err)?;
        }
        sheet.write_string(r, 10, d.status.to_string()).map_err(err)?;
    }

    let s = compute_summary(rows);
    let r = rows.len() as u32 + 1;
    sheet.write_string_with_format(r, 0, "Total", &bold).map_err(err)?;
    sheet
        .write_number_with_format(r, 3, s.mono as f64, &bold)
        .map_err(err)?;
    sheet
        .write_number_with_format(r, 4, s.color as f64, &bold)
        .map_err(err)?;
    sheet
        .write_number_with_format(r, 7, s.pre_tax_total, &money_bold)
        .map_err(err)?;
    sheet
        .write_number_with_format(r, 8, s.tax_total, &money_bold)
        .map_err(err)?;
    sheet
        .write_number_with_format(r, 9, s.inclusive_total, &money_bold)
        .map_err(err)?;

    sheet.set_column_width(0, 14).map_err(err)?;
    sheet.set_column_width(1, 32).map_err(err)?;
    sheet.set_column_width(2, 24).map_err(err)?;
    sheet.set_freeze_panes(1, 0).map_err(err)?;

    workbook.save_to_buffer().map_err(err)
}
