// Shared fixtures: a JSON invoice and in-memory inventory workbooks.

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;

/// Invoice with three billed devices; XYZ99999 is not in [`inventory_xlsx`].
pub const INVOICE_JSON: &str = r#"{
  "pages": [
    {"tables": [[
      ["Ref", "Concepto", "Cantidad", "Importe"],
      [null, "ABC12345 N/S", null, null],
      ["1", "TOTAL MONOCROMO", "1.000", "9,80"],
      ["2", "TOTAL COLOR", "200", "23,80"],
      [null, "XYZ99999 N/S", null, null],
      ["1", "TOTAL MONOCROMO", "2.500,00", "24,50"]
    ]]},
    {"tables": [[
      [null, "LMN45678 N/S", null],
      ["2", "TOTAL COLOR", "10", "1,19"]
    ]]}
  ]
}"#;

/// Second-month invoice: ABC12345 prints more, LMN45678 disappears.
pub const INVOICE_APRIL_JSON: &str = r#"{
  "pages": [
    {"tables": [[
      [null, "ABC12345 N/S", null],
      ["1", "TOTAL MONOCROMO", "2.000", ""],
      ["2", "TOTAL COLOR", "100", ""]
    ]]}
  ]
}"#;

fn write_rows(rows: &[[&str; 3]], sheet: &str) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet().set_name(sheet).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            ws.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    wb.save_to_buffer().unwrap()
}

/// Inventory listing ABC12345 and LMN45678.
pub fn inventory_xlsx() -> Vec<u8> {
    write_rows(
        &[
            ["S/N", "Organismo", "Ubicación exacta"],
            ["ABC12345", "Dept A", "Floor 1"],
            ["LMN45678", "Dept B", "Hall"],
        ],
        "Equipos",
    )
}

/// Inventory whose serial sheet lacks the location column.
pub fn broken_inventory_xlsx() -> Vec<u8> {
    write_rows(
        &[
            ["S/N", "Organismo", "Modelo"],
            ["ABC12345", "Dept A", "C3003"],
        ],
        "Equipos",
    )
}
