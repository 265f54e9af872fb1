//! Typed inventory rows, validated once per sheet.

use crate::error::ReconError;
use crate::model::SheetGrid;

/// Header of the serial-number column. Sheets without it are not inventory.
pub const SERIAL_HEADER: &str = "S/N";
/// Header of the organizational-unit column.
pub const ORG_UNIT_HEADER: &str = "Organismo";
/// Header of the physical-location column.
pub const LOCATION_HEADER: &str = "Ubicación exacta";

/// Column positions resolved from a sheet's header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySchema {
    pub serial: usize,
    pub org_unit: usize,
    pub location: usize,
}

impl InventorySchema {
    /// Resolve the schema from the first row of `sheet`.
    ///
    /// `Ok(None)` when the sheet has no serial column. Once the serial column
    /// is present the companion columns are mandatory.
    pub fn detect(sheet: &SheetGrid) -> Result<Option<Self>, ReconError> {
        let header: Vec<String> = sheet
            .rows
            .first()
            .map(|r| {
                r.iter()
                    .map(|c| c.as_text().unwrap_or_default().trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let idx = |name: &str| header.iter().position(|h| h == name);

        let Some(serial) = idx(SERIAL_HEADER) else {
            return Ok(None);
        };
        let missing = |column: &str| ReconError::MissingColumn {
            sheet: sheet.name.clone(),
            column: column.into(),
        };
        let org_unit = idx(ORG_UNIT_HEADER).ok_or_else(|| missing(ORG_UNIT_HEADER))?;
        let location = idx(LOCATION_HEADER).ok_or_else(|| missing(LOCATION_HEADER))?;

        Ok(Some(Self {
            serial,
            org_unit,
            location,
        }))
    }
}

/// One data row of an eligible inventory sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    pub sheet: String,
    /// 1-based spreadsheet row number.
    pub row: usize,
    /// Trimmed serial; `None` when the cell is blank.
    pub serial: Option<String>,
    pub org_unit: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Rows in sheet-then-row order.
    pub rows: Vec<InventoryRow>,
    /// Sheets ignored for lacking a serial column.
    pub skipped_sheets: Vec<String>,
}

impl Inventory {
    pub fn from_sheets(sheets: &[SheetGrid]) -> Result<Self, ReconError> {
        let mut inventory = Inventory::default();

        for sheet in sheets {
            let Some(schema) = InventorySchema::detect(sheet)? else {
                log::debug!("sheet '{}' has no {SERIAL_HEADER} column, skipped", sheet.name);
                inventory.skipped_sheets.push(sheet.name.clone());
                continue;
            };

            for row in 1..sheet.rows.len() {
                let serial = sheet
                    .cell(row, schema.serial)
                    .as_text()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());

                inventory.rows.push(InventoryRow {
                    sheet: sheet.name.clone(),
                    row: row + 1,
                    serial,
                    org_unit: sheet.cell(row, schema.org_unit).as_text(),
                    location: sheet.cell(row, schema.location).as_text(),
                });
            }
        }

        Ok(inventory)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
