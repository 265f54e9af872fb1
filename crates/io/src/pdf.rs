//! Invoice PDF text extraction via `pdftotext -layout`.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use meterbill_recon::TableDocument;

use crate::error::IoError;
use crate::layout::tables_from_layout_text;

/// True if the bytes look like a PDF: `%PDF` after an optional UTF-8 BOM and
/// leading whitespace.
pub fn is_pdf_magic(bytes: &[u8]) -> bool {
    let rest = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    let start = rest
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(rest.len());
    rest[start..].starts_with(b"%PDF")
}

/// Run `pdftotext -layout <file> -` and capture stdout.
pub fn run_pdftotext(file: &Path) -> Result<String, IoError> {
    which::which("pdftotext").map_err(|_| IoError::PdfToolMissing)?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(file)
        .arg("-")
        .output()
        .map_err(|e| IoError::PdfTool(format!("failed to run: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IoError::PdfTool(format!(
            "exit {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim(),
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();
    if text.trim().is_empty() {
        return Err(IoError::PdfNoText);
    }
    Ok(text)
}

/// Extract the tables of an in-memory PDF.
pub fn extract_tables(bytes: &[u8]) -> Result<TableDocument, IoError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("meterbill-")
        .suffix(".pdf")
        .tempfile()?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    let text = run_pdftotext(tmp.path())?;
    let doc = tables_from_layout_text(&text);
    log::debug!(
        "pdf: {} page(s), {} row(s) recovered",
        doc.pages.len(),
        doc.row_count()
    );
    Ok(doc)
}
