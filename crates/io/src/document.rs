use meterbill_recon::TableDocument;

use crate::error::IoError;
use crate::pdf;

/// Decode invoice bytes into a table document. PDFs go through `pdftotext`;
/// anything else is read as a JSON table document.
pub fn load_document(bytes: &[u8]) -> Result<TableDocument, IoError> {
    if pdf::is_pdf_magic(bytes) {
        pdf::extract_tables(bytes)
    } else {
        Ok(TableDocument::from_json_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_documents_load_directly() {
        let doc = load_document(br#"{"pages":[{"tables":[[["a","b",null]]]}]}"#).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].tables[0][0][2], None);
    }

    #[test]
    fn garbage_is_a_document_error() {
        let err = load_document(b"not a document").unwrap_err();
        assert!(matches!(err, IoError::Document(_)));
    }
}
