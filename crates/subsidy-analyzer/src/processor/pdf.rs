use crate::error::ProcessError;
use crate::processor::{is_pdf, TextExtractor};

/// Embedded-text extraction with lopdf. Scanned documents yield empty text
/// and are dropped further up.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ProcessError> {
        let _span = tracing::debug_span!("processor.pdf", bytes = bytes.len()).entered();

        if !is_pdf(bytes) {
            return Err(ProcessError::NotPdf);
        }

        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| ProcessError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        Ok(extract_text_from_pdf(&doc))
    }
}

/// Concatenates page text in page order, one newline after each page.
/// Pages lopdf cannot decode are skipped rather than failing the document.
fn extract_text_from_pdf(doc: &lopdf::Document) -> String {
    let mut text = String::new();

    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                // lopdf already ends each page with a line break
                text.push_str(page_text.trim_end_matches(['\n', '\r']));
                text.push('\n');
            }
            Err(e) => {
                tracing::debug!(page = page_num, error = %e, "Skipping unreadable page");
            }
        }
    }

    text
}
