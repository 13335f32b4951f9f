pub mod pdf;

use crate::error::ProcessError;

pub use pdf::PdfTextExtractor;

/// Leading bytes every PDF file starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Turns raw document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ProcessError>;
}

/// Checks the `%PDF` signature. Servers routinely answer document links with
/// an HTML error page and a 200, so the status alone is not enough.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}
