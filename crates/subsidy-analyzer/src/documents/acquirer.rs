use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::documents::{DocumentRef, DocumentText};
use crate::error::{FetchError, ProcessError, StorageError};
use crate::http::HttpFetcher;
use crate::processor::{is_pdf, TextExtractor};
use crate::sanitize::{clean_filename, redact_path};
use crate::storage::FileStorage;

/// Why a located document did not make it into the analysis.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("content is not a valid PDF")]
    NotPdf,

    #[error("could not save file: {0}")]
    Storage(#[from] StorageError),

    #[error("text extraction failed: {0}")]
    Extraction(#[from] ProcessError),

    #[error("no text extracted")]
    EmptyText,
}

/// Downloads, stores and extracts documents one after another.
pub struct DocumentAcquirer {
    fetcher: Arc<dyn HttpFetcher>,
    extractor: Arc<dyn TextExtractor>,
    storage: FileStorage,
    timeout: Duration,
}

impl DocumentAcquirer {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        extractor: Arc<dyn TextExtractor>,
        storage: FileStorage,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            storage,
            timeout,
        }
    }

    /// Processes every reference in order. A failing reference is skipped and
    /// reported through `on_skip`; it never stops the remaining ones.
    pub fn acquire_all(
        &self,
        identifier: &str,
        refs: &[DocumentRef],
        mut on_skip: impl FnMut(&DocumentRef, &SkipReason),
    ) -> Vec<DocumentText> {
        let mut texts = Vec::with_capacity(refs.len());

        for doc in refs {
            match self.acquire(identifier, doc) {
                Ok(text) => texts.push(text),
                Err(reason) => on_skip(doc, &reason),
            }
        }

        texts
    }

    /// Download → signature check → save → extract for a single reference.
    pub fn acquire(&self, identifier: &str, doc: &DocumentRef) -> Result<DocumentText, SkipReason> {
        let _span = tracing::info_span!("document", name = %doc.display_name, id = %doc.id).entered();
        tracing::info!(url = %doc.url, "Downloading document");

        let response = self.fetcher.get(&doc.url, self.timeout)?;
        if !response.is_ok() {
            return Err(SkipReason::Status(response.status));
        }

        // headers lie; only the signature counts
        if !is_pdf(&response.body) {
            return Err(SkipReason::NotPdf);
        }

        let filename = storage_filename(identifier, &doc.display_name);
        let storage_path = self.storage.store_bytes(&filename, &response.body)?;
        tracing::info!(file = %redact_path(&storage_path), bytes = response.body.len(), "Saved document");

        let text = self.extractor.extract(&response.body)?;
        if text.trim().is_empty() {
            return Err(SkipReason::EmptyText);
        }

        tracing::info!(chars = text.chars().count(), "Extracted document text");

        Ok(DocumentText {
            display_name: doc.display_name.clone(),
            text,
            storage_path,
        })
    }
}

/// `<identifier>_<sanitized display name>.pdf`
pub fn storage_filename(identifier: &str, display_name: &str) -> String {
    format!("{}_{}.pdf", identifier, clean_filename(display_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct MapFetcher {
        responses: HashMap<String, HttpResponse>,
    }

    impl HttpFetcher for MapFetcher {
        fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, FetchError> {
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Request {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
        }
    }

    /// Treats everything after the signature as the document text.
    struct TailExtractor;

    impl TextExtractor for TailExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<String, ProcessError> {
            let text = String::from_utf8_lossy(&bytes[4..]).to_string();
            if text.contains("CORRUPT") {
                return Err(ProcessError::PdfProcessing("bad xref".to_string()));
            }
            Ok(text)
        }
    }

    fn doc(id: &str, name: &str) -> DocumentRef {
        DocumentRef {
            url: format!("https://docs.example.org/{}", id),
            display_name: name.to_string(),
            id: id.to_string(),
        }
    }

    fn acquirer(dir: &TempDir, responses: Vec<(&str, HttpResponse)>) -> DocumentAcquirer {
        let responses = responses
            .into_iter()
            .map(|(id, r)| (format!("https://docs.example.org/{}", id), r))
            .collect();
        DocumentAcquirer::new(
            Arc::new(MapFetcher { responses }),
            Arc::new(TailExtractor),
            FileStorage::new(dir.path().join("downloads")),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_storage_filename() {
        assert_eq!(
            storage_filename("845133", "Bases reguladoras.pdf"),
            "845133_Bases_reguladoraspdf.pdf"
        );
    }

    #[test]
    fn test_acquire_saves_and_extracts() {
        let dir = TempDir::new().unwrap();
        let acquirer = acquirer(&dir, vec![("7", HttpResponse::new(200, b"%PDF Bases".to_vec()))]);

        let text = acquirer.acquire("845133", &doc("7", "Bases.pdf")).unwrap();

        assert_eq!(text.display_name, "Bases.pdf");
        assert_eq!(text.text, " Bases");
        assert_eq!(
            text.storage_path,
            dir.path().join("downloads").join("845133_Basespdf.pdf")
        );
        assert_eq!(std::fs::read(&text.storage_path).unwrap(), b"%PDF Bases");
    }

    #[test]
    fn test_skip_reasons() {
        let dir = TempDir::new().unwrap();
        let acquirer = acquirer(
            &dir,
            vec![
                ("404", HttpResponse::new(404, Vec::new())),
                ("html", HttpResponse::new(200, b"<html>".to_vec())),
                ("blank", HttpResponse::new(200, b"%PDF   \n".to_vec())),
                ("corrupt", HttpResponse::new(200, b"%PDF CORRUPT".to_vec())),
            ],
        );

        assert!(matches!(
            acquirer.acquire("1", &doc("404", "a.pdf")),
            Err(SkipReason::Status(404))
        ));
        assert!(matches!(
            acquirer.acquire("1", &doc("html", "b.pdf")),
            Err(SkipReason::NotPdf)
        ));
        assert!(matches!(
            acquirer.acquire("1", &doc("blank", "c.pdf")),
            Err(SkipReason::EmptyText)
        ));
        assert!(matches!(
            acquirer.acquire("1", &doc("corrupt", "d.pdf")),
            Err(SkipReason::Extraction(_))
        ));
        assert!(matches!(
            acquirer.acquire("1", &doc("missing", "e.pdf")),
            Err(SkipReason::Fetch(_))
        ));
    }

    #[test]
    fn test_not_pdf_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let acquirer = acquirer(&dir, vec![("html", HttpResponse::new(200, b"<html>".to_vec()))]);

        let _ = acquirer.acquire("1", &doc("html", "b.pdf"));

        assert!(!dir.path().join("downloads").exists());
    }

    #[test]
    fn test_acquire_all_keeps_order_and_isolates_failures() {
        let dir = TempDir::new().unwrap();
        let acquirer = acquirer(
            &dir,
            vec![
                ("1", HttpResponse::new(200, b"%PDF one".to_vec())),
                ("2", HttpResponse::new(500, Vec::new())),
                ("3", HttpResponse::new(200, b"%PDF three".to_vec())),
            ],
        );
        let refs = vec![doc("1", "one.pdf"), doc("2", "two.pdf"), doc("3", "three.pdf")];

        let mut skipped = Vec::new();
        let texts = acquirer.acquire_all("9", &refs, |doc, reason| {
            skipped.push(format!("{}: {}", doc.display_name, reason));
        });

        let names: Vec<&str> = texts.iter().map(|t| t.display_name.as_str()).collect();
        assert_eq!(names, vec!["one.pdf", "three.pdf"]);
        assert_eq!(skipped, vec!["two.pdf: HTTP 500"]);
    }
}
