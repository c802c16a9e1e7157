//! OCR provider abstraction.
//!
//! OCR is a black-box text producer: the extractors only ever see the text an
//! [`OcrProvider`] returns. PDFs with a text layer skip OCR entirely via
//! [`extract_pdf_text`].

pub mod ocr_space;

use crate::diagnostics::FailureSink;

pub use ocr_space::OcrSpaceProvider;

/// A document to read.
#[derive(Debug, Clone)]
pub struct OcrInput {
    pub filename: String,
    pub data: Vec<u8>,
}

impl OcrInput {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// PDF by extension or `%PDF` magic bytes.
    pub fn is_pdf(&self) -> bool {
        self.filename.to_lowercase().ends_with(".pdf") || self.data.starts_with(b"%PDF")
    }

    /// MIME type sent to the provider.
    pub fn mime_type(&self) -> &'static str {
        let name = self.filename.to_lowercase();
        if self.is_pdf() {
            "application/pdf"
        } else if name.ends_with(".png") {
            "image/png"
        } else if name.ends_with(".webp") {
            "image/webp"
        } else {
            "image/jpeg"
        }
    }
}

/// Text produced by a provider.
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    pub engine: u8,
    pub processing_ms: Option<u64>,
    pub provider_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Missing OCR_API_KEY")]
    MissingKey,
    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("OCR timed out. Try Engine 1 or a smaller file.")]
    Timeout,
    #[error("{0}")]
    Processing(String),
    #[error("Malformed OCR response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl OcrError {
    /// Timeouts, client-side or provider-reported, are worth one retry.
    pub fn is_timeout(&self) -> bool {
        match self {
            OcrError::Timeout => true,
            OcrError::Processing(msg) => msg.to_lowercase().contains("timed out"),
            _ => false,
        }
    }

    /// Short label used when reporting to a [`FailureSink`].
    pub fn context(&self) -> &'static str {
        match self {
            OcrError::Timeout => "OCR Timeout",
            OcrError::Processing(_) => "OCR Processing",
            _ => "OCR Error",
        }
    }
}

/// Implemented by each OCR backend.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn process(
        &self,
        input: &OcrInput,
        sink: &dyn FailureSink,
    ) -> Result<OcrResult, OcrError>;
}

/// Read the text layer of a PDF with lopdf. Scanned PDFs yield blank text.
pub fn extract_pdf_text(data: &[u8]) -> anyhow::Result<String> {
    use lopdf::Document;
    use std::io::Cursor;

    let doc = Document::load_from(Cursor::new(data))
        .map_err(|e| anyhow::anyhow!("Failed to load PDF: {}", e))?;

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        if let Ok(content) = doc.extract_text(&[page_num]) {
            text.push_str(&content);
            text.push('\n');
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::FailureLog;

    struct FixedText(&'static str);

    #[async_trait::async_trait]
    impl OcrProvider for FixedText {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn process(
            &self,
            _input: &OcrInput,
            _sink: &dyn FailureSink,
        ) -> Result<OcrResult, OcrError> {
            Ok(OcrResult {
                text: self.0.to_string(),
                engine: 0,
                processing_ms: None,
                provider_name: self.name().to_string(),
            })
        }
    }

    #[test]
    fn test_pdf_detection() {
        assert!(OcrInput::new("scan.PDF", vec![]).is_pdf());
        assert!(OcrInput::new("upload", b"%PDF-1.7".to_vec()).is_pdf());
        assert!(!OcrInput::new("card.jpg", vec![0xff, 0xd8]).is_pdf());
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(OcrInput::new("a.pdf", vec![]).mime_type(), "application/pdf");
        assert_eq!(OcrInput::new("a.PNG", vec![]).mime_type(), "image/png");
        assert_eq!(OcrInput::new("a.jpeg", vec![]).mime_type(), "image/jpeg");
        assert_eq!(OcrInput::new("photo", vec![]).mime_type(), "image/jpeg");
    }

    #[test]
    fn test_timeout_classification() {
        assert!(OcrError::Timeout.is_timeout());
        assert!(OcrError::Processing("E101: Timed out waiting for results".into()).is_timeout());
        assert!(!OcrError::Processing("Invalid file".into()).is_timeout());
        assert!(!OcrError::MissingKey.is_timeout());
        assert_eq!(OcrError::Timeout.context(), "OCR Timeout");
        assert_eq!(OcrError::MissingKey.context(), "OCR Error");
    }

    #[test]
    fn test_invalid_pdf_is_an_error() {
        assert!(extract_pdf_text(b"not a pdf").is_err());
    }

    #[tokio::test]
    async fn test_provider_output_feeds_extraction() {
        let provider: Box<dyn OcrProvider> = Box::new(FixedText("Income Tax Department\nABCDE1234F"));
        let log = FailureLog::new();
        let result = provider
            .process(&OcrInput::new("pan.jpg", vec![1, 2, 3]), &log)
            .await
            .unwrap();
        let doc_type = crate::classify::classify(&result.text);
        assert_eq!(doc_type, crate::classify::DocumentType::Pan);
        assert_eq!(result.provider_name, "fixed");
        assert!(log.entries().is_empty());
    }
}
