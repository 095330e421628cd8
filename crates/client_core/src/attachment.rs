//! Files picked by the user: PDF policy documents and profile pictures.

use std::path::Path;

use reqwest::multipart::Part;

use crate::error::{ClientError, Result};

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_PDF_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_PROFILE_PICTURE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads a file and guesses its MIME type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(filename, mime_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME)
    }

    /// PDF only, at most 5 MB. Runs before any request is built.
    pub fn validate_pdf(&self) -> Result<()> {
        if !self.is_pdf() {
            return Err(ClientError::Attachment(format!(
                "'{}' is not a PDF (got {})",
                self.filename, self.mime_type
            )));
        }
        if self.size() > MAX_PDF_BYTES {
            return Err(ClientError::Attachment(format!(
                "'{}' exceeds the 5 MB limit ({} bytes)",
                self.filename,
                self.size()
            )));
        }
        Ok(())
    }

    pub fn validate_profile_picture(&self) -> Result<()> {
        if !self.mime_type.to_ascii_lowercase().starts_with("image/") {
            return Err(ClientError::Attachment(format!(
                "'{}' is not an image",
                self.filename
            )));
        }
        if self.size() > MAX_PROFILE_PICTURE_BYTES {
            return Err(ClientError::Attachment(format!(
                "'{}' exceeds the 2 MB limit",
                self.filename
            )));
        }
        Ok(())
    }

    pub fn to_part(&self) -> Result<Part> {
        Part::bytes(self.bytes.clone())
            .file_name(self.filename.clone())
            .mime_str(&self.mime_type)
            .map_err(ClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_mime() {
        let doc = Document::new("policy.docx", "application/msword", vec![1, 2, 3]);
        assert!(matches!(doc.validate_pdf(), Err(ClientError::Attachment(_))));
    }

    #[test]
    fn rejects_pdf_over_five_megabytes() {
        let doc = Document::new("big.pdf", PDF_MIME, vec![0; MAX_PDF_BYTES + 1]);
        let err = doc.validate_pdf().unwrap_err();
        assert!(err.to_string().contains("5 MB"));
    }

    #[test]
    fn accepts_pdf_at_the_limit() {
        let doc = Document::new("ok.pdf", "Application/PDF", vec![0; MAX_PDF_BYTES]);
        assert!(doc.validate_pdf().is_ok());
    }

    #[test]
    fn profile_picture_must_be_a_small_image() {
        assert!(Document::new("me.png", "image/png", vec![0; 10])
            .validate_profile_picture()
            .is_ok());
        assert!(Document::new("me.pdf", PDF_MIME, vec![0; 10])
            .validate_profile_picture()
            .is_err());
        assert!(
            Document::new("me.jpg", "image/jpeg", vec![0; MAX_PROFILE_PICTURE_BYTES + 1])
                .validate_profile_picture()
                .is_err()
        );
    }

    #[tokio::test]
    async fn from_path_guesses_pdf_mime() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("poliza.pdf");
        std::fs::write(&path, b"%PDF-1.4").expect("write");

        let doc = Document::from_path(&path).await.expect("read");
        assert_eq!(doc.filename, "poliza.pdf");
        assert!(doc.is_pdf());
        assert_eq!(doc.size(), 8);
    }
}
