//! Multi-file PDF upload queue.

use std::time::Duration;

use async_trait::async_trait;
use shared::domain::PolicyId;
use tracing::{info, warn};

use crate::{attachment::Document, error::Result, services::PolicyService};

/// Sends one queued document somewhere.
#[async_trait]
pub trait DocumentUploader: Send + Sync {
    async fn upload(&self, document: &Document) -> Result<()>;
}

/// Stores each PDF as a document of one policy.
pub struct PolicyDocumentUploader {
    service: PolicyService,
    policy_id: PolicyId,
}

impl PolicyDocumentUploader {
    pub fn new(service: PolicyService, policy_id: PolicyId) -> Self {
        Self { service, policy_id }
    }
}

#[async_trait]
impl DocumentUploader for PolicyDocumentUploader {
    async fn upload(&self, document: &Document) -> Result<()> {
        self.service.upload_document(self.policy_id, document).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploaded,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct QueuedFile {
    pub id: u64,
    pub document: Document,
    pub status: UploadStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: usize,
}

pub struct UploadQueue {
    files: Vec<QueuedFile>,
    next_id: u64,
    linger: Duration,
    error: Option<String>,
}

impl UploadQueue {
    pub fn new(linger: Duration) -> Self {
        Self {
            files: Vec::new(),
            next_id: 1,
            linger,
            error: None,
        }
    }

    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    /// Message for the last rejected selection or failed upload.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Queues the PDFs among `documents` as pending and returns how many were
    /// accepted. Anything else is dropped and reported through [`error`].
    ///
    /// [`error`]: UploadQueue::error
    pub fn add(&mut self, documents: impl IntoIterator<Item = Document>) -> usize {
        let mut accepted = 0;
        let mut rejected = Vec::new();
        for document in documents {
            if let Err(err) = document.validate_pdf() {
                warn!(file = %document.filename, %err, "rejected upload candidate");
                rejected.push(document.filename);
                continue;
            }
            self.files.push(QueuedFile {
                id: self.next_id,
                document,
                status: UploadStatus::Pending,
            });
            self.next_id += 1;
            accepted += 1;
        }
        self.error = if rejected.is_empty() {
            None
        } else {
            Some(format!(
                "Only PDF files up to 5 MB are allowed; ignored: {}",
                rejected.join(", ")
            ))
        };
        accepted
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.files.len();
        self.files.retain(|file| file.id != id);
        self.files.len() != before
    }

    /// Uploads pending entries one at a time. A failure marks only that
    /// entry; the rest of the batch continues.
    pub async fn upload_all(&mut self, uploader: &dyn DocumentUploader) -> UploadSummary {
        let mut summary = UploadSummary::default();
        for file in self
            .files
            .iter_mut()
            .filter(|file| file.status == UploadStatus::Pending)
        {
            match uploader.upload(&file.document).await {
                Ok(()) => {
                    info!(file = %file.document.filename, "uploaded");
                    file.status = UploadStatus::Uploaded;
                    summary.uploaded += 1;
                }
                Err(err) => {
                    warn!(file = %file.document.filename, %err, "upload failed");
                    self.error = Some(format!(
                        "Failed to upload {}; please try again.",
                        file.document.filename
                    ));
                    file.status = UploadStatus::Failed(err.user_message());
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Waits out the linger delay, then drops uploaded entries. Failed ones
    /// stay until removed.
    pub async fn finish_batch(&mut self) -> usize {
        tokio::time::sleep(self.linger).await;
        self.prune_uploaded()
    }

    pub fn prune_uploaded(&mut self) -> usize {
        let before = self.files.len();
        self.files.retain(|file| file.status != UploadStatus::Uploaded);
        before - self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        attachment::{MAX_PDF_BYTES, PDF_MIME},
        error::ClientError,
    };

    #[derive(Default)]
    struct RecordingUploader {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DocumentUploader for RecordingUploader {
        async fn upload(&self, document: &Document) -> Result<()> {
            self.seen.lock().unwrap().push(document.filename.clone());
            if document.filename.starts_with("bad") {
                return Err(ClientError::InvalidResponse("rejected".into()));
            }
            Ok(())
        }
    }

    fn pdf(name: &str) -> Document {
        Document::new(name, PDF_MIME, b"%PDF-1.7".to_vec())
    }

    #[test]
    fn add_keeps_only_pdfs_and_reports_the_rest() {
        let mut queue = UploadQueue::new(Duration::from_secs(2));
        let accepted = queue.add([
            pdf("a.pdf"),
            Document::new("photo.jpg", "image/jpeg", vec![1]),
            Document::new("huge.pdf", PDF_MIME, vec![0; MAX_PDF_BYTES + 1]),
        ]);

        assert_eq!(accepted, 1);
        assert_eq!(queue.files().len(), 1);
        assert_eq!(queue.files()[0].status, UploadStatus::Pending);
        let error = queue.error().expect("rejection message");
        assert!(error.contains("photo.jpg") && error.contains("huge.pdf"));

        queue.add([pdf("b.pdf")]);
        assert!(queue.error().is_none());
    }

    #[test]
    fn remove_by_id() {
        let mut queue = UploadQueue::new(Duration::from_secs(2));
        queue.add([pdf("a.pdf"), pdf("b.pdf")]);
        let id = queue.files()[0].id;

        assert!(queue.remove(id));
        assert!(!queue.remove(id));
        assert_eq!(queue.files()[0].document.filename, "b.pdf");
    }

    #[tokio::test(start_paused = true)]
    async fn uploads_sequentially_and_prunes_successes_after_linger() {
        let uploader = RecordingUploader::default();
        let mut queue = UploadQueue::new(Duration::from_secs(2));
        queue.add([pdf("a.pdf"), pdf("bad.pdf"), pdf("c.pdf")]);

        let summary = queue.upload_all(&uploader).await;
        assert_eq!(summary, UploadSummary { uploaded: 2, failed: 1 });
        assert_eq!(
            *uploader.seen.lock().unwrap(),
            vec!["a.pdf", "bad.pdf", "c.pdf"]
        );
        assert_eq!(queue.files().len(), 3);
        assert!(queue.error().unwrap().contains("bad.pdf"));

        let start = tokio::time::Instant::now();
        assert_eq!(queue.finish_batch().await, 2);
        assert!(start.elapsed() >= Duration::from_secs(2));

        let remaining = queue.files();
        assert_eq!(remaining.len(), 1);
        assert!(matches!(remaining[0].status, UploadStatus::Failed(_)));

        // a second run skips entries that already failed
        let summary = queue.upload_all(&uploader).await;
        assert_eq!(summary, UploadSummary::default());
    }
}
