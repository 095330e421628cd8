//! Saving the Excel workbooks produced by the export endpoints.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use shared::domain::UserId;
use tracing::info;

use crate::error::{ClientError, Result};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Clients,
    Policies,
}

impl ExportKind {
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Clients => "clientes",
            Self::Policies => "polizas",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

/// `{clientes|polizas}_{user_id}_{YYYYMMDDTHHMMSSZ}.xlsx`
pub fn export_file_name(kind: ExportKind, user_id: UserId, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}.xlsx",
        kind.file_prefix(),
        user_id,
        now.format("%Y%m%dT%H%M%SZ")
    )
}

/// Writes the workbook under `dir`, creating the directory if needed.
pub async fn save_export(
    dir: &Path,
    kind: ExportKind,
    user_id: UserId,
    now: DateTime<Utc>,
    bytes: &[u8],
) -> Result<PathBuf> {
    let io_error = |source: std::io::Error| ClientError::Io {
        path: dir.to_path_buf(),
        source,
    };
    tokio::fs::create_dir_all(dir).await.map_err(io_error)?;

    let path = dir.join(export_file_name(kind, user_id, now));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| ClientError::Io {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), bytes = bytes.len(), %kind, "export saved");
    Ok(path)
}
