//! Moving consumed raw payloads from the staging prefix to the processed prefix.
//!
//! Storage offers no atomic rename, so a move is copy-then-delete. Another
//! transform run may be archiving the same object concurrently: a source that
//! vanished after its processed copy appeared, or a delete that finds nothing,
//! both mean the other run got there first and are not errors.

use crate::core::layout::{self, STAGING_PREFIX};
use crate::domain::model::ArchiveScope;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { to: String },
    /// Someone else finished (or is finishing) the move.
    AlreadyArchived { to: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub archived: Vec<String>,
    pub already_archived: Vec<String>,
    pub failed: Vec<String>,
}

impl ArchiveReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub async fn move_object<S: Storage>(storage: &S, from: &str, to: &str) -> Result<MoveOutcome> {
    match storage.copy_file(from, to).await {
        Ok(()) => {}
        Err(EtlError::ObjectNotFound { .. }) => {
            // 來源不見了：若目的地已存在，代表另一個執行已完成封存
            return match storage.read_file(to).await {
                Ok(_) => Ok(MoveOutcome::AlreadyArchived { to: to.to_string() }),
                Err(EtlError::ObjectNotFound { .. }) => Err(EtlError::PartialArchiveError {
                    object: from.to_string(),
                    reason: format!("missing from both staging and '{}'", to),
                }),
                Err(e) => Err(EtlError::PartialArchiveError {
                    object: from.to_string(),
                    reason: format!("source gone and processed copy unreadable: {}", e),
                }),
            };
        }
        Err(e) => {
            return Err(EtlError::PartialArchiveError {
                object: from.to_string(),
                reason: format!("copy to '{}' failed: {}", to, e),
            })
        }
    }

    match storage.delete_file(from).await {
        Ok(true) => Ok(MoveOutcome::Moved { to: to.to_string() }),
        Ok(false) => Ok(MoveOutcome::AlreadyArchived { to: to.to_string() }),
        Err(e) => Err(EtlError::PartialArchiveError {
            object: from.to_string(),
            reason: format!("copied to '{}' but delete failed: {}", to, e),
        }),
    }
}

/// Archives one staging object under the processed prefix.
pub async fn archive_object<S: Storage>(storage: &S, staging_path: &str) -> Result<MoveOutcome> {
    let processed =
        layout::processed_path_for(staging_path).ok_or_else(|| EtlError::ProcessingError {
            message: format!("'{}' is not under {}", staging_path, STAGING_PREFIX),
        })?;

    let outcome = move_object(storage, staging_path, &processed).await?;
    match &outcome {
        MoveOutcome::Moved { to } => tracing::info!("🗄️ Archived {} -> {}", staging_path, to),
        MoveOutcome::AlreadyArchived { to } => {
            tracing::debug!("{} was already archived to {}", staging_path, to)
        }
    }
    Ok(outcome)
}

/// Archives every object currently under the staging prefix. Failures are
/// logged per object and collected; the sweep carries on with the rest.
pub async fn sweep_staging<S: Storage>(storage: &S) -> Result<ArchiveReport> {
    let mut report = ArchiveReport::default();

    for path in storage.list_files(STAGING_PREFIX).await? {
        if !layout::is_staging_path(&path) {
            continue;
        }
        match archive_object(storage, &path).await {
            Ok(MoveOutcome::Moved { .. }) => report.archived.push(path),
            Ok(MoveOutcome::AlreadyArchived { .. }) => report.already_archived.push(path),
            Err(e) => {
                tracing::error!(object = %path, archive_state = "partial", "❌ {}", e);
                report.failed.push(path);
            }
        }
    }

    Ok(report)
}

/// Archives according to `scope` after a run triggered by `triggering_path`.
pub async fn archive<S: Storage>(
    storage: &S,
    scope: ArchiveScope,
    triggering_path: &str,
) -> Result<ArchiveReport> {
    let report = match scope {
        ArchiveScope::Sweep => sweep_staging(storage).await?,
        ArchiveScope::TriggeringObject => {
            let mut report = ArchiveReport::default();
            match archive_object(storage, triggering_path).await {
                Ok(MoveOutcome::Moved { .. }) => report.archived.push(triggering_path.to_string()),
                Ok(MoveOutcome::AlreadyArchived { .. }) => {
                    report.already_archived.push(triggering_path.to_string())
                }
                Err(e) => {
                    tracing::error!(object = %triggering_path, archive_state = "partial", "❌ {}", e);
                    report.failed.push(triggering_path.to_string());
                }
            }
            report
        }
    };
    Ok(report)
}
