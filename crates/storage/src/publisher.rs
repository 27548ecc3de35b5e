//! Publishes one run's artifacts: downloaded files plus the trajectory.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    serde::Serialize,
    tracing::{debug, info},
};

use crate::{error::StorageError, store::ObjectStore};

const TRAJECTORY_FILENAME: &str = "trajectory.json";

/// A downloaded file captured at publish time.
struct Artifact {
    filename: String,
    path: PathBuf,
}

/// Uploads run artifacts and hands back retrieval URLs, or local paths when
/// no store is configured.
pub struct ArtifactPublisher {
    store: Option<Arc<dyn ObjectStore>>,
    presign_ttl: Duration,
}

impl ArtifactPublisher {
    pub fn new(store: Option<Arc<dyn ObjectStore>>, presign_ttl: Duration) -> Self {
        Self { store, presign_ttl }
    }

    /// Publishes everything under `downloads_dir` plus the trajectory record.
    ///
    /// With a store configured, all uploads run concurrently and any single
    /// failure fails the publish. Without one, downloads resolve to their
    /// local paths and the trajectory stays in the response only.
    pub async fn publish<T: Serialize + Sync>(
        &self,
        session_id: &str,
        downloads_dir: &Path,
        trajectory: &T,
    ) -> Result<BTreeMap<String, String>, StorageError> {
        let artifacts = snapshot_downloads(downloads_dir).await?;
        debug!(
            session_id,
            count = artifacts.len(),
            dir = %downloads_dir.display(),
            "collected downloaded artifacts"
        );

        let Some(store) = &self.store else {
            return Ok(artifacts
                .into_iter()
                .map(|a| (a.filename, a.path.display().to_string()))
                .collect());
        };

        let uploads = artifacts.iter().map(|artifact| {
            let key = format!("{session_id}/{}", artifact.filename);
            async move {
                store.put_file(&key, &artifact.path).await?;
                let url = store.presigned_get(&key, self.presign_ttl).await?;
                Ok::<_, StorageError>((artifact.filename.clone(), url))
            }
        });

        // The trajectory is stored for later inspection but is not a
        // download; it never appears in the returned mapping.
        let trajectory_key = format!("{session_id}/{TRAJECTORY_FILENAME}");
        let trajectory_bytes = serde_json::to_vec_pretty(trajectory)?;
        let trajectory_upload =
            store.put_bytes(&trajectory_key, trajectory_bytes, "application/json");

        let (uploaded, ()) =
            tokio::try_join!(futures::future::try_join_all(uploads), trajectory_upload)?;

        let published: BTreeMap<String, String> = uploaded.into_iter().collect();
        info!(session_id, downloads = published.len(), "published run artifacts");
        Ok(published)
    }
}

/// Regular files in the downloads directory, keyed by filename. A missing
/// directory means the session downloaded nothing.
async fn snapshot_downloads(dir: &Path) -> Result<Vec<Artifact>, StorageError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut artifacts = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        artifacts.push(Artifact {
            filename: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }
    Ok(artifacts)
}
