use configs::{DatabaseConfig, FileStorageConfig, StorageConfig, StorageKind};
use storage::Storage;
use tempfile::TempDir;

/// A ready facade plus whatever must outlive it.
pub struct Harness {
    pub label: &'static str,
    pub storage: Storage,
    pub dir: TempDir,
}

impl Harness {
    /// Same backend, fresh handle: what a new process would see. Only the
    /// file backend can be reopened; the in-memory database dies with its pool.
    pub async fn reopen(&self) -> anyhow::Result<Option<Storage>> {
        if self.label != "file" {
            return Ok(None);
        }
        let storage = Storage::from_config(&file_config(&self.dir)).await?;
        storage.reload().await?;
        Ok(Some(storage))
    }
}

fn file_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        kind: StorageKind::File,
        env: "test".into(),
        file: FileStorageConfig { path: dir.path().join("file.json").to_string_lossy().into_owned() },
        database: DatabaseConfig::default(),
    }
}

fn db_config() -> StorageConfig {
    StorageConfig {
        kind: StorageKind::Db,
        env: "test".into(),
        file: FileStorageConfig::default(),
        database: DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() },
    }
}

/// One reloaded facade per backend.
pub async fn backends() -> anyhow::Result<Vec<Harness>> {
    common::utils::logging::init_test_logging();
    let mut out = Vec::new();
    for (label, kind) in [("file", StorageKind::File), ("db", StorageKind::Db)] {
        let dir = tempfile::tempdir()?;
        let cfg = match kind {
            StorageKind::File => file_config(&dir),
            StorageKind::Db => db_config(),
        };
        let storage = Storage::from_config(&cfg).await?;
        storage.reload().await?;
        out.push(Harness { label, storage, dir });
    }
    Ok(out)
}
