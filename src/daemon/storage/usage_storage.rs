use std::{
    ffi::OsString,
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::entities::DailyUsageEntity;

/// Interface for abstracting storage of the daily usage.
pub trait UsageStorage {
    /// Reads previously saved usage. Absent or unreadable data is `None`, since the tracker can
    /// always start from zero.
    fn load(&self) -> impl Future<Output = Result<Option<DailyUsageEntity>>>;

    /// Replaces saved usage with `usage`.
    fn save(&self, usage: &DailyUsageEntity) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> UsageStorage for T
where
    T::Target: UsageStorage,
{
    fn load(&self) -> impl Future<Output = Result<Option<DailyUsageEntity>>> {
        self.deref().load()
    }

    fn save(&self, usage: &DailyUsageEntity) -> impl Future<Output = Result<()>> {
        self.deref().save(usage)
    }
}

/// Keeps usage in a single JSON file.
pub struct UsageFileStorage {
    data_file: PathBuf,
}

impl UsageFileStorage {
    pub fn new(data_file: PathBuf) -> Self {
        Self { data_file }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    fn temporary_file(&self) -> PathBuf {
        let mut name = OsString::from(self.data_file.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn read_contents(path: &Path) -> std::result::Result<String, std::io::Error> {
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut contents = String::new();
        let result = file.read_to_string(&mut contents).await;
        file.unlock_async().await?;
        result.map(|_| contents)
    }

    async fn write_contents(path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = File::create(path).await?;
        file.lock_exclusive()?;
        let result = async {
            file.write_all(contents).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        file.unlock_async().await?;
        Ok(result?)
    }
}

impl UsageStorage for UsageFileStorage {
    async fn load(&self) -> Result<Option<DailyUsageEntity>> {
        let contents = match Self::read_contents(&self.data_file).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No usage saved at {:?}", self.data_file);
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Can't read {:?}", self.data_file));
            }
        };

        match serde_json::from_str::<DailyUsageEntity>(&contents) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                // Can happen if the process was killed in the middle of an older non-atomic write.
                warn!(
                    "Ignoring malformed usage file {:?} {:?}: {e}",
                    self.data_file, contents
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, usage: &DailyUsageEntity) -> Result<()> {
        if let Some(parent) = self.data_file.parent().filter(|v| !v.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Can't create data directory {parent:?}"))?;
        }

        let temporary = self.temporary_file();
        let contents = serde_json::to_vec(usage)?;
        Self::write_contents(&temporary, &contents)
            .await
            .with_context(|| format!("Can't write {temporary:?}"))?;
        tokio::fs::rename(&temporary, &self.data_file)
            .await
            .with_context(|| format!("Can't replace {:?}", self.data_file))?;

        debug!("Saved {:?} into {:?}", usage, self.data_file);
        Ok(())
    }
}
