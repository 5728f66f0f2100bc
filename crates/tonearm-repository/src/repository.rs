//! The audio asset coordinator.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncRead;
use tonearm_core::audio::{AudioId, AudioInfo};
use tonearm_core::index::FingerprintIndex;
use tonearm_object::ObjectStorage;
use tonearm_object::transfer::TransferOptions;

use crate::cache::CacheDir;
use crate::config::RepositoryConfig;
use crate::{Error, Result, TRACING_TARGET_REPOSITORY};

/// Whether a cache/remote synchronisation moved any bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOutcome {
    /// The file was uploaded or downloaded.
    Transferred,
    /// Nothing to do: no local file to upload, or the file is already cached.
    Skipped,
}

impl SyncOutcome {
    /// Returns `true` if bytes were transferred.
    #[inline]
    pub fn is_transferred(self) -> bool {
        matches!(self, Self::Transferred)
    }
}

/// Coordinates the local cache, remote object storage and the fingerprint
/// index.
///
/// Holds no mutable state beyond its collaborators, so every method may run
/// concurrently. Nothing is retried and nothing is rolled back.
#[derive(Clone)]
pub struct AudioRepository {
    config: RepositoryConfig,
    cache: CacheDir,
    storage: Arc<dyn ObjectStorage>,
    index: Arc<dyn FingerprintIndex>,
}

impl AudioRepository {
    /// Creates a repository over `storage` and `index`.
    pub fn new(
        config: RepositoryConfig,
        storage: impl ObjectStorage + 'static,
        index: impl FingerprintIndex + 'static,
    ) -> Result<Self> {
        Self::from_shared(config, Arc::new(storage), Arc::new(index))
    }

    /// Creates a repository over shared collaborators.
    pub fn from_shared(
        config: RepositoryConfig,
        storage: Arc<dyn ObjectStorage>,
        index: Arc<dyn FingerprintIndex>,
    ) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_REPOSITORY,
            audio_dir = %config.audio_dir.display(),
            default_bucket = %config.default_bucket,
            key_layout = %config.key_layout,
            "Audio repository created"
        );

        Ok(Self {
            cache: CacheDir::new(&config.audio_dir),
            config,
            storage,
            index,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Returns the cache directory.
    pub fn cache(&self) -> &CacheDir {
        &self.cache
    }

    fn bucket<'a>(&'a self, bucket: Option<&'a str>) -> &'a str {
        bucket.unwrap_or(&self.config.default_bucket)
    }

    /// Registers an asset in the index and uploads it to remote storage.
    ///
    /// `path` names the asset in the cache directory and is hashed into its
    /// [`AudioId`]. The index receives the cached file, or no path when the
    /// file is absent. The cached file is then uploaded to `bucket` (or the
    /// default bucket) under the key derived from `info`; empty descriptor
    /// fields are left out of that key.
    ///
    /// Returns the index's own success flag. If the upload fails the index
    /// entry stays and the upload error is returned; with the file absent
    /// that error is `SourceNotFound`. A descriptor with no non-empty key
    /// field is still stored, then fails with [`Error::EmptyKey`].
    pub async fn register_audio(
        &self,
        info: &AudioInfo,
        path: &str,
        bucket: Option<&str>,
    ) -> Result<bool> {
        self.register_audio_with(info, path, bucket, &TransferOptions::default())
            .await
    }

    /// [`register_audio`](Self::register_audio) with transfer options.
    #[tracing::instrument(
        name = "repository.register_audio",
        skip_all,
        target = TRACING_TARGET_REPOSITORY,
        fields(path = %path, author = %info.author, album = %info.album, title = %info.title)
    )]
    pub async fn register_audio_with(
        &self,
        info: &AudioInfo,
        path: &str,
        bucket: Option<&str>,
        options: &TransferOptions,
    ) -> Result<bool> {
        let id = AudioId::from_path(path);
        let local_path = self.cache.resolve(path)?;
        let cached = self.cache.existing(path).await?;
        let bucket = self.bucket(bucket);

        let registered = self.index.store(id, cached.as_deref(), info)?;

        tracing::info!(
            target: TRACING_TARGET_REPOSITORY,
            id = %id,
            registered,
            cached = cached.is_some(),
            "Audio stored in fingerprint index"
        );

        let Some(destination) = self.config.key_layout.destination_key(info) else {
            tracing::warn!(
                target: TRACING_TARGET_REPOSITORY,
                id = %id,
                "No remote key for descriptor after index registration"
            );
            return Err(Error::EmptyKey);
        };

        let source = cached.unwrap_or(local_path);
        if let Err(err) = self
            .storage
            .upload(bucket, &source, &destination, options)
            .await
        {
            tracing::warn!(
                target: TRACING_TARGET_REPOSITORY,
                id = %id,
                bucket = %bucket,
                destination = %destination,
                error = %err,
                "Upload failed after index registration"
            );
            return Err(err.into());
        }

        tracing::info!(
            target: TRACING_TARGET_REPOSITORY,
            id = %id,
            bucket = %bucket,
            destination = %destination,
            "Audio registered"
        );

        Ok(registered)
    }

    /// Returns the descriptor of the best index match for `path`.
    pub fn get_audio(&self, path: impl AsRef<Path>) -> Result<AudioInfo> {
        let best = self.index.query(path.as_ref())?;
        Ok(self.index.describe(best.id)?)
    }

    /// Returns the descriptors of every index match for `path`, in the
    /// index's order.
    pub fn get_audio_list(&self, path: impl AsRef<Path>) -> Result<Vec<AudioInfo>> {
        self.index
            .query_list(path.as_ref())?
            .into_iter()
            .map(|m| self.index.describe(m.id).map_err(Error::from))
            .collect()
    }

    /// Copies `reader` into the cache as `file_name`, replacing any existing
    /// file. Returns the cached path.
    pub async fn save_audio<R>(&self, reader: &mut R, file_name: &str) -> Result<PathBuf>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.cache.save(reader, file_name).await
    }

    /// Returns the cached path of `name` if the file exists.
    pub async fn audio_path(&self, name: &str) -> Result<Option<PathBuf>> {
        self.cache.existing(name).await
    }

    /// Uploads the cached `file_name` under the same key.
    ///
    /// Skips without touching storage when the file is not cached.
    pub async fn upload(&self, file_name: &str, bucket: Option<&str>) -> Result<SyncOutcome> {
        self.upload_with(file_name, bucket, &TransferOptions::default())
            .await
    }

    /// [`upload`](Self::upload) with transfer options.
    #[tracing::instrument(
        name = "repository.upload",
        skip_all,
        target = TRACING_TARGET_REPOSITORY,
        fields(file_name = %file_name, bucket = ?bucket)
    )]
    pub async fn upload_with(
        &self,
        file_name: &str,
        bucket: Option<&str>,
        options: &TransferOptions,
    ) -> Result<SyncOutcome> {
        let Some(local_path) = self.cache.existing(file_name).await? else {
            tracing::debug!(
                target: TRACING_TARGET_REPOSITORY,
                file_name,
                "Upload skipped: file not cached"
            );
            return Ok(SyncOutcome::Skipped);
        };

        let bucket = self.bucket(bucket);
        self.storage
            .upload(bucket, &local_path, file_name, options)
            .await?;

        Ok(SyncOutcome::Transferred)
    }

    /// Downloads `file_name` into the cache when it is not cached yet.
    ///
    /// An existing cached file is left untouched, however stale.
    pub async fn download(&self, file_name: &str, bucket: Option<&str>) -> Result<SyncOutcome> {
        self.download_with(file_name, bucket, &TransferOptions::default())
            .await
    }

    /// [`download`](Self::download) with transfer options.
    #[tracing::instrument(
        name = "repository.download",
        skip_all,
        target = TRACING_TARGET_REPOSITORY,
        fields(file_name = %file_name, bucket = ?bucket)
    )]
    pub async fn download_with(
        &self,
        file_name: &str,
        bucket: Option<&str>,
        options: &TransferOptions,
    ) -> Result<SyncOutcome> {
        let local_path = self.cache.resolve(file_name)?;
        if self.cache.existing(file_name).await?.is_some() {
            tracing::debug!(
                target: TRACING_TARGET_REPOSITORY,
                file_name,
                "Download skipped: file already cached"
            );
            return Ok(SyncOutcome::Skipped);
        }

        let bucket = self.bucket(bucket);
        self.storage
            .download(bucket, file_name, &local_path, options)
            .await?;

        Ok(SyncOutcome::Transferred)
    }
}

impl fmt::Debug for AudioRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioRepository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tonearm_object::providers::MemoryProvider;
    use tonearm_test::{MemoryIndex, RecordingStorage, StorageCall};

    use super::*;

    struct Fixture {
        _temp: TempDir,
        cache: PathBuf,
        storage: Arc<RecordingStorage>,
        index: Arc<MemoryIndex>,
        repository: AudioRepository,
    }

    fn fixture() -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let cache = temp.path().join("cache");
        std::fs::create_dir(&cache).unwrap();

        let storage = Arc::new(RecordingStorage::new(
            MemoryProvider::new().with_bucket("audio").with_bucket("archive"),
        ));
        let index = Arc::new(MemoryIndex::default());
        let repository = AudioRepository::from_shared(
            RepositoryConfig::new(&cache, "audio"),
            storage.clone(),
            index.clone(),
        )
        .unwrap();

        Fixture {
            _temp: temp,
            cache,
            storage,
            index,
            repository,
        }
    }

    fn descriptor() -> AudioInfo {
        AudioInfo::new("A", "B", "C")
    }

    #[tokio::test]
    async fn register_then_get() {
        let f = fixture();
        std::fs::write(f.cache.join("song.mp3"), b"ID3 song").unwrap();

        let registered = f
            .repository
            .register_audio(&descriptor(), "song.mp3", None)
            .await
            .unwrap();
        assert!(registered);

        assert_eq!(f.repository.get_audio("song.mp3").unwrap(), descriptor());
        assert!(f.storage.exists("audio", "A/B/C").await.unwrap());

        let entry = f.index.entry(AudioId::from_path("song.mp3")).unwrap();
        assert_eq!(entry.path, Some(f.cache.join("song.mp3")));
    }

    #[tokio::test]
    async fn register_with_bucket_override() {
        let f = fixture();
        std::fs::write(f.cache.join("song.mp3"), b"ID3").unwrap();

        f.repository
            .register_audio(&descriptor(), "song.mp3", Some("archive"))
            .await
            .unwrap();

        assert!(f.storage.exists("archive", "A/B/C").await.unwrap());
        assert!(!f.storage.exists("audio", "A").await.unwrap());
    }

    #[tokio::test]
    async fn register_without_local_file_keeps_index_entry() {
        let f = fixture();

        let err = f
            .repository
            .register_audio(&descriptor(), "song.mp3", None)
            .await
            .unwrap_err();
        assert!(err.is_source_not_found());

        let entry = f.index.entry(AudioId::from_path("song.mp3")).unwrap();
        assert_eq!(entry.path, None);
        assert_eq!(entry.info, descriptor());

        assert_eq!(
            f.storage.calls(),
            vec![StorageCall::Upload {
                bucket: "audio".into(),
                source: f.cache.join("song.mp3"),
                destination: "A/B/C".into(),
            }]
        );
    }

    #[tokio::test]
    async fn register_upload_failure_propagates() {
        let f = fixture();
        std::fs::write(f.cache.join("song.mp3"), b"ID3").unwrap();
        f.storage.fail_uploads(true);

        let err = f
            .repository
            .register_audio(&descriptor(), "song.mp3", None)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Storage(_)));

        // Not rolled back.
        assert_eq!(f.repository.get_audio("song.mp3").unwrap(), descriptor());
    }

    #[tokio::test]
    async fn register_skips_empty_fields_in_key() {
        let f = fixture();
        std::fs::write(f.cache.join("single.mp3"), b"ID3").unwrap();

        let info = AudioInfo::new("A", "", "Single");
        assert!(
            f.repository
                .register_audio(&info, "single.mp3", None)
                .await
                .unwrap()
        );

        assert_eq!(f.index.entry(AudioId::from_path("single.mp3")).unwrap().info, info);
        assert_eq!(
            f.storage.calls(),
            vec![StorageCall::Upload {
                bucket: "audio".into(),
                source: f.cache.join("single.mp3"),
                destination: "A/Single".into(),
            }]
        );
    }

    #[tokio::test]
    async fn register_without_key_fields_still_stores() {
        let f = fixture();
        std::fs::write(f.cache.join("song.mp3"), b"ID3").unwrap();

        let info = AudioInfo::new("", "", "");
        let err = f
            .repository
            .register_audio(&info, "song.mp3", None)
            .await
            .unwrap_err();

        assert!(matches!(err, crate::Error::EmptyKey));
        assert_eq!(f.index.entry(AudioId::from_path("song.mp3")).unwrap().info, info);
        assert!(f.storage.calls().is_empty());
    }

    #[tokio::test]
    async fn get_audio_without_match() {
        let f = fixture();
        let err = f.repository.get_audio("unknown.mp3").unwrap_err();
        assert!(err.is_not_found());
        assert!(f.repository.get_audio_list("unknown.mp3").unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_audio_list_describes_every_match() {
        let f = fixture();
        std::fs::create_dir(f.cache.join("live")).unwrap();
        std::fs::write(f.cache.join("song.mp3"), b"ID3").unwrap();
        std::fs::write(f.cache.join("live/song.mp3"), b"ID3").unwrap();

        f.repository
            .register_audio(&descriptor(), "song.mp3", None)
            .await
            .unwrap();
        f.repository
            .register_audio(&AudioInfo::new("A", "Live", "C"), "live/song.mp3", None)
            .await
            .unwrap();

        let list = f.repository.get_audio_list("song.mp3").unwrap();
        assert_eq!(list.len(), 2);

        let exact = f
            .repository
            .get_audio_list(f.cache.join("live/song.mp3"))
            .unwrap();
        assert_eq!(exact[0].album, "Live");
    }

    #[tokio::test]
    async fn upload_skips_missing_file() {
        let f = fixture();

        let outcome = f.repository.upload("song.mp3", None).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(f.storage.calls().is_empty());
    }

    #[tokio::test]
    async fn upload_uses_file_name_as_key() {
        let f = fixture();
        let mut reader: &[u8] = b"RIFF....WAVE";
        f.repository.save_audio(&mut reader, "take.wav").await.unwrap();

        let outcome = f.repository.upload("take.wav", None).await.unwrap();

        assert!(outcome.is_transferred());
        assert!(f.storage.exists("audio", "take.wav").await.unwrap());
    }

    #[tokio::test]
    async fn upload_rejects_unmapped_extension() {
        let f = fixture();
        std::fs::write(f.cache.join("cover.jpg"), b"\xff\xd8").unwrap();

        let err = f.repository.upload("cover.jpg", None).await.unwrap_err();

        assert!(err.is_invalid_content_type());
        assert!(!f.storage.exists("audio", "cover").await.unwrap());
    }

    #[tokio::test]
    async fn download_skips_cached_file() {
        let f = fixture();
        std::fs::write(f.cache.join("song.mp3"), b"local").unwrap();

        let outcome = f.repository.download("song.mp3", None).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(f.storage.calls().is_empty());
        assert_eq!(std::fs::read(f.cache.join("song.mp3")).unwrap(), b"local");
    }

    #[tokio::test]
    async fn download_fills_cache_on_miss() {
        let f = fixture();
        let staging = f.cache.parent().unwrap().join("staging.mp3");
        std::fs::write(&staging, b"remote").unwrap();
        f.storage
            .upload("archive", &staging, "song.mp3", &TransferOptions::new())
            .await
            .unwrap();
        f.storage.clear_calls();

        let outcome = f
            .repository
            .download("song.mp3", Some("archive"))
            .await
            .unwrap();

        assert!(outcome.is_transferred());
        assert_eq!(
            f.repository.audio_path("song.mp3").await.unwrap(),
            Some(f.cache.join("song.mp3"))
        );
        assert_eq!(std::fs::read(f.cache.join("song.mp3")).unwrap(), b"remote");
    }

    #[tokio::test]
    async fn download_of_missing_object_leaves_cache_empty() {
        let f = fixture();

        let err = f.repository.download("ghost.mp3", None).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(f.repository.audio_path("ghost.mp3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_names_cannot_escape_cache() {
        let f = fixture();

        let err = f.repository.download("../song.mp3", None).await.unwrap_err();

        assert!(matches!(err, crate::Error::InvalidFileName { .. }));
        assert!(f.storage.calls().is_empty());
    }

    #[tokio::test]
    async fn cancelled_download_reports_cancellation() {
        let f = fixture();
        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();

        let err = f
            .repository
            .download_with(
                "song.mp3",
                None,
                &TransferOptions::new().with_cancellation(token),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::Error::Storage(tonearm_object::Error::Cancelled)
        ));
    }
}
