//! The local audio cache directory.

use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::{Error, Result, TRACING_TARGET_CACHE};

/// A directory of cached audio files addressed by relative name.
///
/// Names may contain sub-directories but must stay inside the cache: an
/// absolute name or one with a `..` component is rejected before any I/O.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    /// Creates a cache rooted at `root`. Nothing is created on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the cache path for `name`, whether or not the file exists.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(Error::invalid_file_name(name, "file name cannot be empty"));
        }

        for component in Path::new(name).components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => {
                    return Err(Error::invalid_file_name(name, "file name cannot contain '..'"));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::invalid_file_name(name, "file name must be relative"));
                }
            }
        }

        Ok(self.root.join(name))
    }

    /// Returns the cache path for `name` if a regular file exists there.
    pub async fn existing(&self, name: &str) -> Result<Option<PathBuf>> {
        let path = self.resolve(name)?;
        let is_file = tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_file());

        Ok(is_file.then_some(path))
    }

    /// Copies `reader` into the cache under `name`, replacing any existing
    /// file. Returns the written path.
    ///
    /// Bytes go to a temporary file beside the target, renamed into place
    /// once complete. A failed copy leaves any previous file untouched and
    /// no partial file behind.
    pub async fn save<R>(&self, reader: &mut R, name: &str) -> Result<PathBuf>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.resolve(name)?;
        let parent = path.parent().unwrap_or(&self.root);
        tokio::fs::create_dir_all(parent).await?;

        // Dropping the temp path on any early return deletes the file.
        let (file, temp_path) = NamedTempFile::new_in(parent)?.into_parts();
        let mut file = File::from_std(file);
        let written = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        drop(file);

        temp_path.persist(&path).map_err(std::io::Error::from)?;

        tracing::debug!(
            target: TRACING_TARGET_CACHE,
            path = %path.display(),
            size = written,
            "Audio saved to cache"
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_escapes() {
        let cache = CacheDir::new("/cache");

        assert_eq!(cache.resolve("song.mp3").unwrap(), Path::new("/cache/song.mp3"));
        assert_eq!(
            cache.resolve("live/set.flac").unwrap(),
            Path::new("/cache/live/set.flac")
        );
        assert!(matches!(
            cache.resolve("../song.mp3"),
            Err(Error::InvalidFileName { .. })
        ));
        assert!(matches!(
            cache.resolve("/etc/passwd"),
            Err(Error::InvalidFileName { .. })
        ));
        assert!(cache.resolve("").is_err());
    }

    #[tokio::test]
    async fn save_overwrites_and_existing_finds_files() {
        let temp = tempfile::tempdir().unwrap();
        let cache = CacheDir::new(temp.path());

        assert!(cache.existing("song.mp3").await.unwrap().is_none());

        let mut first: &[u8] = b"first version, longer";
        cache.save(&mut first, "song.mp3").await.unwrap();
        let mut second: &[u8] = b"second";
        let path = cache.save(&mut second, "song.mp3").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(cache.existing("song.mp3").await.unwrap(), Some(path));
    }

    struct FailingReader {
        sent: bool,
    }

    impl AsyncRead for FailingReader {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            if self.sent {
                let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
                return std::task::Poll::Ready(Err(err));
            }

            self.sent = true;
            buf.put_slice(b"partial bytes");
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_save_leaves_no_partial_file() {
        let temp = tempfile::tempdir().unwrap();
        let cache = CacheDir::new(temp.path());

        let mut reader = FailingReader { sent: false };
        let err = cache.save(&mut reader, "live/song.mp3").await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(cache.existing("live/song.mp3").await.unwrap().is_none());
        let leftovers = std::fs::read_dir(temp.path().join("live")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_file() {
        let temp = tempfile::tempdir().unwrap();
        let cache = CacheDir::new(temp.path());

        let mut first: &[u8] = b"complete";
        let path = cache.save(&mut first, "song.mp3").await.unwrap();

        let mut reader = FailingReader { sent: false };
        assert!(cache.save(&mut reader, "song.mp3").await.is_err());

        assert_eq!(std::fs::read(&path).unwrap(), b"complete");
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn directories_are_not_cached_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("album")).unwrap();
        let cache = CacheDir::new(temp.path());

        assert!(cache.existing("album").await.unwrap().is_none());
    }
}
