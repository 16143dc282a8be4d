//! Disk-backed cache for artwork thumbnails, keyed by URL hash.
//!
//! Files are named `<sha256(url)>.png`; downloads are decoded and
//! re-encoded as PNG before they land on disk, so a cache hit returns
//! byte-identical content to the fetch that populated it. Writers to the
//! same key are serialized by a per-key mutex; distinct keys proceed in
//! parallel.

use std::{io::Cursor, path::PathBuf, sync::Arc};

use {
    dashmap::DashMap,
    sha2::{Digest, Sha256},
    thiserror::Error,
    tokio::sync::Mutex,
    tracing::debug,
};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("not a decodable image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct ImageCache {
    dir: PathBuf,
    http: reqwest::Client,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ImageCache {
    /// Open a cache rooted at `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            http: reqwest::Client::new(),
            locks: DashMap::new(),
        })
    }

    /// Cache file path for a URL.
    pub fn cached_path(&self, url: &str) -> PathBuf {
        let key = hex::encode(Sha256::digest(url.as_bytes()));
        self.dir.join(format!("{key}.png"))
    }

    /// Return the PNG bytes for `url`, downloading at most once.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.cached_path(url);
        let key = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(&path).await? {
            debug!(url, "image cache hit");
            return Ok(tokio::fs::read(&path).await?);
        }

        debug!(url, "image cache miss, downloading");
        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let decoded = image::load_from_memory(&bytes)?;
        let mut png = Vec::new();
        decoded.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        tokio::fs::write(&path, &png).await?;
        Ok(png)
    }
}
