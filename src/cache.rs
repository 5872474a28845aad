use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

use crate::models::ResolvedLocation;
use crate::providers::ProviderId;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    place: String,
    location: ResolvedLocation,
}

/// On-disk map from `(provider, place name)` to a resolved location.
///
/// Each entry lives in its own file under `<root>/<provider>/`, named by the
/// SHA-256 of the normalized place, so lookups and writes never touch other
/// entries. Entries never expire.
#[derive(Debug, Clone)]
pub struct LocationCache {
    root: PathBuf,
}

impl LocationCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lowercases, trims and collapses inner whitespace
    pub fn normalize(place: &str) -> String {
        place
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    fn provider_dir(&self, provider: ProviderId) -> PathBuf {
        self.root.join(provider.as_str())
    }

    fn entry_path(&self, provider: ProviderId, normalized: &str) -> PathBuf {
        let key = format!("{:x}", Sha256::digest(normalized.as_bytes()));
        self.provider_dir(provider).join(format!("{}.json", key))
    }

    /// Looks up a cached location. Unreadable or corrupt entries count as misses.
    pub async fn get(&self, provider: ProviderId, place: &str) -> Option<ResolvedLocation> {
        let normalized = Self::normalize(place);
        let path = self.entry_path(provider, &normalized);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read location cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.place == normalized => Some(entry.location),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Ignoring corrupt location cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Stores a resolved location, replacing any previous entry atomically
    pub async fn put(
        &self,
        provider: ProviderId,
        place: &str,
        location: &ResolvedLocation,
    ) -> io::Result<()> {
        let normalized = Self::normalize(place);
        let path = self.entry_path(provider, &normalized);
        let dir = self.provider_dir(provider);
        fs::create_dir_all(&dir).await?;

        let entry = CacheEntry {
            place: normalized,
            location: location.clone(),
        };
        let json = serde_json::to_vec_pretty(&entry)?;

        // Readers only ever see a complete file: write aside, then rename over.
        let tmp = dir.join(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        write_replacing(&tmp, &path, &json).await?;

        tracing::debug!("Cached location for '{}' at {}", entry.place, path.display());
        Ok(())
    }

    /// Removes every entry of one provider, returning how many were deleted
    pub async fn clear(&self, provider: ProviderId) -> io::Result<usize> {
        let dir = self.provider_dir(provider);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        tracing::info!("Cleared {} cached {} locations", removed, provider);
        Ok(removed)
    }
}

/// Writes `bytes` to `tmp` and renames it over `path`; `tmp` never outlives a failure
async fn write_replacing(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let result = async {
        fs::write(tmp, bytes).await?;
        fs::rename(tmp, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(tmp).await;
    }
    result
}
