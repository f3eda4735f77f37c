/// Marker file writer
use crate::{error::MarkerResult, markers::MarkerDocument};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error};

/// Writes marker snapshots to a single file
///
/// Each snapshot goes to a sibling temp file first and is then renamed over
/// the marker file, so the map never reads a half-written document.
/// Writes through clones of one writer are serialized, since they share
/// the temp file.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("markers"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write a snapshot
    pub async fn write(&self, document: &MarkerDocument) -> MarkerResult<()> {
        let json = serde_json::to_vec(document)?;
        let temp_path = self.temp_path();
        let _guard = self.write_lock.lock().await;

        tokio::fs::write(&temp_path, &json).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(
            "Wrote {} marker(s) to {}",
            document.players.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write a snapshot, logging and dropping any failure
    ///
    /// The next scheduled run writes a fresh snapshot, so failures are not
    /// retried.
    pub async fn write_logged(&self, document: &MarkerDocument) -> bool {
        match self.write(document).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to write marker file {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Write a snapshot on a background task
    pub fn spawn_write(&self, document: MarkerDocument) -> JoinHandle<bool> {
        let writer = self.clone();
        tokio::spawn(async move { writer.write_logged(&document).await })
    }

    /// Current marker file contents, if written
    pub async fn read_current(&self) -> MarkerResult<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        markers::PlayerMarker,
        players::Dimension,
        profile::TextureMap,
    };
    use tempfile::TempDir;

    fn document(names: &[&str]) -> MarkerDocument {
        MarkerDocument {
            players: names
                .iter()
                .map(|name| PlayerMarker {
                    username: name.to_string(),
                    location: [0.0, 64.0, 0.0],
                    world: "world".to_string(),
                    dimension: Dimension::Normal,
                    health: 20.0,
                    saturation: 5.0,
                    food: 20,
                    bed: None,
                    level: 0.0,
                    textures: TextureMap::new(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("players.json"));

        writer.write(&document(&["Alex", "Steve"])).await.unwrap();

        let raw = writer.read_current().await.unwrap().unwrap();
        let parsed: MarkerDocument = serde_json::from_slice(&raw).unwrap();
        assert_eq!(parsed, document(&["Alex", "Steve"]));
        assert!(!dir.path().join("players.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("players.json"));

        writer.write(&document(&["Alex", "Steve"])).await.unwrap();
        writer.write(&document(&[])).await.unwrap();

        let raw = writer.read_current().await.unwrap().unwrap();
        assert_eq!(raw, br#"{"players":[]}"#);
    }

    #[tokio::test]
    async fn test_unwritable_path_is_logged_not_raised() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("missing").join("players.json"));

        assert!(!writer.write_logged(&document(&["Alex"])).await);
        assert!(writer.read_current().await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_writes_leave_valid_json() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("players.json"));
        let long = document(&["Alex", "Steve", "Notch", "Herobrine", "Jeb", "Dinnerbone"]);
        let short = document(&["Alex"]);

        for _ in 0..25 {
            let first = writer.spawn_write(long.clone());
            let second = writer.spawn_write(short.clone());
            assert!(first.await.unwrap());
            assert!(second.await.unwrap());

            let raw = writer.read_current().await.unwrap().unwrap();
            let parsed: MarkerDocument = serde_json::from_slice(&raw).unwrap();
            assert!(parsed == long || parsed == short);
        }
        assert!(!dir.path().join("players.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_spawned_write() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().join("players.json"));

        assert!(writer.spawn_write(document(&["Alex"])).await.unwrap());
        assert!(writer.read_current().await.unwrap().is_some());
    }
}
