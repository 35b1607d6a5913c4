//! JSON files on disk, one per document.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::SceneDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each document as `<id>.json` under a base directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Creates the directory if it does not exist yet.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("failed to create {}: {e}", base_path.display())))?;
        }
        Ok(Self { base_path })
    }

    /// `<data dir>/sketchboard/scenes`, falling back to the home directory.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("could not determine a data directory".to_string()))?;
        Self::new(base.join("sketchboard").join("scenes"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &SceneDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        let json = document.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))?;
            log::debug!("saved scene to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SceneDocument>> {
        let path = self.document_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))?;
            SceneDocument::from_json(&json)
                .map_err(|e| StorageError::Serialization(format!("failed to parse {}: {e}", path.display())))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| StorageError::Io(format!("failed to delete {}: {e}", path.display())))?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(Vec::new());
            }
            let entries = fs::read_dir(&base).map_err(|e| StorageError::Io(format!("failed to read directory: {e}")))?;
            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.document_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use kurbo::Point;
    use pollster::block_on;
    use tempfile::tempdir;

    fn sample() -> SceneDocument {
        let mut canvas = Canvas::new();
        canvas.begin_gesture(crate::input::PointerInput::mouse(Point::new(0.0, 0.0)));
        canvas.update_gesture(crate::input::PointerInput::mouse(Point::new(40.0, 30.0)));
        canvas.end_gesture(1);
        canvas.export_scene_at("2024-01-01T00:00:00+00:00")
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let document = sample();

        block_on(storage.save("board", &document)).unwrap();
        let loaded = block_on(storage.load("board")).unwrap();
        assert_eq!(loaded.exported_at, document.exported_at);
        assert_eq!(loaded.paths.len(), 1);
        assert_eq!(loaded.paths[0].id, document.paths[0].id);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(block_on(storage.load("missing")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        assert!(matches!(block_on(storage.load("broken")), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let document = sample();
        block_on(storage.save("two", &document)).unwrap();
        block_on(storage.save("one", &document)).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(block_on(storage.list()).unwrap(), vec!["one".to_string(), "two".to_string()]);
        block_on(storage.delete("one")).unwrap();
        assert!(!block_on(storage.exists("one")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("boards/q3:plan*", &sample())).unwrap();
        assert!(dir.path().join("boards_q3_plan_.json").exists());
        assert!(block_on(storage.load("boards/q3:plan*")).is_ok());
    }
}
