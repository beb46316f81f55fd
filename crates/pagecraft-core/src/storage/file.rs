//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult, with_assigned_id};
use crate::page::PageContent;
use crate::registry::{ComponentPrototype, PrototypeId};
use std::fs;
use std::path::{Path, PathBuf};

const PAGE_FILE: &str = "page.json";
const COMPONENTS_DIR: &str = "components";

/// File-based storage for native platforms.
///
/// Layout under the base directory:
/// `page.json` for the page and `components/<id>.json` per saved component.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for page storage.
    base_path: PathBuf,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    fs::write(path, json)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        let components = base_path.join(COMPONENTS_DIR);
        if !components.exists() {
            fs::create_dir_all(&components).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/pagecraft/`
    /// On Windows: `%LOCALAPPDATA%\pagecraft\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("pagecraft"))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn page_path(&self) -> PathBuf {
        self.base_path.join(PAGE_FILE)
    }

    fn component_path(&self, id: PrototypeId) -> PathBuf {
        self.base_path.join(COMPONENTS_DIR).join(format!("{}.json", id))
    }

    fn read_page(&self) -> StorageResult<PageContent> {
        let path = self.page_path();
        if !path.exists() {
            return Ok(PageContent::default());
        }
        read_json(&path)
    }

    fn read_components(&self) -> StorageResult<Vec<ComponentPrototype>> {
        let dir = self.base_path.join(COMPONENTS_DIR);
        if !dir.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut components = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                match read_json::<ComponentPrototype>(&path) {
                    Ok(prototype) => components.push(prototype),
                    Err(e) => log::warn!("Skipping unreadable component: {}", e),
                }
            }
        }
        components.sort_by_key(|p| p.id);
        Ok(components)
    }

    fn write_component(&self, prototype: &ComponentPrototype) -> StorageResult<ComponentPrototype> {
        let prototype = with_assigned_id(prototype);
        write_json(&self.component_path(prototype.id), &prototype)?;
        Ok(prototype)
    }

    fn remove_component(&self, id: PrototypeId) -> StorageResult<()> {
        let path = self.component_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(format!("component {}", id)));
        }
        fs::remove_file(&path)
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))
    }
}

impl Storage for FileStorage {
    fn load_page(&self) -> BoxFuture<'_, StorageResult<PageContent>> {
        Box::pin(async move { self.read_page() })
    }

    fn save_page(&self, page: &PageContent) -> BoxFuture<'_, StorageResult<()>> {
        let page = page.clone();
        Box::pin(async move { write_json(&self.page_path(), &page) })
    }

    fn list_components(&self) -> BoxFuture<'_, StorageResult<Vec<ComponentPrototype>>> {
        Box::pin(async move { self.read_components() })
    }

    fn save_component(&self, prototype: &ComponentPrototype) -> BoxFuture<'_, StorageResult<ComponentPrototype>> {
        let prototype = prototype.clone();
        Box::pin(async move { self.write_component(&prototype) })
    }

    fn delete_component(&self, id: PrototypeId) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move { self.remove_component(id) })
    }
}
