//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult, with_assigned_id};
use crate::page::PageContent;
use crate::registry::{ComponentPrototype, PrototypeId};
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    page: RwLock<Option<PageContent>>,
    components: RwLock<Vec<ComponentPrototype>>,
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_page(&self) -> StorageResult<PageContent> {
        let page = self.page.read().map_err(lock_error)?;
        Ok(page.clone().unwrap_or_default())
    }

    fn write_page(&self, page: PageContent) -> StorageResult<()> {
        *self.page.write().map_err(lock_error)? = Some(page);
        Ok(())
    }

    fn read_components(&self) -> StorageResult<Vec<ComponentPrototype>> {
        Ok(self.components.read().map_err(lock_error)?.clone())
    }

    fn write_component(&self, prototype: &ComponentPrototype) -> StorageResult<ComponentPrototype> {
        let prototype = with_assigned_id(prototype);
        let mut components = self.components.write().map_err(lock_error)?;
        match components.iter_mut().find(|p| p.id == prototype.id) {
            Some(existing) => *existing = prototype.clone(),
            None => components.push(prototype.clone()),
        }
        Ok(prototype)
    }

    fn remove_component(&self, id: PrototypeId) -> StorageResult<()> {
        let mut components = self.components.write().map_err(lock_error)?;
        let index = components
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("component {}", id)))?;
        components.remove(index);
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn load_page(&self) -> BoxFuture<'_, StorageResult<PageContent>> {
        let result = self.read_page();
        Box::pin(async move { result })
    }

    fn save_page(&self, page: &PageContent) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.write_page(page.clone());
        Box::pin(async move { result })
    }

    fn list_components(&self) -> BoxFuture<'_, StorageResult<Vec<ComponentPrototype>>> {
        let result = self.read_components();
        Box::pin(async move { result })
    }

    fn save_component(&self, prototype: &ComponentPrototype) -> BoxFuture<'_, StorageResult<ComponentPrototype>> {
        let result = self.write_component(prototype);
        Box::pin(async move { result })
    }

    fn delete_component(&self, id: PrototypeId) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.remove_component(id);
        Box::pin(async move { result })
    }
}
