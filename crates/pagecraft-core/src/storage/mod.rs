//! Storage abstraction for persistence.

mod api;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use api::{ApiResponse, ApiStorage};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::page::PageContent;
use crate::registry::{ComponentPrototype, PrototypeId, content_hash};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
///
/// `Send` on native so stores can be shared by a multi-threaded server.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Boxed future for async operations (WASM is single-threaded).
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Page and component persistence.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Load the saved page. An empty store yields an empty page.
    fn load_page(&self) -> BoxFuture<'_, StorageResult<PageContent>>;

    /// Replace the saved page.
    fn save_page(&self, page: &PageContent) -> BoxFuture<'_, StorageResult<()>>;

    /// All saved custom components.
    fn list_components(&self) -> BoxFuture<'_, StorageResult<Vec<ComponentPrototype>>>;

    /// Save a component, assigning its content hash if the id is unset.
    fn save_component(&self, prototype: &ComponentPrototype) -> BoxFuture<'_, StorageResult<ComponentPrototype>>;

    /// Delete a saved component.
    fn delete_component(&self, id: PrototypeId) -> BoxFuture<'_, StorageResult<()>>;
}

/// Page and component persistence (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn load_page(&self) -> BoxFuture<'_, StorageResult<PageContent>>;
    fn save_page(&self, page: &PageContent) -> BoxFuture<'_, StorageResult<()>>;
    fn list_components(&self) -> BoxFuture<'_, StorageResult<Vec<ComponentPrototype>>>;
    fn save_component(&self, prototype: &ComponentPrototype) -> BoxFuture<'_, StorageResult<ComponentPrototype>>;
    fn delete_component(&self, id: PrototypeId) -> BoxFuture<'_, StorageResult<()>>;
}

/// Give a prototype its content-derived id if it has none.
pub(crate) fn with_assigned_id(prototype: &ComponentPrototype) -> ComponentPrototype {
    let mut prototype = prototype.clone();
    if prototype.id == 0 {
        prototype.id = content_hash(&prototype);
    }
    prototype
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
