//! PageCraft Core Library
//!
//! Platform-agnostic data model, gestures and history for the PageCraft
//! visual page builder.

pub mod camera;
pub mod config;
pub mod editor;
pub mod element;
pub mod history;
pub mod input;
pub mod interaction;
pub mod notify;
pub mod page;
pub mod registry;
pub mod selection;
pub mod storage;
pub mod viewport;

pub use camera::Viewport;
pub use config::{ConfigError, EditorConfig, WheelPolicy};
pub use editor::{Editor, EditorError};
pub use element::{ContentItem, ElementError, ElementId, ElementInstance};
pub use history::{HistoryError, HistoryLog, HistorySnapshot};
pub use input::{Modifiers, MouseButton, PointerEvent, WheelEvent};
pub use interaction::{GestureGuard, GestureOutcome, GestureState, GestureSubscription, InteractionController};
pub use notify::{Notification, NotificationKind, Notifications};
pub use page::{PageContent, PageSettings};
pub use registry::property::{PropertyCategory, PropertyKind, PropertySpec, PropertyValue};
pub use registry::{ComponentCategory, ComponentPrototype, ComponentRegistry, PrototypeId, RegistryError};
pub use selection::{Corner, HitTarget};
pub use storage::{ApiResponse, ApiStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use viewport::{PanState, ViewportController};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
