//! Component prototypes and the registry that owns them.
//!
//! Prototype ids are content hashes: two drafts that serialize the same
//! (ignoring ids and positional properties) get the same id, which lets
//! custom components be deduplicated. Instance ids are fresh per call.

mod builtin;
pub mod property;

pub use builtin::builtin_prototypes;

use crate::element::{ContentItem, ElementId, ElementInstance};
use kurbo::{Point, Size};
use property::{PropertyEntry, PropertySpec, is_positional};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Content-derived prototype identifier. Zero means "not yet assigned".
pub type PrototypeId = u32;

/// Size given to new elements when the caller supplies none.
pub const DEFAULT_ELEMENT_SIZE: Size = Size::new(200.0, 100.0);

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Component not found: {0}")]
    NotFound(PrototypeId),
    #[error("Component already registered: {0}")]
    DuplicatePrototype(PrototypeId),
}

/// Sidebar grouping of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Text,
    Container,
    Media,
    Input,
    Layout,
    Custom,
}

/// A reusable component definition: schema plus defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPrototype {
    #[serde(default)]
    pub id: PrototypeId,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub category: ComponentCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Property schema, in panel order. Never contains positional properties.
    pub properties: Vec<PropertySpec>,
    pub can_contain_content: bool,
    #[serde(default)]
    pub default_content: Vec<ContentItem>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ComponentPrototype {
    /// Start a prototype draft (id unassigned).
    pub fn new(name: impl Into<String>, category: ComponentCategory) -> Self {
        Self {
            id: 0,
            name: name.into(),
            icon: String::new(),
            category,
            description: None,
            properties: Vec::new(),
            can_contain_content: false,
            default_content: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_properties(mut self, properties: impl IntoIterator<Item = PropertySpec>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Allow content and set the default content.
    pub fn with_content(mut self, default_content: Vec<ContentItem>) -> Self {
        self.can_contain_content = true;
        self.default_content = default_content;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Look up a property spec by name.
    pub fn spec(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }
}

fn hash_to_id(bytes: &[u8]) -> u32 {
    let digest = Sha256::digest(bytes);
    let id = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    // Zero is reserved for unassigned ids
    id.max(1)
}

/// Compute the content-derived id of a prototype draft.
///
/// Every `id` field at any depth and the draft's positional properties are
/// excluded, so the same logical content always hashes to the same id.
pub fn content_hash(draft: &ComponentPrototype) -> PrototypeId {
    let mut canonical = draft.clone();
    canonical.properties.retain(|p| !is_positional(&p.name));
    // Plain data with string keys always serializes
    let mut value = serde_json::to_value(&canonical).unwrap_or_default();
    zero_ids(&mut value);
    let bytes = serde_json::to_vec(&value).unwrap_or_default();
    hash_to_id(&bytes)
}

fn zero_ids(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if key == "id" {
                    *field = serde_json::Value::from(0);
                } else {
                    zero_ids(field);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(zero_ids),
        _ => {}
    }
}

static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a fresh element id, unrelated to the prototype id.
///
/// Collisions are possible in principle but negligible for an editor.
pub fn generate_element_id(prototype_id: PrototypeId) -> ElementId {
    let salt = {
        let uuid = Uuid::new_v4();
        let b = uuid.as_bytes();
        u32::from_be_bytes([b[0], b[1], b[2], b[3]]) % 1_000_000
    };
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let counter = INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let input = format!("{}-{}-{}", u64::from(prototype_id) + u64::from(salt), millis, counter);
    hash_to_id(input.as_bytes())
}

/// What `register` does when the computed id already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Return the already registered prototype.
    #[default]
    Dedup,
    /// Fail with [`RegistryError::DuplicatePrototype`].
    Reject,
}

/// Catalog of component prototypes.
///
/// Constructed and owned explicitly by the application root; there is no
/// global component library.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    prototypes: Vec<ComponentPrototype>,
    policy: DuplicatePolicy,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in components.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Set the duplicate policy.
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register the built-in components. Already present ones are kept.
    pub fn register_builtins(&mut self) {
        for draft in builtin_prototypes() {
            let id = content_hash(&draft);
            if self.get(id).is_none() {
                self.prototypes.push(ComponentPrototype { id, ..draft });
            }
        }
        log::debug!("Registered {} built-in components", self.prototypes.len());
    }

    /// Register a prototype draft, assigning its content-derived id.
    pub fn register(&mut self, draft: ComponentPrototype) -> Result<ComponentPrototype, RegistryError> {
        let id = content_hash(&draft);
        if let Some(existing) = self.get(id) {
            return match self.policy {
                DuplicatePolicy::Dedup => Ok(existing.clone()),
                DuplicatePolicy::Reject => Err(RegistryError::DuplicatePrototype(id)),
            };
        }

        let mut prototype = draft;
        prototype.id = id;
        prototype.properties.retain(|p| !is_positional(&p.name));
        log::info!("Registered component {:?} ({})", prototype.name, id);
        self.prototypes.push(prototype.clone());
        Ok(prototype)
    }

    /// Insert a prototype that already has an id (e.g. loaded from storage).
    ///
    /// Replaces any prototype with the same id.
    pub fn insert(&mut self, prototype: ComponentPrototype) {
        match self.prototypes.iter_mut().find(|p| p.id == prototype.id) {
            Some(existing) => *existing = prototype,
            None => self.prototypes.push(prototype),
        }
    }

    /// Remove a prototype. Instances of it must be removed by the caller.
    pub fn remove(&mut self, id: PrototypeId) -> Result<ComponentPrototype, RegistryError> {
        let index = self
            .prototypes
            .iter()
            .position(|p| p.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        Ok(self.prototypes.remove(index))
    }

    pub fn get(&self, id: PrototypeId) -> Option<&ComponentPrototype> {
        self.prototypes.iter().find(|p| p.id == id)
    }

    /// First prototype with the given display name.
    pub fn find_by_name(&self, name: &str) -> Option<&ComponentPrototype> {
        self.prototypes.iter().find(|p| p.name == name)
    }

    /// Prototypes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentPrototype> {
        self.prototypes.iter()
    }

    pub fn by_category(&self, category: ComponentCategory) -> impl Iterator<Item = &ComponentPrototype> {
        self.prototypes.iter().filter(move |p| p.category == category)
    }

    /// Case-insensitive search over names and tags.
    pub fn search(&self, query: &str) -> Vec<&ComponentPrototype> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.prototypes.iter().collect();
        }
        self.prototypes
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Create an element from a prototype at a canvas position.
    ///
    /// Properties are the four positional ones followed by every spec's
    /// default value. Default content is deep-copied; nested elements get
    /// fresh ids.
    pub fn instantiate(
        &self,
        prototype: &ComponentPrototype,
        position: Point,
        size: Option<Size>,
    ) -> ElementInstance {
        instantiate(prototype, position, size.unwrap_or(DEFAULT_ELEMENT_SIZE))
    }

    /// Build a custom prototype draft from an element's current values.
    ///
    /// The result has id 0; pass it to [`register`](Self::register).
    pub fn derive_custom_prototype(&self, source: &ElementInstance, name: &str) -> ComponentPrototype {
        derive_custom_prototype(source, name)
    }
}

fn instantiate(prototype: &ComponentPrototype, position: Point, size: Size) -> ElementInstance {
    let mut properties = vec![
        PropertyEntry::new("x", position.x),
        PropertyEntry::new("y", position.y),
        PropertyEntry::new("width", size.width),
        PropertyEntry::new("height", size.height),
    ];
    properties.extend(
        prototype
            .properties
            .iter()
            .filter(|spec| !is_positional(&spec.name))
            .map(|spec| PropertyEntry::new(spec.name.clone(), spec.default_value.clone())),
    );

    ElementInstance {
        id: generate_element_id(prototype.id),
        prototype: prototype.clone(),
        properties,
        content: fresh_content(&prototype.default_content),
    }
}

/// Deep-copy content, giving every nested element a new id.
fn fresh_content(content: &[ContentItem]) -> Vec<ContentItem> {
    content
        .iter()
        .map(|item| match item {
            ContentItem::Text { text } => ContentItem::Text { text: text.clone() },
            ContentItem::Element { element } => ContentItem::Element {
                element: ElementInstance {
                    id: generate_element_id(element.prototype.id),
                    prototype: element.prototype.clone(),
                    properties: element.properties.clone(),
                    content: fresh_content(&element.content),
                },
            },
        })
        .collect()
}

fn derive_custom_prototype(source: &ElementInstance, name: &str) -> ComponentPrototype {
    let properties = source
        .prototype
        .properties
        .iter()
        .filter(|spec| !is_positional(&spec.name))
        .map(|spec| {
            let mut spec = spec.clone();
            if let Some(value) = source.property(&spec.name) {
                spec.default_value = value.clone();
            }
            spec
        })
        .collect();

    ComponentPrototype {
        id: 0,
        name: name.to_string(),
        icon: source.prototype.icon.clone(),
        category: ComponentCategory::Custom,
        description: Some(format!("Custom component based on {}", source.prototype.name)),
        properties,
        can_contain_content: source.prototype.can_contain_content,
        default_content: fresh_content(&source.content),
        tags: vec!["custom".to_string()],
    }
}
