//! Element instances and the pure operations over the page's element list.
//!
//! Every operation takes the current list by reference and returns a new
//! list, so history snapshots can simply keep the old one. Operations that
//! reference a missing element are no-ops; the `try_` variants report why.

use crate::registry::property::{
    PropertyCategory, PropertyEntry, PropertySpec, PropertyValue, base_properties,
};
use crate::registry::{ComponentPrototype, PrototypeId};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier of a placed element.
pub type ElementId = u32;

/// Errors from element list operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    #[error("Element {0} cannot contain content")]
    InvalidContentTarget(ElementId),
    #[error("Element {0} has no property named {1:?}")]
    UnknownProperty(ElementId, String),
    #[error("Element {0} has no text content at index {1}")]
    NoTextAt(ElementId, usize),
}

/// One child of an element: literal text or a nested element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Text {
        #[serde(rename = "content")]
        text: String,
    },
    Element {
        #[serde(rename = "content")]
        element: ElementInstance,
    },
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }

    pub fn element(element: ElementInstance) -> Self {
        ContentItem::Element { element }
    }
}

/// A placed component on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInstance {
    pub id: ElementId,
    /// Prototype this element was created from.
    #[serde(rename = "type")]
    pub prototype: ComponentPrototype,
    /// Positional properties followed by the prototype's properties.
    pub properties: Vec<PropertyEntry>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

impl ElementInstance {
    /// Look up a property value by name.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    /// Look up a numeric property.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(PropertyValue::as_number)
    }

    /// Top-left corner in canvas units.
    pub fn position(&self) -> Point {
        Point::new(
            self.number("x").unwrap_or(0.0),
            self.number("y").unwrap_or(0.0),
        )
    }

    /// Size in canvas units.
    pub fn size(&self) -> Size {
        Size::new(
            self.number("width").unwrap_or(0.0),
            self.number("height").unwrap_or(0.0),
        )
    }

    /// Bounding rectangle in canvas units.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Whether new content may be appended to this element.
    pub fn can_contain_content(&self) -> bool {
        self.prototype.can_contain_content
    }

    /// Copy with the positional properties replaced.
    pub fn with_geometry(&self, position: Point, size: Size) -> Self {
        let mut element = self.clone();
        element.set_value("x", position.x.into());
        element.set_value("y", position.y.into());
        element.set_value("width", size.width.into());
        element.set_value("height", size.height.into());
        element
    }

    fn set_value(&mut self, name: &str, value: PropertyValue) -> bool {
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    /// Schema for a property: positional specs first, then the prototype's.
    pub fn spec_for(&self, name: &str) -> Option<PropertySpec> {
        base_properties()
            .into_iter()
            .find(|s| s.name == name)
            .or_else(|| self.prototype.properties.iter().find(|s| s.name == name).cloned())
    }

    /// Properties grouped by panel category, in display order.
    ///
    /// Categories with no properties are omitted.
    pub fn grouped_properties(&self) -> Vec<(PropertyCategory, Vec<(PropertySpec, PropertyValue)>)> {
        let specs: Vec<PropertySpec> = base_properties()
            .into_iter()
            .chain(self.prototype.properties.iter().cloned())
            .collect();

        PropertyCategory::ALL
            .iter()
            .filter_map(|&category| {
                let fields: Vec<_> = specs
                    .iter()
                    .filter(|s| s.category == category)
                    .filter_map(|s| self.property(&s.name).map(|v| (s.clone(), v.clone())))
                    .collect();
                (!fields.is_empty()).then_some((category, fields))
            })
            .collect()
    }

    /// Direct child elements.
    pub fn children(&self) -> impl Iterator<Item = &ElementInstance> {
        self.content.iter().filter_map(|item| match item {
            ContentItem::Element { element } => Some(element),
            ContentItem::Text { .. } => None,
        })
    }

    /// Find this element or a descendant by id.
    pub fn find(&self, id: ElementId) -> Option<&ElementInstance> {
        if self.id == id {
            return Some(self);
        }
        self.children().find_map(|child| child.find(id))
    }

    /// Whether this element or any descendant was created from a prototype.
    pub fn uses_prototype(&self, prototype_id: PrototypeId) -> bool {
        self.prototype.id == prototype_id || self.children().any(|c| c.uses_prototype(prototype_id))
    }

    /// Replace this element or a descendant with the result of `f`.
    ///
    /// Returns `Ok(None)` if `id` is not in this subtree.
    fn replace_within(
        &self,
        id: ElementId,
        f: &mut dyn FnMut(&ElementInstance) -> Result<ElementInstance, ElementError>,
    ) -> Result<Option<ElementInstance>, ElementError> {
        if self.id == id {
            return f(self).map(Some);
        }
        for (index, item) in self.content.iter().enumerate() {
            if let ContentItem::Element { element } = item {
                if let Some(updated) = element.replace_within(id, f)? {
                    let mut parent = self.clone();
                    parent.content[index] = ContentItem::Element { element: updated };
                    return Ok(Some(parent));
                }
            }
        }
        Ok(None)
    }

    /// Copy of this element with a descendant removed, if it was found.
    fn remove_descendant(&self, id: ElementId) -> Option<ElementInstance> {
        for (index, item) in self.content.iter().enumerate() {
            if let ContentItem::Element { element } = item {
                if element.id == id {
                    let mut parent = self.clone();
                    parent.content.remove(index);
                    return Some(parent);
                }
                if let Some(updated) = element.remove_descendant(id) {
                    let mut parent = self.clone();
                    parent.content[index] = ContentItem::Element { element: updated };
                    return Some(parent);
                }
            }
        }
        None
    }

    /// Copy with every descendant created from `prototype_id` removed.
    fn without_prototype(&self, prototype_id: PrototypeId) -> ElementInstance {
        let mut element = self.clone();
        element.content = self
            .content
            .iter()
            .filter_map(|item| match item {
                ContentItem::Element { element } if element.prototype.id == prototype_id => None,
                ContentItem::Element { element } => Some(ContentItem::Element {
                    element: element.without_prototype(prototype_id),
                }),
                text => Some(text.clone()),
            })
            .collect();
        element
    }
}

/// Find an element anywhere in the page by id.
pub fn find(elements: &[ElementInstance], id: ElementId) -> Option<&ElementInstance> {
    elements.iter().find_map(|e| e.find(id))
}

fn try_replace(
    elements: &[ElementInstance],
    id: ElementId,
    f: &mut dyn FnMut(&ElementInstance) -> Result<ElementInstance, ElementError>,
) -> Result<Vec<ElementInstance>, ElementError> {
    for (index, element) in elements.iter().enumerate() {
        if let Some(updated) = element.replace_within(id, f)? {
            let mut out = elements.to_vec();
            out[index] = updated;
            return Ok(out);
        }
    }
    Err(ElementError::NotFound(id))
}

fn or_unchanged(
    op: &str,
    elements: &[ElementInstance],
    result: Result<Vec<ElementInstance>, ElementError>,
) -> Vec<ElementInstance> {
    result.unwrap_or_else(|err| {
        log::debug!("{op} ignored: {err}");
        elements.to_vec()
    })
}

/// Replace one property value on one element.
pub fn try_update_property(
    elements: &[ElementInstance],
    id: ElementId,
    name: &str,
    value: PropertyValue,
) -> Result<Vec<ElementInstance>, ElementError> {
    try_update_properties(elements, id, &[(name.to_string(), value)])
}

/// Replace one property value; unknown ids or names leave the list unchanged.
pub fn update_property(
    elements: &[ElementInstance],
    id: ElementId,
    name: &str,
    value: PropertyValue,
) -> Vec<ElementInstance> {
    or_unchanged("update_property", elements, try_update_property(elements, id, name, value))
}

/// Replace several property values on one element at once.
///
/// Fails without applying anything if any name is unknown.
pub fn try_update_properties(
    elements: &[ElementInstance],
    id: ElementId,
    updates: &[(String, PropertyValue)],
) -> Result<Vec<ElementInstance>, ElementError> {
    try_replace(elements, id, &mut |element| {
        let mut element = element.clone();
        for (name, value) in updates {
            if !element.set_value(name, value.clone()) {
                return Err(ElementError::UnknownProperty(element.id, name.clone()));
            }
        }
        Ok(element)
    })
}

/// Batched [`update_property`].
pub fn update_properties(
    elements: &[ElementInstance],
    id: ElementId,
    updates: &[(String, PropertyValue)],
) -> Vec<ElementInstance> {
    or_unchanged("update_properties", elements, try_update_properties(elements, id, updates))
}

/// Remove an element from the page or from its parent's content.
///
/// Clearing a selection that pointed at the element is the caller's job.
pub fn try_delete_element(
    elements: &[ElementInstance],
    id: ElementId,
) -> Result<Vec<ElementInstance>, ElementError> {
    if let Some(index) = elements.iter().position(|e| e.id == id) {
        let mut out = elements.to_vec();
        out.remove(index);
        return Ok(out);
    }
    for (index, element) in elements.iter().enumerate() {
        if let Some(updated) = element.remove_descendant(id) {
            let mut out = elements.to_vec();
            out[index] = updated;
            return Ok(out);
        }
    }
    Err(ElementError::NotFound(id))
}

pub fn delete_element(elements: &[ElementInstance], id: ElementId) -> Vec<ElementInstance> {
    or_unchanged("delete_element", elements, try_delete_element(elements, id))
}

/// Append a child element to a container's content.
pub fn try_append_content_element(
    elements: &[ElementInstance],
    parent_id: ElementId,
    child: ElementInstance,
) -> Result<Vec<ElementInstance>, ElementError> {
    let mut child = Some(child);
    try_replace(elements, parent_id, &mut |parent| {
        if !parent.can_contain_content() {
            return Err(ElementError::InvalidContentTarget(parent.id));
        }
        let mut parent = parent.clone();
        if let Some(child) = child.take() {
            parent.content.push(ContentItem::Element { element: child });
        }
        Ok(parent)
    })
}

/// Append a child element; a missing parent or a parent that cannot hold
/// content leaves the list unchanged.
pub fn append_content_element(
    elements: &[ElementInstance],
    parent_id: ElementId,
    child: ElementInstance,
) -> Vec<ElementInstance> {
    or_unchanged(
        "append_content_element",
        elements,
        try_append_content_element(elements, parent_id, child),
    )
}

/// Append a text item to a container's content.
pub fn append_content_text(
    elements: &[ElementInstance],
    parent_id: ElementId,
    text: &str,
) -> Vec<ElementInstance> {
    let result = try_replace(elements, parent_id, &mut |parent| {
        if !parent.can_contain_content() {
            return Err(ElementError::InvalidContentTarget(parent.id));
        }
        let mut parent = parent.clone();
        parent.content.push(ContentItem::text(text));
        Ok(parent)
    });
    or_unchanged("append_content_text", elements, result)
}

/// Replace the text of an existing text item (inline editing).
pub fn try_update_content_text(
    elements: &[ElementInstance],
    parent_id: ElementId,
    index: usize,
    text: &str,
) -> Result<Vec<ElementInstance>, ElementError> {
    try_replace(elements, parent_id, &mut |parent| {
        let mut parent = parent.clone();
        match parent.content.get_mut(index) {
            Some(ContentItem::Text { text: existing }) => {
                *existing = text.to_string();
                Ok(parent)
            }
            _ => Err(ElementError::NoTextAt(parent.id, index)),
        }
    })
}

pub fn update_content_text(
    elements: &[ElementInstance],
    parent_id: ElementId,
    index: usize,
    text: &str,
) -> Vec<ElementInstance> {
    or_unchanged(
        "update_content_text",
        elements,
        try_update_content_text(elements, parent_id, index, text),
    )
}

/// Remove every element, at any depth, created from `prototype_id`.
pub fn remove_instances_of(
    elements: &[ElementInstance],
    prototype_id: PrototypeId,
) -> Vec<ElementInstance> {
    elements
        .iter()
        .filter(|e| e.prototype.id != prototype_id)
        .map(|e| e.without_prototype(prototype_id))
        .collect()
}
