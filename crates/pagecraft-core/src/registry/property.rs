//! Typed property schemas and values.
//!
//! A [`PropertySpec`] describes one editable property of a component
//! prototype. Its [`PropertyKind`] decides which editor the property panel
//! shows and which [`PropertyValue`] variant is accepted.

use serde::{Deserialize, Serialize};

/// Names of the positional properties every element carries.
pub const POSITIONAL_PROPERTIES: [&str; 4] = ["x", "y", "width", "height"];

/// Check whether a property name is one of `x`, `y`, `width`, `height`.
pub fn is_positional(name: &str) -> bool {
    POSITIONAL_PROPERTIES.contains(&name)
}

/// Editor type of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropertyKind {
    /// Single-line text.
    #[serde(rename = "string")]
    ShortText,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    /// CSS color string.
    #[serde(rename = "color")]
    Color,
    /// One value out of a fixed list.
    #[serde(rename = "select")]
    Select { options: Vec<String> },
    /// Multi-line text.
    #[serde(rename = "text")]
    LongText,
    /// Reference to an uploaded file or URL.
    #[serde(rename = "file")]
    File,
}

impl PropertyKind {
    /// Check whether a value has the shape this kind expects.
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match self {
            PropertyKind::Number => matches!(value, PropertyValue::Number(_)),
            PropertyKind::Boolean => matches!(value, PropertyValue::Bool(_)),
            PropertyKind::ShortText
            | PropertyKind::Color
            | PropertyKind::Select { .. }
            | PropertyKind::LongText
            | PropertyKind::File => matches!(value, PropertyValue::Text(_)),
        }
    }
}

/// Property panel group. Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyCategory {
    Layout,
    Typography,
    Decoration,
    Basic,
    Advanced,
}

impl PropertyCategory {
    /// All categories in display order.
    pub const ALL: [PropertyCategory; 5] = [
        PropertyCategory::Layout,
        PropertyCategory::Typography,
        PropertyCategory::Decoration,
        PropertyCategory::Basic,
        PropertyCategory::Advanced,
    ];
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// A named value attached to an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub name: String,
    pub value: PropertyValue,
}

impl PropertyEntry {
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Declarative validation predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "arg", rename_all = "camelCase")]
pub enum Rule {
    /// Number must be finite.
    Finite,
    /// Number must be greater than zero.
    Positive,
    Min(f64),
    Max(f64),
    /// Text must not be empty.
    NonEmpty,
    /// Text must be one of the select options.
    OneOfOptions,
}

/// A validation rule with the message shown when it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub rule: Rule,
    pub message: String,
}

/// Schema of one property of a component prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySpec {
    /// Identifier, unique within a prototype.
    pub name: String,
    /// Display label.
    pub label: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
    pub category: PropertyCategory,
    pub default_value: PropertyValue,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<Validation>,
}

impl PropertySpec {
    /// Create a property spec.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: PropertyKind,
        category: PropertyCategory,
        default_value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            category,
            default_value: default_value.into(),
            required: false,
            description: None,
            validation: Vec::new(),
        }
    }

    pub fn text(name: &str, label: &str, category: PropertyCategory, default: &str) -> Self {
        Self::new(name, label, PropertyKind::ShortText, category, default)
    }

    pub fn number(name: &str, label: &str, category: PropertyCategory, default: f64) -> Self {
        Self::new(name, label, PropertyKind::Number, category, default)
    }

    pub fn boolean(name: &str, label: &str, category: PropertyCategory, default: bool) -> Self {
        Self::new(name, label, PropertyKind::Boolean, category, default)
    }

    pub fn color(name: &str, label: &str, category: PropertyCategory, default: &str) -> Self {
        Self::new(name, label, PropertyKind::Color, category, default)
    }

    pub fn select(
        name: &str,
        label: &str,
        category: PropertyCategory,
        default: &str,
        options: &[&str],
    ) -> Self {
        let options = options.iter().map(|o| o.to_string()).collect();
        Self::new(name, label, PropertyKind::Select { options }, category, default)
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a validation rule.
    pub fn with_validation(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.validation.push(Validation {
            rule,
            message: message.into(),
        });
        self
    }

    /// Validate a candidate value.
    ///
    /// Returns the messages of every failed check; an empty list means the
    /// value is valid. Validation is advisory: callers still store the value.
    pub fn validate(&self, value: &PropertyValue) -> Vec<String> {
        let mut failures = Vec::new();

        if !self.kind.accepts(value) {
            failures.push(format!("{} has the wrong type", self.label));
            return failures;
        }

        for validation in &self.validation {
            if !self.check(&validation.rule, value) {
                failures.push(validation.message.clone());
            }
        }
        failures
    }

    fn check(&self, rule: &Rule, value: &PropertyValue) -> bool {
        match (rule, value) {
            (Rule::Finite, PropertyValue::Number(n)) => n.is_finite(),
            (Rule::Positive, PropertyValue::Number(n)) => *n > 0.0,
            (Rule::Min(min), PropertyValue::Number(n)) => n >= min,
            (Rule::Max(max), PropertyValue::Number(n)) => n <= max,
            (Rule::NonEmpty, PropertyValue::Text(s)) => !s.trim().is_empty(),
            (Rule::OneOfOptions, PropertyValue::Text(s)) => match &self.kind {
                PropertyKind::Select { options } => options.iter().any(|o| o == s),
                _ => true,
            },
            // Rule does not apply to this value type
            _ => true,
        }
    }
}

/// Specs of the positional properties shared by every element.
pub fn base_properties() -> Vec<PropertySpec> {
    vec![
        PropertySpec::number("x", "X Position", PropertyCategory::Layout, 0.0)
            .required()
            .with_validation(Rule::Finite, "X position must be a valid number"),
        PropertySpec::number("y", "Y Position", PropertyCategory::Layout, 0.0)
            .required()
            .with_validation(Rule::Finite, "Y position must be a valid number"),
        PropertySpec::number("width", "Width", PropertyCategory::Layout, 200.0)
            .required()
            .with_validation(Rule::Positive, "Width must be greater than 0"),
        PropertySpec::number("height", "Height", PropertyCategory::Layout, 100.0)
            .required()
            .with_validation(Rule::Positive, "Height must be greater than 0"),
    ]
}
