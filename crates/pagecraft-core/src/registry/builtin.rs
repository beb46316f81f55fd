//! Built-in component definitions.

use super::property::{PropertyCategory as Cat, PropertySpec, Rule};
use super::{ComponentCategory, ComponentPrototype};
use crate::element::ContentItem;

fn text_properties() -> Vec<PropertySpec> {
    vec![
        PropertySpec::color("color", "Text Color", Cat::Typography, "#000000"),
        PropertySpec::number("fontSize", "Font Size", Cat::Typography, 16.0)
            .with_validation(Rule::Positive, "Font size must be greater than 0"),
        PropertySpec::select(
            "textAlign",
            "Text Alignment",
            Cat::Typography,
            "left",
            &["left", "center", "right", "justify"],
        ),
        PropertySpec::select(
            "fontWeight",
            "Font Weight",
            Cat::Typography,
            "normal",
            &["normal", "bold", "lighter"],
        ),
    ]
}

fn container_properties() -> Vec<PropertySpec> {
    vec![
        PropertySpec::color("backgroundColor", "Background Color", Cat::Decoration, "transparent"),
        PropertySpec::text("padding", "Padding", Cat::Layout, "8px"),
        PropertySpec::number("borderRadius", "Corner Radius", Cat::Decoration, 0.0)
            .with_validation(Rule::Min(0.0), "Corner radius cannot be negative"),
        PropertySpec::color("borderColor", "Border Color", Cat::Decoration, "#e2e8f0"),
        PropertySpec::number("borderWidth", "Border Width", Cat::Decoration, 0.0)
            .with_validation(Rule::Min(0.0), "Border width cannot be negative"),
    ]
}

fn heading(name: &str, icon: &str, description: &str, margin: &str, tags: &[&str]) -> ComponentPrototype {
    ComponentPrototype::new(name, ComponentCategory::Text)
        .with_icon(icon)
        .with_description(description)
        .with_properties(text_properties())
        .with_properties([PropertySpec::text("margin", "Margin", Cat::Layout, margin)])
        .with_content(vec![ContentItem::text(name)])
        .with_tags(tags)
}

/// Drafts of every built-in component, ids unassigned.
pub fn builtin_prototypes() -> Vec<ComponentPrototype> {
    vec![
        ComponentPrototype::new("Text Block", ComponentCategory::Text)
            .with_icon("T")
            .with_description("Basic text block for general content")
            .with_properties(text_properties())
            .with_properties(container_properties())
            .with_content(vec![ContentItem::text("Edit this text")])
            .with_tags(&["text", "content", "basic"]),
        heading("Heading 1", "H1", "Large heading for main sections", "0 0 16px 0", &["heading", "title", "h1"]),
        heading("Heading 2", "H2", "Medium heading for subsections", "0 0 12px 0", &["heading", "subtitle", "h2"]),
        ComponentPrototype::new("Paragraph", ComponentCategory::Text)
            .with_icon("¶")
            .with_description("Paragraph text with line spacing")
            .with_properties(text_properties())
            .with_properties([
                PropertySpec::number("lineHeight", "Line Height", Cat::Typography, 1.5),
                PropertySpec::text("margin", "Margin", Cat::Layout, "0 0 16px 0"),
            ])
            .with_content(vec![ContentItem::text("Enter your paragraph text here")])
            .with_tags(&["text", "paragraph", "content"]),
        ComponentPrototype::new("Button", ComponentCategory::Input)
            .with_icon("⬢")
            .with_description("Clickable button element")
            .with_properties([
                PropertySpec::text("text", "Button Text", Cat::Basic, "Click me")
                    .with_validation(Rule::NonEmpty, "Button text cannot be empty"),
                PropertySpec::color("backgroundColor", "Background", Cat::Decoration, "#3b82f6"),
                PropertySpec::color("color", "Text Color", Cat::Decoration, "#ffffff"),
                PropertySpec::number("borderRadius", "Corner Radius", Cat::Decoration, 4.0),
                PropertySpec::text("padding", "Padding", Cat::Layout, "8px 16px"),
                PropertySpec::boolean("disabled", "Disabled", Cat::Advanced, false),
            ])
            .with_tags(&["button", "interactive", "click"]),
        ComponentPrototype::new("Link", ComponentCategory::Input)
            .with_icon("🔗")
            .with_description("Hyperlink element")
            .with_properties([
                PropertySpec::text("text", "Link Text", Cat::Basic, "Click here"),
                PropertySpec::text("href", "URL", Cat::Basic, "#").required(),
                PropertySpec::color("color", "Text Color", Cat::Typography, "#3b82f6"),
                PropertySpec::select(
                    "textDecoration",
                    "Text Decoration",
                    Cat::Typography,
                    "underline",
                    &["none", "underline", "line-through"],
                ),
            ])
            .with_tags(&["link", "url", "navigation"]),
        ComponentPrototype::new("Image", ComponentCategory::Media)
            .with_icon("🖼")
            .with_description("Image display element")
            .with_properties([
                PropertySpec::new(
                    "src",
                    "Image Source",
                    super::property::PropertyKind::File,
                    Cat::Basic,
                    "/api/placeholder/300/200",
                )
                .required(),
                PropertySpec::text("alt", "Alt Text", Cat::Basic, "Image description"),
                PropertySpec::select(
                    "objectFit",
                    "Object Fit",
                    Cat::Layout,
                    "cover",
                    &["contain", "cover", "fill", "none", "scale-down"],
                ),
            ])
            .with_tags(&["image", "media", "picture"]),
        ComponentPrototype::new("Container", ComponentCategory::Layout)
            .with_icon("□")
            .with_description("Generic container element")
            .with_properties(container_properties())
            .with_properties([
                PropertySpec::select("display", "Display", Cat::Layout, "block", &["block", "flex", "grid", "inline-block"])
                    .with_validation(Rule::OneOfOptions, "Unknown display mode"),
                PropertySpec::select("flexDirection", "Flex Direction", Cat::Layout, "row", &["row", "column"]),
            ])
            .with_content(Vec::new())
            .with_tags(&["container", "div", "box"]),
        ComponentPrototype::new("Input Field", ComponentCategory::Input)
            .with_icon("⌨")
            .with_description("Text input field")
            .with_properties([
                PropertySpec::text("placeholder", "Placeholder", Cat::Basic, "Enter text..."),
                PropertySpec::select(
                    "type",
                    "Input Type",
                    Cat::Basic,
                    "text",
                    &["text", "password", "email", "number", "tel"],
                ),
            ])
            .with_properties(container_properties())
            .with_tags(&["input", "form", "text"]),
        ComponentPrototype::new("Text Area", ComponentCategory::Input)
            .with_icon("📝")
            .with_description("Multiline text input")
            .with_properties([
                PropertySpec::new(
                    "placeholder",
                    "Placeholder",
                    super::property::PropertyKind::LongText,
                    Cat::Basic,
                    "Enter text...",
                ),
                PropertySpec::number("rows", "Rows", Cat::Layout, 4.0)
                    .with_validation(Rule::Min(1.0), "Rows must be at least 1"),
            ])
            .with_properties(container_properties())
            .with_tags(&["textarea", "form", "input"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_names_unique() {
        let drafts = builtin_prototypes();
        let names: HashSet<_> = drafts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), drafts.len());
    }

    #[test]
    fn test_property_names_unique_within_prototype() {
        for draft in builtin_prototypes() {
            let names: HashSet<_> = draft.properties.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names.len(), draft.properties.len(), "{}", draft.name);
        }
    }

    #[test]
    fn test_defaults_match_kinds() {
        for draft in builtin_prototypes() {
            for spec in &draft.properties {
                assert!(spec.kind.accepts(&spec.default_value), "{}.{}", draft.name, spec.name);
                assert!(spec.validate(&spec.default_value).is_empty(), "{}.{}", draft.name, spec.name);
            }
        }
    }
}
