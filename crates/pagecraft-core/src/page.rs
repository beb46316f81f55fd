//! Page document: the element list plus page-level settings.

use crate::element::ElementInstance;
use serde::{Deserialize, Serialize};

/// Page-level layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSettings {
    pub responsive: bool,
    pub width: u32,
    pub height: u32,
    /// CSS max-width of the published page.
    pub max_width: String,
    pub bg_color: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            responsive: true,
            width: 1200,
            height: 800,
            max_width: "none".to_string(),
            bg_color: "#ffffff".to_string(),
        }
    }
}

/// Everything that gets saved for a page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub elements: Vec<ElementInstance>,
    #[serde(default)]
    pub settings: PageSettings,
}

impl PageContent {
    pub fn new(elements: Vec<ElementInstance>, settings: PageSettings) -> Self {
        Self { elements, settings }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
