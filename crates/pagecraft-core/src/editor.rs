//! The editor: owns the page, its history and the gesture controllers.
//!
//! Every edit produces a new element list. Discrete edits (add, delete,
//! property changes, the end of a drag or resize) are committed to history;
//! live gesture updates replace the list without committing.

use crate::camera::Viewport;
use crate::config::EditorConfig;
use crate::element::{self, ElementError, ElementId, ElementInstance};
use crate::history::{HistoryError, HistoryLog};
use crate::input::{MouseButton, PointerEvent, WheelEvent};
use crate::interaction::{GestureOutcome, InteractionController};
use crate::notify::Notifications;
use crate::page::{PageContent, PageSettings};
use crate::registry::property::PropertyValue;
use crate::registry::{ComponentPrototype, ComponentRegistry, PrototypeId, RegistryError};
use crate::selection::{self, HitTarget};
use crate::storage::{Storage, StorageError};
use crate::viewport::{ViewportController, WheelSettings};
use kurbo::Point;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Element(#[from] ElementError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("Persistence failed: {0}")]
    PersistenceFailure(#[from] StorageError),
    #[error("No element selected")]
    NoSelection,
}

/// Page builder state.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    registry: ComponentRegistry,
    elements: Vec<ElementInstance>,
    history: HistoryLog,
    viewport: Viewport,
    interaction: InteractionController,
    panning: ViewportController,
    selected: Option<ElementId>,
    settings: PageSettings,
    notifications: Notifications,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with the built-in components and an empty page.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_registry(config, ComponentRegistry::with_builtins())
    }

    /// Create an editor around an existing registry.
    pub fn with_registry(config: EditorConfig, registry: ComponentRegistry) -> Self {
        let wheel = WheelSettings {
            policy: config.wheel_policy,
            zoom_step: config.wheel_zoom_step,
            zoom_sensitivity: config.wheel_zoom_sensitivity,
        };
        Self {
            registry,
            elements: Vec::new(),
            history: HistoryLog::with_capacity(Vec::<ElementInstance>::new(), config.max_history),
            viewport: Viewport::with_limits(config.min_scale, config.max_scale),
            interaction: InteractionController::new(config.min_element_size),
            panning: ViewportController::new(wheel),
            selected: None,
            settings: PageSettings::default(),
            notifications: Notifications::new(Duration::from_millis(config.notification_ttl_ms)),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn elements(&self) -> &[ElementInstance] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementInstance> {
        element::find(&self.elements, id)
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn viewport_controller(&self) -> &ViewportController {
        &self.panning
    }

    pub fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Replace the page settings. Settings are not part of undo history.
    pub fn set_settings(&mut self, settings: PageSettings) {
        self.settings = settings;
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Commits ---

    /// Replace the element list and record it, if it differs.
    fn commit(&mut self, elements: Vec<ElementInstance>) -> bool {
        if elements == self.elements {
            return false;
        }
        self.elements = elements;
        self.history.commit(self.elements.clone());
        self.retain_selection();
        true
    }

    /// Clear the selection if the selected element no longer exists.
    fn retain_selection(&mut self) {
        if let Some(id) = self.selected {
            if element::find(&self.elements, id).is_none() {
                self.selected = None;
            }
        }
    }

    // --- Selection ---

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&ElementInstance> {
        self.selected.and_then(|id| self.element(id))
    }

    /// Select an element, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id.filter(|&id| self.element(id).is_some());
    }

    // --- Element edits ---

    /// Place a new instance of a component at a canvas point and select it.
    pub fn add_component(&mut self, prototype_id: PrototypeId, canvas_point: Point) -> Result<ElementId, EditorError> {
        let prototype = self
            .registry
            .get(prototype_id)
            .ok_or(RegistryError::NotFound(prototype_id))?;
        let element = self
            .registry
            .instantiate(prototype, canvas_point, Some(self.config.default_element_size));
        let id = element.id;

        let mut elements = self.elements.clone();
        elements.push(element);
        self.commit(elements);
        self.selected = Some(id);
        log::info!("Added component {} as element {}", prototype_id, id);
        Ok(id)
    }

    /// Drop a component from the sidebar at a screen point.
    ///
    /// Dropping onto an element that accepts content nests the new element;
    /// anywhere else places it on the page.
    pub fn drop_component(&mut self, prototype_id: PrototypeId, screen_point: Point) -> Result<ElementId, EditorError> {
        let canvas_point = self.viewport.screen_to_canvas(screen_point);
        match selection::drop_target(&self.elements, canvas_point) {
            Some(parent_id) => self.drop_into(parent_id, prototype_id),
            None => self.add_component(prototype_id, canvas_point),
        }
    }

    /// Append a new instance of a component to a container's content.
    pub fn drop_into(&mut self, parent_id: ElementId, prototype_id: PrototypeId) -> Result<ElementId, EditorError> {
        let prototype = self
            .registry
            .get(prototype_id)
            .ok_or(RegistryError::NotFound(prototype_id))?;
        let child = self
            .registry
            .instantiate(prototype, Point::ZERO, Some(self.config.default_element_size));
        let id = child.id;

        let elements = element::try_append_content_element(&self.elements, parent_id, child)?;
        self.commit(elements);
        Ok(id)
    }

    /// Delete an element wherever it is nested.
    pub fn delete_element(&mut self, id: ElementId) -> Result<(), EditorError> {
        let elements = element::try_delete_element(&self.elements, id)?;
        self.commit(elements);
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<(), EditorError> {
        let id = self.selected.ok_or(EditorError::NoSelection)?;
        self.delete_element(id)
    }

    /// Check a candidate value against the element's schema.
    pub fn validate_property(&self, id: ElementId, name: &str, value: &PropertyValue) -> Result<Vec<String>, EditorError> {
        let element = self.element(id).ok_or(ElementError::NotFound(id))?;
        let spec = element
            .spec_for(name)
            .ok_or_else(|| ElementError::UnknownProperty(id, name.to_string()))?;
        Ok(spec.validate(value))
    }

    /// Set one property and commit.
    ///
    /// Validation failures are returned for display but do not block the
    /// edit.
    pub fn set_property(&mut self, id: ElementId, name: &str, value: PropertyValue) -> Result<Vec<String>, EditorError> {
        self.set_properties(id, &[(name.to_string(), value)])
    }

    /// Set several properties as one history entry.
    pub fn set_properties(&mut self, id: ElementId, updates: &[(String, PropertyValue)]) -> Result<Vec<String>, EditorError> {
        let mut messages = Vec::new();
        for (name, value) in updates {
            messages.extend(self.validate_property(id, name, value)?);
        }
        let elements = element::try_update_properties(&self.elements, id, updates)?;
        self.commit(elements);
        Ok(messages)
    }

    /// Replace the text of a content item (inline editing).
    pub fn set_content_text(&mut self, id: ElementId, index: usize, text: &str) -> Result<(), EditorError> {
        let elements = element::try_update_content_text(&self.elements, id, index, text)?;
        self.commit(elements);
        Ok(())
    }

    // --- History ---

    pub fn undo(&mut self) -> Result<(), EditorError> {
        self.abort_gestures();
        self.elements = self.history.undo()?.to_vec();
        self.retain_selection();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditorError> {
        self.abort_gestures();
        self.elements = self.history.redo()?.to_vec();
        self.retain_selection();
        Ok(())
    }

    // --- Custom components ---

    /// Turn the selected element into a reusable component.
    pub fn save_selection_as_component(&mut self, name: &str) -> Result<ComponentPrototype, EditorError> {
        let source = self.selected_element().ok_or(EditorError::NoSelection)?;
        let draft = self.registry.derive_custom_prototype(source, name);
        Ok(self.registry.register(draft)?)
    }

    /// Remove a component and every instance of it on the page.
    pub fn delete_component(&mut self, prototype_id: PrototypeId) -> Result<ComponentPrototype, EditorError> {
        let removed = self.registry.remove(prototype_id)?;
        let elements = element::remove_instances_of(&self.elements, prototype_id);
        self.commit(elements);
        log::info!("Deleted component {:?} ({})", removed.name, prototype_id);
        Ok(removed)
    }

    // --- Page ---

    pub fn page_content(&self) -> PageContent {
        PageContent::new(self.elements.clone(), self.settings.clone())
    }

    /// Replace the page and start a fresh history.
    pub fn load_page(&mut self, content: PageContent) {
        self.abort_gestures();
        self.elements = content.elements;
        self.settings = content.settings;
        self.history.reset(self.elements.clone());
        self.selected = None;
        log::info!("Loaded page with {} elements", self.elements.len());
    }

    // --- Pointer routing ---

    /// What a screen point hits on the top-level page.
    pub fn hit_test(&self, screen_point: Point) -> HitTarget {
        let canvas_point = self.viewport.screen_to_canvas(screen_point);
        let tolerance = self.config.handle_tolerance / self.viewport.scale();
        selection::hit_test(&self.elements, self.selected, canvas_point, tolerance)
    }

    /// Start whatever the target implies: select and drag, resize, delete
    /// or pan. Returns true if state changed.
    pub fn pointer_down(&mut self, target: HitTarget, screen_point: Point) -> bool {
        match target {
            HitTarget::Body(id) => {
                self.select(Some(id));
                self.interaction
                    .pointer_down(target, screen_point, &self.viewport, &self.elements);
                true
            }
            HitTarget::Handle(..) => {
                self.interaction
                    .pointer_down(target, screen_point, &self.viewport, &self.elements)
            }
            HitTarget::Delete(id) => self.delete_element(id).is_ok(),
            HitTarget::Background => {
                self.selected = None;
                self.panning.pointer_down_background(screen_point, &self.viewport)
            }
        }
    }

    /// Continue a gesture. Returns true if anything moved.
    pub fn pointer_move(&mut self, screen_point: Point) -> bool {
        if self.interaction.is_active() {
            if let Some(live) = self
                .interaction
                .pointer_move(screen_point, &self.viewport, &self.elements)
            {
                let changed = live != self.elements;
                self.elements = live;
                return changed;
            }
            return false;
        }
        self.panning.pointer_move(screen_point, &mut self.viewport)
    }

    /// End a gesture. Returns true if a history entry was committed.
    pub fn pointer_up(&mut self, screen_point: Point) -> bool {
        let committed = match self
            .interaction
            .pointer_up(screen_point, &self.viewport, &self.elements)
        {
            GestureOutcome::Committed(elements) => {
                // Live updates already replaced the list; record the result
                self.elements = elements;
                self.history.commit(self.elements.clone());
                true
            }
            GestureOutcome::Unchanged(elements) | GestureOutcome::Cancelled(elements) => {
                self.elements = elements;
                false
            }
            GestureOutcome::Idle => false,
        };
        self.panning.pointer_up();
        committed
    }

    /// Pointer capture was lost: roll back any gesture.
    pub fn pointer_cancel(&mut self) {
        self.abort_gestures();
    }

    fn abort_gestures(&mut self) {
        if let GestureOutcome::Cancelled(original) = self.interaction.cancel() {
            self.elements = original;
        }
        self.panning.cancel();
    }

    /// Returns true if the viewport changed.
    pub fn wheel(&mut self, event: &WheelEvent) -> bool {
        self.panning.wheel(event, &mut self.viewport)
    }

    pub fn pointer_enter_element(&mut self) {
        self.panning.set_pointer_over_element(true);
    }

    pub fn pointer_leave_element(&mut self) {
        self.panning.set_pointer_over_element(false);
    }

    /// Route a raw pointer event, hit-testing presses against the page.
    ///
    /// Only the primary button starts gestures.
    pub fn handle_event(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => {
                let target = self.hit_test(position);
                self.pointer_down(target, position)
            }
            PointerEvent::Down { .. } => false,
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, .. } => self.pointer_up(position),
            PointerEvent::Cancel => {
                self.pointer_cancel();
                true
            }
            PointerEvent::Wheel(wheel) => self.wheel(&wheel),
        }
    }

    // --- Persistence ---

    fn report_failure(&mut self, action: &str, error: StorageError) -> EditorError {
        log::warn!("{}: {}", action, error);
        self.notifications.error(format!("{}: {}", action, error));
        EditorError::PersistenceFailure(error)
    }

    /// Save the page. Failures are logged and shown as a notification.
    pub async fn save(&mut self, storage: &dyn Storage) -> Result<(), EditorError> {
        let content = self.page_content();
        match storage.save_page(&content).await {
            Ok(()) => {
                self.notifications.info("Page saved");
                log::info!("Saved page with {} elements", content.elements.len());
                Ok(())
            }
            Err(e) => Err(self.report_failure("Failed to save page", e)),
        }
    }

    /// Load the page. On failure the current page is kept.
    pub async fn load(&mut self, storage: &dyn Storage) -> Result<(), EditorError> {
        match storage.load_page().await {
            Ok(content) => {
                self.load_page(content);
                Ok(())
            }
            Err(e) => Err(self.report_failure("Failed to load page", e)),
        }
    }

    /// Pull saved custom components into the registry. Returns how many.
    pub async fn sync_components(&mut self, storage: &dyn Storage) -> Result<usize, EditorError> {
        match storage.list_components().await {
            Ok(components) => {
                let count = components.len();
                for prototype in components {
                    self.registry.insert(prototype);
                }
                log::info!("Synced {} components", count);
                Ok(count)
            }
            Err(e) => Err(self.report_failure("Failed to load components", e)),
        }
    }

    /// Save the selected element as a component, locally and in storage.
    pub async fn publish_selection(&mut self, storage: &dyn Storage, name: &str) -> Result<ComponentPrototype, EditorError> {
        let prototype = self.save_selection_as_component(name)?;
        match storage.save_component(&prototype).await {
            Ok(saved) => Ok(saved),
            Err(e) => Err(self.report_failure("Failed to save component", e)),
        }
    }

    /// Delete a component locally (with its instances) and from storage.
    pub async fn unpublish_component(&mut self, storage: &dyn Storage, prototype_id: PrototypeId) -> Result<(), EditorError> {
        self.delete_component(prototype_id)?;
        match storage.delete_component(prototype_id).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.report_failure("Failed to delete component", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::notify::NotificationKind;
    use crate::selection::Corner;
    use crate::storage::{BoxFuture, MemoryStorage, StorageResult, block_on};
    use kurbo::{Size, Vec2};

    fn prototype_id(editor: &Editor, name: &str) -> PrototypeId {
        editor.registry().find_by_name(name).unwrap().id
    }

    fn editor_with_button() -> (Editor, ElementId) {
        let mut editor = Editor::default();
        let button = prototype_id(&editor, "Button");
        let id = editor.add_component(button, Point::new(100.0, 100.0)).unwrap();
        (editor, id)
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn load_page(&self) -> BoxFuture<'_, StorageResult<PageContent>> {
            Box::pin(async { Err(StorageError::Io("offline".to_string())) })
        }

        fn save_page(&self, _page: &PageContent) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("offline".to_string())) })
        }

        fn list_components(&self) -> BoxFuture<'_, StorageResult<Vec<ComponentPrototype>>> {
            Box::pin(async { Err(StorageError::Io("offline".to_string())) })
        }

        fn save_component(&self, _prototype: &ComponentPrototype) -> BoxFuture<'_, StorageResult<ComponentPrototype>> {
            Box::pin(async { Err(StorageError::Io("offline".to_string())) })
        }

        fn delete_component(&self, _id: PrototypeId) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("offline".to_string())) })
        }
    }

    #[test]
    fn test_add_component_commits_and_selects() {
        let (editor, id) = editor_with_button();
        assert_eq!(editor.elements().len(), 1);
        assert_eq!(editor.selected(), Some(id));
        assert_eq!(editor.history().len(), 2);
        assert!(editor.can_undo());

        let element = editor.element(id).unwrap();
        assert_eq!(element.position(), Point::new(100.0, 100.0));
        assert_eq!(element.size(), Size::new(200.0, 100.0));
    }

    #[test]
    fn test_add_unknown_component() {
        let mut editor = Editor::default();
        assert!(matches!(
            editor.add_component(0, Point::ZERO),
            Err(EditorError::Registry(RegistryError::NotFound(0)))
        ));
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn test_drag_scenario_single_history_entry() {
        let (mut editor, id) = editor_with_button();
        let before = editor.history().len();

        let target = editor.hit_test(Point::new(150.0, 150.0));
        assert_eq!(target, HitTarget::Body(id));
        editor.pointer_down(target, Point::new(150.0, 150.0));
        for step in 1..=5 {
            editor.pointer_move(Point::new(150.0 + step as f64 * 10.0, 150.0 - step as f64 * 4.0));
        }
        assert!(editor.pointer_up(Point::new(200.0, 130.0)));

        assert_eq!(editor.element(id).unwrap().position(), Point::new(150.0, 80.0));
        assert_eq!(editor.history().len(), before + 1);
        assert_eq!(editor.interaction().subscription().active_listeners(), 0);

        editor.undo().unwrap();
        assert_eq!(editor.element(id).unwrap().position(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_add_drag_undo_redo_scenario() {
        let mut editor = Editor::default();
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.history().cursor(), 0);

        let button = prototype_id(&editor, "Button");
        let id = editor.add_component(button, Point::new(100.0, 100.0)).unwrap();
        assert_eq!(editor.history().len(), 2);

        editor.pointer_down(HitTarget::Body(id), Point::new(120.0, 120.0));
        editor.pointer_move(Point::new(170.0, 100.0));
        editor.pointer_up(Point::new(170.0, 100.0));
        assert_eq!(editor.history().len(), 3);
        assert_eq!(editor.element(id).unwrap().position(), Point::new(150.0, 80.0));

        editor.undo().unwrap();
        assert_eq!(editor.elements(), &editor.history().entries()[1][..]);
        assert_eq!(editor.element(id).unwrap().position(), Point::new(100.0, 100.0));
        editor.redo().unwrap();
        assert_eq!(editor.element(id).unwrap().position(), Point::new(150.0, 80.0));
    }

    #[test]
    fn test_click_without_move_no_history() {
        let (mut editor, id) = editor_with_button();
        let before = editor.history().len();

        editor.pointer_down(HitTarget::Body(id), Point::new(150.0, 150.0));
        assert!(!editor.pointer_up(Point::new(150.0, 150.0)));
        assert_eq!(editor.history().len(), before);
    }

    #[test]
    fn test_resize_via_handle() {
        let (mut editor, id) = editor_with_button();
        let target = editor.hit_test(Point::new(300.0, 200.0));
        assert_eq!(target, HitTarget::Handle(id, Corner::BottomRight));

        editor.pointer_down(target, Point::new(300.0, 200.0));
        editor.pointer_move(Point::new(330.0, 210.0));
        assert!(editor.pointer_up(Point::new(330.0, 210.0)));
        assert_eq!(editor.element(id).unwrap().size(), Size::new(230.0, 110.0));
    }

    #[test]
    fn test_cancel_restores_pre_gesture_state() {
        let (mut editor, id) = editor_with_button();
        let before = editor.elements().to_vec();
        let history_len = editor.history().len();

        editor.handle_event(PointerEvent::Down {
            position: Point::new(150.0, 150.0),
            button: MouseButton::Left,
        });
        editor.handle_event(PointerEvent::Move {
            position: Point::new(400.0, 400.0),
        });
        assert_ne!(editor.element(id).unwrap().position(), Point::new(100.0, 100.0));

        editor.handle_event(PointerEvent::Cancel);
        assert_eq!(editor.elements(), &before[..]);
        assert_eq!(editor.history().len(), history_len);
        assert_eq!(editor.interaction().subscription().active_listeners(), 0);
    }

    #[test]
    fn test_background_press_pans_and_deselects() {
        let (mut editor, _) = editor_with_button();
        let target = editor.hit_test(Point::new(600.0, 600.0));
        assert_eq!(target, HitTarget::Background);

        editor.pointer_down(target, Point::new(600.0, 600.0));
        assert_eq!(editor.selected(), None);
        editor.pointer_move(Point::new(650.0, 580.0));
        editor.pointer_up(Point::new(650.0, 580.0));
        assert_eq!(editor.viewport().pan, Vec2::new(50.0, -20.0));
    }

    #[test]
    fn test_delete_control_removes_element() {
        let (mut editor, id) = editor_with_button();
        // Label bar sits above the top-right corner
        let target = editor.hit_test(Point::new(290.0, 90.0));
        assert_eq!(target, HitTarget::Delete(id));
        assert!(editor.pointer_down(target, Point::new(290.0, 90.0)));
        assert!(editor.elements().is_empty());
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn test_zoomed_drag_divides_by_scale() {
        let (mut editor, id) = editor_with_button();
        editor.viewport_mut().set_scale(2.0);

        editor.pointer_down(HitTarget::Body(id), Point::new(300.0, 300.0));
        editor.pointer_up(Point::new(400.0, 260.0));
        assert_eq!(editor.element(id).unwrap().position(), Point::new(150.0, 80.0));
    }

    #[test]
    fn test_wheel_zoom_blocked_over_element() {
        let mut editor = Editor::default();
        let event = WheelEvent::new(Point::new(10.0, 10.0), Vec2::new(0.0, -100.0)).with_modifiers(Modifiers {
            meta: true,
            ..Default::default()
        });

        editor.pointer_enter_element();
        assert!(!editor.handle_event(PointerEvent::Wheel(event)));
        editor.pointer_leave_element();
        assert!(editor.handle_event(PointerEvent::Wheel(event)));
        assert_eq!(editor.viewport().zoom_percent(), 120);
    }

    #[test]
    fn test_wheel_with_inverted_scale_limits() {
        let config = EditorConfig {
            min_scale: 3.0,
            max_scale: 1.0,
            ..Default::default()
        };
        let mut editor = Editor::new(config);
        editor.wheel(&WheelEvent::new(Point::new(10.0, 10.0), Vec2::new(0.0, -100.0)));
        editor.wheel(&WheelEvent::new(Point::new(10.0, 10.0), Vec2::new(0.0, 100.0)));
        let scale = editor.viewport().scale();
        assert!((1.0..=3.0).contains(&scale));
    }

    #[test]
    fn test_set_property_is_permissive() {
        let (mut editor, id) = editor_with_button();
        let messages = editor.set_property(id, "text", "".into()).unwrap();
        assert_eq!(messages, vec!["Button text cannot be empty".to_string()]);
        assert_eq!(editor.element(id).unwrap().property("text"), Some(&PropertyValue::from("")));

        let messages = editor.set_property(id, "width", PropertyValue::Number(-5.0)).unwrap();
        assert_eq!(messages, vec!["Width must be greater than 0".to_string()]);

        assert!(matches!(
            editor.set_property(id, "nope", PropertyValue::Number(1.0)),
            Err(EditorError::Element(ElementError::UnknownProperty(..)))
        ));
    }

    #[test]
    fn test_setting_same_value_commits_nothing() {
        let (mut editor, id) = editor_with_button();
        let before = editor.history().len();
        editor.set_property(id, "text", "Click me".into()).unwrap();
        assert_eq!(editor.history().len(), before);
    }

    #[test]
    fn test_undo_redo_boundaries() {
        let mut editor = Editor::default();
        assert!(matches!(
            editor.undo(),
            Err(EditorError::History(HistoryError::NoOlderState))
        ));
        assert!(matches!(
            editor.redo(),
            Err(EditorError::History(HistoryError::NoNewerState))
        ));
    }

    #[test]
    fn test_undo_clears_stale_selection() {
        let (mut editor, id) = editor_with_button();
        editor.undo().unwrap();
        assert!(editor.elements().is_empty());
        assert_eq!(editor.selected(), None);
        editor.redo().unwrap();
        assert!(editor.element(id).is_some());
    }

    #[test]
    fn test_drop_into_container() {
        let mut editor = Editor::default();
        let container = prototype_id(&editor, "Container");
        let text = prototype_id(&editor, "Text Block");
        let image = prototype_id(&editor, "Image");

        let parent = editor.add_component(container, Point::ZERO).unwrap();
        let child = editor.drop_component(text, Point::new(20.0, 20.0)).unwrap();
        assert_eq!(editor.elements().len(), 1);
        assert_eq!(editor.element(parent).unwrap().children().next().unwrap().id, child);

        // Outside the container the drop lands on the page
        editor.drop_component(image, Point::new(600.0, 600.0)).unwrap();
        assert_eq!(editor.elements().len(), 2);

        let button = prototype_id(&editor, "Button");
        let button = editor.add_component(button, Point::new(800.0, 0.0)).unwrap();
        assert!(matches!(
            editor.drop_into(button, text),
            Err(EditorError::Element(ElementError::InvalidContentTarget(_)))
        ));
    }

    #[test]
    fn test_save_selection_and_cascade_delete() {
        let (mut editor, id) = editor_with_button();
        editor.set_property(id, "text", "Subscribe".into()).unwrap();

        let custom = editor.save_selection_as_component("Subscribe").unwrap();
        assert!(editor.registry().get(custom.id).is_some());
        let placed = editor.add_component(custom.id, Point::new(0.0, 300.0)).unwrap();
        assert_eq!(
            editor.element(placed).unwrap().property("text"),
            Some(&PropertyValue::from("Subscribe"))
        );

        editor.delete_component(custom.id).unwrap();
        assert!(editor.element(placed).is_none());
        assert!(editor.element(id).is_some());
        assert!(editor.registry().get(custom.id).is_none());
    }

    #[test]
    fn test_save_selection_requires_selection() {
        let mut editor = Editor::default();
        assert!(matches!(
            editor.save_selection_as_component("Nothing"),
            Err(EditorError::NoSelection)
        ));
    }

    #[test]
    fn test_load_page_resets_history() {
        let (mut editor, _) = editor_with_button();
        let content = editor.page_content();
        editor.load_page(content.clone());
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.can_undo());
        assert_eq!(editor.page_content(), content);
    }

    #[test]
    fn test_save_and_load_through_storage() {
        let storage = MemoryStorage::new();
        let (mut editor, id) = editor_with_button();
        block_on(editor.save(&storage)).unwrap();
        assert_eq!(editor.notifications().latest().unwrap().kind, NotificationKind::Info);

        let mut other = Editor::default();
        block_on(other.load(&storage)).unwrap();
        assert!(other.element(id).is_some());
    }

    #[test]
    fn test_persistence_failure_keeps_state() {
        let (mut editor, id) = editor_with_button();
        let before = editor.elements().to_vec();

        assert!(matches!(
            block_on(editor.save(&FailingStorage)),
            Err(EditorError::PersistenceFailure(_))
        ));
        assert!(matches!(
            block_on(editor.load(&FailingStorage)),
            Err(EditorError::PersistenceFailure(_))
        ));
        assert_eq!(editor.elements(), &before[..]);
        assert_eq!(editor.selected(), Some(id));

        let errors = editor
            .notifications()
            .all()
            .iter()
            .filter(|n| n.kind == NotificationKind::Error)
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn test_publish_and_sync_components() {
        let storage = MemoryStorage::new();
        let (mut editor, _) = editor_with_button();
        let published = block_on(editor.publish_selection(&storage, "Shared Button")).unwrap();

        let mut other = Editor::default();
        assert_eq!(block_on(other.sync_components(&storage)).unwrap(), 1);
        assert_eq!(other.registry().get(published.id).unwrap().name, "Shared Button");

        block_on(other.unpublish_component(&storage, published.id)).unwrap();
        assert!(block_on(storage.list_components()).unwrap().is_empty());
    }
}
