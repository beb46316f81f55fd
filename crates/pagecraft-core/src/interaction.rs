//! Drag and resize gesture handling for elements.
//!
//! A gesture runs from pointer down to pointer up. Moves produce live,
//! uncommitted updates of the element list; the end of the gesture yields
//! at most one list to commit to history. A gesture that loses pointer
//! capture is cancelled and the pre-gesture list is restored.

use crate::camera::Viewport;
use crate::element::{self, ElementId, ElementInstance};
use crate::history::HistorySnapshot;
use crate::registry::property::PropertyValue;
use crate::selection::{Corner, HitTarget, MIN_ELEMENT_SIZE, resize_from_corner};
use kurbo::{Point, Size};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tracks the global pointer listeners a gesture holds.
///
/// A gesture acquires a [`GestureGuard`] when it starts; dropping the guard
/// releases the listeners, so every way out of a gesture deregisters them.
#[derive(Debug, Clone, Default)]
pub struct GestureSubscription {
    active: Arc<AtomicUsize>,
}

impl GestureSubscription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register global move/up listeners for the duration of the guard.
    pub fn acquire(&self) -> GestureGuard {
        self.active.fetch_add(1, Ordering::Relaxed);
        GestureGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Number of currently registered listener sets.
    pub fn active_listeners(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Whether a gesture currently owns the pointer.
    pub fn is_capturing(&self) -> bool {
        self.active_listeners() > 0
    }
}

/// Releases the gesture's listeners when dropped.
#[derive(Debug)]
pub struct GestureGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for GestureGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Current gesture. Pointer positions are in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        element_id: ElementId,
        pointer_start: Point,
        start_position: Point,
    },
    Resizing {
        element_id: ElementId,
        corner: Corner,
        pointer_start: Point,
        start_position: Point,
        start_size: Size,
    },
}

/// Result of ending a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// No gesture was active.
    Idle,
    /// The element ended where it started; nothing to commit.
    Unchanged(Vec<ElementInstance>),
    /// The element moved or changed size; commit this list.
    Committed(Vec<ElementInstance>),
    /// Capture was lost; this is the list from before the gesture.
    Cancelled(Vec<ElementInstance>),
}

/// Drag/resize state machine.
#[derive(Debug)]
pub struct InteractionController {
    state: GestureState,
    /// Element list when the gesture started, restored on cancel.
    original: Option<HistorySnapshot>,
    guard: Option<GestureGuard>,
    subscription: GestureSubscription,
    min_size: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(MIN_ELEMENT_SIZE)
    }
}

impl InteractionController {
    /// Create a controller with the given minimum element size.
    pub fn new(min_size: f64) -> Self {
        Self {
            state: GestureState::Idle,
            original: None,
            guard: None,
            subscription: GestureSubscription::new(),
            min_size,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Listener bookkeeping, shared with the host event loop.
    pub fn subscription(&self) -> &GestureSubscription {
        &self.subscription
    }

    /// Element targeted by the active gesture.
    pub fn active_element(&self) -> Option<ElementId> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging { element_id, .. } | GestureState::Resizing { element_id, .. } => {
                Some(element_id)
            }
        }
    }

    /// Start a drag or resize. Returns false if nothing started.
    pub fn pointer_down(
        &mut self,
        target: HitTarget,
        screen_point: Point,
        viewport: &Viewport,
        elements: &[ElementInstance],
    ) -> bool {
        if self.is_active() {
            log::debug!("pointer_down ignored: gesture already active");
            return false;
        }

        let pointer_start = viewport.screen_to_canvas(screen_point);
        let state = match target {
            HitTarget::Body(id) => element::find(elements, id).map(|e| GestureState::Dragging {
                element_id: id,
                pointer_start,
                start_position: e.position(),
            }),
            HitTarget::Handle(id, corner) => element::find(elements, id).map(|e| GestureState::Resizing {
                element_id: id,
                corner,
                pointer_start,
                start_position: e.position(),
                start_size: e.size(),
            }),
            HitTarget::Delete(_) | HitTarget::Background => None,
        };

        let Some(state) = state else {
            return false;
        };

        log::debug!("Gesture started: {:?}", state);
        self.state = state;
        self.original = Some(elements.into());
        self.guard = Some(self.subscription.acquire());
        true
    }

    /// Apply a pointer move. Returns the live-updated list, or `None` if no
    /// gesture is active.
    pub fn pointer_move(
        &mut self,
        screen_point: Point,
        viewport: &Viewport,
        elements: &[ElementInstance],
    ) -> Option<Vec<ElementInstance>> {
        let current = viewport.screen_to_canvas(screen_point);
        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging {
                element_id,
                pointer_start,
                start_position,
            } => {
                let position = start_position + (current - pointer_start);
                Some(set_geometry(elements, element_id, position, None))
            }
            GestureState::Resizing {
                element_id,
                corner,
                pointer_start,
                start_position,
                start_size,
            } => {
                let delta = current - pointer_start;
                let (position, size) =
                    resize_from_corner(corner, start_position, start_size, delta, self.min_size);
                Some(set_geometry(elements, element_id, position, Some(size)))
            }
        }
    }

    /// End the gesture at `screen_point`.
    ///
    /// The final position is applied, then compared with the start: only a
    /// change yields [`GestureOutcome::Committed`].
    pub fn pointer_up(
        &mut self,
        screen_point: Point,
        viewport: &Viewport,
        elements: &[ElementInstance],
    ) -> GestureOutcome {
        let Some(final_elements) = self.pointer_move(screen_point, viewport, elements) else {
            return GestureOutcome::Idle;
        };

        let changed = match (self.state, self.active_element().and_then(|id| element::find(&final_elements, id))) {
            (_, None) => false,
            (GestureState::Dragging { start_position, .. }, Some(e)) => e.position() != start_position,
            (
                GestureState::Resizing {
                    start_position,
                    start_size,
                    ..
                },
                Some(e),
            ) => e.position() != start_position || e.size() != start_size,
            (GestureState::Idle, Some(_)) => false,
        };

        self.finish();
        if changed {
            GestureOutcome::Committed(final_elements)
        } else {
            GestureOutcome::Unchanged(final_elements)
        }
    }

    /// Abort the gesture after capture loss, restoring the pre-gesture list.
    pub fn cancel(&mut self) -> GestureOutcome {
        let original = self.original.take();
        let was_active = self.is_active();
        self.finish();
        match original {
            Some(original) if was_active => {
                log::debug!("Gesture cancelled, rolling back");
                GestureOutcome::Cancelled(original.to_vec())
            }
            _ => GestureOutcome::Idle,
        }
    }

    fn finish(&mut self) {
        self.state = GestureState::Idle;
        self.original = None;
        // Dropping the guard deregisters the listeners
        self.guard = None;
    }
}

fn set_geometry(
    elements: &[ElementInstance],
    id: ElementId,
    position: Point,
    size: Option<Size>,
) -> Vec<ElementInstance> {
    let mut updates = vec![
        ("x".to_string(), PropertyValue::Number(position.x)),
        ("y".to_string(), PropertyValue::Number(position.y)),
    ];
    if let Some(size) = size {
        updates.push(("width".to_string(), PropertyValue::Number(size.width)));
        updates.push(("height".to_string(), PropertyValue::Number(size.height)));
    }
    element::update_properties(elements, id, &updates)
}
