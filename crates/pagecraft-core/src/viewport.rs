//! Background pan gesture and wheel zoom for the canvas.

use crate::camera::Viewport;
use crate::config::WheelPolicy;
use crate::input::WheelEvent;
use kurbo::{Point, Vec2};

/// Pan gesture state. `pointer_start` is in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanState {
    #[default]
    Idle,
    Panning { pointer_start: Point, pan_start: Vec2 },
}

/// Wheel tuning, usually taken from the editor config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSettings {
    pub policy: WheelPolicy,
    pub zoom_step: f64,
    pub zoom_sensitivity: f64,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            policy: WheelPolicy::StepZoom,
            zoom_step: 0.1,
            zoom_sensitivity: 0.002,
        }
    }
}

/// Pans on background drags and zooms on wheel events.
///
/// While the pointer is over an element neither panning nor wheel zoom
/// starts, so element gestures and scrolling inside elements win.
#[derive(Debug, Default)]
pub struct ViewportController {
    state: PanState,
    pointer_over_element: bool,
    wheel: WheelSettings,
}

impl ViewportController {
    pub fn new(wheel: WheelSettings) -> Self {
        Self {
            wheel,
            ..Self::default()
        }
    }

    pub fn state(&self) -> PanState {
        self.state
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, PanState::Panning { .. })
    }

    pub fn pointer_over_element(&self) -> bool {
        self.pointer_over_element
    }

    /// Set by the renderer on element enter/leave.
    pub fn set_pointer_over_element(&mut self, over: bool) {
        self.pointer_over_element = over;
    }

    /// Start panning from a press on the empty canvas.
    pub fn pointer_down_background(&mut self, screen_point: Point, viewport: &Viewport) -> bool {
        if self.pointer_over_element || self.is_panning() {
            return false;
        }
        self.state = PanState::Panning {
            pointer_start: screen_point,
            pan_start: viewport.pan,
        };
        log::debug!("Pan started at {:?}", screen_point);
        true
    }

    /// Follow the pointer while panning. Returns true if the pan changed.
    pub fn pointer_move(&mut self, screen_point: Point, viewport: &mut Viewport) -> bool {
        match self.state {
            PanState::Idle => false,
            PanState::Panning {
                pointer_start,
                pan_start,
            } => {
                let pan = pan_start + (screen_point - pointer_start);
                let changed = pan != viewport.pan;
                viewport.pan = pan;
                changed
            }
        }
    }

    /// End any pan. A global pointer up also clears the over-element flag.
    pub fn pointer_up(&mut self) {
        self.state = PanState::Idle;
        self.pointer_over_element = false;
    }

    /// Abort a pan. The current pan is kept; panning is not undoable.
    pub fn cancel(&mut self) {
        self.state = PanState::Idle;
    }

    /// Handle a wheel event. Returns true if the viewport changed.
    pub fn wheel(&mut self, event: &WheelEvent, viewport: &mut Viewport) -> bool {
        if self.pointer_over_element {
            return false;
        }

        let before = viewport.clone();
        if event.modifiers.zoom_held() {
            viewport.zoom_by(event.position, -event.delta.y * self.wheel.zoom_sensitivity);
        } else {
            match self.wheel.policy {
                WheelPolicy::StepZoom => {
                    if event.delta.y == 0.0 {
                        return false;
                    }
                    let step = if event.delta.y > 0.0 {
                        -self.wheel.zoom_step
                    } else {
                        self.wheel.zoom_step
                    };
                    viewport.zoom_by(event.position, step);
                }
                WheelPolicy::Scroll => viewport.pan_by(-event.delta),
            }
        }
        *viewport != before
    }
}
