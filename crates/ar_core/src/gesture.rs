//! Gesture recognition from mouse and touch input.
//!
//! A single press is tracked from down to up and classified as:
//! - **Tap**: released quickly without drifting more than `tap_max_movement`
//! - **Long press**: held for `long_press_min_duration` without drifting;
//!   fires once while still held
//! - **Swipe**: released after a mostly-horizontal drag of at least
//!   `swipe_min_distance` pixels
//!
//! [`GestureRecognizer`] is plain state so it can be driven from tests; the
//! [`GesturePlugin`] feeds it from Bevy input and writes [`GestureMessage`]s.

use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::GestureConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Configuration a long press was recognized with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LongPressSettings {
    pub minimum_press_duration: f32,
    pub delays_touches_ended: bool,
}

impl LongPressSettings {
    /// A very short press that doesn't delay touch-ended is too easy to trigger
    /// by accident; such long presses are ignored.
    pub fn is_degenerate(&self) -> bool {
        self.minimum_press_duration <= 0.1 && !self.delays_touches_ended
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureKind {
    Tap,
    LongPress(LongPressSettings),
    Swipe(SwipeDirection),
}

/// A recognized gesture at a screen position (pixels, origin top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub position: Vec2,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct GestureMessage(pub Gesture);

/// Set while another UI layer owns the pointer; new presses are ignored.
#[derive(Resource, Default)]
pub struct PointerCapture(pub bool);

#[derive(Clone, Copy, Debug)]
struct Press {
    start: Vec2,
    current: Vec2,
    started_at: f32,
    long_press_fired: bool,
}

impl Press {
    fn drift(&self) -> f32 {
        self.current.distance(self.start)
    }
}

/// Classifies presses into gestures.
#[derive(Resource, Clone, Debug)]
pub struct GestureRecognizer {
    config: GestureConfig,
    press: Option<Press>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            press: None,
        }
    }

    pub fn long_press_settings(&self) -> LongPressSettings {
        LongPressSettings {
            minimum_press_duration: self.config.long_press_min_duration,
            delays_touches_ended: self.config.delays_touches_ended,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    /// Pointer went down.
    pub fn begin(&mut self, position: Vec2, now: f32) {
        self.press = Some(Press {
            start: position,
            current: position,
            started_at: now,
            long_press_fired: false,
        });
    }

    /// Pointer moved while down.
    pub fn moved(&mut self, position: Vec2) {
        if let Some(press) = &mut self.press {
            press.current = position;
        }
    }

    /// Called every frame; returns a long press once the hold time is reached.
    pub fn update(&mut self, now: f32) -> Option<Gesture> {
        let settings = self.long_press_settings();
        let tap_max_movement = self.config.tap_max_movement;
        let press = self.press.as_mut()?;

        if press.long_press_fired || press.drift() > tap_max_movement {
            return None;
        }
        if now - press.started_at < settings.minimum_press_duration {
            return None;
        }

        press.long_press_fired = true;
        Some(Gesture {
            kind: GestureKind::LongPress(settings),
            position: press.current,
        })
    }

    /// Pointer went up; returns a tap or swipe.
    pub fn end(&mut self, position: Vec2, now: f32) -> Option<Gesture> {
        let mut press = self.press.take()?;
        press.current = position;

        if press.long_press_fired {
            return None;
        }

        let delta = press.current - press.start;
        if delta.x.abs() >= self.config.swipe_min_distance && delta.x.abs() > delta.y.abs() {
            let direction = if delta.x > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            };
            return Some(Gesture {
                kind: GestureKind::Swipe(direction),
                position: press.start,
            });
        }

        let held = now - press.started_at;
        if press.drift() <= self.config.tap_max_movement
            && held < self.config.long_press_min_duration
        {
            return Some(Gesture {
                kind: GestureKind::Tap,
                position: press.current,
            });
        }

        None
    }

    /// Drop the current press without producing a gesture.
    pub fn cancel(&mut self) {
        self.press = None;
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// System that feeds mouse and touch input into the recognizer.
///
/// Touch takes priority; the mouse is only read while no finger is down.
pub fn recognize_gestures(
    time: Res<Time>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touches: Option<Res<Touches>>,
    capture: Res<PointerCapture>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut recognizer: ResMut<GestureRecognizer>,
    mut gestures: MessageWriter<GestureMessage>,
) {
    let now = time.elapsed_secs();
    let mut emit = |gesture: Option<Gesture>| {
        if let Some(gesture) = gesture {
            debug!("Recognized {:?} at {}", gesture.kind, gesture.position);
            gestures.write(GestureMessage(gesture));
        }
    };

    let touch_active = touches.as_ref().is_some_and(|t| t.iter().next().is_some());
    let touch_released = touches
        .as_ref()
        .and_then(|t| t.iter_just_released().next().map(|touch| touch.position()));

    if touch_active || touch_released.is_some() {
        let Some(touches) = touches.as_ref() else {
            return;
        };
        if let Some(touch) = touches.iter_just_pressed().next() {
            if !capture.0 {
                recognizer.begin(touch.position(), now);
            }
        } else if let Some(touch) = touches.iter().next() {
            recognizer.moved(touch.position());
        }
        emit(recognizer.update(now));
        if let Some(position) = touch_released {
            emit(recognizer.end(position, now));
        }
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if mouse_button.just_pressed(MouseButton::Left) {
        if let (Some(position), false) = (cursor, capture.0) {
            recognizer.begin(position, now);
        }
    } else if mouse_button.pressed(MouseButton::Left) {
        if let Some(position) = cursor {
            recognizer.moved(position);
        }
    }

    emit(recognizer.update(now));

    if mouse_button.just_released(MouseButton::Left) {
        match cursor {
            Some(position) => emit(recognizer.end(position, now)),
            // Released outside the window
            None => recognizer.cancel(),
        }
    }
}

/// Plugin that recognizes gestures and publishes [`GestureMessage`]s.
#[derive(Default)]
pub struct GesturePlugin {
    pub config: GestureConfig,
}

impl Plugin for GesturePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<GestureMessage>()
            .init_resource::<PointerCapture>()
            .insert_resource(GestureRecognizer::new(self.config.clone()))
            .add_systems(Update, recognize_gestures);
    }
}
