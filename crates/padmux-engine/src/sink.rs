use padmux_profile::OutputAction;
use padmux_shape::{axis_to_short, circle_to_square, trigger_to_byte};

use crate::output::OutputState;
use crate::SinkError;

/// Receiving end of the pipeline, typically a virtual controller
/// driver. Kept behind a trait so the mapping path can run against a
/// recording fake in tests.
pub trait OutputSink {
    /// Apply a full output frame in one submission.
    fn apply(&mut self, state: &OutputState) -> Result<(), SinkError>;
}

/// One controller report in wire units.
///
/// Sticks are square-remapped jointly per pair so full diagonals reach
/// the corners, and vertical axes flip sign: capture reads down as
/// positive, the wire wants up as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SinkReport {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
    pub left_shoulder: bool,
    pub right_shoulder: bool,
    pub start: bool,
    pub back: bool,
    pub left_thumb: bool,
    pub right_thumb: bool,
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,
    pub trigger_left: u8,
    pub trigger_right: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

impl SinkReport {
    pub fn from_state(state: &OutputState) -> Self {
        let (lx, ly) = circle_to_square(
            state.get(OutputAction::ThumbLX),
            state.get(OutputAction::ThumbLY),
        );
        let (rx, ry) = circle_to_square(
            state.get(OutputAction::ThumbRX),
            state.get(OutputAction::ThumbRY),
        );
        let on = |action: OutputAction| state.get(action) > 0.5;
        Self {
            a: on(OutputAction::ButtonA),
            b: on(OutputAction::ButtonB),
            x: on(OutputAction::ButtonX),
            y: on(OutputAction::ButtonY),
            left_shoulder: on(OutputAction::ButtonLeftShoulder),
            right_shoulder: on(OutputAction::ButtonRightShoulder),
            start: on(OutputAction::ButtonStart),
            back: on(OutputAction::ButtonBack),
            left_thumb: on(OutputAction::ThumbLPressed),
            right_thumb: on(OutputAction::ThumbRPressed),
            dpad_up: on(OutputAction::DPadUp),
            dpad_down: on(OutputAction::DPadDown),
            dpad_left: on(OutputAction::DPadLeft),
            dpad_right: on(OutputAction::DPadRight),
            trigger_left: trigger_to_byte(
                state.get(OutputAction::TriggerLeft),
            ),
            trigger_right: trigger_to_byte(
                state.get(OutputAction::TriggerRight),
            ),
            thumb_lx: axis_to_short(lx),
            thumb_ly: axis_to_short(-ly),
            thumb_rx: axis_to_short(rx),
            thumb_ry: axis_to_short(-ry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_state_makes_neutral_report() {
        let report = SinkReport::from_state(&OutputState::new());
        assert_eq!(report, SinkReport::default());
    }

    #[test]
    fn buttons_require_more_than_half_press() {
        let mut state = OutputState::new();
        state.set(OutputAction::ButtonA, 0.5);
        state.set(OutputAction::ThumbLPressed, 0.75);
        let report = SinkReport::from_state(&state);
        assert!(!report.a);
        assert!(report.left_thumb);
    }

    #[test]
    fn trigger_values_scale_to_bytes() {
        let mut state = OutputState::new();
        state.set(OutputAction::TriggerLeft, 0.5);
        state.set(OutputAction::TriggerRight, 1.0);
        let report = SinkReport::from_state(&state);
        assert_eq!(report.trigger_left, 127);
        assert_eq!(report.trigger_right, 255);
    }

    #[test]
    fn vertical_axes_flip_sign() {
        let mut state = OutputState::new();
        state.set(OutputAction::ThumbLY, 1.0);
        state.set(OutputAction::ThumbRY, -0.5);
        let report = SinkReport::from_state(&state);
        assert_eq!(report.thumb_ly, -32768);
        assert_eq!(report.thumb_ry, 16383);
    }

    #[test]
    fn horizontal_axes_keep_sign() {
        let mut state = OutputState::new();
        state.set(OutputAction::ThumbLX, 1.0);
        state.set(OutputAction::ThumbRX, -1.0);
        let report = SinkReport::from_state(&state);
        assert_eq!(report.thumb_lx, 32767);
        assert_eq!(report.thumb_rx, -32768);
    }

    #[test]
    fn full_diagonal_reaches_the_corner() {
        let d = std::f64::consts::FRAC_1_SQRT_2;
        let mut state = OutputState::new();
        state.set(OutputAction::ThumbLX, d);
        state.set(OutputAction::ThumbLY, d);
        let report = SinkReport::from_state(&state);
        assert!(i32::from(report.thumb_lx) >= 32766);
        assert!(i32::from(report.thumb_ly) <= -32767);
    }

    #[test]
    fn stick_pairs_remap_independently() {
        let mut state = OutputState::new();
        state.set(OutputAction::ThumbLX, 0.5);
        let report = SinkReport::from_state(&state);
        // Right stick untouched by the left pair's remap.
        assert_eq!(report.thumb_rx, 0);
        assert_eq!(report.thumb_ry, 0);
        assert_eq!(report.thumb_lx, 16383);
    }
}
