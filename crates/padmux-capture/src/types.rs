use std::time::{Duration, Instant};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// One raw physical signal sampled from the active device.
///
/// Buttons and D-pad directions report 0 or 1, triggers [0, 1] and
/// stick axes [-1, 1], all after shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    LeftThumb,
    RightThumb,
    View,
    Menu,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

impl Signal {
    pub const COUNT: usize = 20;

    /// Every signal, in declaration order.
    pub const ALL: [Signal; Signal::COUNT] = [
        Signal::A,
        Signal::B,
        Signal::X,
        Signal::Y,
        Signal::LeftBumper,
        Signal::RightBumper,
        Signal::LeftThumb,
        Signal::RightThumb,
        Signal::View,
        Signal::Menu,
        Signal::DPadUp,
        Signal::DPadDown,
        Signal::DPadLeft,
        Signal::DPadRight,
        Signal::LeftX,
        Signal::LeftY,
        Signal::RightX,
        Signal::RightY,
        Signal::LeftTrigger,
        Signal::RightTrigger,
    ];

    /// Dense index, usable for per-signal state arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short display name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Signal::A => "A",
            Signal::B => "B",
            Signal::X => "X",
            Signal::Y => "Y",
            Signal::LeftBumper => "LB",
            Signal::RightBumper => "RB",
            Signal::LeftThumb => "L3",
            Signal::RightThumb => "R3",
            Signal::View => "View",
            Signal::Menu => "Menu",
            Signal::DPadUp => "DUp",
            Signal::DPadDown => "DDown",
            Signal::DPadLeft => "DLeft",
            Signal::DPadRight => "DRight",
            Signal::LeftX => "LX",
            Signal::LeftY => "LY",
            Signal::RightX => "RX",
            Signal::RightY => "RY",
            Signal::LeftTrigger => "LT",
            Signal::RightTrigger => "RT",
        }
    }

    /// True for signals that carry a digital 0/1 value.
    pub fn is_button(self) -> bool {
        !matches!(
            self,
            Signal::LeftX
                | Signal::LeftY
                | Signal::RightX
                | Signal::RightY
                | Signal::LeftTrigger
                | Signal::RightTrigger
        )
    }
}

/// One hardware-level control a logical action can be bound to.
///
/// Serialized by name in profile files. Stick halves keep the
/// historical directional-suffix spelling on the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum PhysicalInput {
    #[default]
    None,
    ButtonSouth,
    ButtonEast,
    ButtonWest,
    ButtonNorth,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    LeftStickClick,
    RightStickClick,
    Start,
    Back,
    #[serde(rename = "LeftStickX_Pos")]
    LeftStickXPos,
    #[serde(rename = "LeftStickX_Neg")]
    LeftStickXNeg,
    #[serde(rename = "LeftStickY_Pos")]
    LeftStickYPos,
    #[serde(rename = "LeftStickY_Neg")]
    LeftStickYNeg,
    #[serde(rename = "RightStickX_Pos")]
    RightStickXPos,
    #[serde(rename = "RightStickX_Neg")]
    RightStickXNeg,
    #[serde(rename = "RightStickY_Pos")]
    RightStickYPos,
    #[serde(rename = "RightStickY_Neg")]
    RightStickYNeg,
}

/// Dispatch category of a physical input, with the signal it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    /// Digital button, read as 0 or 1.
    Button(Signal),
    /// Analog trigger, read as [0, 1].
    Trigger(Signal),
    /// One signed half of a stick axis.
    AxisHalf { signal: Signal, positive: bool },
    /// Explicitly unassigned.
    None,
}

impl PhysicalInput {
    /// Resolve the signal this input samples and how it is interpreted.
    pub fn class(self) -> InputClass {
        match self {
            PhysicalInput::None => InputClass::None,
            PhysicalInput::ButtonSouth => InputClass::Button(Signal::A),
            PhysicalInput::ButtonEast => InputClass::Button(Signal::B),
            PhysicalInput::ButtonWest => InputClass::Button(Signal::X),
            PhysicalInput::ButtonNorth => InputClass::Button(Signal::Y),
            PhysicalInput::DPadUp => InputClass::Button(Signal::DPadUp),
            PhysicalInput::DPadDown => InputClass::Button(Signal::DPadDown),
            PhysicalInput::DPadLeft => InputClass::Button(Signal::DPadLeft),
            PhysicalInput::DPadRight => InputClass::Button(Signal::DPadRight),
            PhysicalInput::LeftBumper => InputClass::Button(Signal::LeftBumper),
            PhysicalInput::RightBumper => {
                InputClass::Button(Signal::RightBumper)
            }
            PhysicalInput::LeftTrigger => {
                InputClass::Trigger(Signal::LeftTrigger)
            }
            PhysicalInput::RightTrigger => {
                InputClass::Trigger(Signal::RightTrigger)
            }
            PhysicalInput::LeftStickClick => {
                InputClass::Button(Signal::LeftThumb)
            }
            PhysicalInput::RightStickClick => {
                InputClass::Button(Signal::RightThumb)
            }
            PhysicalInput::Start => InputClass::Button(Signal::Menu),
            PhysicalInput::Back => InputClass::Button(Signal::View),
            PhysicalInput::LeftStickXPos => InputClass::AxisHalf {
                signal: Signal::LeftX,
                positive: true,
            },
            PhysicalInput::LeftStickXNeg => InputClass::AxisHalf {
                signal: Signal::LeftX,
                positive: false,
            },
            PhysicalInput::LeftStickYPos => InputClass::AxisHalf {
                signal: Signal::LeftY,
                positive: true,
            },
            PhysicalInput::LeftStickYNeg => InputClass::AxisHalf {
                signal: Signal::LeftY,
                positive: false,
            },
            PhysicalInput::RightStickXPos => InputClass::AxisHalf {
                signal: Signal::RightX,
                positive: true,
            },
            PhysicalInput::RightStickXNeg => InputClass::AxisHalf {
                signal: Signal::RightX,
                positive: false,
            },
            PhysicalInput::RightStickYPos => InputClass::AxisHalf {
                signal: Signal::RightY,
                positive: true,
            },
            PhysicalInput::RightStickYNeg => InputClass::AxisHalf {
                signal: Signal::RightY,
                positive: false,
            },
        }
    }

    /// The opposite half-direction for stick-half inputs.
    pub fn axis_counterpart(self) -> Option<PhysicalInput> {
        Some(match self {
            PhysicalInput::LeftStickXPos => PhysicalInput::LeftStickXNeg,
            PhysicalInput::LeftStickXNeg => PhysicalInput::LeftStickXPos,
            PhysicalInput::LeftStickYPos => PhysicalInput::LeftStickYNeg,
            PhysicalInput::LeftStickYNeg => PhysicalInput::LeftStickYPos,
            PhysicalInput::RightStickXPos => PhysicalInput::RightStickXNeg,
            PhysicalInput::RightStickXNeg => PhysicalInput::RightStickXPos,
            PhysicalInput::RightStickYPos => PhysicalInput::RightStickYNeg,
            PhysicalInput::RightStickYNeg => PhysicalInput::RightStickYPos,
            _ => return None,
        })
    }
}

/// A change-batched set of shaped signal readings.
pub type Snapshot = AHashMap<Signal, f64>;

/// Snapshot stamped at emission time so consumers can measure how long
/// it sat queued.
#[derive(Debug, Clone)]
pub struct QueuedSnapshot {
    pub snapshot: Snapshot,
    pub queued_at: Instant,
}

impl QueuedSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            queued_at: Instant::now(),
        }
    }

    /// Time elapsed since this snapshot was emitted.
    pub fn age(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

/// Identity of the currently selected physical device.
///
/// Replaced wholesale on every selection change, never mutated in
/// place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub path: Option<String>,
    pub vendor_id: u16,
    pub product_id: u16,
    /// High-level gamepad read path vs raw joystick fallback.
    pub is_gamepad: bool,
    pub likely_virtual: bool,
}

/// Tuning applied by the poll loop after shaping, before change
/// detection, so it is reflected in the epsilon comparison.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Flip the sign of the left stick vertical axis.
    pub invert_left_y: bool,
    /// Flip the sign of the right stick vertical axis.
    pub invert_right_y: bool,
    /// Left stick multiplier, result clamped back to [-1, 1].
    pub sensitivity_left: f64,
    /// Right stick multiplier, result clamped back to [-1, 1].
    pub sensitivity_right: f64,
    /// Emit buttons only on digital transitions instead of on every
    /// changed sample.
    pub buttons_edge_only: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            invert_left_y: false,
            invert_right_y: false,
            sensitivity_left: 1.0,
            sensitivity_right: 1.0,
            buttons_edge_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_indexes_are_dense() {
        for (i, signal) in Signal::ALL.iter().enumerate() {
            assert_eq!(signal.index(), i);
        }
    }

    #[test]
    fn stick_halves_serialize_with_directional_suffix() {
        let json = serde_json::to_string(&PhysicalInput::LeftStickXPos)
            .expect("serialize");
        assert_eq!(json, "\"LeftStickX_Pos\"");
        let back: PhysicalInput =
            serde_json::from_str("\"RightStickY_Neg\"").expect("deserialize");
        assert_eq!(back, PhysicalInput::RightStickYNeg);
    }

    #[test]
    fn buttons_serialize_by_name() {
        let json =
            serde_json::to_string(&PhysicalInput::ButtonSouth).expect("serialize");
        assert_eq!(json, "\"ButtonSouth\"");
    }

    #[test]
    fn start_and_back_read_menu_and_view() {
        assert_eq!(
            PhysicalInput::Start.class(),
            InputClass::Button(Signal::Menu)
        );
        assert_eq!(
            PhysicalInput::Back.class(),
            InputClass::Button(Signal::View)
        );
    }

    #[test]
    fn counterparts_pair_up() {
        for input in [
            PhysicalInput::LeftStickXPos,
            PhysicalInput::LeftStickYNeg,
            PhysicalInput::RightStickXNeg,
            PhysicalInput::RightStickYPos,
        ] {
            let other = input.axis_counterpart().expect("stick half");
            assert_eq!(other.axis_counterpart(), Some(input));
        }
        assert_eq!(PhysicalInput::ButtonSouth.axis_counterpart(), None);
        assert_eq!(PhysicalInput::None.axis_counterpart(), None);
    }

    #[test]
    fn axis_halves_share_signal() {
        let pos = PhysicalInput::LeftStickYPos.class();
        let neg = PhysicalInput::LeftStickYNeg.class();
        match (pos, neg) {
            (
                InputClass::AxisHalf {
                    signal: a,
                    positive: true,
                },
                InputClass::AxisHalf {
                    signal: b,
                    positive: false,
                },
            ) => assert_eq!(a, b),
            other => panic!("expected axis halves, got {other:?}"),
        }
    }
}
