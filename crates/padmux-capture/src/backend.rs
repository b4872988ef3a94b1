use crate::{CaptureError, Result};

/// Controller family reported by the hardware layer for an opened pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    Xbox360,
    XboxOne,
    Ps4,
    Ps5,
    Standard,
    Unknown,
}

/// Axes exposed by the high-level gamepad read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

/// Buttons exposed by the high-level gamepad read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadButton {
    South,
    East,
    West,
    North,
    LeftShoulder,
    RightShoulder,
    Back,
    Start,
    LeftStick,
    RightStick,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

/// An opened device the poll loop reads from.
///
/// Raw samples use the native signed 16-bit range. Closing happens on
/// drop.
pub trait DeviceHandle {
    fn name(&self) -> String;
    fn path(&self) -> Option<String>;
    fn vendor_id(&self) -> u16;
    fn product_id(&self) -> u16;
    fn kind(&self) -> PadKind;
    fn axis(&self, axis: PadAxis) -> i16;
    fn button(&self, button: PadButton) -> bool;
    /// Raw read path for devices without a gamepad mapping.
    fn joystick_axis(&self, index: u32) -> i16;
    fn joystick_button(&self, index: u32) -> bool;
}

/// Hardware layer the capture loop polls.
///
/// Implementations wrap the platform input library. The whole object
/// is constructed on the poll thread and never leaves it; teardown
/// happens on drop.
pub trait HostBackend {
    type Device: DeviceHandle;

    /// Drain pending hotplug notifications. Returns true when any
    /// device arrived or left since the previous call.
    fn pump_events(&mut self) -> bool;
    /// Force-refresh the backend's internal device state cache.
    fn refresh(&mut self);
    /// Ids of devices exposing a high-level gamepad mapping.
    fn gamepad_ids(&mut self) -> Vec<u32>;
    /// Ids of devices only reachable through the raw joystick path.
    fn joystick_ids(&mut self) -> Vec<u32>;
    fn open_gamepad(&mut self, id: u32) -> Result<Self::Device>;
    fn open_joystick(&mut self, id: u32) -> Result<Self::Device>;
}

/// Backend that never enumerates anything. Stands in when the host has
/// no supported input library and keeps pipeline wiring testable.
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Placeholder handle for [`NullBackend`]; never actually opened.
#[derive(Debug)]
pub struct NullDevice;

impl DeviceHandle for NullDevice {
    fn name(&self) -> String {
        String::new()
    }

    fn path(&self) -> Option<String> {
        None
    }

    fn vendor_id(&self) -> u16 {
        0
    }

    fn product_id(&self) -> u16 {
        0
    }

    fn kind(&self) -> PadKind {
        PadKind::Unknown
    }

    fn axis(&self, _axis: PadAxis) -> i16 {
        0
    }

    fn button(&self, _button: PadButton) -> bool {
        false
    }

    fn joystick_axis(&self, _index: u32) -> i16 {
        0
    }

    fn joystick_button(&self, _index: u32) -> bool {
        false
    }
}

impl HostBackend for NullBackend {
    type Device = NullDevice;

    fn pump_events(&mut self) -> bool {
        false
    }

    fn refresh(&mut self) {}

    fn gamepad_ids(&mut self) -> Vec<u32> {
        Vec::new()
    }

    fn joystick_ids(&mut self) -> Vec<u32> {
        Vec::new()
    }

    fn open_gamepad(&mut self, id: u32) -> Result<NullDevice> {
        Err(CaptureError::DeviceOpen(format!("no such device: {id}")))
    }

    fn open_joystick(&mut self, id: u32) -> Result<NullDevice> {
        Err(CaptureError::DeviceOpen(format!("no such device: {id}")))
    }
}
