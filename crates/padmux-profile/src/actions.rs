use padmux_capture::PhysicalInput;

use crate::binding::Binding;

/// The fixed set of virtual-controller output actions. Every built
/// output state carries a value for each of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputAction {
    ButtonA,
    ButtonB,
    ButtonX,
    ButtonY,
    ButtonLeftShoulder,
    ButtonRightShoulder,
    ButtonStart,
    ButtonBack,
    ThumbLPressed,
    ThumbRPressed,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    TriggerLeft,
    TriggerRight,
    ThumbLX,
    ThumbLY,
    ThumbRX,
    ThumbRY,
}

impl OutputAction {
    pub const COUNT: usize = 20;

    /// Every action, in declaration order.
    pub const ALL: [OutputAction; OutputAction::COUNT] = [
        OutputAction::ButtonA,
        OutputAction::ButtonB,
        OutputAction::ButtonX,
        OutputAction::ButtonY,
        OutputAction::ButtonLeftShoulder,
        OutputAction::ButtonRightShoulder,
        OutputAction::ButtonStart,
        OutputAction::ButtonBack,
        OutputAction::ThumbLPressed,
        OutputAction::ThumbRPressed,
        OutputAction::DPadUp,
        OutputAction::DPadDown,
        OutputAction::DPadLeft,
        OutputAction::DPadRight,
        OutputAction::TriggerLeft,
        OutputAction::TriggerRight,
        OutputAction::ThumbLX,
        OutputAction::ThumbLY,
        OutputAction::ThumbRX,
        OutputAction::ThumbRY,
    ];

    /// Dense index, usable for per-action state arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical action name as it appears in profile files.
    pub fn name(self) -> &'static str {
        match self {
            OutputAction::ButtonA => "ButtonA",
            OutputAction::ButtonB => "ButtonB",
            OutputAction::ButtonX => "ButtonX",
            OutputAction::ButtonY => "ButtonY",
            OutputAction::ButtonLeftShoulder => "ButtonLeftShoulder",
            OutputAction::ButtonRightShoulder => "ButtonRightShoulder",
            OutputAction::ButtonStart => "ButtonStart",
            OutputAction::ButtonBack => "ButtonBack",
            OutputAction::ThumbLPressed => "ThumbLPressed",
            OutputAction::ThumbRPressed => "ThumbRPressed",
            OutputAction::DPadUp => "DPadUp",
            OutputAction::DPadDown => "DPadDown",
            OutputAction::DPadLeft => "DPadLeft",
            OutputAction::DPadRight => "DPadRight",
            OutputAction::TriggerLeft => "TriggerLeft",
            OutputAction::TriggerRight => "TriggerRight",
            OutputAction::ThumbLX => "ThumbLX",
            OutputAction::ThumbLY => "ThumbLY",
            OutputAction::ThumbRX => "ThumbRX",
            OutputAction::ThumbRY => "ThumbRY",
        }
    }

    /// Resolve an action name, ignoring case. Profile files written by
    /// hand or by older builds are not consistent about casing.
    pub fn from_name(name: &str) -> Option<OutputAction> {
        OutputAction::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(name))
    }

    /// One of the two analog trigger actions.
    pub fn is_trigger(self) -> bool {
        matches!(self, OutputAction::TriggerLeft | OutputAction::TriggerRight)
    }

    /// One of the four continuous stick-axis actions.
    pub fn is_stick(self) -> bool {
        matches!(
            self,
            OutputAction::ThumbLX
                | OutputAction::ThumbLY
                | OutputAction::ThumbRX
                | OutputAction::ThumbRY
        )
    }
}

/// The built-in mapping every new profile starts from. Stick actions
/// carry both half-directions of their axis.
pub fn default_bindings() -> Vec<Binding> {
    vec![
        Binding::new("ButtonA", PhysicalInput::ButtonSouth),
        Binding::new("ButtonB", PhysicalInput::ButtonEast),
        Binding::new("ButtonX", PhysicalInput::ButtonWest),
        Binding::new("ButtonY", PhysicalInput::ButtonNorth),
        Binding::new("ButtonLeftShoulder", PhysicalInput::LeftBumper),
        Binding::new("ButtonRightShoulder", PhysicalInput::RightBumper),
        Binding::new("ButtonStart", PhysicalInput::Start),
        Binding::new("ButtonBack", PhysicalInput::Back),
        Binding::new("ThumbLPressed", PhysicalInput::LeftStickClick),
        Binding::new("ThumbRPressed", PhysicalInput::RightStickClick),
        Binding::new("DPadUp", PhysicalInput::DPadUp),
        Binding::new("DPadDown", PhysicalInput::DPadDown),
        Binding::new("DPadLeft", PhysicalInput::DPadLeft),
        Binding::new("DPadRight", PhysicalInput::DPadRight),
        Binding::new("TriggerLeft", PhysicalInput::LeftTrigger),
        Binding::new("TriggerRight", PhysicalInput::RightTrigger),
        Binding::new("ThumbLX", PhysicalInput::LeftStickXPos),
        Binding::new("ThumbLX", PhysicalInput::LeftStickXNeg),
        Binding::new("ThumbLY", PhysicalInput::LeftStickYPos),
        Binding::new("ThumbLY", PhysicalInput::LeftStickYNeg),
        Binding::new("ThumbRX", PhysicalInput::RightStickXPos),
        Binding::new("ThumbRX", PhysicalInput::RightStickXNeg),
        Binding::new("ThumbRY", PhysicalInput::RightStickYPos),
        Binding::new("ThumbRY", PhysicalInput::RightStickYNeg),
    ]
}

/// Names of every action the system recognizes.
pub fn default_actions() -> Vec<&'static str> {
    OutputAction::ALL.iter().map(|action| action.name()).collect()
}
