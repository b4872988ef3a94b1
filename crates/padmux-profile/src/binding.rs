use padmux_capture::PhysicalInput;
use serde::{Deserialize, Serialize};

/// One persisted profile record binding a logical action to a
/// physical input. Records with missing fields deserialize to an
/// unassigned binding instead of failing the whole profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Binding {
    pub action: String,
    pub assigned: PhysicalInput,
}

impl Binding {
    pub fn new(action: impl Into<String>, assigned: PhysicalInput) -> Self {
        Self {
            action: action.into(),
            assigned,
        }
    }
}

impl Default for Binding {
    fn default() -> Self {
        Self {
            action: String::new(),
            assigned: PhysicalInput::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_lowercase_keys() {
        let binding = Binding::new("ButtonA", PhysicalInput::ButtonSouth);
        let json = serde_json::to_string(&binding).expect("serialize");
        assert_eq!(json, r#"{"action":"ButtonA","assigned":"ButtonSouth"}"#);
    }

    #[test]
    fn missing_fields_default_to_unassigned() {
        let binding: Binding = serde_json::from_str("{}").expect("parse");
        assert_eq!(binding.action, "");
        assert_eq!(binding.assigned, PhysicalInput::None);
    }

    #[test]
    fn stick_half_round_trips_wire_name() {
        let binding = Binding::new("ThumbLX", PhysicalInput::LeftStickXNeg);
        let json = serde_json::to_string(&binding).expect("serialize");
        assert!(json.contains("LeftStickX_Neg"));
        let back: Binding = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, binding);
    }
}
