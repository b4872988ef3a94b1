use ahash::AHashMap;
use padmux_capture::{InputClass, PhysicalInput, Signal, Snapshot};
use padmux_profile::{Binding, OutputAction};

use crate::output::OutputState;

/// Press threshold for digital targets fed by buttons or triggers.
const PRESS_THRESHOLD: f64 = 0.5;
/// Deflection threshold for digital targets fed by stick halves.
const AXIS_THRESHOLD: f64 = 0.6;

/// Translates physical signal state into output actions through a
/// binding table.
///
/// Snapshots arrive as change batches, so the engine keeps the last
/// known value of every signal: a button held across many cycles stays
/// asserted even when later snapshots never mention it. `build_output`
/// folds the incoming batch into that state and re-evaluates the whole
/// table against it.
pub struct MappingEngine {
    table: AHashMap<PhysicalInput, Box<str>>,
    state: [f64; Signal::COUNT],
    /// Per stick action: both half-directions bound, so each half
    /// contributes only its own sign.
    half_sticks: [bool; 4],
}

impl MappingEngine {
    pub fn new() -> Self {
        Self {
            table: AHashMap::new(),
            state: [0.0; Signal::COUNT],
            half_sticks: [false; 4],
        }
    }

    /// Replaces the binding table wholesale.
    ///
    /// Unassigned bindings are skipped. When two bindings claim the
    /// same physical input, the later entry wins.
    pub fn load(&mut self, bindings: &[Binding]) {
        let mut table = AHashMap::with_capacity(bindings.len());
        for binding in bindings {
            if binding.assigned == PhysicalInput::None {
                continue;
            }
            let action = binding.action.clone().into_boxed_str();
            if let Some(previous) = table.insert(binding.assigned, action) {
                log::debug!(
                    "{:?} rebound from '{}' to '{}'",
                    binding.assigned,
                    previous,
                    binding.action
                );
            }
        }
        self.half_sticks = stick_half_modes(&table);
        self.table = table;
    }

    /// Folds a snapshot into the remembered signal state and rebuilds
    /// the full output frame from it.
    ///
    /// Bindings whose action name resolves to nothing are ignored.
    pub fn build_output(&mut self, snapshot: &Snapshot) -> OutputState {
        for (signal, value) in snapshot {
            self.state[signal.index()] = *value;
        }

        let mut output = OutputState::new();
        for (input, action) in &self.table {
            let Some(target) = OutputAction::from_name(action) else {
                continue;
            };
            match input.class() {
                InputClass::Button(signal) => {
                    if self.state[signal.index()] >= PRESS_THRESHOLD {
                        output.set(target, 1.0);
                    }
                }
                InputClass::Trigger(signal) => {
                    let value = self.state[signal.index()];
                    if target.is_trigger() {
                        // Several triggers may feed one output; the
                        // strongest pull wins.
                        let value = value.clamp(0.0, 1.0);
                        if value > output.get(target) {
                            output.set(target, value);
                        }
                    } else if value >= PRESS_THRESHOLD {
                        output.set(target, 1.0);
                    }
                }
                InputClass::AxisHalf { signal, positive } => {
                    let value = self.state[signal.index()];
                    if let Some(slot) = stick_slot(target) {
                        let contribution = if !self.half_sticks[slot] {
                            // Lone half-binding drives the whole axis.
                            value
                        } else if positive {
                            value.max(0.0)
                        } else {
                            value.min(0.0)
                        };
                        if contribution.abs() > output.get(target).abs() {
                            output.set(target, contribution);
                        }
                    } else {
                        let active = if positive {
                            value >= AXIS_THRESHOLD
                        } else {
                            value <= -AXIS_THRESHOLD
                        };
                        if active {
                            output.set(target, 1.0);
                        }
                    }
                }
                InputClass::None => {}
            }
        }
        output
    }

    /// Forgets all remembered signal state, e.g. after a disconnect.
    pub fn reset(&mut self) {
        self.state = [0.0; Signal::COUNT];
    }

    /// Number of active (assigned) bindings in the current table.
    pub fn binding_count(&self) -> usize {
        self.table.len()
    }
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn stick_slot(action: OutputAction) -> Option<usize> {
    match action {
        OutputAction::ThumbLX => Some(0),
        OutputAction::ThumbLY => Some(1),
        OutputAction::ThumbRX => Some(2),
        OutputAction::ThumbRY => Some(3),
        _ => None,
    }
}

fn stick_half_modes(table: &AHashMap<PhysicalInput, Box<str>>) -> [bool; 4] {
    let mut pos = [false; 4];
    let mut neg = [false; 4];
    for (input, action) in table {
        let Some(slot) =
            OutputAction::from_name(action).and_then(stick_slot)
        else {
            continue;
        };
        if let InputClass::AxisHalf { positive, .. } = input.class() {
            if positive {
                pos[slot] = true;
            } else {
                neg[slot] = true;
            }
        }
    }
    [
        pos[0] && neg[0],
        pos[1] && neg[1],
        pos[2] && neg[2],
        pos[3] && neg[3],
    ]
}
