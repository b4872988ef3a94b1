use padmux_capture::PhysicalInput;

use crate::actions::{default_bindings, OutputAction};
use crate::binding::Binding;

/// The four stick actions with their half-direction inputs.
const STICK_PAIRS: [(OutputAction, PhysicalInput, PhysicalInput); 4] = [
    (
        OutputAction::ThumbLX,
        PhysicalInput::LeftStickXPos,
        PhysicalInput::LeftStickXNeg,
    ),
    (
        OutputAction::ThumbLY,
        PhysicalInput::LeftStickYPos,
        PhysicalInput::LeftStickYNeg,
    ),
    (
        OutputAction::ThumbRX,
        PhysicalInput::RightStickXPos,
        PhysicalInput::RightStickXNeg,
    ),
    (
        OutputAction::ThumbRY,
        PhysicalInput::RightStickYPos,
        PhysicalInput::RightStickYNeg,
    ),
];

fn legacy_target(action: &str) -> Option<&'static str> {
    Some(match action.to_ascii_uppercase().as_str() {
        "LX+" | "LX-" => "ThumbLX",
        "LY+" | "LY-" => "ThumbLY",
        "RX+" | "RX-" => "ThumbRX",
        "RY+" | "RY-" => "ThumbRY",
        _ => return None,
    })
}

/// Rewrite actions recorded under the old directional-suffix scheme
/// (`LX+`, `RY-`, ...) to the unified continuous-axis names.
pub(crate) fn migrate_legacy_actions(
    bindings: Vec<Binding>,
) -> (bool, Vec<Binding>) {
    let mut changed = false;
    let migrated = bindings
        .into_iter()
        .map(|binding| match legacy_target(&binding.action) {
            Some(newer) if binding.action != newer => {
                changed = true;
                Binding::new(newer, binding.assigned)
            }
            _ => binding,
        })
        .collect();
    (changed, migrated)
}

/// For each stick action with at least one half-direction bound, add
/// the missing half so both directions of the axis work. Axes the
/// user cleared entirely are left alone.
pub(crate) fn complete_axis_pairs(
    bindings: Vec<Binding>,
) -> (bool, Vec<Binding>) {
    let mut changed = false;
    let mut list = bindings;

    for (action, pos, neg) in STICK_PAIRS {
        let has_half = |input: PhysicalInput| {
            list.iter().any(|b| {
                b.action.eq_ignore_ascii_case(action.name())
                    && b.assigned == input
            })
        };
        let has_pos = has_half(pos);
        let has_neg = has_half(neg);
        if !(has_pos || has_neg) {
            continue;
        }
        if !has_pos {
            list.push(Binding::new(action.name(), pos));
            changed = true;
        }
        if !has_neg {
            list.push(Binding::new(action.name(), neg));
            changed = true;
        }
    }

    (changed, list)
}

/// Drop entries explicitly bound to nothing, then fill any action
/// missing from the profile with its built-in default bindings.
pub(crate) fn merge_defaults(bindings: Vec<Binding>) -> (bool, Vec<Binding>) {
    let mut changed = false;
    let mut list: Vec<Binding> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        if binding.assigned == PhysicalInput::None {
            changed = true;
            continue;
        }
        list.push(binding);
    }

    for action in OutputAction::ALL {
        let bound = list
            .iter()
            .any(|b| b.action.eq_ignore_ascii_case(action.name()));
        if bound {
            continue;
        }
        for default in default_bindings()
            .into_iter()
            .filter(|b| b.action == action.name())
        {
            list.push(default);
            changed = true;
        }
    }

    (changed, list)
}

/// Save-time pass: for stick-half assignments, record the counterpart
/// half ahead of the chosen one so the file always carries a full
/// pair, with the caller's half last and therefore authoritative for
/// order-sensitive readers. Exact duplicates are collapsed.
pub(crate) fn normalize_axis_entries(bindings: &[Binding]) -> Vec<Binding> {
    let mut result: Vec<Binding> = Vec::with_capacity(bindings.len());

    fn add_if_missing(
        result: &mut Vec<Binding>,
        action: &str,
        assigned: PhysicalInput,
    ) {
        let present = result.iter().any(|b| {
            b.action.eq_ignore_ascii_case(action) && b.assigned == assigned
        });
        if !present {
            result.push(Binding::new(action, assigned));
        }
    }

    for binding in bindings {
        match binding.assigned.axis_counterpart() {
            Some(other) if is_stick_action(&binding.action) => {
                add_if_missing(&mut result, &binding.action, other);
                add_if_missing(&mut result, &binding.action, binding.assigned);
            }
            _ => add_if_missing(&mut result, &binding.action, binding.assigned),
        }
    }

    result
}

fn is_stick_action(action: &str) -> bool {
    OutputAction::from_name(action).is_some_and(OutputAction::is_stick)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_names_are_rewritten() {
        let (changed, out) = migrate_legacy_actions(vec![
            Binding::new("LX+", PhysicalInput::LeftStickXPos),
            Binding::new("ry-", PhysicalInput::RightStickYNeg),
            Binding::new("ButtonA", PhysicalInput::ButtonSouth),
        ]);
        assert!(changed);
        assert_eq!(out[0].action, "ThumbLX");
        assert_eq!(out[1].action, "ThumbRY");
        assert_eq!(out[2].action, "ButtonA");
    }

    #[test]
    fn migration_reports_no_change_for_current_names() {
        let input = vec![
            Binding::new("ThumbLX", PhysicalInput::LeftStickXPos),
            Binding::new("ButtonB", PhysicalInput::ButtonEast),
        ];
        let (changed, out) = migrate_legacy_actions(input.clone());
        assert!(!changed);
        assert_eq!(out, input);
    }

    #[test]
    fn half_bound_axis_gains_its_counterpart() {
        let (changed, out) = complete_axis_pairs(vec![Binding::new(
            "ThumbLX",
            PhysicalInput::LeftStickXPos,
        )]);
        assert!(changed);
        assert!(out.contains(&Binding::new(
            "ThumbLX",
            PhysicalInput::LeftStickXNeg
        )));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn cleared_axis_is_not_resurrected() {
        let (changed, out) =
            complete_axis_pairs(vec![Binding::new(
                "ButtonA",
                PhysicalInput::ButtonSouth,
            )]);
        assert!(!changed);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn axis_completion_is_idempotent() {
        let (_, once) = complete_axis_pairs(vec![Binding::new(
            "ThumbRY",
            PhysicalInput::RightStickYNeg,
        )]);
        let (changed, twice) = complete_axis_pairs(once.clone());
        assert!(!changed);
        assert_eq!(once, twice);
    }

    #[test]
    fn none_assignments_are_dropped_and_backfilled() {
        let (changed, out) =
            merge_defaults(vec![Binding::new("ButtonA", PhysicalInput::None)]);
        assert!(changed);
        assert!(!out
            .iter()
            .any(|b| b.assigned == PhysicalInput::None));
        // ButtonA came back from the defaults.
        assert!(out.contains(&Binding::new(
            "ButtonA",
            PhysicalInput::ButtonSouth
        )));
    }

    #[test]
    fn merge_fills_every_missing_action() {
        let (changed, out) = merge_defaults(Vec::new());
        assert!(changed);
        for action in OutputAction::ALL {
            assert!(
                out.iter()
                    .any(|b| b.action.eq_ignore_ascii_case(action.name())),
                "missing {}",
                action.name()
            );
        }
        // Stick actions arrive as full pairs.
        assert_eq!(
            out.iter().filter(|b| b.action == "ThumbLX").count(),
            2
        );
    }

    #[test]
    fn merge_keeps_multiple_bindings_per_action() {
        let input = vec![
            Binding::new("TriggerLeft", PhysicalInput::LeftTrigger),
            Binding::new("TriggerLeft", PhysicalInput::RightBumper),
        ];
        let (_, out) = merge_defaults(input);
        assert_eq!(
            out.iter().filter(|b| b.action == "TriggerLeft").count(),
            2
        );
    }

    #[test]
    fn merge_reports_no_change_for_complete_profile() {
        let (_, complete) = merge_defaults(Vec::new());
        let (changed, out) = merge_defaults(complete.clone());
        assert!(!changed);
        assert_eq!(out, complete);
    }

    #[test]
    fn normalize_writes_counterpart_before_chosen_half() {
        let out = normalize_axis_entries(&[Binding::new(
            "ThumbLX",
            PhysicalInput::LeftStickXPos,
        )]);
        assert_eq!(
            out,
            vec![
                Binding::new("ThumbLX", PhysicalInput::LeftStickXNeg),
                Binding::new("ThumbLX", PhysicalInput::LeftStickXPos),
            ]
        );
    }

    #[test]
    fn normalize_collapses_duplicates() {
        let out = normalize_axis_entries(&[
            Binding::new("ButtonA", PhysicalInput::ButtonSouth),
            Binding::new("ButtonA", PhysicalInput::ButtonSouth),
            Binding::new("ThumbLX", PhysicalInput::LeftStickXPos),
            Binding::new("ThumbLX", PhysicalInput::LeftStickXNeg),
        ]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn normalize_leaves_non_stick_assignments_alone() {
        let out = normalize_axis_entries(&[Binding::new(
            "ButtonA",
            PhysicalInput::LeftStickXPos,
        )]);
        assert_eq!(
            out,
            vec![Binding::new("ButtonA", PhysicalInput::LeftStickXPos)]
        );
    }
}
