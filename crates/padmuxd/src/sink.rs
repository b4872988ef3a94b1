use colored::Colorize;
use padmux_engine::{OutputSink, OutputState, SinkError, SinkReport};

use crate::print_debug;

/// Sink for runs without a virtual pad driver attached: converts each
/// frame to a wire report and logs transitions instead of submitting
/// them anywhere.
pub(crate) struct TraceSink {
    frames: u64,
    last: Option<SinkReport>,
}

impl TraceSink {
    pub fn new() -> Self {
        Self {
            frames: 0,
            last: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl OutputSink for TraceSink {
    fn apply(&mut self, state: &OutputState) -> Result<(), SinkError> {
        self.frames += 1;
        let report = SinkReport::from_state(state);
        if self.last != Some(report) {
            print_debug!(
                "report lx={} ly={} rx={} ry={} lt={} rt={} pressed={}",
                report.thumb_lx,
                report.thumb_ly,
                report.thumb_rx,
                report.thumb_ry,
                report.trigger_left,
                report.trigger_right,
                pressed_list(&report)
            );
            self.last = Some(report);
        }
        Ok(())
    }
}

fn pressed_list(report: &SinkReport) -> String {
    let names = [
        (report.a, "A"),
        (report.b, "B"),
        (report.x, "X"),
        (report.y, "Y"),
        (report.left_shoulder, "LB"),
        (report.right_shoulder, "RB"),
        (report.start, "Start"),
        (report.back, "Back"),
        (report.left_thumb, "L3"),
        (report.right_thumb, "R3"),
        (report.dpad_up, "DUp"),
        (report.dpad_down, "DDown"),
        (report.dpad_left, "DLeft"),
        (report.dpad_right, "DRight"),
    ];
    let pressed: Vec<&str> = names
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
    if pressed.is_empty() {
        "-".to_string()
    } else {
        pressed.join("+")
    }
}

#[cfg(test)]
mod tests {
    use padmux_profile::OutputAction;

    use super::*;

    #[test]
    fn counts_every_applied_frame() {
        let mut sink = TraceSink::new();
        let state = OutputState::new();
        sink.apply(&state).unwrap();
        sink.apply(&state).unwrap();
        assert_eq!(sink.frames(), 2);
        assert_eq!(sink.last, Some(SinkReport::default()));
    }

    #[test]
    fn pressed_list_names_active_buttons() {
        let mut state = OutputState::new();
        assert_eq!(pressed_list(&SinkReport::from_state(&state)), "-");

        state.set(OutputAction::ButtonA, 1.0);
        state.set(OutputAction::DPadUp, 1.0);
        let report = SinkReport::from_state(&state);
        assert_eq!(pressed_list(&report), "A+DUp");
    }
}
