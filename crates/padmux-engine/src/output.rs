use padmux_profile::OutputAction;

/// Fully populated output frame, one value per action.
///
/// Buttons hold 0 or 1, triggers [0, 1], stick axes [-1, 1]. Every
/// build starts from an all-zero frame so stale values never leak
/// between cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputState([f64; OutputAction::COUNT]);

impl OutputState {
    pub fn new() -> Self {
        Self([0.0; OutputAction::COUNT])
    }

    #[inline]
    pub fn get(&self, action: OutputAction) -> f64 {
        self.0[action.index()]
    }

    #[inline]
    pub fn set(&mut self, action: OutputAction, value: f64) {
        self.0[action.index()] = value;
    }

    /// Iterates (action, value) pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputAction, f64)> + '_ {
        OutputAction::ALL.iter().map(|a| (*a, self.0[a.index()]))
    }

    /// True when every action is at rest.
    pub fn is_neutral(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl Default for OutputState {
    fn default() -> Self {
        Self::new()
    }
}
