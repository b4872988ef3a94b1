use std::path::{Path, PathBuf};

use ahash::AHashSet;
use thiserror::Error;

/// Error type for device-hiding operations.
#[derive(Debug, Error)]
pub(crate) enum HideError {
    /// No strategy produced a usable path to our own executable.
    #[error("Could not resolve the executable path")]
    ExePathUnresolved,
    /// The hiding driver rejected an operation.
    #[error("Hiding driver failed: {0}")]
    Driver(String),
}

/// Boundary to the OS-level device cloaking driver.
pub(crate) trait CloakDriver {
    fn is_installed(&self) -> bool;
    fn enable_global_hiding(&mut self) -> Result<(), HideError>;
    /// Whitelist an application so it keeps seeing hidden devices.
    fn add_application(&mut self, path: &Path) -> Result<(), HideError>;
    fn add_device(&mut self, id: &str) -> Result<(), HideError>;
    fn remove_device(&mut self, id: &str) -> Result<(), HideError>;
}

/// Driver wrapper that tracks what was hidden so disable can undo
/// exactly that and nothing else.
pub(crate) struct Cloak<D> {
    driver: D,
    enabled: bool,
    hidden: Vec<String>,
}

impl<D: CloakDriver> Cloak<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            enabled: false,
            hidden: Vec::new(),
        }
    }

    /// Whitelist this executable and turn on global cloaking. False
    /// when no driver is installed; failing to locate our own binary
    /// is fatal for the flow, since hiding without a whitelisted
    /// reader would blind the capture loop too.
    pub fn enable(&mut self) -> Result<bool, HideError> {
        if !self.driver.is_installed() {
            return Ok(false);
        }
        let candidates = exe_candidates();
        if candidates.is_empty() {
            return Err(HideError::ExePathUnresolved);
        }
        for path in &candidates {
            self.driver.add_application(path)?;
        }
        self.driver.enable_global_hiding()?;
        self.enabled = true;
        Ok(true)
    }

    /// Hide one device instance. A no-op until `enable` succeeded;
    /// already-hidden ids are skipped case-insensitively.
    pub fn hide_device(&mut self, id: &str) -> Result<(), HideError> {
        if !self.enabled {
            return Ok(());
        }
        if self.hidden.iter().any(|h| h.eq_ignore_ascii_case(id)) {
            return Ok(());
        }
        self.driver.add_device(id)?;
        self.hidden.push(id.to_string());
        Ok(())
    }

    /// Unhide the devices we hid. Global cloaking and the application
    /// whitelist stay in place for the next run.
    pub fn disable(&mut self) -> Result<(), HideError> {
        if !self.enabled {
            return Ok(());
        }
        for id in self.hidden.drain(..) {
            self.driver.remove_device(&id)?;
        }
        self.enabled = false;
        Ok(())
    }
}

/// Every way we know to locate our own executable on disk, canonical
/// and deduplicated case-insensitively. Strategies that fail on this
/// platform are skipped.
fn exe_candidates() -> Vec<PathBuf> {
    let raw = [
        std::env::current_exe().ok(),
        std::fs::read_link("/proc/self/exe").ok(),
        std::env::args().next().map(PathBuf::from),
    ];
    let mut seen = AHashSet::new();
    let mut found = Vec::new();
    for path in raw.into_iter().flatten() {
        let Ok(path) = path.canonicalize() else {
            continue;
        };
        if !path.is_file() {
            continue;
        }
        let key = path.to_string_lossy().to_ascii_lowercase();
        if seen.insert(key) {
            found.push(path);
        }
    }
    found
}

/// Stand-in for hosts without a cloaking stack installed.
pub(crate) struct NullCloak;

impl CloakDriver for NullCloak {
    fn is_installed(&self) -> bool {
        false
    }

    fn enable_global_hiding(&mut self) -> Result<(), HideError> {
        Ok(())
    }

    fn add_application(&mut self, _path: &Path) -> Result<(), HideError> {
        Ok(())
    }

    fn add_device(&mut self, _id: &str) -> Result<(), HideError> {
        Ok(())
    }

    fn remove_device(&mut self, _id: &str) -> Result<(), HideError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockDriver {
        installed: bool,
        calls: Vec<String>,
    }

    impl CloakDriver for MockDriver {
        fn is_installed(&self) -> bool {
            self.installed
        }

        fn enable_global_hiding(&mut self) -> Result<(), HideError> {
            self.calls.push("global_on".to_string());
            Ok(())
        }

        fn add_application(&mut self, path: &Path) -> Result<(), HideError> {
            self.calls.push(format!("app:{}", path.display()));
            Ok(())
        }

        fn add_device(&mut self, id: &str) -> Result<(), HideError> {
            self.calls.push(format!("add:{id}"));
            Ok(())
        }

        fn remove_device(&mut self, id: &str) -> Result<(), HideError> {
            self.calls.push(format!("remove:{id}"));
            Ok(())
        }
    }

    #[test]
    fn enable_without_driver_reports_false() {
        let mut cloak = Cloak::new(MockDriver::default());
        assert!(!cloak.enable().expect("enable"));
        assert!(cloak.driver.calls.is_empty());
    }

    #[test]
    fn enable_whitelists_exe_before_global_hiding() {
        let mut cloak = Cloak::new(MockDriver {
            installed: true,
            ..MockDriver::default()
        });
        assert!(cloak.enable().expect("enable"));

        let calls = &cloak.driver.calls;
        let global = calls
            .iter()
            .position(|c| c == "global_on")
            .expect("global hiding enabled");
        let apps: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| c.starts_with("app:"))
            .map(|(i, _)| i)
            .collect();
        // The test binary path always resolves.
        assert!(!apps.is_empty());
        assert!(apps.iter().all(|i| *i < global));
    }

    #[test]
    fn hide_device_before_enable_is_a_noop() {
        let mut cloak = Cloak::new(MockDriver {
            installed: true,
            ..MockDriver::default()
        });
        cloak.hide_device("HID\\VID_1234").expect("hide");
        assert!(cloak.driver.calls.is_empty());
    }

    #[test]
    fn hidden_devices_dedupe_case_insensitively() {
        let mut cloak = Cloak::new(MockDriver {
            installed: true,
            ..MockDriver::default()
        });
        cloak.enable().expect("enable");
        cloak.hide_device("HID\\VID_1234&PID_0001").expect("hide");
        cloak.hide_device("hid\\vid_1234&pid_0001").expect("hide");
        cloak.hide_device("HID\\VID_1234&PID_0002").expect("hide");

        let adds: Vec<&String> = cloak
            .driver
            .calls
            .iter()
            .filter(|c| c.starts_with("add:"))
            .collect();
        assert_eq!(adds.len(), 2);
    }

    #[test]
    fn disable_removes_devices_and_nothing_else() {
        let mut cloak = Cloak::new(MockDriver {
            installed: true,
            ..MockDriver::default()
        });
        cloak.enable().expect("enable");
        cloak.hide_device("dev-a").expect("hide");
        cloak.hide_device("dev-b").expect("hide");

        let before = cloak.driver.calls.len();
        cloak.disable().expect("disable");
        let after: Vec<String> =
            cloak.driver.calls[before..].to_vec();
        assert_eq!(after, vec!["remove:dev-a", "remove:dev-b"]);

        // A second disable has nothing left to do.
        cloak.disable().expect("disable");
        assert_eq!(cloak.driver.calls.len(), before + 2);
    }

    #[test]
    fn exe_resolution_finds_this_binary() {
        let candidates = exe_candidates();
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|p| p.is_file()));
    }
}
