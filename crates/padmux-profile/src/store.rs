use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ahash::AHashSet;
use log::warn;

use crate::actions::default_bindings;
use crate::binding::Binding;
use crate::migrate::{
    complete_axis_pairs, merge_defaults, migrate_legacy_actions,
    normalize_axis_entries,
};
use crate::{Result, StoreError};

/// Reserved id of the default profile; also its file stem.
const DEFAULT_PROFILE: &str = "mapping";

/// Stand-in stem for profile ids that sanitize down to nothing.
const FALLBACK_STEM: &str = "mapping_alt";

const INVALID_CHARS: [char; 9] =
    ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Durable storage for binding profiles, one JSON file per profile
/// under the per-user application data directory.
///
/// Loading is infallible by design: a missing, corrupt or unreadable
/// profile degrades to the built-in defaults and the store heals the
/// file on disk where it can.
pub struct ProfileStore {
    root: PathBuf,
    default_path: PathBuf,
}

impl ProfileStore {
    /// Open the store in the per-user data directory, creating it if
    /// missing.
    pub fn new() -> Result<Self> {
        let root = dirs::data_local_dir()
            .ok_or(StoreError::NoDataDir)?
            .join("padmux");
        Self::with_root(root)
    }

    /// Open the store rooted at an explicit directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let default_path = root.join(format!("{DEFAULT_PROFILE}.json"));
        Ok(Self { root, default_path })
    }

    fn resolve_path(&self, profile_id: Option<&str>) -> PathBuf {
        let id = profile_id.unwrap_or("").trim();
        if id.is_empty()
            || id.eq_ignore_ascii_case(DEFAULT_PROFILE)
            || id.eq_ignore_ascii_case("default")
        {
            return self.default_path.clone();
        }
        self.root.join(format!("{}.json", sanitize_id(id)))
    }

    /// Load a profile, repairing it on disk when needed. The result is
    /// always structurally complete: legacy action names are migrated,
    /// half-bound stick axes completed and missing actions filled from
    /// the defaults.
    pub fn load(&self, profile_id: Option<&str>) -> Vec<Binding> {
        let path = self.resolve_path(profile_id);

        if !path.exists() {
            let defaults = default_bindings();
            self.write_back(profile_id, &defaults);
            return defaults;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("cannot read {}: {e}", path.display());
                let defaults = default_bindings();
                self.write_back(profile_id, &defaults);
                return defaults;
            }
        };

        let entries: Vec<Binding> = match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("corrupt profile {}: {e}", path.display());
                back_up(&path);
                let defaults = default_bindings();
                self.write_back(profile_id, &defaults);
                return defaults;
            }
        };

        let (migrated, entries) = migrate_legacy_actions(entries);
        let (completed, entries) = complete_axis_pairs(entries);
        let (merged, entries) = merge_defaults(entries);

        if migrated || completed || merged {
            // Persist the repair so the next load is clean.
            self.write_back(profile_id, &entries);
        }
        entries
    }

    /// Persist `bindings` for the profile. Stick-half assignments are
    /// normalized so the file always records both halves, with the
    /// caller's half last.
    pub fn save(
        &self,
        profile_id: Option<&str>,
        bindings: &[Binding],
    ) -> Result<()> {
        let path = self.resolve_path(profile_id);
        let normalized = normalize_axis_entries(bindings);
        let json = serde_json::to_string_pretty(&normalized)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Profile ids present on disk, most recently modified first, with
    /// the default profile forced to the front.
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        let mut stamped: Vec<(SystemTime, String)> = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.trim().is_empty() {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            stamped.push((modified, stem.to_string()));
        }
        stamped.sort_by(|a, b| b.0.cmp(&a.0));

        let mut names: Vec<String> =
            stamped.into_iter().map(|(_, name)| name).collect();
        if let Some(pos) = names.iter().position(|name| name == DEFAULT_PROFILE)
        {
            names.remove(pos);
        }
        names.insert(0, DEFAULT_PROFILE.to_string());

        let mut seen = AHashSet::new();
        names.retain(|name| seen.insert(name.to_lowercase()));
        Ok(names)
    }

    /// Remove a stored profile. The default profile is refused and
    /// reports false, as does a profile with no file on disk.
    pub fn delete_profile(&self, profile_id: &str) -> Result<bool> {
        let path = self.resolve_path(Some(profile_id));
        if path == self.default_path {
            return Ok(false);
        }
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    /// Best-effort save used on the load recovery paths, where a
    /// write failure must not take down the caller.
    fn write_back(&self, profile_id: Option<&str>, bindings: &[Binding]) {
        if let Err(e) = self.save(profile_id, bindings) {
            warn!("failed to persist profile: {e}");
        }
    }
}

/// Move a broken profile aside as `<file>.bak`, replacing any older
/// backup. Failure is tolerated; the file will simply be overwritten.
fn back_up(path: &Path) {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    if backup.exists() {
        let _ = fs::remove_file(&backup);
    }
    if let Err(e) = fs::rename(path, &backup) {
        warn!("failed to back up {}: {e}", path.display());
    }
}

/// Strip filename-hostile characters from a profile id, joining the
/// surviving runs with underscores.
fn sanitize_id(id: &str) -> String {
    let safe = id
        .split(|c: char| c.is_control() || INVALID_CHARS.contains(&c))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if safe.trim().is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        safe
    }
}
