//! JSON persistence for the roster.

use super::store::EquipmentStore;
use super::types::Roster;
use crate::config::PlannerConfig;
use crate::equipment::Equipment;
use crate::error::StoreError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load a roster, returning an empty one if the file does not exist yet.
/// A file that exists but cannot be parsed is an error.
pub fn load_roster(path: &Path) -> Result<Roster, StoreError> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(serde_json::from_str(&json)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No roster file, starting empty");
            Ok(Roster::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Write the roster as pretty-printed JSON, stamping `saved_at`.
pub fn save_roster(path: &Path, roster: &mut Roster) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    roster.saved_at = Some(chrono::Utc::now());
    let json = serde_json::to_string_pretty(roster)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), characters = roster.characters.len(), "Saved roster");
    Ok(())
}

/// A roster bound to its file. Every equipment replacement is written
/// through before returning.
pub struct SavedRoster {
    path: PathBuf,
    roster: Roster,
}

impl SavedRoster {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let roster = load_roster(&path)?;
        info!(path = %path.display(), characters = roster.characters.len(), "Opened roster");
        Ok(Self { path, roster })
    }

    pub fn open_default(config: &PlannerConfig) -> Result<Self, StoreError> {
        Self::open(config.roster_path())
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Edit the roster and persist the result.
    pub fn update<T>(
        &mut self,
        edit: impl FnOnce(&mut Roster) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let value = edit(&mut self.roster)?;
        self.save()?;
        Ok(value)
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        save_roster(&self.path, &mut self.roster)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EquipmentStore for SavedRoster {
    fn equipment(&self, character_id: &str) -> Option<&[Equipment]> {
        self.roster.equipment(character_id)
    }

    fn replace_equipment(
        &mut self,
        character_id: &str,
        equipment: Vec<Equipment>,
    ) -> Result<(), StoreError> {
        self.roster.replace_equipment(character_id, equipment)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{ConcreteSlot, EquipmentType};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn temp_roster_path() -> PathBuf {
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);
        let test_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("starforce-test-{}-{}", std::process::id(), test_id))
            .join("roster.json")
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let roster = load_roster(&temp_roster_path()).unwrap();
        assert!(roster.characters.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_roster_path();
        let mut roster = Roster::new();
        let id = roster.add_character("Alpha");
        roster
            .add_equipment(
                &id,
                Equipment::new("", "Cape", ConcreteSlot::Cape, 150, EquipmentType::Armor)
                    .with_stars(5, 17),
            )
            .unwrap();
        save_roster(&path, &mut roster).unwrap();

        let loaded = load_roster(&path).unwrap();
        assert_eq!(loaded, roster);
        assert!(loaded.saved_at.is_some());

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_roster_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_roster(&path), Err(StoreError::Serialization(_))));
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_saved_roster_writes_through_on_replace() {
        let path = temp_roster_path();
        let mut saved = SavedRoster::open(&path).unwrap();
        let id = saved.update(|r| Ok(r.add_character("Alpha"))).unwrap();

        let list = vec![Equipment::new("e1", "Belt", ConcreteSlot::Belt, 150, EquipmentType::Armor)];
        saved.replace_equipment(&id, list.clone()).unwrap();

        let reloaded = load_roster(&path).unwrap();
        assert_eq!(reloaded.character(&id).unwrap().equipment, list);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_open_default_uses_configured_data_dir() {
        let path = temp_roster_path();
        let config = PlannerConfig {
            data_dir: path.parent().unwrap().to_path_buf(),
            ..Default::default()
        };
        let mut saved = SavedRoster::open_default(&config).unwrap();
        assert_eq!(saved.path(), path.as_path());

        saved.update(|r| Ok(r.add_character("Alpha"))).unwrap();
        assert!(path.exists());
        assert_eq!(load_roster(&path).unwrap().characters.len(), 1);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
