use crate::equipment::Equipment;
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// A character and the gear tracked for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    /// Equipped items, ids unique within the character
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    /// Items tracked for calculation only, not equipped
    #[serde(default)]
    pub virtual_equipment: Vec<Equipment>,
}

impl Character {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            equipment: Vec::new(),
            virtual_equipment: Vec::new(),
        }
    }

    pub fn find_equipment(&self, equipment_id: &str) -> Option<&Equipment> {
        self.equipment.iter().find(|eq| eq.id == equipment_id)
    }
}

pub fn new_equipment_id() -> String {
    Uuid::new_v4().to_string()
}

/// All characters plus the current selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_character_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a character and return its id. The first character added becomes
    /// active.
    pub fn add_character(&mut self, name: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        self.characters.push(Character::new(id.clone(), name));
        if self.active_character_id.is_none() {
            self.active_character_id = Some(id.clone());
        }
        id
    }

    pub fn remove_character(&mut self, character_id: &str) -> bool {
        let before = self.characters.len();
        self.characters.retain(|c| c.id != character_id);
        if self.active_character_id.as_deref() == Some(character_id) {
            self.active_character_id = None;
        }
        self.characters.len() != before
    }

    pub fn select(&mut self, character_id: &str) -> Result<(), StoreError> {
        if self.character(character_id).is_none() {
            return Err(StoreError::CharacterNotFound(character_id.to_string()));
        }
        self.active_character_id = Some(character_id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.active_character_id = None;
    }

    pub fn active(&self) -> Option<&Character> {
        let id = self.active_character_id.as_deref()?;
        self.character(id)
    }

    pub fn character(&self, character_id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == character_id)
    }

    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn character_mut(&mut self, character_id: &str) -> Result<&mut Character, StoreError> {
        self.characters
            .iter_mut()
            .find(|c| c.id == character_id)
            .ok_or_else(|| StoreError::CharacterNotFound(character_id.to_string()))
    }

    /// Append equipment under a fresh synthetic id, returning the id.
    pub fn add_equipment(
        &mut self,
        character_id: &str,
        mut equipment: Equipment,
    ) -> Result<String, StoreError> {
        let character = self.character_mut(character_id)?;
        equipment.id = new_equipment_id();
        let id = equipment.id.clone();
        debug!(character = character_id, equipment = %id, "Adding equipment");
        character.equipment.push(equipment);
        Ok(id)
    }

    /// Replace the record with the same id in place.
    pub fn update_equipment(
        &mut self,
        character_id: &str,
        equipment: Equipment,
    ) -> Result<(), StoreError> {
        let character = self.character_mut(character_id)?;
        let slot = character
            .equipment
            .iter_mut()
            .find(|eq| eq.id == equipment.id)
            .ok_or_else(|| StoreError::EquipmentNotFound(equipment.id.clone()))?;
        *slot = equipment;
        Ok(())
    }

    /// Remove a record by id. Sibling lineage pointing at it is cleared; a
    /// transferred star floor stays where it landed.
    pub fn remove_equipment(
        &mut self,
        character_id: &str,
        equipment_id: &str,
    ) -> Result<bool, StoreError> {
        let character = self.character_mut(character_id)?;
        let before = character.equipment.len();
        character.equipment.retain(|eq| eq.id != equipment_id);
        let removed = character.equipment.len() != before;
        if removed {
            for eq in character.equipment.iter_mut() {
                if eq.transferred_to.as_deref() == Some(equipment_id) {
                    eq.transferred_to = None;
                }
                if eq.transfer_target_id.as_deref() == Some(equipment_id) {
                    eq.transfer_target_id = None;
                }
            }
        }
        Ok(removed)
    }

    /// Edit an item's star goal. Values are clamped to the level limit and the
    /// transferred floor.
    pub fn set_star_goal(
        &mut self,
        character_id: &str,
        equipment_id: &str,
        current: u32,
        target: u32,
    ) -> Result<(), StoreError> {
        let character = self.character_mut(character_id)?;
        let equipment = character
            .equipment
            .iter_mut()
            .chain(character.virtual_equipment.iter_mut())
            .find(|eq| eq.id == equipment_id)
            .ok_or_else(|| StoreError::EquipmentNotFound(equipment_id.to_string()))?;
        equipment.set_star_goal(current, target);
        Ok(())
    }

    pub fn add_virtual_equipment(
        &mut self,
        character_id: &str,
        mut equipment: Equipment,
    ) -> Result<String, StoreError> {
        let character = self.character_mut(character_id)?;
        equipment.id = new_equipment_id();
        let id = equipment.id.clone();
        character.virtual_equipment.push(equipment);
        Ok(id)
    }

    pub fn remove_virtual_equipment(
        &mut self,
        character_id: &str,
        equipment_id: &str,
    ) -> Result<bool, StoreError> {
        let character = self.character_mut(character_id)?;
        let before = character.virtual_equipment.len();
        character.virtual_equipment.retain(|eq| eq.id != equipment_id);
        Ok(character.virtual_equipment.len() != before)
    }

    pub(crate) fn set_equipment(
        &mut self,
        character_id: &str,
        equipment: Vec<Equipment>,
    ) -> Result<(), StoreError> {
        self.character_mut(character_id)?.equipment = equipment;
        Ok(())
    }
}
