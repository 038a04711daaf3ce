use super::types::Roster;
use crate::equipment::Equipment;
use crate::error::StoreError;

/// Equipment record store. Lists are only ever replaced whole.
pub trait EquipmentStore {
    fn equipment(&self, character_id: &str) -> Option<&[Equipment]>;

    fn replace_equipment(
        &mut self,
        character_id: &str,
        equipment: Vec<Equipment>,
    ) -> Result<(), StoreError>;
}

impl EquipmentStore for Roster {
    fn equipment(&self, character_id: &str) -> Option<&[Equipment]> {
        self.character(character_id).map(|c| c.equipment.as_slice())
    }

    fn replace_equipment(
        &mut self,
        character_id: &str,
        equipment: Vec<Equipment>,
    ) -> Result<(), StoreError> {
        self.set_equipment(character_id, equipment)
    }
}
