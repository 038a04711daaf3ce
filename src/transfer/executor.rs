use super::types::TransferResolution;
use crate::character::{Character, EquipmentStore};
use crate::equipment::Equipment;
use crate::error::StoreError;
use tracing::{info, warn};

/// Retire a source: stars zeroed, marked consumed, pointed at its target.
pub fn finalize_source(mut source: Equipment, target_id: &str) -> Equipment {
    source.current_star_force = 0;
    source.is_transfer_source = true;
    source.transferred_to = Some(target_id.to_string());
    source.transfer_target_id = Some(target_id.to_string());
    source
}

/// Write a resolved pair into an equipment list: records already present
/// (matched by id) are replaced where they stand, new ones are appended,
/// source before target. Re-applying the same pair changes nothing.
pub fn apply_transfer(
    equipment: &[Equipment],
    source: &Equipment,
    target: &Equipment,
) -> Vec<Equipment> {
    let mut list = equipment.to_vec();
    for record in [source, target] {
        match list.iter_mut().find(|eq| eq.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => list.push(record.clone()),
        }
    }
    list
}

type TransferCallback<'a> = Box<dyn FnMut(&Equipment, &Equipment) + 'a>;

/// Applies resolved transfers to the store and notifies an optional
/// observer with the persisted pair.
#[derive(Default)]
pub struct TransferExecutor<'a> {
    on_transfer: Option<TransferCallback<'a>>,
}

impl<'a> TransferExecutor<'a> {
    pub fn new() -> Self {
        Self { on_transfer: None }
    }

    pub fn with_callback(on_transfer: impl FnMut(&Equipment, &Equipment) + 'a) -> Self {
        Self {
            on_transfer: Some(Box::new(on_transfer)),
        }
    }

    /// Persist a resolved transfer for `character`.
    ///
    /// With no active character this does nothing and returns `Ok(None)`.
    /// Otherwise the source is retired, both records are written in one
    /// whole-list replacement, and the new list is returned. The callback
    /// runs only after the store accepted the list.
    pub fn execute<S: EquipmentStore + ?Sized>(
        &mut self,
        store: &mut S,
        character: Option<&Character>,
        resolution: TransferResolution,
    ) -> Result<Option<Vec<Equipment>>, StoreError> {
        let Some(character) = character else {
            return Ok(None);
        };

        let TransferResolution {
            updated_source,
            updated_target,
        } = resolution;
        let source = finalize_source(updated_source, &updated_target.id);
        let target = updated_target;

        if target.current_star_force < target.star_floor() {
            warn!(
                target_id = %target.id,
                current = target.current_star_force,
                floor = target.star_floor(),
                "Transfer target is below its transferred star floor"
            );
        }

        let current = store
            .equipment(&character.id)
            .unwrap_or(character.equipment.as_slice());
        let updated = apply_transfer(current, &source, &target);
        store.replace_equipment(&character.id, updated.clone())?;

        info!(
            character = %character.id,
            source_id = %source.id,
            target_id = %target.id,
            transferred_stars = target.transferred_stars.unwrap_or(0),
            "Applied star force transfer"
        );

        if let Some(callback) = self.on_transfer.as_mut() {
            callback(&source, &target);
        }
        Ok(Some(updated))
    }
}
