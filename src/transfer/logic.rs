use super::types::*;
use crate::equipment::{occupied_slots, resolve_slot, slots_compatible, Equipment, Slot};

/// Decide whether `source` may transfer its progress onto `target`.
///
/// Pure; the first failing rule is reported.
pub fn can_transfer(source: &Equipment, target: &Equipment) -> TransferEligibility {
    match check_transfer(source, target) {
        Ok(()) => TransferEligibility::Allowed,
        Err(reason) => TransferEligibility::Denied(reason),
    }
}

fn check_transfer(source: &Equipment, target: &Equipment) -> Result<(), TransferIneligibility> {
    if source.id == target.id {
        return Err(TransferIneligibility::SameItem);
    }
    if source.is_same_item(target) {
        return Err(TransferIneligibility::IdenticalItems);
    }
    if source.is_transfer_source {
        return Err(TransferIneligibility::SourceAlreadyTransferred);
    }
    if !source.starforceable {
        return Err(TransferIneligibility::SourceNotStarforceable);
    }
    if source.target_star_force == 0 {
        return Err(TransferIneligibility::SourceHasNoStars);
    }
    if !target.starforceable {
        return Err(TransferIneligibility::TargetNotStarforceable);
    }
    if !slots_compatible(source.slot, target.slot) {
        return Err(TransferIneligibility::SlotMismatch {
            source_slot: source.slot.to_string(),
            target_slot: target.slot.to_string(),
        });
    }
    let in_window = target.level >= source.level
        && target.level - source.level <= TRANSFER_LEVEL_WINDOW;
    if !in_window {
        return Err(TransferIneligibility::LevelOutOfRange {
            source_level: source.level,
            target_level: target.level,
            window: TRANSFER_LEVEL_WINDOW,
        });
    }
    if target.transferred_from.is_some() {
        return Err(TransferIneligibility::TargetAlreadyReceived);
    }
    if target.current_star_force != 0 {
        return Err(TransferIneligibility::TargetHasStars(
            target.current_star_force,
        ));
    }
    Ok(())
}

/// Stars the target keeps as its floor: the source's goal minus the penalty.
pub fn transferred_star_amount(source: &Equipment) -> u32 {
    source.target_star_force.saturating_sub(TRANSFER_STAR_PENALTY)
}

/// Keep a requested target current star force at or above the floor.
pub fn clamp_transfer_current(transferred_stars: u32, desired_current: u32) -> u32 {
    desired_current.max(transferred_stars)
}

/// Starting values for a transfer form.
pub fn preview(source: &Equipment, target: &Equipment) -> TransferPreview {
    let transferred_stars = transferred_star_amount(source);
    let max = target.max_star_force();
    let suggested_current = transferred_stars.min(max);
    let suggested_target = source.target_star_force.min(max).max(suggested_current);
    TransferPreview {
        transferred_stars,
        suggested_current,
        suggested_target,
    }
}

/// Compute the source and target records after a transfer.
///
/// Does not check eligibility and does not zero the source's stars; both are
/// left to the caller so this can back a preview. `desired_current` is used
/// as given, even below the floor.
///
/// A target stored under a generic family slot is placed in the first member
/// slot no sibling occupies, falling back to the source's own slot.
pub fn resolve(
    source: &Equipment,
    target: &Equipment,
    desired_current: u32,
    desired_target: u32,
    siblings: &[Equipment],
) -> TransferResolution {
    let transferred_stars = transferred_star_amount(source);

    let mut updated_source = source.clone();
    updated_source.transferred_to = Some(target.id.clone());

    let slot = match target.slot {
        Slot::Family(family) => {
            let occupied = occupied_slots(siblings, &[target.id.as_str()]);
            let fallback = source
                .slot
                .concrete()
                .unwrap_or(family.members()[0]);
            Slot::Concrete(resolve_slot(target.slot, &occupied, fallback))
        }
        concrete => concrete,
    };

    let mut updated_target = target.clone();
    updated_target.slot = slot;
    updated_target.current_star_force = desired_current;
    updated_target.target_star_force = desired_target;
    updated_target.transferred_from = Some(source.id.clone());
    updated_target.transferred_stars = Some(transferred_stars);

    TransferResolution {
        updated_source,
        updated_target,
    }
}

/// Entries of `pool` that `source` may transfer onto.
pub fn transfer_candidates<'a>(source: &Equipment, pool: &'a [Equipment]) -> Vec<&'a Equipment> {
    pool.iter()
        .filter(|candidate| can_transfer(source, candidate).is_allowed())
        .collect()
}
