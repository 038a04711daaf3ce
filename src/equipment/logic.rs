use super::types::*;

/// Slots are compatible when they are the same slot, or when both belong to
/// the same family (numbered or generic).
pub fn slots_compatible(a: Slot, b: Slot) -> bool {
    if a == b {
        return true;
    }
    match (a.family(), b.family()) {
        (Some(fa), Some(fb)) => fa == fb,
        _ => false,
    }
}

/// First member of `family` not present in `occupied`.
pub fn first_free_member(family: SlotFamily, occupied: &[ConcreteSlot]) -> Option<ConcreteSlot> {
    family
        .members()
        .iter()
        .copied()
        .find(|member| !occupied.contains(member))
}

/// Resolve a slot to a concrete position. Concrete slots resolve to
/// themselves; a family slot takes the first free member, or `fallback` when
/// every member is occupied.
pub fn resolve_slot(slot: Slot, occupied: &[ConcreteSlot], fallback: ConcreteSlot) -> ConcreteSlot {
    match slot {
        Slot::Concrete(concrete) => concrete,
        Slot::Family(family) => first_free_member(family, occupied).unwrap_or(fallback),
    }
}

/// Concrete slots held by `equipment`, skipping the records in `exclude_ids`.
pub fn occupied_slots<'a>(
    equipment: impl IntoIterator<Item = &'a Equipment>,
    exclude_ids: &[&str],
) -> Vec<ConcreteSlot> {
    equipment
        .into_iter()
        .filter(|eq| !exclude_ids.contains(&eq.id.as_str()))
        .filter_map(|eq| eq.slot.concrete())
        .collect()
}
