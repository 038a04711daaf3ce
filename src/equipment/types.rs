use crate::format::MesoAmount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numbered, equippable position. Ring and pendant positions are members of
/// a [`SlotFamily`]; every other slot stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConcreteSlot {
    Weapon,
    Secondary,
    Emblem,
    Hat,
    Top,
    Bottom,
    Overall,
    Shoes,
    Gloves,
    Cape,
    Belt,
    Shoulder,
    Face,
    Eye,
    Earring,
    Pendant1,
    Pendant2,
    Ring1,
    Ring2,
    Ring3,
    Ring4,
    Heart,
    Badge,
    Pocket,
}

/// A category of interchangeable slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotFamily {
    Pendant,
    Ring,
}

/// Slot as stored on an equipment record: either a specific numbered slot or
/// the generic family category (e.g. an item picked from a catalog that has
/// not been assigned a ring position yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Slot {
    Concrete(ConcreteSlot),
    Family(SlotFamily),
}

const CONCRETE_SLOTS: [(ConcreteSlot, &str); 24] = [
    (ConcreteSlot::Weapon, "weapon"),
    (ConcreteSlot::Secondary, "secondary"),
    (ConcreteSlot::Emblem, "emblem"),
    (ConcreteSlot::Hat, "hat"),
    (ConcreteSlot::Top, "top"),
    (ConcreteSlot::Bottom, "bottom"),
    (ConcreteSlot::Overall, "overall"),
    (ConcreteSlot::Shoes, "shoes"),
    (ConcreteSlot::Gloves, "gloves"),
    (ConcreteSlot::Cape, "cape"),
    (ConcreteSlot::Belt, "belt"),
    (ConcreteSlot::Shoulder, "shoulder"),
    (ConcreteSlot::Face, "face"),
    (ConcreteSlot::Eye, "eye"),
    (ConcreteSlot::Earring, "earring"),
    (ConcreteSlot::Pendant1, "pendant1"),
    (ConcreteSlot::Pendant2, "pendant2"),
    (ConcreteSlot::Ring1, "ring1"),
    (ConcreteSlot::Ring2, "ring2"),
    (ConcreteSlot::Ring3, "ring3"),
    (ConcreteSlot::Ring4, "ring4"),
    (ConcreteSlot::Heart, "heart"),
    (ConcreteSlot::Badge, "badge"),
    (ConcreteSlot::Pocket, "pocket"),
];

impl ConcreteSlot {
    pub fn key(&self) -> &'static str {
        CONCRETE_SLOTS
            .iter()
            .find(|(slot, _)| slot == self)
            .map(|(_, key)| *key)
            .unwrap_or("unknown")
    }

    /// The family this slot belongs to, if any.
    pub fn family(&self) -> Option<SlotFamily> {
        match self {
            ConcreteSlot::Pendant1 | ConcreteSlot::Pendant2 => Some(SlotFamily::Pendant),
            ConcreteSlot::Ring1 | ConcreteSlot::Ring2 | ConcreteSlot::Ring3 | ConcreteSlot::Ring4 => {
                Some(SlotFamily::Ring)
            }
            _ => None,
        }
    }
}

impl SlotFamily {
    pub fn key(&self) -> &'static str {
        match self {
            SlotFamily::Pendant => "pendant",
            SlotFamily::Ring => "ring",
        }
    }

    /// Member slots in assignment order.
    pub fn members(&self) -> &'static [ConcreteSlot] {
        match self {
            SlotFamily::Pendant => &[ConcreteSlot::Pendant1, ConcreteSlot::Pendant2],
            SlotFamily::Ring => &[
                ConcreteSlot::Ring1,
                ConcreteSlot::Ring2,
                ConcreteSlot::Ring3,
                ConcreteSlot::Ring4,
            ],
        }
    }
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Concrete(slot) => slot.key(),
            Slot::Family(family) => family.key(),
        }
    }

    /// Family of this slot, whether it is stored generically or numbered.
    pub fn family(&self) -> Option<SlotFamily> {
        match self {
            Slot::Concrete(slot) => slot.family(),
            Slot::Family(family) => Some(*family),
        }
    }

    pub fn concrete(&self) -> Option<ConcreteSlot> {
        match self {
            Slot::Concrete(slot) => Some(*slot),
            Slot::Family(_) => None,
        }
    }
}

impl From<ConcreteSlot> for Slot {
    fn from(slot: ConcreteSlot) -> Self {
        Slot::Concrete(slot)
    }
}

impl From<SlotFamily> for Slot {
    fn from(family: SlotFamily) -> Self {
        Slot::Family(family)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown equipment slot: {0}")]
pub struct UnknownSlot(pub String);

impl FromStr for Slot {
    type Err = UnknownSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "pendant" => return Ok(Slot::Family(SlotFamily::Pendant)),
            "ring" => return Ok(Slot::Family(SlotFamily::Ring)),
            _ => {}
        }
        CONCRETE_SLOTS
            .iter()
            .find(|(_, k)| *k == key)
            .map(|(slot, _)| Slot::Concrete(*slot))
            .ok_or_else(|| UnknownSlot(s.to_string()))
    }
}

impl TryFrom<String> for Slot {
    type Error = UnknownSlot;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.key().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentType {
    Weapon,
    Armor,
    Accessory,
}

/// Star force ceilings by item level. Each entry is the lowest level at which
/// the ceiling applies.
pub const STAR_LIMITS: [(u32, u32); 6] = [(0, 5), (95, 8), (108, 10), (118, 15), (128, 20), (138, 25)];

pub fn max_star_force_for_level(level: u32) -> u32 {
    STAR_LIMITS
        .iter()
        .rev()
        .find(|(min_level, _)| level >= *min_level)
        .map(|(_, max)| *max)
        .unwrap_or(0)
}

/// A single gear item tracked for enhancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub slot: Slot,
    pub level: u32,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub starforceable: bool,
    pub current_star_force: u32,
    pub target_star_force: u32,

    // Transfer lineage. Ids are weak references into the same character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transferred_stars: Option<u32>,
    #[serde(default)]
    pub is_transfer_source: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_target_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<MesoAmount>,
    #[serde(default)]
    pub safeguard: bool,
}

impl Equipment {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        slot: impl Into<Slot>,
        level: u32,
        equipment_type: EquipmentType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slot: slot.into(),
            level,
            equipment_type,
            starforceable: true,
            current_star_force: 0,
            target_star_force: 0,
            transferred_from: None,
            transferred_to: None,
            transferred_stars: None,
            is_transfer_source: false,
            transfer_target_id: None,
            actual_cost: None,
            safeguard: false,
        }
    }

    /// Builder-style star goal, clamped like [`Equipment::set_star_goal`].
    pub fn with_stars(mut self, current: u32, target: u32) -> Self {
        self.set_star_goal(current, target);
        self
    }

    pub fn max_star_force(&self) -> u32 {
        max_star_force_for_level(self.level)
    }

    /// Lowest current star force this item may hold. Non-zero only once a
    /// transfer has landed on it.
    pub fn star_floor(&self) -> u32 {
        if self.transferred_from.is_some() {
            self.transferred_stars.unwrap_or(0)
        } else {
            0
        }
    }

    /// Set current/target stars, keeping `floor <= current <= target <= max`.
    pub fn set_star_goal(&mut self, current: u32, target: u32) {
        let max = self.max_star_force();
        let floor = self.star_floor().min(max);
        let target = target.min(max).max(floor);
        self.target_star_force = target;
        self.current_star_force = current.clamp(floor, target);
    }

    /// Still has enhancement left to plan for.
    pub fn is_pending(&self) -> bool {
        self.starforceable && self.current_star_force < self.target_star_force
    }

    /// Two records describing the same physical item (same name and level).
    pub fn is_same_item(&self, other: &Equipment) -> bool {
        self.name == other.name && self.level == other.level
    }
}
