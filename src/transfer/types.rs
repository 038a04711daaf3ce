use crate::equipment::Equipment;
use thiserror::Error;

/// Target level may exceed source level by at most this much.
pub const TRANSFER_LEVEL_WINDOW: u32 = 10;

/// Stars lost when progress moves to a new item.
pub const TRANSFER_STAR_PENALTY: u32 = 1;

/// Why a transfer is not allowed. Returned to the caller, never raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferIneligibility {
    #[error("Cannot transfer an item onto itself")]
    SameItem,

    #[error("Source and target are the same item (same name and level)")]
    IdenticalItems,

    #[error("Source has already transferred its stars and cannot be used again")]
    SourceAlreadyTransferred,

    #[error("Source item cannot be star forced")]
    SourceNotStarforceable,

    #[error("Source has no star force target to transfer")]
    SourceHasNoStars,

    #[error("Target item cannot be star forced")]
    TargetNotStarforceable,

    #[error("Items must share an equipment slot ({source_slot} vs {target_slot})")]
    SlotMismatch {
        source_slot: String,
        target_slot: String,
    },

    #[error("Target must be 0-{window} levels above the source (source {source_level}, target {target_level})")]
    LevelOutOfRange {
        source_level: u32,
        target_level: u32,
        window: u32,
    },

    #[error("Target has already received a transfer")]
    TargetAlreadyReceived,

    #[error("Target already has {0} stars that would be lost")]
    TargetHasStars(u32),
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEligibility {
    Allowed,
    Denied(TransferIneligibility),
}

impl TransferEligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TransferEligibility::Allowed)
    }

    pub fn reason(&self) -> Option<&TransferIneligibility> {
        match self {
            TransferEligibility::Allowed => None,
            TransferEligibility::Denied(reason) => Some(reason),
        }
    }
}

/// Both records after a resolved transfer, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferResolution {
    pub updated_source: Equipment,
    pub updated_target: Equipment,
}

/// Values a transfer form starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPreview {
    /// Floor the target will carry (`transferredStars`)
    pub transferred_stars: u32,
    pub suggested_current: u32,
    pub suggested_target: u32,
}
