use std::{
    fmt::{self, Display, Formatter},
    sync::atomic::{AtomicI64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl ParticipantId {
    pub fn new() -> ParticipantId {
        ParticipantId(next_id())
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub i64);

impl BlockId {
    pub fn new() -> BlockId {
        BlockId(next_id())
    }
}

/// The designated no-payment block. Seeded on first start, never deletable.
pub const NO_PAYMENT_BLOCK: BlockId = BlockId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub i64);

impl PaymentId {
    pub fn new() -> PaymentId {
        PaymentId(next_id())
    }
}

/// Tag stored in place of a block id for ad-hoc payments.
pub const CUSTOM_BLOCK_TAG: &str = "custom";

/// Reference from a payment to its block: a real catalog id or the
/// `custom` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockRef {
    Id(BlockId),
    Custom(String),
}

impl BlockRef {
    pub fn custom() -> BlockRef {
        BlockRef::Custom(CUSTOM_BLOCK_TAG.to_string())
    }

    pub fn id(&self) -> Option<BlockId> {
        match self {
            BlockRef::Id(id) => Some(*id),
            BlockRef::Custom(_) => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, BlockRef::Custom(_))
    }
}

impl From<BlockId> for BlockRef {
    fn from(id: BlockId) -> Self {
        BlockRef::Id(id)
    }
}

/// Millisecond timestamps as identifiers, matching the documents written
/// by earlier versions of the app. Monotonic within a process so two
/// entries created in the same millisecond cannot collide.
pub fn next_id() -> i64 {
    static LAST: AtomicI64 = AtomicI64::new(0);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0);
    let prev = LAST
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(prev + 1)
}
