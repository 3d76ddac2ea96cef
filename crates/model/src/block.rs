use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount,
    ids::{BlockId, NO_PAYMENT_BLOCK},
};

/// What a purchased block grants: a bundle of sessions or a number of
/// days of access. Legacy documents carry no `type` field and default
/// to session bundles.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Count,
    Time,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub cost: Amount,
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub training_count: u32,
    #[serde(default)]
    pub duration: u32,
}

impl Block {
    pub fn count(name: impl Into<String>, cost: Amount, training_count: u32) -> Block {
        Block {
            id: BlockId::new(),
            name: name.into(),
            cost,
            kind: BlockKind::Count,
            training_count,
            duration: 0,
        }
    }

    pub fn time(name: impl Into<String>, cost: Amount, duration: u32) -> Block {
        Block {
            id: BlockId::new(),
            name: name.into(),
            cost,
            kind: BlockKind::Time,
            training_count: 0,
            duration,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.id == NO_PAYMENT_BLOCK
    }
}
