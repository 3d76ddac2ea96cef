use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount,
    block::Block,
    ids::{BlockRef, PaymentId},
};

/// Display name stored on ad-hoc payments.
pub const CUSTOM_PAYMENT_NAME: &str = "Произвольная оплата";

/// Placeholder shown when neither a snapshot nor a live block can name
/// a payment.
pub const MISSING_LABEL: &str = "Н/Д";

/// A historical payment fact. The `*_snapshot` fields freeze the block
/// definition at entry time; they are authoritative for reporting and
/// are never touched by later catalog edits. Payments written before
/// snapshotting existed carry `None` and degrade to a live lookup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
    pub block_id: BlockRef,
    pub payment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_snapshot: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_count_snapshot: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_name_snapshot: Option<String>,
}

impl Payment {
    /// A payment against a catalog block, with snapshots frozen from the
    /// current definition.
    pub fn for_block(block: &Block, payment_date: NaiveDate) -> Payment {
        Payment {
            payment_id: Some(PaymentId::new()),
            block_id: block.id.into(),
            payment_date,
            cost_snapshot: Some(block.cost),
            training_count_snapshot: Some(block.training_count),
            block_name_snapshot: Some(block.name.clone()),
        }
    }

    /// An ad-hoc payment with a free-form amount and session count.
    pub fn custom(cost: Amount, training_count: u32, payment_date: NaiveDate) -> Payment {
        Payment {
            payment_id: Some(PaymentId::new()),
            block_id: BlockRef::custom(),
            payment_date,
            cost_snapshot: Some(cost),
            training_count_snapshot: Some(training_count),
            block_name_snapshot: Some(CUSTOM_PAYMENT_NAME.to_string()),
        }
    }

    pub fn live_block<'a>(&self, blocks: &'a [Block]) -> Option<&'a Block> {
        self.block_id
            .id()
            .and_then(|id| blocks.iter().find(|block| block.id == id))
    }

    /// Snapshot cost, falling back to the live catalog for legacy
    /// payments, then to zero.
    pub fn effective_cost(&self, blocks: &[Block]) -> Amount {
        self.cost_snapshot
            .or_else(|| self.live_block(blocks).map(|block| block.cost))
            .unwrap_or_default()
    }

    /// Snapshot session count with the same legacy fallback chain.
    pub fn effective_training_count(&self, blocks: &[Block]) -> u32 {
        self.training_count_snapshot
            .or_else(|| self.live_block(blocks).map(|block| block.training_count))
            .unwrap_or(0)
    }

    /// Snapshot name, falling back to the live catalog, then to the
    /// placeholder label.
    pub fn display_name(&self, blocks: &[Block]) -> String {
        self.block_name_snapshot
            .clone()
            .or_else(|| self.live_block(blocks).map(|block| block.name.clone()))
            .unwrap_or_else(|| MISSING_LABEL.to_string())
    }
}
