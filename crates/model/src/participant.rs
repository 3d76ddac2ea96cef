use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{block::BlockKind, ids::ParticipantId, payment::Payment};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub is_archived: bool,
    /// Insertion order, which is entry order, not payment-date order.
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Cached expiry of the last time-pass payment. Stale once a newer
    /// payment supersedes it; standings are derived from the payment
    /// list, not from this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<BlockKind>,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Participant {
        Participant {
            id: ParticipantId::new(),
            name: name.into(),
            is_archived: false,
            payments: vec![],
            active_until: None,
            subscription_type: None,
        }
    }

    pub fn last_payment(&self) -> Option<&Payment> {
        self.payments.last()
    }
}
