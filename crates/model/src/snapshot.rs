use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    amount::Amount,
    attendance::AttendanceLog,
    block::{Block, BlockKind},
    ids::{BlockId, ParticipantId, NO_PAYMENT_BLOCK},
    participant::Participant,
    rent::DEFAULT_RENT,
};

/// The single flat document the whole application state lives in.
/// Persisted as-is and replaced as a whole on every save; there is no
/// partial or delta persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub attendance: AttendanceLog,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub rent_amount: Amount,
}

impl StateSnapshot {
    /// Catalog and rent a fresh account starts with.
    pub fn initial() -> StateSnapshot {
        StateSnapshot {
            blocks: vec![
                seed_block(NO_PAYMENT_BLOCK, "Без оплаты", 0, 0),
                seed_block(BlockId(1), "Блок 10 тренировок", 25000, 10),
                seed_block(BlockId(2), "Блок 8 тренировок", 20000, 8),
                seed_block(BlockId(3), "Блок 5 тренировок", 14000, 5),
                seed_block(BlockId(4), "Разовая", 3000, 1),
            ],
            participants: vec![],
            attendance: AttendanceLog::default(),
            rent_amount: Amount::new(DEFAULT_RENT),
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn participant_exists(&self, id: ParticipantId) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }
}

impl Default for StateSnapshot {
    fn default() -> Self {
        StateSnapshot::initial()
    }
}

fn seed_block(id: BlockId, name: &str, cost: i64, training_count: u32) -> Block {
    Block {
        id,
        name: name.to_string(),
        cost: Amount::int(cost),
        kind: BlockKind::Count,
        training_count,
        duration: 0,
    }
}

/// Accepts whatever a stale document holds in `rentAmount`: a number,
/// null, a string, or nothing. Non-numbers collapse to zero here and are
/// repaired to the default at read time.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().map(Amount::new).unwrap_or_default())
}
