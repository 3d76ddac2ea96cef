use chrono::{Days, NaiveDate};
use model::{block::BlockKind, participant::Participant, snapshot::StateSnapshot};

use crate::{statistics, Ledger};

/// Label shown when a participant has no payment to name a block from.
pub const NO_BLOCK_LABEL: &str = "Блок не назначен";

/// Current standing derived from the payment history. Which model
/// applies is decided by the most recent payment, not by what was ever
/// bought before.
#[derive(Debug, Clone, PartialEq)]
pub enum Standing {
    /// Time pass: access until a calendar day.
    Time {
        active_until: NaiveDate,
        expired: bool,
    },
    /// Session bundle: prepaid minus attended. Negative remaining means
    /// over-attendance, which is allowed and worth showing, not an error.
    Count {
        purchased: u32,
        attended: u32,
        remaining: i64,
    },
}

/// Expiry of a time pass bought on `payment_date`: whole calendar days
/// added to the payment day, immune to DST and timezone drift.
pub fn expiry_date(payment_date: NaiveDate, duration: u32) -> NaiveDate {
    payment_date
        .checked_add_days(Days::new(duration as u64))
        .unwrap_or(payment_date)
}

/// Resolves the standing of one participant as of `today`.
pub fn standing(state: &StateSnapshot, participant: &Participant, today: NaiveDate) -> Standing {
    if let Some(pass) = time_pass(state, participant) {
        return Standing::Time {
            active_until: pass,
            expired: pass < today,
        };
    }

    let purchased: u32 = participant
        .payments
        .iter()
        .map(|payment| payment.effective_training_count(&state.blocks))
        .sum();
    let attended = statistics::lifetime_attendance(state, participant.id);
    Standing::Count {
        purchased,
        attended,
        remaining: purchased as i64 - attended as i64,
    }
}

/// Block label of the latest payment: name snapshot, then the live
/// catalog, then a placeholder; no payments at all gets its own label.
pub fn block_label(state: &StateSnapshot, participant: &Participant) -> String {
    match participant.last_payment() {
        Some(payment) => payment.display_name(&state.blocks),
        None => NO_BLOCK_LABEL.to_string(),
    }
}

/// Expiry date of the participant's current time pass, if the most
/// recent payment resolves to one. The stored `active_until` is
/// authoritative; a live catalog lookup covers documents written before
/// it was cached.
fn time_pass(state: &StateSnapshot, participant: &Participant) -> Option<NaiveDate> {
    let payment = participant.last_payment()?;
    let kind = payment
        .live_block(&state.blocks)
        .map(|block| block.kind)
        .or(participant.subscription_type)?;
    if kind != BlockKind::Time {
        return None;
    }
    participant.active_until.or_else(|| {
        payment
            .live_block(&state.blocks)
            .map(|block| expiry_date(payment.payment_date, block.duration))
    })
}

impl Ledger {
    pub fn standing(&self, participant: &Participant, today: NaiveDate) -> Standing {
        standing(&self.state, participant, today)
    }

    pub fn block_label(&self, participant: &Participant) -> String {
        block_label(&self.state, participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{
        amount::Amount,
        attendance::AttendanceKey,
        block::Block,
        ids::BlockId,
        payment::Payment,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn empty_state() -> StateSnapshot {
        StateSnapshot {
            blocks: vec![],
            participants: vec![],
            attendance: Default::default(),
            rent_amount: Amount::zero(),
        }
    }

    #[test]
    fn test_expiry_is_calendar_arithmetic() {
        assert_eq!(expiry_date(date(2024, 3, 1), 30), date(2024, 3, 31));
        // Across a DST switch and a month boundary.
        assert_eq!(expiry_date(date(2024, 10, 15), 30), date(2024, 11, 14));
        assert_eq!(expiry_date(date(2024, 2, 28), 2), date(2024, 3, 1));
    }

    #[test]
    fn test_count_standing_allows_negative_remaining() {
        let mut state = empty_state();
        let mut participant = Participant::new("Иванова Анна");
        participant
            .payments
            .push(Payment::custom(Amount::int(3000), 2, date(2024, 1, 5)));
        let id = participant.id;
        state.participants.push(participant);
        for day in 1..=3 {
            state
                .attendance
                .set(AttendanceKey::new(id, 2024, 0, day), true);
        }

        let participant = state.participant(id).unwrap();
        match standing(&state, participant, date(2024, 2, 1)) {
            Standing::Count {
                purchased,
                attended,
                remaining,
            } => {
                assert_eq!(purchased, 2);
                assert_eq!(attended, 3);
                assert_eq!(remaining, -1);
                // Accounting identity from the ledger's point of view.
                assert_eq!(remaining + attended as i64, purchased as i64);
            }
            Standing::Time { .. } => panic!("count standing expected"),
        }
    }

    #[test]
    fn test_time_standing_expiry_flag() {
        let mut state = empty_state();
        let pass = Block::time("Онлайн месяц", Amount::int(3000), 30);
        let mut participant = Participant::new("Петров Олег");
        participant.payments.push(Payment::for_block(&pass, date(2024, 3, 1)));
        participant.active_until = Some(date(2024, 3, 31));
        participant.subscription_type = Some(BlockKind::Time);
        state.blocks.push(pass);
        let id = participant.id;
        state.participants.push(participant);

        let participant = state.participant(id).unwrap();
        assert_eq!(
            standing(&state, participant, date(2024, 3, 31)),
            Standing::Time { active_until: date(2024, 3, 31), expired: false }
        );
        assert_eq!(
            standing(&state, participant, date(2024, 4, 1)),
            Standing::Time { active_until: date(2024, 3, 31), expired: true }
        );
    }

    #[test]
    fn test_time_standing_survives_block_deletion() {
        // The pass block is gone from the catalog; the cached kind and
        // expiry still resolve a time standing.
        let mut state = empty_state();
        let mut participant = Participant::new("Петров Олег");
        participant.payments.push(Payment {
            payment_id: None,
            block_id: model::ids::BlockRef::Id(BlockId(42)),
            payment_date: date(2024, 3, 1),
            cost_snapshot: Some(Amount::int(3000)),
            training_count_snapshot: Some(0),
            block_name_snapshot: Some("Онлайн месяц".to_string()),
        });
        participant.active_until = Some(date(2024, 3, 31));
        participant.subscription_type = Some(BlockKind::Time);
        let id = participant.id;
        state.participants.push(participant);

        let participant = state.participant(id).unwrap();
        assert!(matches!(
            standing(&state, participant, date(2024, 5, 1)),
            Standing::Time { expired: true, .. }
        ));
    }

    #[test]
    fn test_block_label_fallback_chain() {
        let mut state = empty_state();
        let mut participant = Participant::new("Иванова Анна");
        assert_eq!(block_label(&state, &participant), NO_BLOCK_LABEL);

        participant.payments.push(Payment {
            payment_id: None,
            block_id: model::ids::BlockRef::Id(BlockId(404)),
            payment_date: date(2024, 1, 1),
            cost_snapshot: None,
            training_count_snapshot: None,
            block_name_snapshot: None,
        });
        assert_eq!(
            block_label(&state, &participant),
            model::payment::MISSING_LABEL
        );

        participant.payments[0].block_name_snapshot = Some("Блок 5 тренировок".to_string());
        let id = participant.id;
        state.participants.push(participant);
        assert_eq!(
            block_label(&state, state.participant(id).unwrap()),
            "Блок 5 тренировок"
        );
    }
}
