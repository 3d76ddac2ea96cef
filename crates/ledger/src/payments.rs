use chrono::NaiveDate;
use itertools::Itertools as _;
use log::info;
use model::{
    amount::Amount,
    block::BlockKind,
    ids::{BlockId, ParticipantId, PaymentId},
    payment::Payment,
};
use thiserror::Error;

use crate::{standing::expiry_date, Ledger};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Participant not found: {0:?}")]
    ParticipantNotFound(ParticipantId),
    #[error("Block not found: {0:?}")]
    BlockNotFound(BlockId),
    #[error("Payment not found")]
    PaymentNotFound,
}

/// What to record: a catalog block or an ad-hoc entry.
#[derive(Debug, Clone)]
pub enum NewPayment {
    Block { id: BlockId, date: NaiveDate },
    Custom {
        cost: Amount,
        training_count: u32,
        date: NaiveDate,
    },
}

/// New values for one historical payment, applied as a whole.
#[derive(Debug, Clone)]
pub struct PaymentPatch {
    pub payment_date: NaiveDate,
    pub cost: Amount,
    pub training_count: u32,
    pub block_name: String,
}

/// Reference to one payment row, captured when the row was displayed.
/// Removal tries positional identity first, then the id, then a
/// date + cost content match, so duplicated or id-less rows from
/// degraded documents still resolve to exactly one removal.
#[derive(Debug, Clone)]
pub struct PaymentRef {
    pub position: usize,
    pub payment: Payment,
}

impl Ledger {
    /// Appends a payment with cost, session count and display name
    /// frozen from the current block definition (or the ad-hoc values).
    /// Later catalog edits never touch these snapshots.
    ///
    /// A payment against a time pass resets the expiry from its own
    /// date; it does not extend a previous pass.
    pub fn record_payment(
        &mut self,
        participant_id: ParticipantId,
        new: NewPayment,
    ) -> Result<(), PaymentError> {
        let (payment, pass_until) = match new {
            NewPayment::Block { id, date } => {
                let block = self
                    .state
                    .block(id)
                    .ok_or(PaymentError::BlockNotFound(id))?;
                let pass_until = match block.kind {
                    BlockKind::Time => Some(expiry_date(date, block.duration)),
                    BlockKind::Count => None,
                };
                (Payment::for_block(block, date), pass_until)
            }
            NewPayment::Custom {
                cost,
                training_count,
                date,
            } => (Payment::custom(cost, training_count, date), None),
        };

        let participant = self
            .state
            .participant_mut(participant_id)
            .ok_or(PaymentError::ParticipantNotFound(participant_id))?;
        match pass_until {
            Some(until) => {
                participant.active_until = Some(until);
                participant.subscription_type = Some(BlockKind::Time);
            }
            None => {
                participant.active_until = None;
                participant.subscription_type = Some(BlockKind::Count);
            }
        }
        info!(
            "Recording payment of {} for participant {participant_id}",
            payment.effective_cost(&[])
        );
        participant.payments.push(payment);
        self.dirty();
        Ok(())
    }

    /// Rewrites the editable fields of one payment, located by id.
    pub fn edit_payment(
        &mut self,
        participant_id: ParticipantId,
        payment_id: PaymentId,
        patch: PaymentPatch,
    ) -> Result<(), PaymentError> {
        let participant = self
            .state
            .participant_mut(participant_id)
            .ok_or(PaymentError::ParticipantNotFound(participant_id))?;
        let payment = participant
            .payments
            .iter_mut()
            .find(|payment| payment.payment_id == Some(payment_id))
            .ok_or(PaymentError::PaymentNotFound)?;
        payment.payment_date = patch.payment_date;
        payment.cost_snapshot = Some(patch.cost);
        payment.training_count_snapshot = Some(patch.training_count);
        payment.block_name_snapshot = Some(patch.block_name);
        self.dirty();
        Ok(())
    }

    /// Removes one payment through the layered matching described on
    /// [`PaymentRef`]. Attendance is unrelated to payments and stays
    /// untouched.
    pub fn remove_payment(
        &mut self,
        participant_id: ParticipantId,
        target: &PaymentRef,
    ) -> Result<(), PaymentError> {
        let participant = self
            .state
            .participant_mut(participant_id)
            .ok_or(PaymentError::ParticipantNotFound(participant_id))?;
        let payments = &mut participant.payments;

        let position = if payments
            .get(target.position)
            .is_some_and(|payment| *payment == target.payment)
        {
            Some(target.position)
        } else if let Some(id) = target.payment.payment_id {
            payments
                .iter()
                .position(|payment| payment.payment_id == Some(id))
        } else {
            payments.iter().position(|payment| {
                payment.payment_date == target.payment.payment_date
                    && payment.cost_snapshot == target.payment.cost_snapshot
            })
        };

        let position = position.ok_or(PaymentError::PaymentNotFound)?;
        let removed = payments.remove(position);
        info!(
            "Removed payment dated {} from participant {participant_id}",
            removed.payment_date
        );
        self.dirty();
        Ok(())
    }

    /// Payment rows newest first, as the history view shows them.
    /// Positions refer to the stored entry order and can be handed back
    /// to [`Ledger::remove_payment`].
    pub fn payment_history(&self, participant_id: ParticipantId) -> Vec<PaymentRef> {
        self.state
            .participant(participant_id)
            .map(|participant| {
                participant
                    .payments
                    .iter()
                    .cloned()
                    .enumerate()
                    .sorted_by_key(|(_, payment)| std::cmp::Reverse(payment.payment_date))
                    .map(|(position, payment)| PaymentRef { position, payment })
                    .collect()
            })
            .unwrap_or_default()
    }
}
