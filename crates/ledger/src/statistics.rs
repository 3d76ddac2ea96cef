//! The aggregation engine. Every function here is pure over the state
//! snapshot and a period selector and is recomputed on each call; the
//! pull model is the designed behavior, not a missing cache.
//!
//! Two money metrics coexist and are intentionally never reconciled:
//! realized revenue follows usage (a visit realizes one session at the
//! participant's average session price, however long ago the block was
//! paid for), collected income follows cash (payments dated in the
//! period).

use std::cmp::Reverse;

use model::{
    amount::Amount,
    ids::ParticipantId,
    participant::Participant,
    period::{Month, Period},
    rent::effective_rent,
    snapshot::StateSnapshot,
};

/// Visits inside the period. Only keys marked `true` count, and keys of
/// deleted participants are dropped silently.
pub fn attended_count(
    state: &StateSnapshot,
    period: Period,
    participant: Option<ParticipantId>,
) -> u32 {
    state
        .attendance
        .marked()
        .filter(|key| period.contains_key(key))
        .filter(|key| participant.map_or(true, |id| key.participant == id))
        .filter(|key| state.participant_exists(key.participant))
        .count() as u32
}

/// All-history visit count of one participant, for session balances.
pub fn lifetime_attendance(state: &StateSnapshot, participant: ParticipantId) -> u32 {
    state
        .attendance
        .marked()
        .filter(|key| key.participant == participant)
        .count() as u32
}

/// Average price of one session across everything the participant ever
/// bought. Zero when nothing grants sessions.
pub fn cost_per_training(state: &StateSnapshot, participant: &Participant) -> Amount {
    let paid: Amount = participant
        .payments
        .iter()
        .map(|payment| payment.effective_cost(&state.blocks))
        .sum();
    let sessions: u32 = participant
        .payments
        .iter()
        .map(|payment| payment.effective_training_count(&state.blocks))
        .sum();
    if sessions == 0 {
        Amount::zero()
    } else {
        paid / sessions as f64
    }
}

/// Usage-based revenue of the period.
pub fn realized_revenue(state: &StateSnapshot, period: Period) -> Amount {
    state
        .participants
        .iter()
        .map(|participant| {
            cost_per_training(state, participant)
                * attended_count(state, period, Some(participant.id)) as f64
        })
        .sum()
}

/// Cash-based income of the period: payment costs by payment date.
pub fn collected_income(state: &StateSnapshot, period: Period) -> Amount {
    state
        .participants
        .iter()
        .flat_map(|participant| &participant.payments)
        .filter(|payment| period.contains_date(payment.payment_date))
        .map(|payment| payment.effective_cost(&state.blocks))
        .sum()
}

pub fn net_profit(state: &StateSnapshot, period: Period) -> Amount {
    realized_revenue(state, period) - effective_rent(state.rent_amount)
}

pub fn income_net(state: &StateSnapshot, period: Period) -> Amount {
    collected_income(state, period) - effective_rent(state.rent_amount)
}

/// Realized revenue per visit; zero when nobody attended.
pub fn avg_training_cost(state: &StateSnapshot, period: Period) -> Amount {
    let attended = attended_count(state, period, None);
    if attended == 0 {
        Amount::zero()
    } else {
        realized_revenue(state, period) / attended as f64
    }
}

/// One row of the popularity ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockPopularity {
    pub name: String,
    pub purchases: u32,
    pub total: Amount,
}

/// Payments of the year grouped by display name, most purchased first.
/// The sort is stable, so ties keep discovery order.
pub fn block_popularity(state: &StateSnapshot, year: i32) -> Vec<BlockPopularity> {
    let mut rows: Vec<BlockPopularity> = Vec::new();
    for payment in state
        .participants
        .iter()
        .flat_map(|participant| &participant.payments)
    {
        if !Period::Year(year).contains_date(payment.payment_date) {
            continue;
        }
        let name = payment.display_name(&state.blocks);
        let cost = payment.effective_cost(&state.blocks);
        match rows.iter_mut().find(|row| row.name == name) {
            Some(row) => {
                row.purchases += 1;
                row.total += cost;
            }
            None => rows.push(BlockPopularity {
                name,
                purchases: 1,
                total: cost,
            }),
        }
    }
    rows.sort_by_key(|row| Reverse(row.purchases));
    rows
}

/// One chart point of the yearly series.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthPoint {
    pub month: Month,
    pub label: &'static str,
    pub income: Amount,
    pub net_profit: Amount,
    pub attended: u32,
}

/// Exactly twelve points, January through December, every month present
/// even when all-zero.
pub fn yearly_series(state: &StateSnapshot, year: i32) -> Vec<MonthPoint> {
    (0..12)
        .map(|month0| {
            let month = Month::new(year, month0);
            let period = Period::Month(month);
            MonthPoint {
                month,
                label: month.short_label(),
                income: income_net(state, period),
                net_profit: net_profit(state, period),
                attended: attended_count(state, period, None),
            }
        })
        .collect()
}
