use chrono::NaiveDate;
use itertools::Itertools as _;
use model::{
    amount::Amount,
    ids::ParticipantId,
    period::{Month, Period},
    rent::effective_rent,
    snapshot::StateSnapshot,
};

use crate::{
    standing,
    statistics::{self, BlockPopularity, MonthPoint},
    Ledger,
};

/// Per-participant row of the month report table.
#[derive(Debug, Clone)]
pub struct ParticipantRow {
    pub id: ParticipantId,
    pub name: String,
    pub block_label: String,
    pub cost_per_training: Amount,
    pub attended: u32,
    pub realized: Amount,
}

/// Headline numbers of one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCards {
    pub realized_total: Amount,
    pub net_profit: Amount,
    pub avg_training_cost: Amount,
    pub collected_income: Amount,
}

/// One entry of the month's cash journal.
#[derive(Debug, Clone)]
pub struct IncomeEntry {
    pub payment_date: NaiveDate,
    pub participant: String,
    pub block: String,
    pub cost: Amount,
}

/// Attendance leaderboard row; only participants with visits appear.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitsRow {
    pub name: String,
    pub visits: u32,
}

#[derive(Debug, Clone)]
pub struct MonthReport {
    pub month: Month,
    pub rows: Vec<ParticipantRow>,
    pub cards: MonthCards,
    pub income: Vec<IncomeEntry>,
    pub income_total: Amount,
    pub visits: Vec<VisitsRow>,
    pub visits_total: u32,
}

/// The twelve-point chart plus its positive-month totals.
#[derive(Debug, Clone)]
pub struct YearChart {
    pub year: i32,
    pub points: Vec<MonthPoint>,
    pub positive_income_total: Amount,
    pub positive_profit_total: Amount,
}

/// Dashboard cards: roster size, trainings held, cash income less rent.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub active_participants: usize,
    pub trainings_held: u32,
    pub income: Amount,
}

/// Sum of the profitable months only. Loss months are excluded from the
/// total, not clamped to zero.
pub fn positive_profit_total(points: &[MonthPoint]) -> Amount {
    points
        .iter()
        .filter(|point| point.net_profit.is_positive())
        .map(|point| point.net_profit)
        .sum()
}

pub fn positive_income_total(points: &[MonthPoint]) -> Amount {
    points
        .iter()
        .filter(|point| point.income.is_positive())
        .map(|point| point.income)
        .sum()
}

impl Ledger {
    pub fn month_report(&self, month: Month) -> MonthReport {
        month_report(&self.state, month)
    }

    pub fn year_chart(&self, year: i32) -> YearChart {
        let points = statistics::yearly_series(&self.state, year);
        YearChart {
            year,
            positive_income_total: positive_income_total(&points),
            positive_profit_total: positive_profit_total(&points),
            points,
        }
    }

    pub fn block_popularity(&self, year: i32) -> Vec<BlockPopularity> {
        statistics::block_popularity(&self.state, year)
    }

    pub fn dashboard(&self, month: Month) -> Dashboard {
        let period = Period::Month(month);
        Dashboard {
            active_participants: self
                .state
                .participants
                .iter()
                .filter(|participant| !participant.is_archived)
                .count(),
            trainings_held: statistics::attended_count(&self.state, period, None),
            income: statistics::collected_income(&self.state, period)
                - effective_rent(self.state.rent_amount),
        }
    }
}

fn month_report(state: &StateSnapshot, month: Month) -> MonthReport {
    let period = Period::Month(month);

    let rows: Vec<ParticipantRow> = state
        .participants
        .iter()
        .map(|participant| {
            let cost_per_training = statistics::cost_per_training(state, participant);
            let attended = statistics::attended_count(state, period, Some(participant.id));
            ParticipantRow {
                id: participant.id,
                name: participant.name.clone(),
                block_label: standing::block_label(state, participant),
                cost_per_training,
                attended,
                realized: cost_per_training * attended as f64,
            }
        })
        .collect();

    let income: Vec<IncomeEntry> = state
        .participants
        .iter()
        .flat_map(|participant| {
            participant
                .payments
                .iter()
                .filter(|payment| period.contains_date(payment.payment_date))
                .map(|payment| IncomeEntry {
                    payment_date: payment.payment_date,
                    participant: participant.name.clone(),
                    block: payment.display_name(&state.blocks),
                    cost: payment.effective_cost(&state.blocks),
                })
        })
        .sorted_by_key(|entry| entry.payment_date)
        .collect();
    let income_total = income.iter().map(|entry| entry.cost).sum();

    let visits: Vec<VisitsRow> = rows
        .iter()
        .filter(|row| row.attended > 0)
        .map(|row| VisitsRow {
            name: row.name.clone(),
            visits: row.attended,
        })
        .sorted_by_key(|row| std::cmp::Reverse(row.visits))
        .collect();
    let visits_total = visits.iter().map(|row| row.visits).sum();

    MonthReport {
        month,
        cards: MonthCards {
            realized_total: statistics::realized_revenue(state, period),
            net_profit: statistics::net_profit(state, period),
            avg_training_cost: statistics::avg_training_cost(state, period),
            collected_income: statistics::collected_income(state, period),
        },
        rows,
        income,
        income_total,
        visits,
        visits_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{payments::NewPayment, testutil};
    use model::rent::DEFAULT_RENT;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_report_rows_and_cards() {
        let (_dir, mut ledger) = testutil::ledger();
        let anna = ledger.add_participant("Иванова Анна");
        ledger
            .record_payment(
                anna,
                NewPayment::Custom { cost: Amount::int(1000), training_count: 5, date: date(2024, 1, 10) },
            )
            .unwrap();
        for day in [3, 10, 17] {
            ledger.set_attendance(anna, date(2024, 1, day), true).unwrap();
        }
        ledger.set_rent(Amount::int(50000));

        let report = ledger.month_report(Month::new(2024, 0));
        assert_eq!(report.rows.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.cost_per_training, Amount::int(200));
        assert_eq!(row.attended, 3);
        assert_eq!(row.realized, Amount::int(600));
        assert_eq!(row.block_label, model::payment::CUSTOM_PAYMENT_NAME);

        assert_eq!(report.cards.realized_total, Amount::int(600));
        assert_eq!(report.cards.net_profit, Amount::int(600 - 50000));
        assert_eq!(report.cards.avg_training_cost, Amount::int(200));
        assert_eq!(report.cards.collected_income, Amount::int(1000));

        assert_eq!(report.income.len(), 1);
        assert_eq!(report.income_total, Amount::int(1000));
        assert_eq!(report.visits, vec![VisitsRow { name: "Иванова Анна".to_string(), visits: 3 }]);
        assert_eq!(report.visits_total, 3);
    }

    #[test]
    fn test_income_journal_is_date_sorted() {
        let (_dir, mut ledger) = testutil::ledger();
        let anna = ledger.add_participant("Иванова Анна");
        for day in [20, 5, 12] {
            ledger
                .record_payment(
                    anna,
                    NewPayment::Custom { cost: Amount::int(1000), training_count: 1, date: date(2024, 1, day) },
                )
                .unwrap();
        }

        let report = ledger.month_report(Month::new(2024, 0));
        let days: Vec<u32> = report
            .income
            .iter()
            .map(|entry| chrono::Datelike::day(&entry.payment_date))
            .collect();
        assert_eq!(days, vec![5, 12, 20]);
    }

    #[test]
    fn test_year_chart_positive_totals_exclude_loss_months() {
        let (_dir, mut ledger) = testutil::ledger();
        let anna = ledger.add_participant("Иванова Анна");
        ledger.set_rent(Amount::int(1000));
        // March pays 3000: +2000 income net. The other months sit at
        // -1000 and must not drag the positive total down.
        ledger
            .record_payment(
                anna,
                NewPayment::Custom { cost: Amount::int(3000), training_count: 3, date: date(2024, 3, 5) },
            )
            .unwrap();

        let chart = ledger.year_chart(2024);
        assert_eq!(chart.points.len(), 12);
        assert_eq!(chart.positive_income_total, Amount::int(2000));
        assert_eq!(chart.positive_profit_total, Amount::zero());

        let march = &chart.points[2];
        assert_eq!(march.label, "мар");
        assert_eq!(march.income, Amount::int(2000));
    }

    #[test]
    fn test_dashboard_counts_active_only_but_keeps_history() {
        let (_dir, mut ledger) = testutil::ledger();
        let anna = ledger.add_participant("Иванова Анна");
        let oleg = ledger.add_participant("Петров Олег");
        ledger.set_attendance(anna, date(2024, 1, 9), true).unwrap();
        ledger.set_archived(anna, true).unwrap();
        ledger.set_rent(Amount::zero());

        let dashboard = ledger.dashboard(Month::new(2024, 0));
        assert_eq!(dashboard.active_participants, 1);
        // Archived history still counts as a held training.
        assert_eq!(dashboard.trainings_held, 1);
        // Zero rent repairs to the default at read time.
        assert_eq!(dashboard.income, Amount::zero() - Amount::new(DEFAULT_RENT));
        assert!(ledger.state().participant_exists(oleg));
    }
}
