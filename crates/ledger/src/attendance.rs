use chrono::{Datelike as _, NaiveDate};
use model::{attendance::AttendanceKey, ids::ParticipantId, period::Month};

use crate::{participants::ParticipantError, Ledger};

impl Ledger {
    /// Marks or unmarks a visit and returns the new state of the day.
    pub fn toggle_attendance(
        &mut self,
        participant: ParticipantId,
        date: NaiveDate,
    ) -> Result<bool, ParticipantError> {
        if !self.state.participant_exists(participant) {
            return Err(ParticipantError::NotFound(participant));
        }
        let present = self
            .state
            .attendance
            .toggle(AttendanceKey::on(participant, date));
        self.dirty();
        Ok(present)
    }

    pub fn set_attendance(
        &mut self,
        participant: ParticipantId,
        date: NaiveDate,
        present: bool,
    ) -> Result<(), ParticipantError> {
        if !self.state.participant_exists(participant) {
            return Err(ParticipantError::NotFound(participant));
        }
        self.state
            .attendance
            .set(AttendanceKey::on(participant, date), present);
        self.dirty();
        Ok(())
    }

    /// Days of the month the participant attended, for the calendar grid.
    pub fn marked_days(&self, participant: ParticipantId, month: Month) -> Vec<u32> {
        self.state
            .attendance
            .marked_days(participant, month.year, month.month0)
    }

    /// Days of the month the participant paid on, for the calendar
    /// payment overlay.
    pub fn payment_days(&self, participant: ParticipantId, month: Month) -> Vec<u32> {
        self.state
            .participant(participant)
            .map(|participant| {
                participant
                    .payments
                    .iter()
                    .filter(|payment| month.contains(payment.payment_date))
                    .map(|payment| payment.payment_date.day())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use model::ids::ParticipantId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_toggle_round_trip() {
        let (_dir, mut ledger) = testutil::ledger();
        let id = ledger.add_participant("Иванова Анна");

        assert!(ledger.toggle_attendance(id, date(2024, 1, 15)).unwrap());
        assert!(!ledger.toggle_attendance(id, date(2024, 1, 15)).unwrap());
        assert!(ledger
            .toggle_attendance(ParticipantId(404), date(2024, 1, 15))
            .is_err());
    }

    #[test]
    fn test_marked_and_payment_days() {
        let (_dir, mut ledger) = testutil::ledger();
        let id = ledger.add_participant("Иванова Анна");
        ledger.set_attendance(id, date(2024, 3, 4), true).unwrap();
        ledger.set_attendance(id, date(2024, 3, 11), true).unwrap();
        ledger.set_attendance(id, date(2024, 4, 1), true).unwrap();

        let march = Month::new(2024, 2);
        assert_eq!(ledger.marked_days(id, march), vec![4, 11]);
        assert_eq!(ledger.payment_days(id, march), Vec::<u32>::new());
    }
}
