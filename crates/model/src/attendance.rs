use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use chrono::{Datelike as _, NaiveDate};
use serde::{ser::SerializeMap as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::ParticipantId;

/// Composite key of one marked visit. The month index is zero based
/// (0 = January) on both the write and the read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttendanceKey {
    pub participant: ParticipantId,
    pub year: i32,
    pub month0: u32,
    pub day: u32,
}

impl AttendanceKey {
    pub fn new(participant: ParticipantId, year: i32, month0: u32, day: u32) -> AttendanceKey {
        AttendanceKey {
            participant,
            year,
            month0,
            day,
        }
    }

    pub fn on(participant: ParticipantId, date: NaiveDate) -> AttendanceKey {
        AttendanceKey {
            participant,
            year: date.year(),
            month0: date.month0(),
            day: date.day(),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Parses a dash-joined key. Anything that does not split into
    /// exactly four integer fields is not a key.
    pub fn decode(key: &str) -> Option<AttendanceKey> {
        let mut parts = key.split('-');
        let participant = parts.next()?.parse().ok()?;
        let year = parts.next()?.parse().ok()?;
        let month0 = parts.next()?.parse().ok()?;
        let day = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(AttendanceKey {
            participant: ParticipantId(participant),
            year,
            month0,
            day,
        })
    }
}

impl Display for AttendanceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.participant, self.year, self.month0, self.day
        )
    }
}

/// Sparse visit log. Only `true` entries mean "present"; entries may be
/// explicitly `false` instead of removed, both read as "not present".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceLog(BTreeMap<AttendanceKey, bool>);

impl AttendanceLog {
    pub fn set(&mut self, key: AttendanceKey, present: bool) {
        self.0.insert(key, present);
    }

    /// Flips a day and returns the new state.
    pub fn toggle(&mut self, key: AttendanceKey) -> bool {
        let present = !self.is_marked(&key);
        self.0.insert(key, present);
        present
    }

    pub fn is_marked(&self, key: &AttendanceKey) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// All keys marked present, in key order.
    pub fn marked(&self) -> impl Iterator<Item = &AttendanceKey> {
        self.0
            .iter()
            .filter(|(_, present)| **present)
            .map(|(key, _)| key)
    }

    /// Days of the given month the participant attended.
    pub fn marked_days(&self, participant: ParticipantId, year: i32, month0: u32) -> Vec<u32> {
        self.marked()
            .filter(|key| key.participant == participant && key.year == year && key.month0 == month0)
            .map(|key| key.day)
            .collect()
    }

    /// Removes every entry of a participant. Returns how many entries
    /// were dropped.
    pub fn purge_participant(&mut self, participant: ParticipantId) -> usize {
        let before = self.0.len();
        self.0.retain(|key, _| key.participant != participant);
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AttendanceLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, present) in &self.0 {
            map.serialize_entry(&key.encode(), present)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttendanceLog {
    fn deserialize<D>(deserializer: D) -> Result<AttendanceLog, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Malformed keys are dropped here, in one place, instead of being
        // re-checked at every read site.
        let raw = BTreeMap::<String, bool>::deserialize(deserializer)?;
        Ok(AttendanceLog(
            raw.into_iter()
                .filter_map(|(key, present)| AttendanceKey::decode(&key).map(|key| (key, present)))
                .collect(),
        ))
    }
}

impl FromIterator<(AttendanceKey, bool)> for AttendanceLog {
    fn from_iter<T: IntoIterator<Item = (AttendanceKey, bool)>>(iter: T) -> Self {
        AttendanceLog(iter.into_iter().collect())
    }
}
