use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

use super::Amount;

/// Row identifier assigned by the store (AUTOINCREMENT).
pub type EntryId = i64;

/// On-disk format of the `datetime` column. Local wall-clock time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single deposit or withdrawal recorded for one participant.
/// Entries are never updated; the only mutation is deleting the most recent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    /// Participant name, stored verbatim ("Bob" and "bob " are different people)
    pub name: String,
    /// Positive for deposits, negative for withdrawals
    pub amount: Amount,
    /// Local time the entry was recorded, second granularity
    #[serde(with = "timestamp_serde")]
    pub recorded_at: NaiveDateTime,
}

impl Entry {
    pub fn is_deposit(&self) -> bool {
        self.amount > 0
    }

    pub fn is_withdrawal(&self) -> bool {
        self.amount < 0
    }
}

/// Current local time truncated to whole seconds.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input.trim(), TIMESTAMP_FORMAT)
}

mod timestamp_serde {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}
