use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

/// Usage stored on disk. `seconds` belongs to `date` only, so a file from a previous day means
/// nothing for today.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct DailyUsageEntity {
    pub date: NaiveDate,
    // Older files call it time_used.
    #[serde(alias = "time_used")]
    pub seconds: u64,
}

impl DailyUsageEntity {
    pub fn new(date: NaiveDate, seconds: u64) -> Self {
        Self { date, seconds }
    }

    /// Returns usage only if it was recorded for `today`.
    pub fn for_day(self, today: NaiveDate) -> Option<u64> {
        (self.date == today).then_some(self.seconds)
    }
}
