//! Pure codec between [`ScheduleRecord`]s and the textual row grammar.
//!
//! The row grammar is the restricted natural-language subset understood by
//! the table poller: `at HH:MM on the D day of MONTHNAME in YYYY`, always
//! UTC. No I/O happens here.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use regex::Regex;
use url::Url;

use pagecron_domain::error::{Error, Result};

use crate::model::{ScheduleEntry, ScheduleRecord};

/// Month names exactly as they appear in stored rows. Index 0 = January.
/// The "Oktober" spelling is part of the stored-row format and the lookup
/// is case-sensitive, so it must not be "fixed" here.
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "Oktober",
    "November",
    "December",
];

/// Grammar of the when-text column. Unanchored, like the poller's own parse.
const WHEN_PATTERN: &str = r"at (\d{1,2}):(\d{2})([ap]m)? on the (\d{1,2}) day of (\w+) in (\d{4})";

/// Encode/decode pair between domain records and table row text.
///
/// Holds the configured site origin; decoded paths are joined against it
/// and encoded display URLs are rebuilt from it.
#[derive(Clone, Debug)]
pub struct ScheduleCodec {
    origin: Url,
    when_re: Regex,
}

impl ScheduleCodec {
    pub fn new(origin: Url) -> Self {
        // The pattern is a constant; compilation cannot fail at runtime.
        let when_re = Regex::new(WHEN_PATTERN).expect("when-text pattern is valid");
        Self { origin, when_re }
    }

    /// The origin that decoded paths resolve against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Format a record into the fixed UTC phrase form.
    ///
    /// Hours and minutes are zero-padded; the day is not. The action is
    /// always `publish <path>` and the display URL is origin + path.
    pub fn encode(&self, record: &ScheduleRecord) -> ScheduleEntry {
        let dt = record.datetime;
        let path = record.url.path();
        ScheduleEntry {
            when_text: format!(
                "at {:02}:{:02} on the {} day of {} in {}",
                dt.hour(),
                dt.minute(),
                dt.day(),
                MONTHS[dt.month0() as usize],
                dt.year()
            ),
            action_text: format!("publish {path}"),
            display_url: format!("{}{}", self.origin.origin().ascii_serialization(), path),
        }
    }

    /// Parse an entry back into a record.
    ///
    /// A `pm` suffix adds 12 to the parsed hour unconditionally, so `12pm`
    /// yields hour 24 and rolls into the next day. Stored rows written by
    /// the 24-hour encoder never carry a suffix, but hand-edited ones do,
    /// and the poller resolves them exactly this way.
    pub fn decode(&self, entry: &ScheduleEntry) -> Result<ScheduleRecord> {
        let caps = self
            .when_re
            .captures(&entry.when_text)
            .ok_or_else(|| Error::Parse(entry.when_text.clone()))?;

        let num = |i: usize| -> Result<i64> {
            caps[i]
                .parse::<i64>()
                .map_err(|_| Error::Parse(entry.when_text.clone()))
        };

        let mut hours = num(1)?;
        let minutes = num(2)?;
        if let Some(suffix) = caps.get(3) {
            if suffix.as_str() == "pm" {
                hours += 12;
            }
        }
        let day = num(4)? as u32;
        let month_name = &caps[5];
        let year = num(6)? as i32;

        let month0 = MONTHS
            .iter()
            .position(|m| *m == month_name)
            .ok_or_else(|| Error::UnknownMonth(month_name.to_string()))?;

        let date = NaiveDate::from_ymd_opt(year, month0 as u32 + 1, day)
            .ok_or_else(|| Error::Parse(entry.when_text.clone()))?;

        // Applying the time as an offset lets an overflowing hour (the
        // `12pm` case above) roll into the next day instead of failing.
        let datetime = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            + Duration::hours(hours)
            + Duration::minutes(minutes);

        let verb = entry
            .action_text
            .split_whitespace()
            .next()
            .unwrap_or_default();
        let path = entry
            .action_text
            .split_whitespace()
            .last()
            .unwrap_or_default();
        let url = self
            .origin
            .join(path)
            .map_err(|_| Error::Parse(entry.action_text.clone()))?;

        Ok(ScheduleRecord {
            datetime,
            url,
            action: verb.to_string(),
        })
    }
}
