//! Time references for validating and rendering a schedule.
//!
//! All comparisons happen in the viewer's wall-clock frame: the current
//! instant and any decoded entry are both shifted into the configured zone
//! and compared as naive datetimes, mirroring how the date picker and the
//! stored rows are constructed.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use pagecron_domain::config::ScheduleConfig;

use crate::codec::ScheduleCodec;
use crate::model::ScheduleEntry;

/// Parse a timezone string into a `chrono_tz::Tz`, falling back to UTC.
pub fn parse_tz(tz: &str) -> Tz {
    tz.parse::<Tz>().unwrap_or(Tz::UTC)
}

/// The time references one workflow invocation needs, all in the viewer's
/// wall-clock frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSnapshot {
    pub now: NaiveDateTime,
    /// `now + lead_time`. Edits before this instant race the poller.
    pub min_allowed: NaiveDateTime,
    /// Scheduled instant of the existing entry, when one exists and parses.
    pub existing: Option<NaiveDateTime>,
}

/// Computes [`ClockSnapshot`]s and display strings for a fixed zone and
/// lead time.
#[derive(Clone, Debug)]
pub struct ScheduleClock {
    tz: Tz,
    lead_time: Duration,
}

impl ScheduleClock {
    pub fn new(tz: Tz, lead_time_minutes: u64) -> Self {
        Self {
            tz,
            lead_time: Duration::minutes(lead_time_minutes as i64),
        }
    }

    pub fn from_config(cfg: &ScheduleConfig) -> Self {
        let cfg = cfg.clamped();
        if cfg.timezone.parse::<Tz>().is_err() {
            tracing::warn!(timezone = %cfg.timezone, "unknown timezone, falling back to UTC");
        }
        Self::new(parse_tz(&cfg.timezone), cfg.lead_time_minutes)
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Snapshot against the real current instant.
    pub fn snapshot(&self, codec: &ScheduleCodec, existing: Option<&ScheduleEntry>) -> ClockSnapshot {
        self.snapshot_at(Utc::now(), codec, existing)
    }

    /// Snapshot against an injected instant.
    ///
    /// When `existing` fails to decode the failure is logged and the entry
    /// is treated as absent — the page then behaves as never scheduled.
    pub fn snapshot_at(
        &self,
        now: DateTime<Utc>,
        codec: &ScheduleCodec,
        existing: Option<&ScheduleEntry>,
    ) -> ClockSnapshot {
        let existing = existing.and_then(|entry| match codec.decode(entry) {
            Ok(record) => Some(self.to_local(record.datetime)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse existing schedule");
                None
            }
        });
        let now = self.to_local(now);
        ClockSnapshot {
            now,
            min_allowed: now + self.lead_time,
            existing,
        }
    }

    /// Shift an instant into the viewer's wall-clock frame.
    pub fn to_local(&self, t: DateTime<Utc>) -> NaiveDateTime {
        t.with_timezone(&self.tz).naive_local()
    }

    /// Resolve a submitted wall-clock datetime back to an instant.
    ///
    /// On a fall-back overlap the earlier mapping wins; a spring-forward
    /// gap is nudged to the first valid wall-clock hour after it.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => match self.tz.from_local_datetime(&(local + Duration::hours(1))) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
                LocalResult::None => Utc.from_utc_datetime(&local),
            },
        }
    }

    /// Minutes to add to local time to reach UTC at the given instant —
    /// positive west of Greenwich, the `getTimezoneOffset` convention the
    /// stored rows were written under.
    pub fn offset_minutes(&self, at: DateTime<Utc>) -> i32 {
        -(self
            .tz
            .offset_from_utc_datetime(&at.naive_utc())
            .fix()
            .local_minus_utc()
            / 60)
    }

    /// Localized caption for rendered surfaces, e.g.
    /// `Times are in Europe/Berlin timezone (GMT+2)`.
    pub fn timezone_caption(&self) -> String {
        self.caption_at(Utc::now())
    }

    pub fn caption_at(&self, at: DateTime<Utc>) -> String {
        let offset = self.offset_minutes(at);
        // Display sign is inverted relative to the raw offset value.
        let hours = -(f64::from(offset)) / 60.0;
        format!("Times are in {} timezone (GMT{hours:+})", self.tz.name())
    }

    /// Short human form of an instant, rendered in the viewer's zone.
    pub fn format_datetime(&self, t: DateTime<Utc>) -> String {
        self.to_local(t).format("%-d %b %Y, %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScheduleEntry;
    use url::Url;

    fn codec() -> ScheduleCodec {
        ScheduleCodec::new(Url::parse("https://x").unwrap())
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn entry(when: &str) -> ScheduleEntry {
        ScheduleEntry {
            when_text: when.into(),
            action_text: "publish /p".into(),
            display_url: "https://x/p".into(),
        }
    }

    #[test]
    fn snapshot_shifts_now_into_the_zone() {
        let clock = ScheduleClock::new(parse_tz("Asia/Tokyo"), 10);
        let snap = clock.snapshot_at(utc("2025-06-05T00:00:00Z"), &codec(), None);
        assert_eq!(snap.now.to_string(), "2025-06-05 09:00:00");
        assert_eq!(snap.min_allowed - snap.now, Duration::minutes(10));
        assert_eq!(snap.existing, None);
    }

    #[test]
    fn snapshot_decodes_existing_entry_into_the_zone() {
        let clock = ScheduleClock::new(parse_tz("Asia/Tokyo"), 10);
        let snap = clock.snapshot_at(
            utc("2025-06-05T00:00:00Z"),
            &codec(),
            Some(&entry("at 14:30 on the 5 day of June in 2025")),
        );
        assert_eq!(snap.existing.unwrap().to_string(), "2025-06-05 23:30:00");
    }

    #[test]
    fn unparseable_existing_entry_is_treated_as_absent() {
        let clock = ScheduleClock::new(Tz::UTC, 10);
        let snap = clock.snapshot_at(
            utc("2025-06-05T00:00:00Z"),
            &codec(),
            Some(&entry("whenever feels right")),
        );
        assert_eq!(snap.existing, None);
    }

    #[test]
    fn offset_minutes_is_positive_west_of_greenwich() {
        let at = utc("2025-01-15T12:00:00Z");
        let east = ScheduleClock::new(parse_tz("Asia/Tokyo"), 10);
        assert_eq!(east.offset_minutes(at), -540);
        let west = ScheduleClock::new(parse_tz("America/New_York"), 10);
        assert_eq!(west.offset_minutes(at), 300);
    }

    #[test]
    fn caption_inverts_the_display_sign() {
        let at = utc("2025-01-15T12:00:00Z");
        let tokyo = ScheduleClock::new(parse_tz("Asia/Tokyo"), 10);
        assert_eq!(
            tokyo.caption_at(at),
            "Times are in Asia/Tokyo timezone (GMT+9)"
        );
        let ny = ScheduleClock::new(parse_tz("America/New_York"), 10);
        assert_eq!(
            ny.caption_at(at),
            "Times are in America/New_York timezone (GMT-5)"
        );
    }

    #[test]
    fn caption_keeps_fractional_offsets() {
        let at = utc("2025-01-15T12:00:00Z");
        let kolkata = ScheduleClock::new(parse_tz("Asia/Kolkata"), 10);
        assert_eq!(
            kolkata.caption_at(at),
            "Times are in Asia/Kolkata timezone (GMT+5.5)"
        );
    }

    #[test]
    fn to_utc_round_trips_through_the_zone() {
        let clock = ScheduleClock::new(parse_tz("Europe/Berlin"), 10);
        let instant = utc("2025-06-05T14:30:00Z");
        assert_eq!(clock.to_utc(clock.to_local(instant)), instant);
    }

    #[test]
    fn to_utc_prefers_earliest_mapping_in_fall_back_overlap() {
        // 2025-10-26 02:30 occurs twice in Berlin; the CEST (UTC+2)
        // reading comes first.
        let clock = ScheduleClock::new(parse_tz("Europe/Berlin"), 10);
        let local = "2025-10-26T02:30:00".parse::<NaiveDateTime>().unwrap();
        assert_eq!(clock.to_utc(local), utc("2025-10-26T00:30:00Z"));
    }

    #[test]
    fn to_utc_nudges_spring_forward_gap() {
        // 2025-03-30 02:30 does not exist in Berlin.
        let clock = ScheduleClock::new(parse_tz("Europe/Berlin"), 10);
        let local = "2025-03-30T02:30:00".parse::<NaiveDateTime>().unwrap();
        assert_eq!(clock.to_utc(local), utc("2025-03-30T01:30:00Z"));
    }

    #[test]
    fn from_config_falls_back_to_utc() {
        let cfg = ScheduleConfig {
            timezone: "Not/Real".into(),
            ..Default::default()
        };
        assert_eq!(ScheduleClock::from_config(&cfg).timezone(), Tz::UTC);
    }
}
