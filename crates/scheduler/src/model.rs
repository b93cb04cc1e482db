//! Schedule data model — the textual row form and its decoded domain form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::store::TableRow;

/// Column positions inside a crontab row.
const COL_WHEN: usize = 0;
const COL_ACTION: usize = 1;
const COL_DISPLAY_URL: usize = 2;

/// One semantic row of the schedule table, still in its textual form.
///
/// The storage address of an entry is its fetch index, which is transient
/// and must be recomputed after every remote mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// `at HH:MM on the D day of MONTHNAME in YYYY`, UTC, 24-hour.
    pub when_text: String,
    /// `publish <absolutePath>`.
    pub action_text: String,
    /// Absolute URL the action refers to, shown to humans.
    pub display_url: String,
}

impl ScheduleEntry {
    /// Read an entry out of a raw table row. Tolerant of short rows — the
    /// codec decides later whether the text is interpretable.
    pub fn from_row(row: &[String]) -> Self {
        let col = |i: usize| row.get(i).cloned().unwrap_or_default();
        Self {
            when_text: col(COL_WHEN),
            action_text: col(COL_ACTION),
            display_url: col(COL_DISPLAY_URL),
        }
    }

    /// Render the entry as a wire row: `[when, action, display-url, reserved]`.
    pub fn to_row(&self) -> TableRow {
        vec![
            self.when_text.clone(),
            self.action_text.clone(),
            self.display_url.clone(),
            String::new(),
        ]
    }
}

/// Decoded form of a [`ScheduleEntry`]. Ephemeral — recomputed per workflow
/// invocation, never persisted outside the remote table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// The publish instant, UTC-normalized.
    pub datetime: DateTime<Utc>,
    /// Absolute URL of the page to act on.
    pub url: Url,
    /// Action verb, `publish` for every row this subsystem writes.
    pub action: String,
}
