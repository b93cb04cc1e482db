//! UI-enablement state for the schedule form, derived from a clock snapshot.

use chrono::NaiveDateTime;

use crate::clock::ClockSnapshot;

/// Which form actions are currently legal, plus the values the date input
/// should carry. Purely derived; holds no behaviour of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormState {
    /// Whether the create/update control is enabled.
    pub submit_enabled: bool,
    /// Whether the delete control is enabled. Mirrors submit whenever an
    /// existing entry is present; disabled when there is nothing to delete.
    pub delete_enabled: bool,
    /// Prefilled value for the date input. Cleared for lapsed schedules.
    pub prefill: Option<NaiveDateTime>,
    /// Browser-enforced minimum for the date input.
    pub min: NaiveDateTime,
}

impl FormState {
    pub fn derive(snapshot: &ClockSnapshot) -> Self {
        let min = snapshot.min_allowed;
        let Some(existing) = snapshot.existing else {
            // First-time scheduling is always allowed, subject only to the
            // date-picker minimum.
            return Self {
                submit_enabled: true,
                delete_enabled: false,
                prefill: None,
                min,
            };
        };

        if snapshot.now >= existing {
            // Lapsed: the poller should already have acted. Editing is
            // treated as scheduling fresh, so the prefill is cleared.
            Self {
                submit_enabled: true,
                delete_enabled: true,
                prefill: None,
                min,
            }
        } else if existing < snapshot.min_allowed {
            // Fires inside the unsafe edit horizon — too close to risk a
            // race with the poller.
            Self {
                submit_enabled: false,
                delete_enabled: false,
                prefill: Some(existing),
                min,
            }
        } else {
            Self {
                submit_enabled: true,
                delete_enabled: true,
                prefill: Some(existing),
                min,
            }
        }
    }
}
