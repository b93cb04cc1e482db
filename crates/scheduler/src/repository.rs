//! Row-level orchestration of a page's schedule against a [`TableSession`].
//!
//! Row indexes returned by [`ScheduleRepository::find`] are absolute fetch
//! indexes (header at 0). The store's mutating calls address data rows
//! only, so the header offset is applied here — and nowhere else.

use chrono::{DateTime, Utc};
use url::Url;

use pagecron_domain::config::StoreConfig;
use pagecron_domain::error::{Error, Result};

use crate::codec::ScheduleCodec;
use crate::model::{ScheduleEntry, ScheduleRecord};
use crate::store::TableSession;

/// Rows occupied by the header at the top of every fetch.
pub const HEADER_ROWS: usize = 1;

/// A matching entry plus its transient storage address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundEntry {
    pub entry: ScheduleEntry,
    /// Absolute index in the fetched rows. Stale after any remote
    /// mutation; re-`find` before using it again.
    pub row_index: usize,
}

pub struct ScheduleRepository {
    codec: ScheduleCodec,
    table_path: String,
    table_name: String,
}

impl ScheduleRepository {
    pub fn new(codec: ScheduleCodec, store: &StoreConfig) -> Self {
        Self {
            codec,
            table_path: store.table_path.clone(),
            table_name: store.table_name.clone(),
        }
    }

    /// First entry whose action path ends with `url`'s path, with its fetch
    /// index. `None` when nothing matches; store failures propagate.
    pub async fn find(
        &self,
        session: &dyn TableSession,
        url: &Url,
    ) -> Result<Option<FoundEntry>> {
        let rows = session.list_rows(&self.table_path, &self.table_name).await?;
        let path = url.path();
        for (row_index, row) in rows.iter().enumerate() {
            let entry = ScheduleEntry::from_row(row);
            if entry.action_text.ends_with(path) {
                return Ok(Some(FoundEntry { entry, row_index }));
            }
        }
        Ok(None)
    }

    /// Append a new entry. Callers must have `find`-checked first — nothing
    /// here prevents duplicate rows for the same URL.
    pub async fn create(&self, session: &dyn TableSession, record: &ScheduleRecord) -> Result<()> {
        let row = self.codec.encode(record).to_row();
        session
            .append_rows(&self.table_path, &self.table_name, vec![row])
            .await
    }

    /// Overwrite the entry at `row_index` (an index from a prior `find` in
    /// the same session). A stale index silently misupdates — there is no
    /// optimistic locking on the table.
    pub async fn update(
        &self,
        session: &dyn TableSession,
        record: &ScheduleRecord,
        row_index: usize,
    ) -> Result<()> {
        let row = self.codec.encode(record).to_row();
        session
            .update_row(
                &self.table_path,
                &self.table_name,
                data_index(row_index)?,
                vec![row],
            )
            .await
    }

    /// Remove the entry at `row_index` (an index from a prior `find`).
    pub async fn delete(&self, session: &dyn TableSession, row_index: usize) -> Result<()> {
        session
            .delete_row(&self.table_path, &self.table_name, data_index(row_index)?)
            .await
    }

    /// All upcoming publish records, ascending by datetime.
    ///
    /// Rows that fail to decode are skipped, not fatal to the batch. Only
    /// entries with action `publish` and a datetime strictly after `now`
    /// are retained.
    pub async fn list(
        &self,
        session: &dyn TableSession,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScheduleRecord>> {
        let rows = session.list_rows(&self.table_path, &self.table_name).await?;
        let mut records: Vec<ScheduleRecord> = rows
            .iter()
            .skip(HEADER_ROWS)
            .filter_map(|row| {
                let entry = ScheduleEntry::from_row(row);
                match self.codec.decode(&entry) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        tracing::debug!(error = %err, when = %entry.when_text, "skipping row");
                        None
                    }
                }
            })
            .filter(|record| record.action == "publish" && record.datetime > now)
            .collect();
        records.sort_by_key(|record| record.datetime);
        Ok(records)
    }
}

/// Translate an absolute fetch index into the store's data-row index.
fn data_index(row_index: usize) -> Result<usize> {
    row_index
        .checked_sub(HEADER_ROWS)
        .ok_or_else(|| Error::Validation(format!("row index {row_index} addresses the header")))
}
