//! The `TableStore` / `TableSession` traits define the interface to the
//! remote row-based table, plus an in-memory backend for tests and demos.
//!
//! Implementations may talk to a real workbook API or be a test double.
//! Authentication yields a session handle; the workflow establishes one
//! lazily and reuses it for its whole lifetime. No retries happen at this
//! layer — every failure maps to a domain error and propagates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use pagecron_domain::error::{Error, Result};

/// One raw wire row: `[when-text, action-text, display-url, reserved]`.
/// Fetched row 0 is the header.
pub type TableRow = Vec<String>;

/// Entry point to a table backend: exchanges credentials for a session.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn authenticate(
        &self,
        client_id: &str,
        authority: &str,
    ) -> Result<Arc<dyn TableSession>>;
}

/// An authenticated handle for row CRUD on named tables.
///
/// `list_rows` returns the header row first; `update_row` and `delete_row`
/// address data rows only (the header is not addressable), which is why
/// callers apply the header offset before calling in.
#[async_trait]
pub trait TableSession: Send + Sync {
    async fn list_rows(&self, table: &str, name: &str) -> Result<Vec<TableRow>>;

    async fn append_rows(&self, table: &str, name: &str, rows: Vec<TableRow>) -> Result<()>;

    async fn update_row(
        &self,
        table: &str,
        name: &str,
        index: usize,
        rows: Vec<TableRow>,
    ) -> Result<()>;

    async fn delete_row(&self, table: &str, name: &str, index: usize) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-process [`TableStore`] holding a single table in memory.
///
/// Can be told to deny authentication or fail row operations, to exercise
/// the workflow's error paths.
#[derive(Default)]
pub struct MemoryTableStore {
    rows: Arc<RwLock<Vec<TableRow>>>,
    deny_auth: bool,
    fail_ops: Arc<AtomicBool>,
}

impl MemoryTableStore {
    /// A store seeded with the given rows (header included).
    pub fn seeded(rows: Vec<TableRow>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
            ..Default::default()
        }
    }

    /// A store that rejects every authentication attempt.
    pub fn denying_auth() -> Self {
        Self {
            deny_auth: true,
            ..Default::default()
        }
    }

    /// Make every subsequent row operation fail (or succeed again).
    pub fn set_fail_ops(&self, fail: bool) {
        self.fail_ops.store(fail, Ordering::SeqCst);
    }

    /// Current table contents, header included.
    pub async fn dump(&self) -> Vec<TableRow> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn authenticate(
        &self,
        client_id: &str,
        _authority: &str,
    ) -> Result<Arc<dyn TableSession>> {
        if self.deny_auth {
            return Err(Error::Auth(format!("sign-in rejected for {client_id:?}")));
        }
        Ok(Arc::new(MemorySession {
            rows: Arc::clone(&self.rows),
            fail_ops: Arc::clone(&self.fail_ops),
        }))
    }
}

struct MemorySession {
    rows: Arc<RwLock<Vec<TableRow>>>,
    fail_ops: Arc<AtomicBool>,
}

impl MemorySession {
    fn check(&self) -> Result<()> {
        if self.fail_ops.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("simulated outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TableSession for MemorySession {
    async fn list_rows(&self, _table: &str, _name: &str) -> Result<Vec<TableRow>> {
        self.check()?;
        Ok(self.rows.read().await.clone())
    }

    async fn append_rows(&self, _table: &str, _name: &str, rows: Vec<TableRow>) -> Result<()> {
        self.check()?;
        self.rows.write().await.extend(rows);
        Ok(())
    }

    async fn update_row(
        &self,
        _table: &str,
        _name: &str,
        index: usize,
        rows: Vec<TableRow>,
    ) -> Result<()> {
        self.check()?;
        let mut table = self.rows.write().await;
        // Data-row index: the header at slot 0 is not addressable.
        let slot = index + 1;
        let row = rows.into_iter().next().unwrap_or_default();
        match table.get_mut(slot) {
            Some(target) => {
                *target = row;
                Ok(())
            }
            None => Err(Error::StoreUnavailable(format!(
                "row index {index} out of range"
            ))),
        }
    }

    async fn delete_row(&self, _table: &str, _name: &str, index: usize) -> Result<()> {
        self.check()?;
        let mut table = self.rows.write().await;
        let slot = index + 1;
        if slot >= table.len() {
            return Err(Error::StoreUnavailable(format!(
                "row index {index} out of range"
            )));
        }
        table.remove(slot);
        Ok(())
    }
}
