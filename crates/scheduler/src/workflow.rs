//! Top-level workflow tying codec, clock, repository, and form state
//! together to service the schedule, cancel, inspect, and list intents.
//!
//! All collaborators are injected: the table backend through
//! [`TableStore`], dialog rendering through [`UserInterface`], and the
//! downstream cache refresh through [`RefreshSignal`]. The authenticated
//! session is owned here — established lazily on first use and reused for
//! the lifetime of the workflow, never process-global.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::OnceCell;
use url::Url;

use pagecron_domain::config::Config;
use pagecron_domain::error::{Error, Result};

use crate::clock::ScheduleClock;
use crate::codec::ScheduleCodec;
use crate::form::FormState;
use crate::model::ScheduleRecord;
use crate::repository::{FoundEntry, ScheduleRepository};
use crate::store::{TableSession, TableStore};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Injected capabilities
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What the user chose in the schedule form dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormOutcome {
    /// Submitted a wall-clock datetime from the date input.
    Submit(NaiveDateTime),
    /// Asked to delete the existing schedule.
    Delete,
    /// Closed the dialog without acting.
    Dismiss,
}

/// Dialog-rendering capability. Implementations own all chrome; the
/// workflow only hands over derived state and literal messages.
#[async_trait]
pub trait UserInterface: Send + Sync {
    /// Present the schedule form and wait for the user's choice.
    async fn schedule_form(&self, form: &FormState, timezone_caption: &str) -> FormOutcome;

    /// Yes/no confirmation dialog.
    async fn confirm(&self, title: &str, message: &str) -> bool;

    /// Blocking error dialog the user must dismiss.
    async fn acknowledge(&self, title: &str, message: &str);

    /// Transient success toast.
    async fn notify(&self, message: &str);

    /// Render the upcoming-jobs table. An empty `jobs` slice must still
    /// render, with an explicit "no jobs" row.
    async fn show_jobs(&self, jobs: &[ScheduleRecord], timezone_caption: &str);
}

/// Downstream cache-refresh signal: ask for the resource at `path` to be
/// recomputed so consumers observe the table change.
#[async_trait]
pub trait RefreshSignal: Send + Sync {
    async fn refresh(&self, path: &str) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Workflow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ScheduleWorkflow {
    config: Config,
    codec: ScheduleCodec,
    clock: ScheduleClock,
    repository: ScheduleRepository,
    store: Arc<dyn TableStore>,
    ui: Arc<dyn UserInterface>,
    refresh: Arc<dyn RefreshSignal>,
    session: OnceCell<Arc<dyn TableSession>>,
}

impl ScheduleWorkflow {
    /// Build a workflow from validated configuration and injected
    /// collaborators. Configuration errors fail construction.
    pub fn new(
        config: Config,
        store: Arc<dyn TableStore>,
        ui: Arc<dyn UserInterface>,
        refresh: Arc<dyn RefreshSignal>,
    ) -> Result<Self> {
        let errors: Vec<String> = config
            .validate()
            .into_iter()
            .filter(|e| e.severity == pagecron_domain::config::ConfigSeverity::Error)
            .map(|e| e.to_string())
            .collect();
        if !errors.is_empty() {
            return Err(Error::Validation(errors.join("; ")));
        }

        let schedule = config.schedule.clamped();
        let origin = Url::parse(&schedule.site_origin)
            .map_err(|e| Error::Validation(format!("site_origin: {e}")))?;
        let codec = ScheduleCodec::new(origin);
        let clock = ScheduleClock::from_config(&schedule);
        let repository = ScheduleRepository::new(codec.clone(), &config.store);

        Ok(Self {
            config,
            codec,
            clock,
            repository,
            store,
            ui,
            refresh,
            session: OnceCell::new(),
        })
    }

    /// The authenticated session, established on first use and reused.
    async fn session(&self) -> Result<&Arc<dyn TableSession>> {
        self.session
            .get_or_try_init(|| async {
                let session = self
                    .store
                    .authenticate(&self.config.store.client_id, &self.config.store.authority)
                    .await?;
                tracing::info!("connected to the table store");
                Ok(session)
            })
            .await
    }

    /// Best-effort downstream refresh after a table mutation. A failed
    /// refresh is logged but does not undo the mutation.
    async fn signal_refresh(&self) {
        let path = self.config.store.refresh_path();
        if let Err(err) = self.refresh.refresh(&path).await {
            tracing::warn!(error = %err, path = %path, "refresh signal failed");
        }
    }

    // ── intents ──────────────────────────────────────────────────────

    /// Schedule or reschedule publication of `url`.
    ///
    /// Remote failures are surfaced through the UI and end the invocation;
    /// the table is left as it was.
    pub async fn publish_later(&self, url: &Url) -> Result<()> {
        let session = match self.session().await {
            Ok(session) => Arc::clone(session),
            Err(err) => {
                tracing::error!(error = %err, "could not sign in to the table store");
                self.ui
                    .acknowledge("Error", "Could not sign in to the table store.")
                    .await;
                return Ok(());
            }
        };

        let found = match self.repository.find(session.as_ref(), url).await {
            Ok(found) => found,
            Err(err) => {
                tracing::error!(error = %err, "could not retrieve scheduled jobs");
                self.ui
                    .acknowledge("Error", "Could not retrieve scheduled jobs.")
                    .await;
                return Ok(());
            }
        };

        let snapshot = self
            .clock
            .snapshot(&self.codec, found.as_ref().map(|f| &f.entry));
        let form = FormState::derive(&snapshot);
        let caption = self.clock.timezone_caption();

        match self.ui.schedule_form(&form, &caption).await {
            FormOutcome::Submit(local) => self.submit(&session, url, &found, local).await,
            FormOutcome::Delete => {
                if let Some(found) = &found {
                    self.confirm_and_delete(&session, found.row_index).await;
                }
                Ok(())
            }
            FormOutcome::Dismiss => Ok(()),
        }
    }

    async fn submit(
        &self,
        session: &Arc<dyn TableSession>,
        url: &Url,
        found: &Option<FoundEntry>,
        local: NaiveDateTime,
    ) -> Result<()> {
        let record = ScheduleRecord {
            datetime: self.clock.to_utc(local),
            url: url.clone(),
            action: "publish".into(),
        };

        let result = match found {
            Some(found) => {
                self.repository
                    .update(session.as_ref(), &record, found.row_index)
                    .await
            }
            None => self.repository.create(session.as_ref(), &record).await,
        };

        match result {
            Ok(()) => {
                self.signal_refresh().await;
                self.ui.notify("Publishing scheduled successfully.").await;
            }
            Err(err) if found.is_some() => {
                tracing::error!(error = %err, "failed to update publishing job");
                self.ui
                    .acknowledge(
                        "Publish Later",
                        "Failed to update existing publishing schedule.",
                    )
                    .await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to create publishing job");
                self.ui
                    .acknowledge("Publish Later", "Failed to create publishing schedule.")
                    .await;
            }
        }
        Ok(())
    }

    /// Cancel the schedule for `url`, if any.
    pub async fn cancel(&self, url: &Url) -> Result<()> {
        let session = match self.session().await {
            Ok(session) => Arc::clone(session),
            Err(err) => {
                tracing::error!(error = %err, "could not sign in to the table store");
                self.ui
                    .acknowledge("Error", "Could not sign in to the table store.")
                    .await;
                return Ok(());
            }
        };

        match self.repository.find(session.as_ref(), url).await {
            Ok(Some(found)) => {
                self.confirm_and_delete(&session, found.row_index).await;
            }
            Ok(None) => {
                self.ui.notify("Nothing is scheduled for this page.").await;
            }
            Err(err) => {
                tracing::error!(error = %err, "could not retrieve scheduled jobs");
                self.ui
                    .acknowledge("Error", "Could not retrieve scheduled jobs.")
                    .await;
            }
        }
        Ok(())
    }

    async fn confirm_and_delete(&self, session: &Arc<dyn TableSession>, row_index: usize) {
        let confirmed = self
            .ui
            .confirm(
                "Delete schedule",
                "Are you sure you want to delete this publishing schedule?",
            )
            .await;
        if !confirmed {
            return;
        }
        match self.repository.delete(session.as_ref(), row_index).await {
            Ok(()) => {
                self.signal_refresh().await;
                self.ui.notify("Publishing job deleted successfully.").await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to delete publishing job");
                self.ui
                    .acknowledge(
                        "Publish Later",
                        "Failed to delete existing publishing schedule.",
                    )
                    .await;
            }
        }
    }

    /// Read-only lookup of the current page's schedule.
    ///
    /// Returns `Ok(None)` both when nothing is scheduled and when the
    /// matching row cannot be interpreted (the caller renders "Never").
    /// Auth and store failures propagate.
    pub async fn inspect(&self, url: &Url) -> Result<Option<ScheduleRecord>> {
        let session = self.session().await?;
        let found = self.repository.find(session.as_ref(), url).await?;
        Ok(found.and_then(|found| match self.codec.decode(&found.entry) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse existing schedule");
                None
            }
        }))
    }

    /// Render all upcoming publish jobs through the UI.
    pub async fn list_all(&self) -> Result<()> {
        let session = match self.session().await {
            Ok(session) => Arc::clone(session),
            Err(err) => {
                tracing::error!(error = %err, "could not sign in to the table store");
                self.ui
                    .acknowledge("Error", "Could not sign in to the table store.")
                    .await;
                return Ok(());
            }
        };

        match self.repository.list(session.as_ref(), Utc::now()).await {
            Ok(jobs) => {
                let caption = self.clock.timezone_caption();
                self.ui.show_jobs(&jobs, &caption).await;
            }
            Err(err) => {
                tracing::error!(error = %err, "could not retrieve scheduled jobs");
                self.ui
                    .acknowledge("Error", "Could not retrieve scheduled jobs.")
                    .await;
            }
        }
        Ok(())
    }

    /// Human-readable form of a record's instant, for rendered surfaces.
    pub fn format_datetime(&self, record: &ScheduleRecord) -> String {
        self.clock.format_datetime(record.datetime)
    }
}
