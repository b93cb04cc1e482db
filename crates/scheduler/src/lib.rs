//! Publish-later scheduling against a row-based "crontab" table.
//!
//! Converts between `{datetime, url}` domain records and the textual row
//! format the table poller consumes, and drives the create/edit/delete
//! state machine around the minimum-lead-time horizon.
//!
//! Split into submodules for maintainability:
//! - [`model`] — Row and record data types
//! - [`codec`] — Encode/decode between records and row text
//! - [`clock`] — Time references and timezone rendering
//! - [`store`] — `TableStore`/`TableSession` seam + in-memory backend
//! - [`repository`] — Row CRUD orchestration, header-offset handling
//! - [`form`] — UI-enablement state machine
//! - [`workflow`] — User intents wired through injected collaborators

pub mod clock;
pub mod codec;
pub mod form;
pub mod model;
pub mod repository;
pub mod store;
pub mod workflow;

pub use clock::{parse_tz, ClockSnapshot, ScheduleClock};
pub use codec::ScheduleCodec;
pub use form::FormState;
pub use model::{ScheduleEntry, ScheduleRecord};
pub use repository::{FoundEntry, ScheduleRepository, HEADER_ROWS};
pub use store::{MemoryTableStore, TableRow, TableSession, TableStore};
pub use workflow::{FormOutcome, RefreshSignal, ScheduleWorkflow, UserInterface};
