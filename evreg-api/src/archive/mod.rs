//! Soft-delete archive and restore for users, events and registrations.
//!
//! Users and registrations move to `archived_users` / `archived_registrations`
//! when deleted and can be restored from there; events are soft-deleted in
//! place. [`service`] holds the bulk entry points used by the HTTP API and the
//! admin CLI.

pub mod archiver;
pub mod audit;
pub mod credential;
pub mod error;
pub mod purge;
pub mod report;
pub mod restorer;
pub mod schema_guard;
pub mod service;

pub use error::ArchiveError;
pub use report::{ArchiveSummary, PurgeSummary, RestoreReport, RowOutcome, SkipEntry, SkipReason};
pub use service::{Actor, EntityFamily, bulk_archive, bulk_purge, bulk_restore, parse_ids};
