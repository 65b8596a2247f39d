use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Why a restore left a row in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SkipReason {
    /// The registration's event is gone or soft-deleted.
    EventMissingOrArchived,
    /// The registration's user is not live.
    UserMissing,
    /// A conflicting live row is already present.
    AlreadyExists,
    /// The archived user's original id is taken by a live user.
    UserIdExists,
    /// The archived user's email is taken by a live user.
    EmailExists,
    /// No archive row (or event) with this id.
    NotFound,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::EventMissingOrArchived => "event_missing_or_archived",
            SkipReason::UserMissing => "user_missing",
            SkipReason::AlreadyExists => "already_exists",
            SkipReason::UserIdExists => "user_id_exists",
            SkipReason::EmailExists => "email_exists",
            SkipReason::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SkipEntry {
    pub id: i32,
    pub reason: SkipReason,
}

/// Result of restoring one requested id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Carries the live id the row was restored under.
    Restored(i32),
    Skipped(SkipEntry),
}

impl RowOutcome {
    pub fn skipped(id: i32, reason: SkipReason) -> Self {
        RowOutcome::Skipped(SkipEntry { id, reason })
    }
}

/// Aggregate result of a bulk restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RestoreReport {
    pub requested: usize,
    pub restored: usize,
    pub restored_ids: Vec<i32>,
    pub skipped_count: usize,
    pub skipped: Vec<SkipEntry>,
}

impl RestoreReport {
    pub fn from_outcomes(requested: usize, outcomes: Vec<RowOutcome>) -> Self {
        let mut report = RestoreReport {
            requested,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                RowOutcome::Restored(id) => report.restored_ids.push(id),
                RowOutcome::Skipped(entry) => report.skipped.push(entry),
            }
        }
        report.restored = report.restored_ids.len();
        report.skipped_count = report.skipped.len();
        report
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArchiveSummary {
    pub archived_count: usize,
    /// Ids of the rows that left live storage.
    pub archived_ids: Vec<i32>,
    /// Registration ids archived along with deleted users. Empty for other families.
    pub cascaded_registration_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurgeSummary {
    pub deleted_count: usize,
}
