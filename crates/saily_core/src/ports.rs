//! crates/saily_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    AiSummary, DayRange, Group, Stamp, Theme, TimeEntry, UserSettings, WordCursor, WordRecord,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Record Stores
//=========================================================================================

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create_group(
        &self,
        owner_id: &str,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> PortResult<Uuid>;

    /// All groups of the owner, active and inactive, sorted by name.
    async fn list_groups(&self, owner_id: &str) -> PortResult<Vec<Group>>;

    async fn deactivate_group(
        &self,
        owner_id: &str,
        group_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn reactivate_group(&self, owner_id: &str, group_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    /// Opens a new session with no end and an empty description. Fails with
    /// `NotFound` unless the group belongs to `owner_id`.
    async fn create_time_entry(
        &self,
        owner_id: &str,
        group_id: Uuid,
        start: Stamp,
    ) -> PortResult<Uuid>;

    async fn update_time_entry(
        &self,
        owner_id: &str,
        entry_id: Uuid,
        description: &str,
        start: Stamp,
        end: Option<Stamp>,
    ) -> PortResult<()>;

    /// Closes a session. An end before the start is `InvalidInput`.
    async fn end_time_entry(&self, owner_id: &str, entry_id: Uuid, end: Stamp) -> PortResult<()>;

    /// Entries started on `day`, sorted by start time.
    async fn list_time_entries_for_day(
        &self,
        owner_id: &str,
        day: NaiveDate,
    ) -> PortResult<Vec<TimeEntry>>;

    /// Entries started within `range` (inclusive), sorted by start time.
    async fn list_time_entries_in_range(
        &self,
        owner_id: &str,
        range: DayRange,
    ) -> PortResult<Vec<TimeEntry>>;

    async fn delete_time_entry(&self, owner_id: &str, entry_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_settings(&self, owner_id: &str) -> PortResult<Option<UserSettings>>;

    /// Creates the settings record, replacing any existing one.
    async fn write_settings(&self, owner_id: &str, theme: Theme) -> PortResult<()>;

    /// Changes the theme of an existing record.
    async fn update_theme(&self, owner_id: &str, theme: Theme) -> PortResult<()>;
}

#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn save_summary(&self, summary: &AiSummary) -> PortResult<()>;

    /// Newest first.
    async fn list_summaries(&self, owner_id: &str) -> PortResult<Vec<AiSummary>>;

    async fn delete_summary(&self, owner_id: &str, summary_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait WordIndexStore: Send + Sync {
    /// The highest dataset index used within the newest cycle, if any word was ever stored.
    async fn highest_index(&self) -> PortResult<Option<WordCursor>>;

    async fn append_word(&self, record: &WordRecord) -> PortResult<()>;

    async fn latest_word(&self) -> PortResult<Option<WordRecord>>;
}

//=========================================================================================
// Outbound Services
//=========================================================================================

/// What the dictionary said about a word. Transport failures are reported as
/// `Err(PortError)` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryLookup {
    Found(Value),
    NotFound,
}

#[async_trait]
pub trait DictionaryService: Send + Sync {
    async fn lookup(&self, word: &str) -> PortResult<DictionaryLookup>;
}

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Summarizes the given task descriptions into a single paragraph.
    async fn summarize_tasks(&self, tasks: &[String]) -> PortResult<String>;
}
