//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the record store ports from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use saily_core::domain::{
    AiSummary, DateParts, DayRange, Group, Stamp, Theme, TimeEntry, UserSettings, WordCursor,
    WordRecord,
};
use saily_core::ports::{
    GroupStore, PortError, PortResult, SettingsStore, SummaryStore, TimeEntryStore,
    WordIndexStore,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every record store port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `url`, creating the database file if it does not exist.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn from_millis(millis: i64) -> PortResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| PortError::Unexpected(format!("timestamp {} is out of range", millis)))
}

fn stamp_from_parts(at: i64, year: i64, month: i64, day: i64) -> PortResult<Stamp> {
    Ok(Stamp {
        at: from_millis(at)?,
        day: DateParts {
            year: year as i32,
            month: month as u32,
            day: day as u32,
        },
    })
}

/// Fails with `NotFound` when an owner-scoped write touched no row.
fn ensure_touched(rows: u64, entity: &str, id: impl std::fmt::Display) -> PortResult<()> {
    if rows == 0 {
        Err(PortError::NotFound(format!("{} {} not found", entity, id)))
    } else {
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct GroupRecord {
    id: Uuid,
    owner_id: String,
    name: String,
    created_at: i64,
    deactivated_at: Option<i64>,
}
impl GroupRecord {
    fn to_domain(self) -> PortResult<Group> {
        Ok(Group {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            created_at: from_millis(self.created_at)?,
            deactivated_at: self.deactivated_at.map(from_millis).transpose()?,
        })
    }
}

#[derive(FromRow)]
struct TimeEntryRecord {
    id: Uuid,
    owner_id: String,
    group_id: Uuid,
    start_time: i64,
    start_year: i64,
    start_month: i64,
    start_day: i64,
    end_time: Option<i64>,
    end_year: Option<i64>,
    end_month: Option<i64>,
    end_day: Option<i64>,
    description: String,
}
impl TimeEntryRecord {
    fn to_domain(self) -> PortResult<TimeEntry> {
        let start = stamp_from_parts(
            self.start_time,
            self.start_year,
            self.start_month,
            self.start_day,
        )?;
        let end = match (self.end_time, self.end_year, self.end_month, self.end_day) {
            (Some(at), Some(y), Some(m), Some(d)) => Some(stamp_from_parts(at, y, m, d)?),
            (None, None, None, None) => None,
            _ => {
                return Err(PortError::Unexpected(format!(
                    "time entry {} has partial end fields",
                    self.id
                )))
            }
        };
        Ok(TimeEntry {
            id: self.id,
            owner_id: self.owner_id,
            group_id: self.group_id,
            start,
            end,
            description: self.description,
        })
    }
}

#[derive(FromRow)]
struct SettingsRecord {
    owner_id: String,
    theme: String,
}
impl SettingsRecord {
    fn to_domain(self) -> PortResult<UserSettings> {
        let theme = Theme::from_str(&self.theme).map_err(PortError::Unexpected)?;
        Ok(UserSettings {
            owner_id: self.owner_id,
            theme,
        })
    }
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    owner_id: String,
    created_at: i64,
    summary: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    range_label: String,
}
impl SummaryRecord {
    fn to_domain(self) -> PortResult<AiSummary> {
        Ok(AiSummary {
            id: self.id,
            owner_id: self.owner_id,
            created_at: from_millis(self.created_at)?,
            summary: self.summary,
            range: DayRange {
                start: self.start_date,
                end: self.end_date,
            },
            range_label: self.range_label,
        })
    }
}

#[derive(FromRow)]
struct WordRow {
    id: Uuid,
    word: String,
    details: String,
    dataset_index: i64,
    cycle: i64,
    created_at: i64,
}
impl WordRow {
    fn to_domain(self) -> PortResult<WordRecord> {
        let details = serde_json::from_str(&self.details)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(WordRecord {
            id: self.id,
            word: self.word,
            details,
            cursor: WordCursor {
                cycle: self.cycle,
                dataset_index: self.dataset_index as usize,
            },
            created_at: from_millis(self.created_at)?,
        })
    }
}

//=========================================================================================
// `GroupStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl GroupStore for DbAdapter {
    async fn create_group(
        &self,
        owner_id: &str,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO groups (id, owner_id, name, created_at, deactivated_at) VALUES (?, ?, ?, ?, NULL)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(id)
    }

    async fn list_groups(&self, owner_id: &str) -> PortResult<Vec<Group>> {
        let records = sqlx::query_as::<_, GroupRecord>(
            "SELECT id, owner_id, name, created_at, deactivated_at FROM groups WHERE owner_id = ? ORDER BY name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn deactivate_group(
        &self,
        owner_id: &str,
        group_id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE groups SET deactivated_at = ? WHERE id = ? AND owner_id = ?")
            .bind(at.timestamp_millis())
            .bind(group_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_touched(result.rows_affected(), "Group", group_id)
    }

    async fn reactivate_group(&self, owner_id: &str, group_id: Uuid) -> PortResult<()> {
        let result =
            sqlx::query("UPDATE groups SET deactivated_at = NULL WHERE id = ? AND owner_id = ?")
                .bind(group_id)
                .bind(owner_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        ensure_touched(result.rows_affected(), "Group", group_id)
    }
}

//=========================================================================================
// `TimeEntryStore` Trait Implementation
//=========================================================================================

const TIME_ENTRY_COLUMNS: &str = "id, owner_id, group_id, start_time, start_year, start_month, start_day, end_time, end_year, end_month, end_day, description";

#[async_trait]
impl TimeEntryStore for DbAdapter {
    async fn create_time_entry(
        &self,
        owner_id: &str,
        group_id: Uuid,
        start: Stamp,
    ) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        // Only the owner's own groups can take new entries.
        let result = sqlx::query(
            "INSERT INTO time_entries (id, owner_id, group_id, start_time, start_year, start_month, start_day, end_time, end_year, end_month, end_day, description) \
             SELECT ?, ?, ?, ?, ?, ?, ?, NULL, NULL, NULL, NULL, '' \
             WHERE EXISTS (SELECT 1 FROM groups WHERE id = ? AND owner_id = ?)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(group_id)
        .bind(start.at.timestamp_millis())
        .bind(start.day.year)
        .bind(start.day.month as i64)
        .bind(start.day.day as i64)
        .bind(group_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        ensure_touched(result.rows_affected(), "Group", group_id)?;
        Ok(id)
    }

    async fn update_time_entry(
        &self,
        owner_id: &str,
        entry_id: Uuid,
        description: &str,
        start: Stamp,
        end: Option<Stamp>,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE time_entries SET description = ?, start_time = ?, start_year = ?, start_month = ?, start_day = ?, \
             end_time = ?, end_year = ?, end_month = ?, end_day = ? WHERE id = ? AND owner_id = ?",
        )
        .bind(description)
        .bind(start.at.timestamp_millis())
        .bind(start.day.year)
        .bind(start.day.month as i64)
        .bind(start.day.day as i64)
        .bind(end.map(|e| e.at.timestamp_millis()))
        .bind(end.map(|e| e.day.year))
        .bind(end.map(|e| e.day.month as i64))
        .bind(end.map(|e| e.day.day as i64))
        .bind(entry_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        ensure_touched(result.rows_affected(), "Time entry", entry_id)
    }

    async fn end_time_entry(&self, owner_id: &str, entry_id: Uuid, end: Stamp) -> PortResult<()> {
        let end_millis = end.at.timestamp_millis();
        let result = sqlx::query(
            "UPDATE time_entries SET end_time = ?, end_year = ?, end_month = ?, end_day = ? \
             WHERE id = ? AND owner_id = ? AND start_time <= ?",
        )
        .bind(end_millis)
        .bind(end.day.year)
        .bind(end.day.month as i64)
        .bind(end.day.day as i64)
        .bind(entry_id)
        .bind(owner_id)
        .bind(end_millis)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing matched: either the entry is missing or the end precedes its start.
        let owned: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM time_entries WHERE id = ? AND owner_id = ?")
                .bind(entry_id)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        ensure_touched(owned as u64, "Time entry", entry_id)?;
        Err(PortError::InvalidInput(format!(
            "end time precedes the start of time entry {}",
            entry_id
        )))
    }

    async fn list_time_entries_for_day(
        &self,
        owner_id: &str,
        day: NaiveDate,
    ) -> PortResult<Vec<TimeEntry>> {
        let parts = DateParts::from(day);
        let records = sqlx::query_as::<_, TimeEntryRecord>(&format!(
            "SELECT {} FROM time_entries WHERE owner_id = ? AND start_year = ? AND start_month = ? AND start_day = ? ORDER BY start_time ASC",
            TIME_ENTRY_COLUMNS
        ))
        .bind(owner_id)
        .bind(parts.year)
        .bind(parts.month as i64)
        .bind(parts.day as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_time_entries_in_range(
        &self,
        owner_id: &str,
        range: DayRange,
    ) -> PortResult<Vec<TimeEntry>> {
        let from = DateParts::from(range.start);
        let to = DateParts::from(range.end);
        let records = sqlx::query_as::<_, TimeEntryRecord>(&format!(
            "SELECT {} FROM time_entries WHERE owner_id = ? \
             AND (start_year, start_month, start_day) >= (?, ?, ?) \
             AND (start_year, start_month, start_day) <= (?, ?, ?) \
             ORDER BY start_time ASC",
            TIME_ENTRY_COLUMNS
        ))
        .bind(owner_id)
        .bind(from.year)
        .bind(from.month as i64)
        .bind(from.day as i64)
        .bind(to.year)
        .bind(to.month as i64)
        .bind(to.day as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn delete_time_entry(&self, owner_id: &str, entry_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = ? AND owner_id = ?")
            .bind(entry_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_touched(result.rows_affected(), "Time entry", entry_id)
    }
}

//=========================================================================================
// `SettingsStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SettingsStore for DbAdapter {
    async fn get_settings(&self, owner_id: &str) -> PortResult<Option<UserSettings>> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT owner_id, theme FROM user_settings WHERE owner_id = ?",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(|r| r.to_domain()).transpose()
    }

    async fn write_settings(&self, owner_id: &str, theme: Theme) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_settings (owner_id, theme) VALUES (?, ?) \
             ON CONFLICT(owner_id) DO UPDATE SET theme = excluded.theme",
        )
        .bind(owner_id)
        .bind(theme.as_str())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update_theme(&self, owner_id: &str, theme: Theme) -> PortResult<()> {
        let result = sqlx::query("UPDATE user_settings SET theme = ? WHERE owner_id = ?")
            .bind(theme.as_str())
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_touched(result.rows_affected(), "Settings for", owner_id)
    }
}

//=========================================================================================
// `SummaryStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummaryStore for DbAdapter {
    async fn save_summary(&self, summary: &AiSummary) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO ai_summaries (id, owner_id, created_at, summary, start_date, end_date, range_label) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(summary.id)
        .bind(&summary.owner_id)
        .bind(summary.created_at.timestamp_millis())
        .bind(&summary.summary)
        .bind(summary.range.start)
        .bind(summary.range.end)
        .bind(&summary.range_label)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_summaries(&self, owner_id: &str) -> PortResult<Vec<AiSummary>> {
        let records = sqlx::query_as::<_, SummaryRecord>(
            "SELECT id, owner_id, created_at, summary, start_date, end_date, range_label FROM ai_summaries WHERE owner_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn delete_summary(&self, owner_id: &str, summary_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM ai_summaries WHERE id = ? AND owner_id = ?")
            .bind(summary_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_touched(result.rows_affected(), "Summary", summary_id)
    }
}

//=========================================================================================
// `WordIndexStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl WordIndexStore for DbAdapter {
    async fn highest_index(&self) -> PortResult<Option<WordCursor>> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT cycle, dataset_index FROM word_records ORDER BY cycle DESC, dataset_index DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(row.map(|(cycle, dataset_index)| WordCursor {
            cycle,
            dataset_index: dataset_index as usize,
        }))
    }

    async fn append_word(&self, record: &WordRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO word_records (id, word, details, dataset_index, cycle, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id)
        .bind(&record.word)
        .bind(record.details.to_string())
        .bind(record.cursor.dataset_index as i64)
        .bind(record.cursor.cycle)
        .bind(record.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn latest_word(&self) -> PortResult<Option<WordRecord>> {
        let row = sqlx::query_as::<_, WordRow>(
            "SELECT id, word, details, dataset_index, cycle, created_at FROM word_records ORDER BY cycle DESC, dataset_index DESC, created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(|r| r.to_domain()).transpose()
    }
}
