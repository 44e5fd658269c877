//! crates/saily_core/src/history.rs
//!
//! Folds logged time entries into per-day, per-group totals and renders them
//! as task lines for the summarizer.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{DayRange, Group, TimeEntry};

const UNKNOWN_GROUP: &str = "Ungrouped";

/// Time spent on one group during one day.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub group_id: Uuid,
    pub group_name: String,
    pub entries: usize,
    pub total: Duration,
}

/// All group totals of a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTotals {
    pub day: NaiveDate,
    pub groups: Vec<GroupTotal>,
    pub total: Duration,
}

fn group_names(groups: &[Group]) -> HashMap<Uuid, &str> {
    groups.iter().map(|g| (g.id, g.name.as_str())).collect()
}

/// Per-day totals, days ascending and groups sorted by name within a day.
/// Entries whose start day cannot be represented are skipped.
pub fn daily_totals(
    entries: &[TimeEntry],
    groups: &[Group],
    now: Option<DateTime<Utc>>,
) -> Vec<DayTotals> {
    let names = group_names(groups);
    let mut days: BTreeMap<NaiveDate, HashMap<Uuid, GroupTotal>> = BTreeMap::new();

    for entry in entries {
        let Some(day) = entry.start.day.to_date() else {
            continue;
        };
        let slot = days
            .entry(day)
            .or_default()
            .entry(entry.group_id)
            .or_insert_with(|| GroupTotal {
                group_id: entry.group_id,
                group_name: names
                    .get(&entry.group_id)
                    .copied()
                    .unwrap_or(UNKNOWN_GROUP)
                    .to_string(),
                entries: 0,
                total: Duration::zero(),
            });
        slot.entries += 1;
        slot.total = slot.total + entry.duration(now);
    }

    days.into_iter()
        .map(|(day, by_group)| {
            let mut groups: Vec<GroupTotal> = by_group.into_values().collect();
            groups.sort_by(|a, b| a.group_name.cmp(&b.group_name));
            let total = groups
                .iter()
                .fold(Duration::zero(), |acc, g| acc + g.total);
            DayTotals { day, groups, total }
        })
        .collect()
}

/// `1h 5m` style rendering used in task lines.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// One line per entry, `[Group] description (1h 5m)`, ordered by group name
/// and then by start time.
pub fn task_lines(entries: &[TimeEntry], groups: &[Group]) -> Vec<String> {
    let names = group_names(groups);
    let mut rows: Vec<(&str, &TimeEntry)> = entries
        .iter()
        .map(|e| (names.get(&e.group_id).copied().unwrap_or(UNKNOWN_GROUP), e))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0).then(a.1.start.at.cmp(&b.1.start.at)));

    rows.into_iter()
        .map(|(group, entry)| {
            let description = match entry.description.trim() {
                "" => "(no description)",
                d => d,
            };
            format!(
                "[{}] {} ({})",
                group,
                description,
                format_duration(entry.duration(None))
            )
        })
        .collect()
}

/// Human readable label for a range: `Jan 6, 2025` or `Jan 6, 2025 - Jan 12, 2025`.
pub fn range_label(range: &DayRange) -> String {
    const FORMAT: &str = "%b %-d, %Y";
    if range.start == range.end {
        range.start.format(FORMAT).to_string()
    } else {
        format!(
            "{} - {}",
            range.start.format(FORMAT),
            range.end.format(FORMAT)
        )
    }
}
