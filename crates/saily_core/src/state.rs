//! crates/saily_core/src/state.rs
//!
//! Client-side view state. The state is a plain owned struct; every change goes
//! through [`ViewState::apply`].

use chrono::NaiveDate;

use crate::domain::{Group, TimeEntry, UserSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Today,
    History,
    Summaries,
    Settings,
}

/// A single change to the view state.
#[derive(Debug, Clone)]
pub enum ViewUpdate {
    SelectDate(NaiveDate),
    TimeEntriesLoaded(Vec<TimeEntry>),
    GroupsLoaded(Vec<Group>),
    SettingsLoaded(Option<UserSettings>),
    SignedIn(String),
    SignedOut,
    Navigate(Page),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    selected_date: NaiveDate,
    time_entries: Vec<TimeEntry>,
    groups: Vec<Group>,
    user_settings: Option<UserSettings>,
    user_id: Option<String>,
    active_page: Page,
}

impl ViewState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected_date: today,
            time_entries: Vec::new(),
            groups: Vec::new(),
            user_settings: None,
            user_id: None,
            active_page: Page::default(),
        }
    }

    pub fn apply(&mut self, update: ViewUpdate) {
        match update {
            ViewUpdate::SelectDate(date) => {
                if date != self.selected_date {
                    self.selected_date = date;
                    // Entries belong to the previously selected day.
                    self.time_entries.clear();
                }
            }
            ViewUpdate::TimeEntriesLoaded(entries) => self.time_entries = entries,
            ViewUpdate::GroupsLoaded(groups) => self.groups = groups,
            ViewUpdate::SettingsLoaded(settings) => self.user_settings = settings,
            ViewUpdate::SignedIn(user_id) => self.user_id = Some(user_id),
            ViewUpdate::SignedOut => *self = Self::new(self.selected_date),
            ViewUpdate::Navigate(page) => self.active_page = page,
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn time_entries(&self) -> &[TimeEntry] {
        &self.time_entries
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn user_settings(&self) -> Option<&UserSettings> {
        self.user_settings.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn active_page(&self) -> Page {
        self.active_page
    }

    /// The running session of the selected day, if any.
    pub fn open_entry(&self) -> Option<&TimeEntry> {
        self.time_entries.iter().rev().find(|e| e.is_open())
    }
}
