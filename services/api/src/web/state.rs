//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::DbAdapter;
use crate::config::Config;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use saily_core::ports::{
    GroupStore, SettingsStore, SummarizationService, SummaryStore, TimeEntryStore, WordIndexStore,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub groups: Arc<dyn GroupStore>,
    pub times: Arc<dyn TimeEntryStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub summaries: Arc<dyn SummaryStore>,
    pub words: Arc<dyn WordIndexStore>,
    pub summarizer: Arc<dyn SummarizationService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires every record store to the same database adapter.
    pub fn with_database(
        db: Arc<DbAdapter>,
        summarizer: Arc<dyn SummarizationService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            groups: db.clone(),
            times: db.clone(),
            settings: db.clone(),
            summaries: db.clone(),
            words: db,
            summarizer,
            config,
        }
    }

    pub fn time_zone(&self) -> Tz {
        self.config.time_zone
    }

    /// The current calendar day in the configured time zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.config.time_zone).date_naive()
    }
}
