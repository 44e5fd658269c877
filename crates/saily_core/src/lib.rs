pub mod domain;
pub mod history;
pub mod ports;
pub mod state;
pub mod summary;
pub mod word_of_the_day;

pub use domain::{
    AiSummary, DateParts, DayRange, Group, Stamp, Theme, TimeEntry, UserSettings, WordCursor,
    WordRecord,
};
pub use ports::{
    DictionaryLookup, DictionaryService, GroupStore, PortError, PortResult, SettingsStore,
    SummarizationService, SummaryStore, TimeEntryStore, WordIndexStore,
};
pub use word_of_the_day::{WordList, WordOfTheDay, WordOfTheDayOutcome};
