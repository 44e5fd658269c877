//! crates/saily_core/src/word_of_the_day.rs
//!
//! Picks the next word from a fixed, ordered list, looks it up in the dictionary
//! and stores the first usable definition.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{WordCursor, WordRecord};
use crate::ports::{DictionaryLookup, DictionaryService, WordIndexStore};

/// The ordered list of candidate words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new(words: Vec<String>) -> Self {
        let words = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    /// The cursor following `previous`, wrapping to index 0 of the next cycle
    /// once the end of the list is passed.
    pub fn next_cursor(&self, previous: Option<WordCursor>) -> WordCursor {
        let Some(previous) = previous else {
            return WordCursor {
                cycle: 0,
                dataset_index: 0,
            };
        };
        let candidate = previous.dataset_index + 1;
        if candidate >= self.words.len() {
            WordCursor {
                cycle: previous.cycle + 1,
                dataset_index: 0,
            }
        } else {
            WordCursor {
                cycle: previous.cycle,
                dataset_index: candidate,
            }
        }
    }
}

/// What a single run of the job did.
#[derive(Debug, Clone, PartialEq)]
pub enum WordOfTheDayOutcome {
    /// A record was stored.
    Persisted(WordRecord),
    /// Neither the primary nor the fallback word had a definition.
    NoDefinition { tried: Vec<String> },
    /// The job stopped because of a store or transport failure, or an empty list.
    Failed(String),
}

/// The daily job. Construct once and call [`WordOfTheDay::run`] from a trigger.
pub struct WordOfTheDay {
    store: Arc<dyn WordIndexStore>,
    dictionary: Arc<dyn DictionaryService>,
    words: WordList,
}

impl WordOfTheDay {
    pub fn new(
        store: Arc<dyn WordIndexStore>,
        dictionary: Arc<dyn DictionaryService>,
        words: WordList,
    ) -> Self {
        Self {
            store,
            dictionary,
            words,
        }
    }

    /// Runs the job once. Never returns an error; failures are logged and
    /// reported through the outcome.
    pub async fn run(&self) -> WordOfTheDayOutcome {
        if self.words.is_empty() {
            error!("Word list is empty, skipping word of the day");
            return WordOfTheDayOutcome::Failed("word list is empty".to_string());
        }

        let previous = match self.store.highest_index().await {
            Ok(previous) => previous,
            Err(e) => {
                error!("Failed to read the latest word index: {:?}", e);
                return WordOfTheDayOutcome::Failed(e.to_string());
            }
        };

        let primary = self.words.next_cursor(previous);
        // At most one retry, with the cursor that follows the primary one.
        // A single-word list has no other word to fall back to.
        let fallback = self.words.next_cursor(Some(primary));
        let mut cursors = vec![primary];
        if fallback.dataset_index != primary.dataset_index {
            cursors.push(fallback);
        }

        let mut tried = Vec::with_capacity(cursors.len());
        for cursor in cursors {
            let Some(word) = self.words.get(cursor.dataset_index) else {
                return WordOfTheDayOutcome::Failed(format!(
                    "index {} is outside the word list",
                    cursor.dataset_index
                ));
            };
            tried.push(word.to_string());

            match self.dictionary.lookup(word).await {
                Ok(DictionaryLookup::Found(details)) => {
                    return self.persist(word, details, cursor).await;
                }
                Ok(DictionaryLookup::NotFound) => {
                    warn!(word, index = cursor.dataset_index, "No definition found");
                }
                Err(e) => {
                    error!(word, "Dictionary lookup failed: {:?}", e);
                    return WordOfTheDayOutcome::Failed(e.to_string());
                }
            }
        }

        warn!(?tried, "No word of the day stored today");
        WordOfTheDayOutcome::NoDefinition { tried }
    }

    async fn persist(
        &self,
        word: &str,
        details: serde_json::Value,
        cursor: WordCursor,
    ) -> WordOfTheDayOutcome {
        let record = WordRecord {
            id: Uuid::new_v4(),
            word: word.to_string(),
            details,
            cursor,
            created_at: Utc::now(),
        };
        match self.store.append_word(&record).await {
            Ok(()) => {
                info!(
                    word,
                    index = cursor.dataset_index,
                    cycle = cursor.cycle,
                    "Stored word of the day"
                );
                WordOfTheDayOutcome::Persisted(record)
            }
            Err(e) => {
                error!(word, "Failed to store word of the day: {:?}", e);
                WordOfTheDayOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryWordStore {
        records: Mutex<Vec<WordRecord>>,
    }

    impl MemoryWordStore {
        fn with_cursor(cycle: i64, dataset_index: usize) -> Self {
            let store = Self::default();
            store.records.lock().unwrap().push(WordRecord {
                id: Uuid::new_v4(),
                word: "seed".to_string(),
                details: json!([]),
                cursor: WordCursor {
                    cycle,
                    dataset_index,
                },
                created_at: Utc::now(),
            });
            store
        }

        fn stored(&self) -> Vec<WordRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WordIndexStore for MemoryWordStore {
        async fn highest_index(&self) -> PortResult<Option<WordCursor>> {
            Ok(self.records.lock().unwrap().iter().map(|r| r.cursor).max())
        }

        async fn append_word(&self, record: &WordRecord) -> PortResult<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn latest_word(&self) -> PortResult<Option<WordRecord>> {
            Ok(self.records.lock().unwrap().last().cloned())
        }
    }

    enum Answer {
        Found,
        Missing,
        Broken,
    }

    struct ScriptedDictionary {
        answers: HashMap<&'static str, Answer>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedDictionary {
        fn new(answers: Vec<(&'static str, Answer)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DictionaryService for ScriptedDictionary {
        async fn lookup(&self, word: &str) -> PortResult<DictionaryLookup> {
            self.calls.lock().unwrap().push(word.to_string());
            match self.answers.get(word) {
                Some(Answer::Found) => Ok(DictionaryLookup::Found(json!([{ "word": word }]))),
                Some(Answer::Broken) => Err(PortError::Unexpected("connection reset".into())),
                Some(Answer::Missing) | None => Ok(DictionaryLookup::NotFound),
            }
        }
    }

    fn words() -> WordList {
        WordList::new(vec![
            "apple".to_string(),
            "banana".to_string(),
            "cherry".to_string(),
        ])
    }

    fn job(store: &Arc<MemoryWordStore>, dictionary: &Arc<ScriptedDictionary>) -> WordOfTheDay {
        WordOfTheDay::new(store.clone(), dictionary.clone(), words())
    }

    #[test]
    fn next_cursor_starts_at_zero_and_wraps() {
        let list = words();
        assert_eq!(
            list.next_cursor(None),
            WordCursor {
                cycle: 0,
                dataset_index: 0
            }
        );
        assert_eq!(
            list.next_cursor(Some(WordCursor {
                cycle: 0,
                dataset_index: 1
            })),
            WordCursor {
                cycle: 0,
                dataset_index: 2
            }
        );
        assert_eq!(
            list.next_cursor(Some(WordCursor {
                cycle: 0,
                dataset_index: 2
            })),
            WordCursor {
                cycle: 1,
                dataset_index: 0
            }
        );
    }

    #[test]
    fn word_list_drops_blank_entries() {
        let list = WordList::new(vec![" apple ".into(), "".into(), "  ".into(), "pear".into()]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some("apple"));
        assert_eq!(list.get(1), Some("pear"));
    }

    #[tokio::test]
    async fn empty_store_uses_first_word() {
        let store = Arc::new(MemoryWordStore::default());
        let dictionary = Arc::new(ScriptedDictionary::new(vec![("apple", Answer::Found)]));

        let outcome = job(&store, &dictionary).run().await;

        assert!(matches!(outcome, WordOfTheDayOutcome::Persisted(_)));
        let stored = store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].word, "apple");
        assert_eq!(stored[0].cursor.dataset_index, 0);
    }

    #[tokio::test]
    async fn advances_past_highest_index() {
        let store = Arc::new(MemoryWordStore::with_cursor(0, 0));
        let dictionary = Arc::new(ScriptedDictionary::new(vec![("banana", Answer::Found)]));

        job(&store, &dictionary).run().await;

        let stored = store.stored();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].word, "banana");
        assert_eq!(stored[1].cursor.dataset_index, 1);
        assert_eq!(dictionary.calls(), vec!["banana".to_string()]);
    }

    #[tokio::test]
    async fn wraps_after_last_position() {
        let store = Arc::new(MemoryWordStore::with_cursor(0, 2));
        let dictionary = Arc::new(ScriptedDictionary::new(vec![("apple", Answer::Found)]));

        job(&store, &dictionary).run().await;

        let stored = store.stored();
        assert_eq!(stored.len(), 2);
        assert_eq!(
            stored[1].cursor,
            WordCursor {
                cycle: 1,
                dataset_index: 0
            }
        );
    }

    #[tokio::test]
    async fn keeps_advancing_after_a_wrap() {
        let store = Arc::new(MemoryWordStore::with_cursor(0, 2));
        store.append_word(&WordRecord {
            id: Uuid::new_v4(),
            word: "apple".to_string(),
            details: json!([]),
            cursor: WordCursor { cycle: 1, dataset_index: 0 },
            created_at: Utc::now(),
        })
        .await
        .unwrap();
        let dictionary = Arc::new(ScriptedDictionary::new(vec![("banana", Answer::Found)]));

        job(&store, &dictionary).run().await;

        let last = store.stored().pop().unwrap();
        assert_eq!(last.word, "banana");
        assert_eq!(last.cursor, WordCursor { cycle: 1, dataset_index: 1 });
    }

    #[tokio::test]
    async fn falls_back_once_when_primary_is_missing() {
        let store = Arc::new(MemoryWordStore::with_cursor(0, 0));
        let dictionary = Arc::new(ScriptedDictionary::new(vec![
            ("banana", Answer::Missing),
            ("cherry", Answer::Found),
        ]));

        let outcome = job(&store, &dictionary).run().await;

        let WordOfTheDayOutcome::Persisted(record) = outcome else {
            panic!("expected a stored record, got {:?}", outcome);
        };
        assert_eq!(record.word, "cherry");
        assert_eq!(record.cursor.dataset_index, 2);
        assert_eq!(store.stored().len(), 2);
    }

    #[tokio::test]
    async fn fallback_wraps_past_the_end() {
        let store = Arc::new(MemoryWordStore::with_cursor(0, 1));
        let dictionary = Arc::new(ScriptedDictionary::new(vec![
            ("cherry", Answer::Missing),
            ("apple", Answer::Found),
        ]));

        job(&store, &dictionary).run().await;

        let last = store.stored().pop().unwrap();
        assert_eq!(last.word, "apple");
        assert_eq!(last.cursor, WordCursor { cycle: 1, dataset_index: 0 });
    }

    #[tokio::test]
    async fn single_word_list_is_looked_up_once() {
        let store = Arc::new(MemoryWordStore::default());
        let dictionary = Arc::new(ScriptedDictionary::new(vec![("apple", Answer::Missing)]));
        let job = WordOfTheDay::new(
            store.clone(),
            dictionary.clone(),
            WordList::new(vec!["apple".to_string()]),
        );

        let outcome = job.run().await;

        let WordOfTheDayOutcome::NoDefinition { tried } = outcome else {
            panic!("expected no definition, got {:?}", outcome);
        };
        assert_eq!(tried, vec!["apple".to_string()]);
        assert_eq!(dictionary.calls(), vec!["apple".to_string()]);
        assert!(store.stored().is_empty());
    }

    #[tokio::test]
    async fn gives_up_after_a_single_retry() {
        let store = Arc::new(MemoryWordStore::default());
        let dictionary = Arc::new(ScriptedDictionary::new(vec![]));

        let outcome = job(&store, &dictionary).run().await;

        assert_eq!(
            outcome,
            WordOfTheDayOutcome::NoDefinition {
                tried: vec!["apple".to_string(), "banana".to_string()]
            }
        );
        assert!(store.stored().is_empty());
        assert_eq!(dictionary.calls().len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_stores_nothing() {
        let store = Arc::new(MemoryWordStore::default());
        let dictionary = Arc::new(ScriptedDictionary::new(vec![
            ("apple", Answer::Broken),
            ("banana", Answer::Found),
        ]));

        let outcome = job(&store, &dictionary).run().await;

        assert!(matches!(outcome, WordOfTheDayOutcome::Failed(_)));
        assert!(store.stored().is_empty());
        assert_eq!(dictionary.calls(), vec!["apple".to_string()]);
    }

    #[tokio::test]
    async fn empty_list_does_nothing() {
        let store = Arc::new(MemoryWordStore::default());
        let dictionary = Arc::new(ScriptedDictionary::new(vec![]));
        let job = WordOfTheDay::new(store.clone(), dictionary.clone(), WordList::default());

        assert!(matches!(job.run().await, WordOfTheDayOutcome::Failed(_)));
        assert!(dictionary.calls().is_empty());
    }
}
