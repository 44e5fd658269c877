pub mod db;
pub mod dictionary;
pub mod summary_llm;
pub mod word_list;

pub use db::DbAdapter;
pub use dictionary::HttpDictionaryAdapter;
pub use summary_llm::CompletionSummaryAdapter;
pub use word_list::load_word_list;
