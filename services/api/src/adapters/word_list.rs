//! services/api/src/adapters/word_list.rs
//!
//! Loads the ordered word list from disk. Accepts either a JSON array of
//! strings or one word per line (blank lines and `#` comments are skipped).

use saily_core::WordList;
use std::path::Path;

use crate::error::ApiError;

pub async fn load_word_list(path: &Path) -> Result<WordList, ApiError> {
    let text = tokio::fs::read_to_string(path).await?;
    parse_word_list(&text)
}

pub fn parse_word_list(text: &str) -> Result<WordList, ApiError> {
    if text.trim_start().starts_with('[') {
        let words: Vec<String> = serde_json::from_str(text)
            .map_err(|e| ApiError::Internal(format!("Invalid word list JSON: {}", e)))?;
        return Ok(WordList::new(words));
    }

    let words = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    Ok(WordList::new(words))
}
