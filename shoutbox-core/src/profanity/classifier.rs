use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::sync::Arc;
use tracing::{error, info};

use super::ban_list::{BanList, BanListError, BanListSource};

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{P}").expect("punctuation pattern is valid"));

/// Split text into the tokens that are checked against the ban list.
///
/// Punctuation is removed before splitting on single spaces, so
/// `"foo,bar"` becomes the single token `"foobar"` and consecutive spaces
/// produce empty tokens.
pub fn normalize(text: &str) -> Vec<String> {
    PUNCTUATION
        .replace_all(text, "")
        .to_lowercase()
        .split(' ')
        .map(str::to_string)
        .collect()
}

/// Exact-token profanity filter over a lazily loaded ban list.
#[derive(Debug)]
pub struct TextClassifier {
    source: Arc<dyn BanListSource>,
    ban_list: OnceCell<BanList>,
}

impl TextClassifier {
    pub fn new(source: Arc<dyn BanListSource>) -> Self {
        Self {
            source,
            ban_list: OnceCell::new(),
        }
    }

    /// The cached ban list, loading it on first use.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn ban_list(&self) -> Result<&BanList, BanListError> {
        self.ban_list.get_or_try_init(|| {
            let raw = self.source.load()?;
            let ban_list = BanList::parse(&raw);
            info!("Loaded ban list with {} entries", ban_list.len());
            Ok(ban_list)
        })
    }

    /// `false` if any token of `text` is banned or the ban list cannot be loaded.
    pub fn is_acceptable(&self, text: &str) -> bool {
        let ban_list = match self.ban_list() {
            Ok(ban_list) => ban_list,
            Err(e) => {
                error!("Rejecting text because the ban list is unavailable: {}", e);
                return false;
            }
        };

        !normalize(text)
            .iter()
            .any(|token| ban_list.contains(token))
    }
}
