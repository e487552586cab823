//! Word-list profanity filter for submitted shouts.

mod ban_list;
mod classifier;

pub use ban_list::{BanList, BanListError, BanListSource, FileBanListSource, StaticBanListSource};
pub use classifier::{normalize, TextClassifier};
