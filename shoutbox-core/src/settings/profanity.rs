use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
#[readonly::make]
pub struct ProfanitySettings {
    /// Plain text file with one banned word per line.
    #[serde(default = "default_word_list_path")]
    pub word_list_path: String,
}

fn default_word_list_path() -> String {
    "config/profanity-list.txt".to_string()
}

impl Default for ProfanitySettings {
    fn default() -> Self {
        Self {
            word_list_path: default_word_list_path(),
        }
    }
}
