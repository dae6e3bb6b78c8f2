use serde::{Deserialize, Serialize};

use super::calendar::GridLayout;
use super::date_key::DateKeyStyle;

/// User-configurable settings. Every field has a default so partial
/// configuration files load cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Storage key of the memo snapshot
    pub memo_key: String,

    /// Storage key of the income/expense snapshot
    pub ledger_key: String,

    /// Storage key holding the anonymous board's user id
    pub user_id_key: String,

    /// Prefix of the per-user post feed key (`posts_<userId>`)
    pub posts_key_prefix: String,

    /// Spelling of newly created date keys
    pub date_key_style: DateKeyStyle,

    pub grid_layout: GridLayout,

    /// Length of the converter's historical series
    pub history_days: u32,

    /// Base URL of the dashboard backend (e.g. "http://localhost:8080/api")
    pub backend_url: Option<String>,

    /// API key for the sentiment analyzer
    pub analysis_api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            memo_key: "calendarMemos".to_string(),
            ledger_key: "transactions".to_string(),
            user_id_key: "stress-community-userId".to_string(),
            posts_key_prefix: "posts_".to_string(),
            date_key_style: DateKeyStyle::Padded,
            grid_layout: GridLayout::Compact,
            history_days: 30,
            backend_url: None,
            analysis_api_key: None,
        }
    }
}

impl Settings {
    pub fn posts_key(&self, user_id: &str) -> String {
        format!("{}{}", self.posts_key_prefix, user_id)
    }
}
