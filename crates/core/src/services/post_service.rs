use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::analysis::StressAnalysis;
use crate::models::post::{Post, PostFeed};
use crate::models::settings::Settings;
use crate::providers::analysis::SentimentAnalyzer;
use crate::storage::kv::KeyValueStore;
use crate::storage::manager::StorageManager;

/// Characters a nickname is drawn from. They look alike on purpose.
pub const NICKNAME_ALPHABET: [char; 4] = ['1', 'i', 'I', 'l'];
pub const NICKNAME_MIN_LEN: usize = 6;
pub const NICKNAME_MAX_LEN: usize = 10;

/// Random 6-10 character nickname over [`NICKNAME_ALPHABET`].
pub fn random_nickname() -> Result<String, CoreError> {
    let mut bytes = [0u8; NICKNAME_MAX_LEN + 1];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| CoreError::Unsupported(format!("Random source unavailable: {e}")))?;

    let span = NICKNAME_MAX_LEN - NICKNAME_MIN_LEN + 1;
    let len = NICKNAME_MIN_LEN + bytes[0] as usize % span;
    Ok(bytes[1..=len]
        .iter()
        .map(|b| NICKNAME_ALPHABET[*b as usize % NICKNAME_ALPHABET.len()])
        .collect())
}

/// A fresh anonymous user id: `user_<uuid>`.
pub fn new_user_id() -> String {
    format!("user_{}", uuid::Uuid::new_v4())
}

/// Anonymous per-user post board.
///
/// The user id is created on first open and kept under the configured key;
/// the feed lives under `posts_<userId>`, newest first. Every mutation is
/// written through and rolled back if the write fails.
pub struct PostBoard<S: KeyValueStore> {
    store: S,
    settings: Settings,
    user_id: String,
    feed: PostFeed,
}

impl<S: KeyValueStore> PostBoard<S> {
    /// Open the board, creating and persisting a user id if none exists.
    pub fn open(mut store: S, settings: Settings) -> Result<Self, CoreError> {
        let user_id = match store.get(&settings.user_id_key)? {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                let id = new_user_id();
                store.set(&settings.user_id_key, &id)?;
                info!(user_id = %id, "anonymous user id created");
                id
            }
        };

        let feed: PostFeed = StorageManager::load_or_default(&store, &settings.posts_key(&user_id));
        debug!(user_id = %user_id, posts = feed.len(), "post board opened");

        Ok(Self {
            store,
            settings,
            user_id,
            feed,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn feed(&self) -> &PostFeed {
        &self.feed
    }

    /// Publish `content` (editor HTML) at `timestamp`.
    ///
    /// Empty content, or the lone `<br>` an emptied editor leaves behind,
    /// is rejected.
    pub fn publish(&mut self, content: &str, timestamp: DateTime<Utc>) -> Result<&Post, CoreError> {
        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("<br>") {
            return Err(CoreError::Validation("Please write something first".into()));
        }

        let post = Post {
            nickname: random_nickname()?,
            content: trimmed.to_string(),
            timestamp,
        };

        let previous = self.feed.clone();
        self.feed.prepend(post);
        if let Err(e) = self.persist() {
            self.feed = previous;
            return Err(e);
        }

        let newest = &self.feed.posts()[0];
        info!(nickname = %newest.nickname, posts = self.feed.len(), "post published");
        Ok(newest)
    }

    /// Publish stamped with the current time.
    pub fn publish_now(&mut self, content: &str) -> Result<&Post, CoreError> {
        self.publish(content, Utc::now())
    }

    /// Plain text of all posts, ready for analysis.
    pub fn corpus(&self) -> String {
        self.feed.analysis_corpus()
    }

    /// Run the analyzer over the whole feed. An empty feed is rejected
    /// before any request is made.
    pub async fn analyze(&self, analyzer: &dyn SentimentAnalyzer) -> Result<StressAnalysis, CoreError> {
        let corpus = self.corpus();
        if self.feed.is_empty() || corpus.trim().is_empty() {
            return Err(CoreError::Validation(
                "There are no posts to analyze yet".into(),
            ));
        }
        debug!(analyzer = analyzer.name(), chars = corpus.len(), "analyzing posts");
        analyzer.analyze(&corpus).await
    }

    fn persist(&mut self) -> Result<(), CoreError> {
        let key = self.settings.posts_key(&self.user_id);
        StorageManager::save(&mut self.store, &key, &self.feed)
    }

    /// Give the store back (e.g. to reopen it in a test).
    pub fn into_store(self) -> S {
        self.store
    }
}
