use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown when a user's feed is empty.
pub const EMPTY_FEED_MESSAGE: &str = "No posts yet. Share your first story.";

/// An anonymous post. `content` is the editor's HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub nickname: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Post {
    /// Content with markup removed and common entities decoded.
    pub fn plain_text(&self) -> String {
        strip_markup(&self.content)
    }
}

/// A user's posts, newest first. Persisted as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostFeed {
    posts: Vec<Post>,
}

impl PostFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front so the newest post is shown first.
    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Plain text of every post joined by blank lines, newest first.
    pub fn analysis_corpus(&self) -> String {
        self.posts
            .iter()
            .map(Post::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Remove tags, turn `<br>` and block ends into newlines, decode the
/// handful of entities a contenteditable produces.
pub fn strip_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for ch in html.chars() {
        match (in_tag, ch) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or("")
                    .to_lowercase();
                let closing = tag.starts_with('/');
                if name == "br" || (closing && matches!(name.as_str(), "div" | "p")) {
                    out.push('\n');
                }
            }
            (true, c) => tag.push(c),
            (false, c) => out.push(c),
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
