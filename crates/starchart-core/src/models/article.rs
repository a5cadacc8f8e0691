use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ArticleRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub published_at: String,
}

impl ArticleRecord {
    /// Summary for list views, falling back to the start of the content.
    pub fn teaser(&self, max_len: usize) -> String {
        let source = self
            .summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.content.as_deref())
            .unwrap_or("");
        crate::utils::truncate_string(source.trim(), max_len)
    }
}
