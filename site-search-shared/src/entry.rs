use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Read-only view of a content entry as exposed by the host CMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    pub site_id: u32,
    pub title: Option<String>,
    /// Public URL of the rendered entry. Entries without a URL are indexed
    /// without body content.
    pub url: Option<String>,
    pub post_date: Option<NaiveDateTime>,
    pub expiry_date: Option<NaiveDateTime>,
    pub enabled: bool,
    pub enabled_for_site: bool,
    /// Handle of the section (category) the entry belongs to.
    pub section: String,
    /// Drafts and revisions are never indexed.
    pub is_draft_or_revision: bool,
}

impl Entry {
    /// Create an enabled, published entry with no dates and no URL.
    pub fn new(id: u64, site_id: u32, section: impl Into<String>) -> Self {
        Self {
            id,
            site_id,
            title: None,
            url: None,
            post_date: None,
            expiry_date: None,
            enabled: true,
            enabled_for_site: true,
            section: section.into(),
            is_draft_or_revision: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_post_date(mut self, post_date: NaiveDateTime) -> Self {
        self.post_date = Some(post_date);
        self
    }

    pub fn with_expiry_date(mut self, expiry_date: NaiveDateTime) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Whether the entry is live on its site and may be indexed.
    pub fn is_live(&self) -> bool {
        self.enabled && self.enabled_for_site && !self.is_draft_or_revision
    }
}
