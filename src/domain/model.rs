use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An asset in the image library. Pages only ever hold its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub title: String,
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
}

/// Generic identity every page carries regardless of its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: PageId,
    pub title: String,
    pub slug: String,
    pub parent: Option<PageId>,
    /// True once a revision has been published.
    pub live: bool,
    pub has_unpublished_changes: bool,
    pub latest_revision: u32,
    pub live_revision: Option<u32>,
    pub last_published_at: Option<DateTime<Utc>>,
}

/// One stored answer to a contact form, keyed by field `clean_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: u64,
    pub page_id: PageId,
    pub form_data: serde_json::Map<String, serde_json::Value>,
    pub submit_time: DateTime<Utc>,
}

/// A submission that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub page_id: PageId,
    pub form_data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Derive a URL slug from a page title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}
