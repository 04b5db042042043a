//! Core types for pixiv-dl

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier pixiv assigns to an illustration
///
/// The AJAX endpoints send it as a string; it is kept verbatim because it
/// ends up in the image file name on the image host.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IllustrationId(pub String);

impl IllustrationId {
    /// Create a new IllustrationId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IllustrationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for IllustrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalog record as returned by the top and search endpoints
///
/// Only `id`, `tags` and `update_date` matter to the download pipeline; the
/// rest is decoded so it can be logged or shown. Every field is defaulted
/// because the search listing interleaves placeholder entries (ads) that
/// carry none of them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Illustration {
    /// Identifier assigned by pixiv
    pub id: IllustrationId,
    /// Title given by the uploader
    pub title: String,
    /// 0 = illustration, 1 = manga, 2 = ugoira
    pub illust_type: i32,
    /// Non-zero for age-restricted work
    pub x_restrict: i32,
    /// Thumbnail used by the site itself
    pub url: String,
    /// Tags given by the uploader, in display order
    pub tags: Vec<String>,
    /// Uploader's identifier
    pub user_id: String,
    /// Uploader's display name
    pub user_name: String,
    /// Original width in pixels
    pub width: u32,
    /// Original height in pixels
    pub height: u32,
    /// Number of pages in the work
    pub page_count: u32,
    /// Alternate title / subtitle
    pub alt: String,
    /// Creation time, RFC 3339
    pub create_date: String,
    /// Last update time, RFC 3339; the image URL is derived from it
    pub update_date: String,
    /// Thumbnails in other sizes, keyed by size name
    pub urls: HashMap<String, String>,
}

impl Illustration {
    /// Whether the record carries an update timestamp
    ///
    /// Image URLs cannot be built without one, so records failing this check
    /// never enter a batch.
    pub fn has_update_date(&self) -> bool {
        !self.update_date.is_empty()
    }
}

/// Result of one attempted fetch, as kept in the recent-result log
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The image was written to disk
    Saved {
        /// Number of bytes written
        bytes: u64,
    },
    /// The fetch failed; the batch moved on regardless
    Failed {
        /// Human-readable error description
        error: String,
    },
}

impl Outcome {
    /// Whether the fetch succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Saved { .. })
    }

    /// Error description for failed fetches
    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Saved { .. } => None,
            Outcome::Failed { error } => Some(error),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_top_listing_entry() {
        let json = r##"{
            "id": "118833455",
            "title": "夏",
            "illustType": 0,
            "xRestrict": 0,
            "restrict": 0,
            "sl": 2,
            "url": "https://i.pximg.net/c/250x250_80_a2/img-master/img/2024/05/19/00/00/13/118833455_p0_square1200.jpg",
            "tags": ["オリジナル", "女の子"],
            "userId": "1234",
            "userName": "artist",
            "width": 1200,
            "height": 1700,
            "pageCount": 1,
            "isBookmarkable": true,
            "bookmarkData": null,
            "alt": "#オリジナル 夏 - artist's illustration",
            "titleCaptionTranslation": {"workTitle": null, "workCaption": null},
            "createDate": "2024-05-19T00:00:13+09:00",
            "updateDate": "2024-05-19T00:00:13+09:00",
            "isUnlisted": false,
            "isMasked": false,
            "urls": {"250x250": "https://i.pximg.net/a.jpg"},
            "profileImageUrl": "https://i.pximg.net/user.jpg"
        }"##;

        let item: Illustration = serde_json::from_str(json).unwrap();

        assert_eq!(item.id, IllustrationId::from("118833455"));
        assert_eq!(item.tags, vec!["オリジナル", "女の子"]);
        assert_eq!(item.update_date, "2024-05-19T00:00:13+09:00");
        assert_eq!(item.page_count, 1);
        assert!(item.has_update_date());
    }

    #[test]
    fn placeholder_entry_decodes_without_timestamp() {
        let item: Illustration = serde_json::from_str(r#"{"isAdContainer": true}"#).unwrap();

        assert_eq!(item.id.as_str(), "");
        assert!(!item.has_update_date());
    }

    #[test]
    fn outcome_accessors() {
        let saved = Outcome::Saved { bytes: 10 };
        let failed = Outcome::Failed {
            error: "network timeout".into(),
        };

        assert!(saved.is_ok());
        assert_eq!(saved.error(), None);
        assert!(!failed.is_ok());
        assert_eq!(failed.error(), Some("network timeout"));
    }
}
