//! Photo metadata and query types.
//!
//! A [`Photo`] carries exactly the fields the remote API returns that are
//! needed to build a retrieval URL and a caption. [`Query`] is the active
//! search input after trimming.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host serving the static photo files.
const STATIC_HOST: &str = "staticflickr.com";

/// One photo as returned by the remote source.
///
/// Immutable once fetched. `id` is unique within a result set; the remaining
/// identifiers are only used to build image URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub owner: String,
    pub secret: String,
    pub server: String,
    pub farm: u32,
    #[serde(default)]
    pub title: String,
}

/// Size variant of a photo image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSize {
    /// 150x150 square crop, used for grid thumbnails.
    Square,
    /// Medium, 500px on the longest side.
    #[default]
    Medium,
    /// 1024px on the longest side, used by the overlay.
    Large,
}

impl ImageSize {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Square => "_q",
            Self::Medium => "",
            Self::Large => "_b",
        }
    }
}

impl Photo {
    /// URL of the medium-sized image.
    pub fn image_url(&self) -> String {
        self.image_url_sized(ImageSize::Medium)
    }

    /// URL of the image at a given size.
    pub fn image_url_sized(&self, size: ImageSize) -> String {
        format!(
            "https://farm{}.{STATIC_HOST}/{}/{}_{}{}.jpg",
            self.farm,
            self.server,
            self.id,
            self.secret,
            size.suffix()
        )
    }

    /// Title to show in the UI, with a fallback for untitled photos.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() { "(untitled)" } else { title }
    }
}

/// The active search input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Query {
    /// Empty input: show the default feed of recent photos.
    #[default]
    Default,
    /// A trimmed, non-empty search string.
    Search(String),
}

impl Query {
    /// Build a query from raw user input.
    ///
    /// ```
    /// use photogrid::photo::Query;
    ///
    /// assert_eq!(Query::parse("  cats "), Query::Search("cats".to_string()));
    /// assert_eq!(Query::parse("   "), Query::Default);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Default
        } else {
            Self::Search(trimmed.to_string())
        }
    }

    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// The search text, or `None` for the default feed.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Search(text) => Some(text),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "recent photos"),
            Self::Search(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_photo(id: &str) -> Photo {
    Photo {
        id: id.to_string(),
        owner: "12345@N00".to_string(),
        secret: "abcdef".to_string(),
        server: "65535".to_string(),
        farm: 66,
        title: format!("photo {id}"),
    }
}
