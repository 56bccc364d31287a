//! Photo records as returned by the photo source
//!
//! These are vendor-neutral: the Flickr adapter maps its wire format into
//! [`RawPhoto`] and nothing downstream sees JSON.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner of a photo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    /// Flickr NSID
    pub id: String,
    pub username: String,
    pub real_name: Option<String>,
    /// Free-text location from the owner's profile
    pub location: Option<String>,
}

impl Owner {
    /// Real name when present, otherwise the username.
    pub fn display_name(&self) -> &str {
        match self.real_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Geotag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    pub latitude: f64,
    pub longitude: f64,
    /// Flickr accuracy level (1 = world .. 16 = street)
    pub accuracy: i32,
}

/// Reverse-geocoded place names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceData {
    pub country: Option<String>,
    pub region: Option<String>,
    pub locality: Option<String>,
}

/// One photo from a group pool page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPhoto {
    pub id: String,
    pub secret: String,
    pub server: String,
    pub farm: Option<i64>,
    pub title: String,
    pub owner: Owner,
    pub description: String,
    /// License code, resolved through the license table
    pub license: String,
    pub tags: Vec<String>,
    pub machine_tags: Vec<String>,
    /// Taken date; Flickr reports it as a wall-clock time without zone
    pub date_taken: Option<NaiveDateTime>,
    pub date_uploaded: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    pub geo: Option<GeoData>,
    pub place: Option<PlaceData>,
    /// Canonical photo page URL
    pub page_url: String,
    /// Original-size media URL
    pub original_url: Option<String>,
}

impl RawPhoto {
    /// Machine tags first, then plain tags that look like machine tags.
    ///
    /// Flickr lists machine tags in both fields depending on `extras`, so
    /// duplicates are removed while keeping first-seen order.
    pub fn all_tags(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for tag in self.machine_tags.iter().chain(self.tags.iter()) {
            let tag = tag.as_str();
            if !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        seen
    }
}
