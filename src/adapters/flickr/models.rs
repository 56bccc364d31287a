//! Flickr REST API models
//!
//! Wire structures for `flickr.groups.pools.getPhotos` and
//! `flickr.photos.licenses.getInfo` JSON responses, kept separate from the
//! domain types. Flickr is loose with scalar types (the same field arrives
//! as `"16"` or `16` depending on the endpoint), so scalars are read
//! leniently and converted in [`PoolPhoto::into_raw_photo`].

use crate::domain::{
    FlickrError, GeoData, LicenseTable, Owner, PhotoPage, PlaceData, RawPhoto, Result,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Format of `datetaken`
pub const DATE_TAKEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads a string, number or bool as `Option<String>`; null and `""` are `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Flickr's `{"_content": "..."}` wrapper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(rename = "_content", default)]
    pub content: String,
}

impl Content {
    fn into_option(self) -> Option<String> {
        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Common response envelope: `stat` plus error details on failure
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub stat: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    /// Converts a `stat = "fail"` envelope into an API error
    pub fn check(&self) -> Result<()> {
        if self.stat == "ok" {
            return Ok(());
        }
        Err(FlickrError::Api {
            code: self.code.unwrap_or(-1),
            message: self
                .message
                .clone()
                .unwrap_or_else(|| format!("stat = {}", self.stat)),
        }
        .into())
    }
}

/// `flickr.groups.pools.getPhotos` response
#[derive(Debug, Clone, Deserialize)]
pub struct PoolPhotosResponse {
    pub photos: PoolPhotos,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolPhotos {
    #[serde(default, deserialize_with = "lenient_string")]
    pub page: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pages: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub perpage: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total: Option<String>,
    #[serde(default)]
    pub photo: Vec<PoolPhoto>,
}

impl PoolPhotos {
    pub fn into_page(self) -> Result<PhotoPage> {
        let number = |field: &str, value: Option<String>| -> Result<u64> {
            match value {
                None => Ok(0),
                Some(v) => v.parse::<u64>().map_err(|_| {
                    FlickrError::InvalidResponse(format!("photos.{field} is not a number: {v}"))
                        .into()
                }),
            }
        };
        let page = number("page", self.page)?;
        let pages = number("pages", self.pages)?;
        let per_page = number("perpage", self.perpage)?;
        let total = number("total", self.total)?;

        Ok(PhotoPage {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            pages: u32::try_from(pages).unwrap_or(u32::MAX),
            per_page: u32::try_from(per_page).unwrap_or(u32::MAX),
            total,
            photos: self
                .photo
                .into_iter()
                .map(PoolPhoto::into_raw_photo)
                .collect(),
        })
    }
}

/// Reverse-geocoded location block (present when the response carries it)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub locality: Option<Content>,
    #[serde(default)]
    pub region: Option<Content>,
    #[serde(default)]
    pub country: Option<Content>,
}

/// One photo entry of a pool listing
#[derive(Debug, Clone, Deserialize)]
pub struct PoolPhoto {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub secret: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub server: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub farm: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ownername: Option<String>,
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default)]
    pub owner_location: Option<String>,
    #[serde(default)]
    pub description: Option<Content>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub license: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dateupload: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lastupdate: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub datetaken: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub accuracy: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub machine_tags: Option<String>,
    #[serde(default)]
    pub url_o: Option<String>,
    #[serde(default)]
    pub originalsecret: Option<String>,
    #[serde(default)]
    pub originalformat: Option<String>,
}

fn unix_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

fn split_tags(value: Option<String>) -> Vec<String> {
    value
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

impl PoolPhoto {
    /// Photo page URL in Flickr's canonical short form
    fn page_url(&self, id: &str, owner: &str) -> String {
        format!("https://flickr.com/photos/{owner}/{id}")
    }

    /// Original media URL: `url_o` when requested, otherwise built from
    /// the original secret and format if the listing included them.
    fn original_url(&self, id: &str) -> Option<String> {
        if let Some(url) = self.url_o.as_ref().filter(|u| !u.is_empty()) {
            return Some(url.clone());
        }
        match (
            self.server.as_deref(),
            self.originalsecret.as_deref(),
            self.originalformat.as_deref(),
        ) {
            (Some(server), Some(secret), Some(format)) => Some(format!(
                "https://live.staticflickr.com/{server}/{id}_{secret}_o.{format}"
            )),
            _ => None,
        }
    }

    fn geo(&self) -> Option<GeoData> {
        let latitude: f64 = self.latitude.as_deref()?.parse().ok()?;
        let longitude: f64 = self.longitude.as_deref()?.parse().ok()?;
        // Flickr reports 0/0 for photos without a geotag
        if latitude == 0.0 && longitude == 0.0 {
            return None;
        }
        let accuracy = self
            .accuracy
            .as_deref()
            .and_then(|a| a.parse().ok())
            .unwrap_or(0);
        Some(GeoData {
            latitude,
            longitude,
            accuracy,
        })
    }

    /// Maps the wire record into the domain photo model
    pub fn into_raw_photo(self) -> RawPhoto {
        let id = self.id.clone().unwrap_or_default();
        let owner_id = self.owner.clone().unwrap_or_default();
        let page_url = self.page_url(&id, &owner_id);
        let original_url = self.original_url(&id);
        let geo = self.geo();
        let date_taken = self
            .datetaken
            .as_deref()
            .and_then(|d| NaiveDateTime::parse_from_str(d, DATE_TAKEN_FORMAT).ok());
        let date_uploaded = unix_timestamp(self.dateupload.as_deref());
        let last_update = unix_timestamp(self.lastupdate.as_deref());

        let place = self.location.map(|location| PlaceData {
            country: location.country.and_then(Content::into_option),
            region: location.region.and_then(Content::into_option),
            locality: location.locality.and_then(Content::into_option),
        });

        RawPhoto {
            id,
            secret: self.secret.unwrap_or_default(),
            server: self.server.unwrap_or_default(),
            farm: self.farm.and_then(|f| f.parse().ok()),
            title: self.title.unwrap_or_default(),
            owner: Owner {
                id: owner_id,
                username: self.ownername.unwrap_or_default(),
                real_name: self.realname.filter(|n| !n.trim().is_empty()),
                location: self.owner_location.filter(|l| !l.trim().is_empty()),
            },
            description: self.description.map(|d| d.content).unwrap_or_default(),
            license: self.license.unwrap_or_default(),
            tags: split_tags(self.tags),
            machine_tags: split_tags(self.machine_tags),
            date_taken,
            date_uploaded,
            last_update,
            geo,
            place,
            page_url,
            original_url,
        }
    }
}

/// `flickr.photos.licenses.getInfo` response
#[derive(Debug, Clone, Deserialize)]
pub struct LicensesResponse {
    pub licenses: Licenses,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Licenses {
    #[serde(default)]
    pub license: Vec<LicenseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LicenseEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Licenses {
    pub fn into_table(self) -> LicenseTable {
        LicenseTable::new(
            self.license
                .into_iter()
                .filter_map(|entry| entry.id.map(|id| (id, entry.name))),
        )
    }
}
