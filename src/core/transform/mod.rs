//! Photo to Darwin Core transformation
//!
//! [`transform_photo`] turns one [`RawPhoto`] into a [`NormalizedRecord`], or
//! excludes it when its last update falls outside the configured window.
//! It performs no I/O, so workers can call it concurrently with shared
//! read-only inputs.

pub mod machine_tags;
pub mod occurrence;

use crate::config::DateBounds;
use crate::domain::schema::{
    ACCESS_RIGHTS, ASSOCIATED_MEDIA, BASIS_OF_RECORD, COORDINATE_UNCERTAINTY, COUNTRY,
    DECIMAL_LATITUDE, DECIMAL_LONGITUDE, EVENT_DATE, LICENSE, LOCALITY, OCCURRENCE_DETAILS,
    OCCURRENCE_ID, OCCURRENCE_REMARKS, RECORDED_BY, STATE_PROVINCE, USER_ID,
};
use crate::domain::{HarvesterError, LicenseTable, NormalizedRecord, RawPhoto, Result};
use chrono::{DateTime, Utc};
use std::fmt;

/// `basisOfRecord` for every harvested row
pub const BASIS_OF_RECORD_IMAGE: &str = "Image";

/// Output format of `eventDate`
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Why a photo produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Last update is at or before the lower bound
    UpdatedBeforeWindow,
    /// Last update is at or after the upper bound
    UpdatedAfterWindow,
    /// A bound is set but the photo reports no last update
    MissingLastUpdate,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ExclusionReason::UpdatedBeforeWindow => "updated before window",
            ExclusionReason::UpdatedAfterWindow => "updated after window",
            ExclusionReason::MissingLastUpdate => "no last update date",
        };
        f.write_str(reason)
    }
}

/// Exclusive last-update window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateWindow {
    pub min: Option<DateTime<Utc>>,
    pub max: Option<DateTime<Utc>>,
}

impl UpdateWindow {
    pub fn new(min: Option<DateTime<Utc>>, max: Option<DateTime<Utc>>) -> Self {
        Self { min, max }
    }

    /// Builds the window from the `[flickr.dates]` update bounds.
    pub fn from_bounds(bounds: &DateBounds) -> Result<Self> {
        let (min, max) = bounds
            .update_window()
            .map_err(HarvesterError::Configuration)?;
        Ok(Self { min, max })
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Checks a last-update timestamp against both bounds.
    pub fn admits(&self, last_update: Option<DateTime<Utc>>) -> std::result::Result<(), ExclusionReason> {
        if self.is_open() {
            return Ok(());
        }
        let updated = last_update.ok_or(ExclusionReason::MissingLastUpdate)?;
        if let Some(min) = self.min {
            if updated <= min {
                return Err(ExclusionReason::UpdatedBeforeWindow);
            }
        }
        if let Some(max) = self.max {
            if updated >= max {
                return Err(ExclusionReason::UpdatedAfterWindow);
            }
        }
        Ok(())
    }
}

/// Result of transforming one photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    Accepted(NormalizedRecord),
    Excluded(ExclusionReason),
}

impl Transformed {
    pub fn accepted(self) -> Option<NormalizedRecord> {
        match self {
            Transformed::Accepted(record) => Some(record),
            Transformed::Excluded(_) => None,
        }
    }
}

/// Transforms a photo into a Darwin Core record.
///
/// Fixed derivations are applied first; machine tags naming a schema term
/// are applied last and may overwrite a derived location column.
pub fn transform_photo(
    photo: &RawPhoto,
    licenses: &LicenseTable,
    window: &UpdateWindow,
) -> Transformed {
    if let Err(reason) = window.admits(photo.last_update) {
        return Transformed::Excluded(reason);
    }

    let mut record = NormalizedRecord::new();
    record.set(BASIS_OF_RECORD, BASIS_OF_RECORD_IMAGE);

    if let Some(name) = licenses.name(&photo.license) {
        record.set(ACCESS_RIGHTS, name);
        record.set(LICENSE, name);
    }

    let occurrence_id = occurrence::occurrence_id(&photo.page_url);
    record.set(USER_ID, photo.owner.id.as_str());
    if let Some(url) = &photo.original_url {
        record.set(ASSOCIATED_MEDIA, url.as_str());
    }
    if let Some(taken) = photo.date_taken {
        record.set(EVENT_DATE, taken.format(EVENT_DATE_FORMAT).to_string());
    }
    record.set(OCCURRENCE_REMARKS, photo.description.as_str());
    let details = occurrence::biodiversity_library_link(&photo.description)
        .unwrap_or(occurrence_id.as_str())
        .to_string();
    record.set(OCCURRENCE_DETAILS, details);
    record.set(OCCURRENCE_ID, occurrence_id);
    record.set(RECORDED_BY, photo.owner.display_name());

    if let Some(geo) = photo.geo {
        record.set(DECIMAL_LATITUDE, geo.latitude.to_string());
        record.set(DECIMAL_LONGITUDE, geo.longitude.to_string());
        record.set(COORDINATE_UNCERTAINTY, geo.accuracy.to_string());
    }

    let place = photo.place.as_ref();
    if let Some(country) = place.and_then(|p| p.country.as_deref()) {
        record.set(COUNTRY, country);
    }
    if let Some(region) = place.and_then(|p| p.region.as_deref()) {
        record.set(STATE_PROVINCE, region);
    }
    let locality = place
        .and_then(|p| p.locality.as_deref())
        .or(photo.owner.location.as_deref());
    if let Some(locality) = locality {
        record.set(LOCALITY, locality);
    }

    for tag in photo.all_tags() {
        if let Some((field, value)) = machine_tags::to_field(tag) {
            record.set(field, value);
        }
    }

    Transformed::Accepted(record)
}
