//! Darwin Core record schema
//!
//! The output CSV has a fixed, ordered header: the columns the harvester
//! derives itself, followed by the Darwin Core terms that machine tags are
//! allowed to populate.

use std::collections::HashMap;
use std::sync::OnceLock;

pub const BASIS_OF_RECORD: &str = "basisOfRecord";
pub const ACCESS_RIGHTS: &str = "dcterms:accessRights";
pub const OCCURRENCE_ID: &str = "occurrenceID";
pub const USER_ID: &str = "userId";
pub const ASSOCIATED_MEDIA: &str = "associatedMedia";
pub const EVENT_DATE: &str = "eventDate";
pub const OCCURRENCE_REMARKS: &str = "occurrenceRemarks";
pub const OCCURRENCE_DETAILS: &str = "occurrenceDetails";
pub const RECORDED_BY: &str = "recordedBy";
pub const LICENSE: &str = "license";

pub const COUNTRY: &str = "country";
pub const STATE_PROVINCE: &str = "stateProvince";
pub const LOCALITY: &str = "locality";
pub const DECIMAL_LATITUDE: &str = "decimalLatitude";
pub const DECIMAL_LONGITUDE: &str = "decimalLongitude";
pub const COORDINATE_UNCERTAINTY: &str = "coordinateUncertaintyInMeters";

/// Columns filled by the transformation itself, in header order.
pub const DERIVED_FIELDS: [&str; 10] = [
    BASIS_OF_RECORD,
    ACCESS_RIGHTS,
    OCCURRENCE_ID,
    USER_ID,
    ASSOCIATED_MEDIA,
    EVENT_DATE,
    OCCURRENCE_REMARKS,
    OCCURRENCE_DETAILS,
    RECORDED_BY,
    LICENSE,
];

/// Darwin Core terms a machine tag predicate may target.
pub const ALLOWED_TAGS: [&str; 77] = [
    "taxonID",
    "scientificNameID",
    "acceptedNameUsageID",
    "parentNameUsageID",
    "originalNameUsageID",
    "nameAccordingToID",
    "namePublishedInID",
    "taxonConceptID",
    "scientificName",
    "acceptedNameUsage",
    "parentNameUsage",
    "originalNameUsage",
    "nameAccordingTo",
    "namePublishedIn",
    "namePublishedInYear",
    "higherClassification",
    "kingdom",
    "phylum",
    "class",
    "order",
    "family",
    "genus",
    "subgenus",
    "specificEpithet",
    "infraspecificEpithet",
    "taxonRank",
    "verbatimTaxonRank",
    "scientificNameAuthorship",
    "vernacularName",
    "nomenclaturalCode",
    "taxonomicStatus",
    "nomenclaturalStatus",
    "taxonRemarks",
    "locationID",
    "higherGeographyID",
    "higherGeography",
    "continent",
    "waterBody",
    "islandGroup",
    "island",
    COUNTRY,
    "countryCode",
    STATE_PROVINCE,
    "county",
    "municipality",
    LOCALITY,
    "verbatimLocality",
    "minimumElevationInMeters",
    "maximumElevationInMeters",
    "verbatimElevation",
    "minimumDepthInMeters",
    "maximumDepthInMeters",
    "verbatimDepth",
    "minimumDistanceAboveSurfaceInMeters",
    "maximumDistanceAboveSurfaceInMeters",
    "locationAccordingTo",
    "locationRemarks",
    DECIMAL_LATITUDE,
    DECIMAL_LONGITUDE,
    "geodeticDatum",
    COORDINATE_UNCERTAINTY,
    "coordinatePrecision",
    "pointRadiusSpatialFit",
    "verbatimCoordinates",
    "verbatimLatitude",
    "verbatimLongitude",
    "verbatimCoordinateSystem",
    "verbatimSRS",
    "footprintWKT",
    "footprintSRS",
    "footprintSpatialFit",
    "georeferencedBy",
    "georeferencedDate",
    "georeferenceProtocol",
    "georeferenceSources",
    "georeferenceVerificationStatus",
    "georeferenceRemarks",
];

/// Number of columns in every output row.
pub const FIELD_COUNT: usize = DERIVED_FIELDS.len() + ALLOWED_TAGS.len();

struct SchemaIndex {
    header: Vec<&'static str>,
    positions: HashMap<&'static str, usize>,
    tags_by_lowercase: HashMap<String, &'static str>,
}

fn index() -> &'static SchemaIndex {
    static INDEX: OnceLock<SchemaIndex> = OnceLock::new();
    INDEX.get_or_init(|| {
        let header: Vec<&'static str> = DERIVED_FIELDS
            .iter()
            .chain(ALLOWED_TAGS.iter())
            .copied()
            .collect();
        let positions = header
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, i))
            .collect();
        let tags_by_lowercase = ALLOWED_TAGS
            .iter()
            .map(|name| (name.to_lowercase(), *name))
            .collect();
        SchemaIndex {
            header,
            positions,
            tags_by_lowercase,
        }
    })
}

/// Ordered output header.
pub fn header() -> &'static [&'static str] {
    &index().header
}

/// Column position of a schema field, `None` for names outside the schema.
pub fn position(field: &str) -> Option<usize> {
    index().positions.get(field).copied()
}

/// Whether `field` is an exact schema field name.
pub fn contains(field: &str) -> bool {
    position(field).is_some()
}

/// Resolves a machine tag predicate to its canonical schema spelling.
///
/// Matching is case-insensitive; only [`ALLOWED_TAGS`] qualify.
pub fn canonical_tag(predicate: &str) -> Option<&'static str> {
    index()
        .tags_by_lowercase
        .get(&predicate.trim().to_lowercase())
        .copied()
}
