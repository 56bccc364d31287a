//! Domain models and types for the harvester.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record schema** ([`schema`]): the ordered Darwin Core header and the
//!   machine tag whitelist
//! - **Photo models** ([`RawPhoto`], [`Owner`], [`GeoData`], [`PlaceData`])
//! - **Work items** ([`WorkItem`], [`PageRequest`], [`PhotoPage`])
//! - **Output records** ([`NormalizedRecord`])
//! - **Error types** ([`HarvesterError`], [`FlickrError`]) and [`Result`]
//!
//! # Unknown fields
//!
//! ```rust
//! use flickr_harvester::domain::NormalizedRecord;
//!
//! let mut record = NormalizedRecord::new();
//! assert!(record.set("scientificName", "Felis catus"));
//! assert!(!record.set("bogusfield", "x"));
//! ```

pub mod errors;
pub mod license;
pub mod photo;
pub mod record;
pub mod result;
pub mod schema;
pub mod work_item;

pub use errors::{FlickrError, HarvesterError};
pub use license::LicenseTable;
pub use photo::{GeoData, Owner, PlaceData, RawPhoto};
pub use record::NormalizedRecord;
pub use result::Result;
pub use work_item::{PageRequest, PhotoPage, PoolQuery, WorkItem};
