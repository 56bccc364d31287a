//! External system integrations.
//!
//! - [`flickr`] - Flickr REST API (group pool listings, license table)
//!
//! Adapters isolate external dependencies behind traits so the harvest
//! pipeline can run against in-memory sources in tests.

pub mod flickr;
