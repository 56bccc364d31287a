//! Flickr adapter
//!
//! The [`PhotoSource`] trait, its REST implementation and the API wire models.

pub mod client;
pub mod models;
mod source;

pub use client::FlickrClient;
pub use source::PhotoSource;
