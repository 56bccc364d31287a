//! Photo source trait definition
//!
//! `PhotoSource` abstracts the paged photo listing the harvester pulls from.
//! [`FlickrClient`](super::FlickrClient) is the production implementation;
//! tests drive the pipeline with in-memory sources.

use crate::domain::{LicenseTable, PageRequest, PhotoPage, PoolQuery, Result};
use async_trait::async_trait;

/// Paged listing of group pool photos
///
/// # Example
///
/// ```no_run
/// use flickr_harvester::adapters::flickr::{FlickrClient, PhotoSource};
/// use flickr_harvester::config::load_config;
/// use flickr_harvester::domain::PageRequest;
///
/// # async fn example() -> flickr_harvester::domain::Result<()> {
/// let config = load_config("harvester.toml")?;
/// let client = FlickrClient::new(config.flickr.clone())?;
/// let query = config.pool_query();
///
/// let pages = client.count_pages(&query).await?;
/// let first = client.fetch_page(&PageRequest::new(&query, 1)?).await?;
/// println!("{} pages, {} photos on page 1", pages, first.photos.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Fetch one page of the listing
    async fn fetch_page(&self, request: &PageRequest) -> Result<PhotoPage>;

    /// Fetch the license code table
    async fn fetch_licenses(&self) -> Result<LicenseTable>;

    /// Total number of pages for `query`
    ///
    /// The default requests a single photo without extras and derives the
    /// page count from the reported total at `query.per_page`.
    async fn count_pages(&self, query: &PoolQuery) -> Result<u32> {
        let count_query = PoolQuery {
            per_page: 1,
            extras: Vec::new(),
            ..query.clone()
        };
        let first = self.fetch_page(&PageRequest::new(&count_query, 1)?).await?;
        let pages = pages_for(first.total, query.per_page);
        tracing::debug!(
            group_id = %query.group_id,
            pages,
            total = first.total,
            "Counted pool pages"
        );
        Ok(pages)
    }
}

/// Pages needed to list `total` photos at `per_page` photos per page
fn pages_for(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX)
}
