//! Work items passed from the producer to the worker pool

use super::errors::HarvesterError;
use super::photo::RawPhoto;
use super::result::Result;

/// Parameters shared by every page of one group pool listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolQuery {
    pub group_id: String,
    pub user_id: Option<String>,
    pub machine_tags: Vec<String>,
    pub extras: Vec<String>,
    pub per_page: u32,
}

/// Request for a single page of a group pool.
///
/// Fields are private so a request cannot be altered after it is queued,
/// and the constructor rejects page numbers below 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    group_id: String,
    user_id: Option<String>,
    machine_tags: Vec<String>,
    extras: Vec<String>,
    per_page: u32,
    page: u32,
}

impl PageRequest {
    pub fn new(query: &PoolQuery, page: u32) -> Result<Self> {
        if page == 0 {
            return Err(HarvesterError::Queue(
                "page numbers start at 1, got 0".to_string(),
            ));
        }
        Ok(Self {
            group_id: query.group_id.clone(),
            user_id: query.user_id.clone(),
            machine_tags: query.machine_tags.clone(),
            extras: query.extras.clone(),
            per_page: query.per_page,
            page,
        })
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn machine_tags(&self) -> &[String] {
        &self.machine_tags
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Unit of work on the harvest queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Fetch, transform and emit one page
    PageFetch(PageRequest),
    /// Sentinel: the receiving worker stops
    Terminate,
}

impl WorkItem {
    pub fn is_terminate(&self) -> bool {
        matches!(self, WorkItem::Terminate)
    }
}

/// One page of results from the photo source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoPage {
    pub page: u32,
    /// Total number of pages in the listing
    pub pages: u32,
    pub per_page: u32,
    /// Total number of photos in the listing
    pub total: u64,
    pub photos: Vec<RawPhoto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> PoolQuery {
        PoolQuery {
            group_id: "806927@N20".to_string(),
            user_id: None,
            machine_tags: vec!["taxonomy:".to_string()],
            extras: vec!["geo".to_string()],
            per_page: 100,
        }
    }

    #[test]
    fn test_page_request_rejects_page_zero() {
        assert!(PageRequest::new(&query(), 0).is_err());
    }

    #[test]
    fn test_page_request_copies_query() {
        let request = PageRequest::new(&query(), 3).unwrap();
        assert_eq!(request.page(), 3);
        assert_eq!(request.group_id(), "806927@N20");
        assert_eq!(request.per_page(), 100);
        assert_eq!(request.machine_tags(), ["taxonomy:".to_string()]);
        assert_eq!(request.user_id(), None);
    }

    #[test]
    fn test_is_terminate() {
        assert!(WorkItem::Terminate.is_terminate());
        let item = WorkItem::PageFetch(PageRequest::new(&query(), 1).unwrap());
        assert!(!item.is_terminate());
    }
}
