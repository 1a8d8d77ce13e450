//! Query parameter types for listing endpoints.
//!
//! Fields are spelled out per endpoint rather than flattened, since
//! `serde_urlencoded` cannot parse numbers through `#[serde(flatten)]`.

use kiraa_core::store::{Pagination, ProductFilter};
use kiraa_core::submission::SubmissionStatus;
use serde::Deserialize;

/// `?status=&limit=&offset=` for submission listings.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionListParams {
    pub status: Option<SubmissionStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SubmissionListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}

/// `?category=&city=&limit=&offset=` for the public catalogue.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub category: Option<String>,
    pub city: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductListParams {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.clone(),
            city: self.city.clone(),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.limit, self.offset)
    }
}
