//! Pagination discovery for category listings

use crate::harvest::extractor::extract_page_numbers;
use crate::harvest::Fetcher;
use crate::state::Category;
use url::Url;

/// Result of probing a category's first listing page
#[derive(Debug, Clone)]
pub struct PageDiscovery {
    /// Number of listing pages; at least 1
    pub total_pages: u32,

    /// Body of page 1, if it could be fetched
    pub first_page: Option<String>,
}

/// Builds listing page URLs and discovers how many pages a category has
#[derive(Debug, Clone)]
pub struct Paginator {
    base_url: Url,
}

impl Paginator {
    /// Creates a paginator rooted at `base_url`
    ///
    /// A missing trailing slash is added so category segments are appended
    /// rather than replacing the last path segment.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    /// Returns the URL of listing page `page` (1-based)
    ///
    /// Page 1 is the bare category URL; later pages append `page/<n>/`.
    pub fn page_url(&self, category: Category, page: u32) -> Result<Url, url::ParseError> {
        let category_url = self.base_url.join(&category.path_segment())?;
        if page <= 1 {
            Ok(category_url)
        } else {
            category_url.join(&format!("page/{}/", page))
        }
    }

    /// Returns the URLs of pages `1..=total_pages` in order
    pub fn page_urls(&self, category: Category, total_pages: u32) -> Result<Vec<Url>, url::ParseError> {
        (1..=total_pages.max(1))
            .map(|page| self.page_url(category, page))
            .collect()
    }

    /// Fetches page 1 and reads the highest page index it links to
    ///
    /// Degrades to a single page when the page has no pagination block or
    /// cannot be fetched; some categories legitimately have one page.
    pub async fn discover(&self, fetcher: &Fetcher, category: Category) -> PageDiscovery {
        let url = match self.page_url(category, 1) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build first page URL for {}: {}", category, e);
                return PageDiscovery {
                    total_pages: 1,
                    first_page: None,
                };
            }
        };

        match fetcher.fetch(url.as_str()).await {
            Ok(body) => PageDiscovery {
                total_pages: count_pages(&body),
                first_page: Some(body),
            },
            Err(e) => {
                tracing::warn!("Page count unavailable for {}, assuming 1: {}", category, e);
                PageDiscovery {
                    total_pages: 1,
                    first_page: None,
                }
            }
        }
    }

    /// Returns the number of listing pages of a category
    pub async fn page_count(&self, fetcher: &Fetcher, category: Category) -> u32 {
        self.discover(fetcher, category).await.total_pages
    }
}

/// Returns the highest page marker of a listing page, or 1 if there is none
pub fn count_pages(body: &str) -> u32 {
    extract_page_numbers(body).into_iter().max().unwrap_or(1).max(1)
}
