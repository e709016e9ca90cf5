//! Page-at-a-time retrieval of the user's properties.

use crate::api::PropertyStore;
use crate::error::RetrievalError;
use crate::models::{Page, PageToken};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reads one page of properties from the store. Failures are returned to the
/// caller as-is, nothing is retried here.
pub struct PropertyFetcher<S> {
    store: Arc<S>,
}

impl<S> Clone for PropertyFetcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PropertyStore> PropertyFetcher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Fetch the page identified by `token` (`PageToken::FIRST` for the first page)
    pub async fn fetch_page(&self, token: PageToken) -> Result<Page, RetrievalError> {
        debug!("Requesting page {} from {}", token, self.store.source_name());

        let page = self.store.fetch_page(token).await.map_err(|err| {
            warn!("Page {} could not be retrieved: {}", token, err);
            err
        })?;

        if let Some(next) = page.next_page {
            if page.total_pages > 0 && next.number() > page.total_pages {
                warn!(
                    "Page {} points at next page {} beyond total of {}",
                    token, next, page.total_pages
                );
            }
        }

        info!(
            "Received page {}/{} with {} properties",
            token,
            page.total_pages,
            page.properties.len()
        );
        Ok(page)
    }

    pub async fn first_page(&self) -> Result<Page, RetrievalError> {
        self.fetch_page(PageToken::FIRST).await
    }
}
