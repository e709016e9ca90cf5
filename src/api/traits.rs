use crate::error::{MutationError, RetrievalError};
use crate::models::{Booking, Page, PageToken, Property, PropertyId};
use async_trait::async_trait;

/// Remote store holding the signed-in user's properties and their bookings.
/// The controller only ever talks to the server through this trait, so an
/// in-memory store can stand in for the HTTP one.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// `GET properties(page)`
    async fn fetch_page(&self, page: PageToken) -> Result<Page, RetrievalError>;

    /// `GET propertyBookings(id)`
    async fn fetch_bookings(&self, id: PropertyId) -> Result<Vec<Booking>, RetrievalError>;

    /// `GET property(id)`
    async fn fetch_property(&self, id: PropertyId) -> Result<Property, RetrievalError>;

    /// `DELETE property(id)`
    async fn delete_property(&self, id: PropertyId) -> Result<(), MutationError>;

    /// Get the name of the backing source
    fn source_name(&self) -> &'static str;
}
