//! Booking retrieval and the money derived from it.

use crate::api::PropertyStore;
use crate::error::RetrievalError;
use crate::models::{Booking, PropertyId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Nights billed between two dates: the absolute span rounded up to whole
/// days, with a same-day stay counting as one night.
pub fn billable_nights(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds().abs();
    let days = (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    days.max(1)
}

pub fn total_price(booking: &Booking) -> f64 {
    billable_nights(booking.start_date, booking.end_date) as f64 * booking.price_per_night
}

/// Revenue roll-up for one property's bookings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropertyFinancials {
    pub bookings: usize,
    pub booked_nights: i64,
    pub gross: f64,
    pub paid: f64,
    pub outstanding: f64,
}

impl PropertyFinancials {
    pub fn from_bookings(bookings: &[Booking]) -> Self {
        bookings.iter().fold(Self::default(), |mut acc, booking| {
            let total = booking.total_price();
            acc.bookings += 1;
            acc.booked_nights += booking.nights();
            acc.gross += total;
            if booking.paid {
                acc.paid += total;
            } else {
                acc.outstanding += total;
            }
            acc
        })
    }
}

/// Fetches the bookings of a single property
pub struct BookingAggregator<S> {
    store: Arc<S>,
}

impl<S> Clone for BookingAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PropertyStore> BookingAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn fetch_bookings(&self, id: PropertyId) -> Result<Vec<Booking>, RetrievalError> {
        let bookings = self.store.fetch_bookings(id).await?;
        debug!(
            "Property {} has {} bookings worth {:.2}",
            id,
            bookings.len(),
            PropertyFinancials::from_bookings(&bookings).gross
        );
        Ok(bookings)
    }
}
