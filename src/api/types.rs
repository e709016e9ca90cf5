use crate::models::{Booking, Property};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the HTTP property store
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Scheme and host of the API, without a trailing slash
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("property-board/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Body of `GET /api/properties/{id}/bookings`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingsEnvelope {
    pub bookings: Vec<Booking>,
}

/// Body of `GET /api/properties/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyEnvelope {
    pub property: Property,
}
