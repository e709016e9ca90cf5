use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub mod pagination;

pub use pagination::{Cursor, Page, PageToken};

/// Server-assigned property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location information for a property
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// A photo attached to a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub id: u64,
    pub image_url: String,
}

/// Core property data model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: PropertyId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub location: Location,
    #[serde(rename = "property_type", alias = "type", default)]
    pub category: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub price_per_night: f64,
    #[serde(default)]
    pub max_guests: u32,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub baths: u32,
    #[serde(default)]
    pub images: Vec<Image>,
    /// `None` until booking enrichment has completed for this property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<Booking>>,
}

/// A stay booked against one property. Never mutated after it is fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: u64,
    #[serde(rename = "name", default)]
    pub guest_name: String,
    #[serde(deserialize_with = "booking_date")]
    pub start_date: DateTime<Utc>,
    #[serde(deserialize_with = "booking_date")]
    pub end_date: DateTime<Utc>,
    #[serde(deserialize_with = "number_or_string")]
    pub price_per_night: f64,
    #[serde(rename = "is_paid", default)]
    pub paid: bool,
}

impl Booking {
    /// Whole nights billed for this stay (never less than one)
    pub fn nights(&self) -> i64 {
        crate::bookings::billable_nights(self.start_date, self.end_date)
    }

    pub fn total_price(&self) -> f64 {
        crate::bookings::total_price(self)
    }

    pub fn status_label(&self) -> &'static str {
        if self.paid {
            "Paid"
        } else {
            "Pending Payment"
        }
    }
}

/// Parse a booking date as either a plain `YYYY-MM-DD` (UTC midnight) or an RFC 3339 timestamp
pub fn parse_booking_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

fn booking_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_booking_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised booking date `{raw}`")))
}

// Rails serialises decimal columns as strings, so prices may arrive either way.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct PriceVisitor;

    impl<'de> serde::de::Visitor<'de> for PriceVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a price as a number or numeric string")
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid price `{v}`")))
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }
    }

    deserializer.deserialize_any(PriceVisitor)
}
