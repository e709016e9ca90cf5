//! Plain-text rendering of the property list for the terminal.

use crate::bookings::PropertyFinancials;
use crate::models::{Booking, Property};

/// Relative link to the property's public page
pub fn detail_link(property: &Property) -> String {
    format!("/property/{}", property.id)
}

pub fn booking_line(booking: &Booking) -> String {
    format!(
        "{} ${:.2} {} ({} to {})",
        booking.guest_name,
        booking.total_price(),
        booking.status_label(),
        booking.start_date.format("%Y-%m-%d"),
        booking.end_date.format("%Y-%m-%d"),
    )
}

/// Multi-line summary of one property and whatever bookings are known for it
pub fn property_block(index: usize, property: &Property) -> String {
    let mut out = format!(
        "{}. {} ({}, {})\n   ${:.2} USD/night, {} guests, {} bedrooms\n   Link: {}\n",
        index,
        property.title,
        property.location.city.to_uppercase(),
        property.location.country,
        property.price_per_night,
        property.max_guests,
        property.bedrooms,
        detail_link(property),
    );

    match &property.bookings {
        None => out.push_str("   Bookings: not loaded\n"),
        Some(bookings) if bookings.is_empty() => out.push_str("   Bookings: none\n"),
        Some(bookings) => {
            let summary = PropertyFinancials::from_bookings(bookings);
            out.push_str(&format!(
                "   Bookings: {} ({} nights, ${:.2} paid, ${:.2} pending)\n",
                summary.bookings, summary.booked_nights, summary.paid, summary.outstanding
            ));
            for booking in bookings {
                out.push_str(&format!("   - {}\n", booking_line(booking)));
            }
        }
    }
    out
}
