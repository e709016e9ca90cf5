//! The serialized reducer behind the property list.
//!
//! Every change to the list (a page arriving, bookings arriving, a widget
//! opening or closing) is an [`Event`] applied by [`ViewState::apply`], one at
//! a time. The reducer never performs I/O; it hands back an [`Effect`] telling
//! the controller what to do next.

use crate::models::{Booking, Cursor, Page, Property, PropertyId};
use serde::Serialize;
use std::collections::VecDeque;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Bumped every time the collection is replaced wholesale
pub type Generation = u64;

const MAX_RECORDED_FAILURES: usize = 64;

/// Which modal, if any, is on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum WidgetState {
    #[default]
    Closed,
    Adding,
    Editing(PropertyId),
}

impl WidgetState {
    pub fn add_visible(&self) -> bool {
        matches!(self, WidgetState::Adding)
    }

    pub fn update_visible(&self) -> bool {
        matches!(self, WidgetState::Editing(_))
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, WidgetState::Closed)
    }

    // Moving between editor targets keeps the same modal on screen.
    fn same_modal(&self, other: &WidgetState) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// What to do with bookings that arrive for an older generation of the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum StaleEnrichment {
    /// Drop results issued before the latest refresh
    #[default]
    Discard,
    /// Merge them anyway if the property id is still present
    Apply,
}

impl FromStr for StaleEnrichment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(StaleEnrichment::Discard),
            "apply" => Ok(StaleEnrichment::Apply),
            other => Err(format!("expected `discard` or `apply`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Replace,
    Append,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PageRequested,
    PageLoaded {
        mode: LoadMode,
        page: Page,
    },
    PageFailed,
    BookingsLoaded {
        generation: Generation,
        property_id: PropertyId,
        bookings: Vec<Booking>,
    },
    BookingsFailed {
        generation: Generation,
        property_id: PropertyId,
        error: String,
    },
    /// An enrichment task died before reporting back
    EnrichmentLost {
        reason: String,
    },
    DeleteConfirmed(PropertyId),
    EditLoaded(Property),
    WidgetChanged(WidgetState),
}

/// Follow-up work requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Enrich {
        generation: Generation,
        ids: Vec<PropertyId>,
    },
    Refresh,
}

/// A booking enrichment that could not be completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentFailure {
    pub property_id: Option<PropertyId>,
    pub generation: Option<Generation>,
    pub error: String,
}

/// What the rendering layer reads
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListView {
    pub properties: Vec<Property>,
    pub loading: bool,
    pub has_more: bool,
    pub widget: WidgetState,
    pub edit_buffer: Option<Property>,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    properties: Vec<Property>,
    cursor: Cursor,
    loading: bool,
    widget: WidgetState,
    edit_buffer: Option<Property>,
    generation: Generation,
    stale_policy: StaleEnrichment,
    failures: VecDeque<EnrichmentFailure>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(StaleEnrichment::default())
    }
}

impl ViewState {
    /// Starts out loading, with nothing fetched yet
    pub fn new(stale_policy: StaleEnrichment) -> Self {
        Self {
            properties: Vec::new(),
            cursor: Cursor::default(),
            loading: true,
            widget: WidgetState::Closed,
            edit_buffer: None,
            generation: 0,
            stale_policy,
            failures: VecDeque::new(),
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn widget(&self) -> WidgetState {
        self.widget
    }

    pub fn edit_buffer(&self) -> Option<&Property> {
        self.edit_buffer.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn stale_policy(&self) -> StaleEnrichment {
        self.stale_policy
    }

    /// Most recent enrichment failures, oldest first
    pub fn enrichment_failures(&self) -> &VecDeque<EnrichmentFailure> {
        &self.failures
    }

    pub fn view(&self) -> ListView {
        ListView {
            properties: self.properties.clone(),
            loading: self.loading,
            has_more: self.has_more(),
            widget: self.widget,
            edit_buffer: self.edit_buffer.clone(),
        }
    }

    /// Replace the bookings of every listed property carrying `id`. Returns
    /// `false` (and changes nothing) when no such property is in the list.
    pub fn merge_bookings(&mut self, id: PropertyId, bookings: Vec<Booking>) -> bool {
        let mut merged = 0;
        for property in self.properties.iter_mut().filter(|p| p.id == id) {
            property.bookings = Some(bookings.clone());
            merged += 1;
        }

        if merged == 0 {
            debug!("Property {} no longer listed, dropping its bookings", id);
            return false;
        }
        debug!(
            "Merged {} bookings into {} entries for property {}",
            bookings.len(),
            merged,
            id
        );
        true
    }

    pub fn apply(&mut self, event: Event) -> Effect {
        match event {
            Event::PageRequested => {
                self.loading = true;
                Effect::None
            }
            Event::PageLoaded { mode, page } => self.page_loaded(mode, page),
            Event::PageFailed => {
                self.loading = false;
                Effect::None
            }
            Event::BookingsLoaded {
                generation,
                property_id,
                bookings,
            } => {
                if self.is_stale(generation) {
                    debug!(
                        "Discarding bookings for property {} from generation {} (now {})",
                        property_id, generation, self.generation
                    );
                } else {
                    self.merge_bookings(property_id, bookings);
                }
                Effect::None
            }
            Event::BookingsFailed {
                generation,
                property_id,
                error,
            } => {
                warn!("Bookings for property {} unavailable: {}", property_id, error);
                self.record_failure(EnrichmentFailure {
                    property_id: Some(property_id),
                    generation: Some(generation),
                    error,
                });
                Effect::None
            }
            Event::EnrichmentLost { reason } => {
                warn!("Enrichment task lost: {}", reason);
                self.record_failure(EnrichmentFailure {
                    property_id: None,
                    generation: None,
                    error: reason,
                });
                Effect::None
            }
            Event::DeleteConfirmed(id) => {
                info!("Property {} deleted, reloading list", id);
                Effect::Refresh
            }
            Event::EditLoaded(property) => {
                if self.widget == WidgetState::Editing(property.id) {
                    self.edit_buffer = Some(property);
                } else {
                    debug!("Editor moved on, ignoring draft for property {}", property.id);
                }
                Effect::None
            }
            Event::WidgetChanged(next) => self.widget_changed(next),
        }
    }

    fn page_loaded(&mut self, mode: LoadMode, page: Page) -> Effect {
        self.cursor = Cursor::from_page(&page);
        self.loading = false;

        let ids: Vec<PropertyId> = page.properties.iter().map(|p| p.id).collect();
        match mode {
            LoadMode::Replace => {
                self.generation += 1;
                self.properties = page.properties;
            }
            LoadMode::Append => self.properties.extend(page.properties),
        }

        if ids.is_empty() {
            Effect::None
        } else {
            Effect::Enrich {
                generation: self.generation,
                ids,
            }
        }
    }

    fn widget_changed(&mut self, next: WidgetState) -> Effect {
        let previous = std::mem::replace(&mut self.widget, next);
        debug!("Widget {:?} -> {:?}", previous, next);

        if let WidgetState::Editing(target) = next {
            if self.edit_buffer.as_ref().is_some_and(|draft| draft.id != target) {
                self.edit_buffer = None;
            }
        }

        if previous.is_open() && !previous.same_modal(&next) {
            Effect::Refresh
        } else {
            Effect::None
        }
    }

    fn is_stale(&self, generation: Generation) -> bool {
        self.stale_policy == StaleEnrichment::Discard && generation != self.generation
    }

    fn record_failure(&mut self, failure: EnrichmentFailure) {
        if self.failures.len() == MAX_RECORDED_FAILURES {
            self.failures.pop_front();
        }
        self.failures.push_back(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_booking_date, Location, PageToken};

    fn property(id: u64) -> Property {
        Property {
            id: PropertyId(id),
            title: format!("Property {id}"),
            description: String::new(),
            location: Location::default(),
            category: "apartment".to_string(),
            price_per_night: 100.0,
            max_guests: 2,
            bedrooms: 1,
            beds: 1,
            baths: 1,
            images: vec![],
            bookings: None,
        }
    }

    fn booking(id: u64) -> Booking {
        Booking {
            id,
            guest_name: "Guest".to_string(),
            start_date: parse_booking_date("2023-01-01").unwrap(),
            end_date: parse_booking_date("2023-01-03").unwrap(),
            price_per_night: 100.0,
            paid: false,
        }
    }

    fn page(ids: &[u64], next: Option<u32>, total: u32) -> Page {
        Page {
            properties: ids.iter().copied().map(property).collect(),
            total_pages: total,
            next_page: next.map(PageToken),
        }
    }

    fn loaded(ids: &[u64]) -> ViewState {
        let mut state = ViewState::default();
        state.apply(Event::PageLoaded {
            mode: LoadMode::Replace,
            page: page(ids, Some(2), 2),
        });
        state
    }

    #[test]
    fn replace_clears_loading_and_requests_enrichment() {
        let mut state = ViewState::default();
        assert!(state.loading());

        let effect = state.apply(Event::PageLoaded {
            mode: LoadMode::Replace,
            page: page(&[1, 2], Some(2), 2),
        });

        assert!(!state.loading());
        assert!(state.has_more());
        assert_eq!(state.generation(), 1);
        assert_eq!(
            effect,
            Effect::Enrich {
                generation: 1,
                ids: vec![PropertyId(1), PropertyId(2)]
            }
        );
    }

    #[test]
    fn append_keeps_order_and_generation() {
        let mut state = loaded(&[1, 2]);
        state.apply(Event::PageRequested);
        assert!(state.loading());

        let effect = state.apply(Event::PageLoaded {
            mode: LoadMode::Append,
            page: page(&[3, 2], None, 2),
        });

        let ids: Vec<u64> = state.properties().iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 2]);
        assert!(!state.has_more());
        assert_eq!(
            effect,
            Effect::Enrich {
                generation: 1,
                ids: vec![PropertyId(3), PropertyId(2)]
            }
        );
    }

    #[test]
    fn empty_page_needs_no_enrichment() {
        let mut state = ViewState::default();
        let effect = state.apply(Event::PageLoaded {
            mode: LoadMode::Replace,
            page: page(&[], None, 0),
        });
        assert_eq!(effect, Effect::None);
        assert!(state.properties().is_empty());
    }

    #[test]
    fn merge_for_missing_property_is_noop() {
        let mut state = loaded(&[1, 2]);
        let before = state.properties().to_vec();

        assert!(!state.merge_bookings(PropertyId(99), vec![booking(1)]));
        assert_eq!(state.properties(), before.as_slice());
    }

    #[test]
    fn merge_reaches_every_copy_of_a_repeated_id() {
        let mut state = loaded(&[1, 2]);
        state.apply(Event::PageLoaded {
            mode: LoadMode::Append,
            page: page(&[2], None, 2),
        });

        state.apply(Event::BookingsLoaded {
            generation: 1,
            property_id: PropertyId(2),
            bookings: vec![booking(4)],
        });

        let enriched: Vec<bool> = state
            .properties()
            .iter()
            .map(|p| p.bookings.is_some())
            .collect();
        assert_eq!(enriched, vec![false, true, true]);
    }

    #[test]
    fn failure_log_is_bounded() {
        let mut state = loaded(&[1]);
        for n in 0..MAX_RECORDED_FAILURES + 3 {
            state.apply(Event::BookingsFailed {
                generation: 1,
                property_id: PropertyId(1),
                error: format!("failure {n}"),
            });
        }

        let failures = state.enrichment_failures();
        assert_eq!(failures.len(), MAX_RECORDED_FAILURES);
        assert_eq!(failures.front().map(|f| f.error.as_str()), Some("failure 3"));
    }

    #[test]
    fn merge_replaces_rather_than_extends() {
        let mut state = loaded(&[1]);
        state.merge_bookings(PropertyId(1), vec![booking(1), booking(2)]);
        state.merge_bookings(PropertyId(1), vec![booking(3)]);

        let bookings = state.property(PropertyId(1)).unwrap().bookings.as_ref().unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].id, 3);
    }

    #[test]
    fn failed_enrichment_keeps_known_bookings() {
        let mut state = loaded(&[1]);
        state.merge_bookings(PropertyId(1), vec![booking(1)]);

        state.apply(Event::BookingsFailed {
            generation: 1,
            property_id: PropertyId(1),
            error: "boom".to_string(),
        });

        assert_eq!(
            state.property(PropertyId(1)).unwrap().bookings.as_ref().map(Vec::len),
            Some(1)
        );
        assert_eq!(state.enrichment_failures().len(), 1);
        assert_eq!(state.enrichment_failures()[0].property_id, Some(PropertyId(1)));
    }

    #[test]
    fn stale_bookings_are_discarded_by_default() {
        let mut state = loaded(&[1]);
        state.apply(Event::PageLoaded {
            mode: LoadMode::Replace,
            page: page(&[1], None, 1),
        });

        state.apply(Event::BookingsLoaded {
            generation: 1,
            property_id: PropertyId(1),
            bookings: vec![booking(7)],
        });
        assert!(state.property(PropertyId(1)).unwrap().bookings.is_none());
    }

    #[test]
    fn stale_bookings_apply_when_configured() {
        let mut state = ViewState::new(StaleEnrichment::Apply);
        for _ in 0..2 {
            state.apply(Event::PageLoaded {
                mode: LoadMode::Replace,
                page: page(&[1], None, 1),
            });
        }

        state.apply(Event::BookingsLoaded {
            generation: 1,
            property_id: PropertyId(1),
            bookings: vec![booking(7)],
        });
        assert!(state.property(PropertyId(1)).unwrap().bookings.is_some());
    }

    #[test]
    fn closing_a_widget_requests_refresh_opening_does_not() {
        let mut state = loaded(&[1]);
        assert_eq!(state.apply(Event::WidgetChanged(WidgetState::Adding)), Effect::None);
        assert_eq!(state.apply(Event::WidgetChanged(WidgetState::Closed)), Effect::Refresh);
        assert_eq!(state.apply(Event::WidgetChanged(WidgetState::Closed)), Effect::None);
    }

    #[test]
    fn retargeting_editor_does_not_refresh() {
        let mut state = loaded(&[1, 2]);
        state.apply(Event::WidgetChanged(WidgetState::Editing(PropertyId(1))));
        assert_eq!(
            state.apply(Event::WidgetChanged(WidgetState::Editing(PropertyId(2)))),
            Effect::None
        );
        assert_eq!(
            state.apply(Event::WidgetChanged(WidgetState::Adding)),
            Effect::Refresh
        );
    }

    #[test]
    fn draft_for_abandoned_target_is_ignored() {
        let mut state = loaded(&[1, 2]);
        state.apply(Event::WidgetChanged(WidgetState::Editing(PropertyId(2))));

        state.apply(Event::EditLoaded(property(1)));
        assert!(state.edit_buffer().is_none());

        state.apply(Event::EditLoaded(property(2)));
        assert_eq!(state.edit_buffer().map(|p| p.id), Some(PropertyId(2)));
    }

    #[test]
    fn retargeting_editor_drops_previous_draft() {
        let mut state = loaded(&[1, 2]);
        state.apply(Event::WidgetChanged(WidgetState::Editing(PropertyId(1))));
        state.apply(Event::EditLoaded(property(1)));

        state.apply(Event::WidgetChanged(WidgetState::Editing(PropertyId(2))));
        assert_eq!(state.widget(), WidgetState::Editing(PropertyId(2)));
        assert!(state.edit_buffer().is_none());
    }

    #[test]
    fn reopening_editor_on_same_target_keeps_draft() {
        let mut state = loaded(&[1]);
        state.apply(Event::WidgetChanged(WidgetState::Editing(PropertyId(1))));
        state.apply(Event::EditLoaded(property(1)));
        state.apply(Event::WidgetChanged(WidgetState::Closed));

        state.apply(Event::WidgetChanged(WidgetState::Editing(PropertyId(1))));
        assert_eq!(state.edit_buffer().map(|p| p.id), Some(PropertyId(1)));
    }

    #[test]
    fn delete_confirmation_requests_refresh_without_touching_list() {
        let mut state = loaded(&[1, 2]);
        assert_eq!(state.apply(Event::DeleteConfirmed(PropertyId(2))), Effect::Refresh);
        assert!(state.property(PropertyId(2)).is_some());
    }

    #[test]
    fn stale_policy_parses_from_config_values() {
        assert_eq!("Discard".parse::<StaleEnrichment>(), Ok(StaleEnrichment::Discard));
        assert_eq!(" apply ".parse::<StaleEnrichment>(), Ok(StaleEnrichment::Apply));
        assert!("sometimes".parse::<StaleEnrichment>().is_err());
    }
}
