//! The list controller: owns the user's property collection, drives page
//! retrieval and booking enrichment, and reacts to the add/update widgets.

pub mod state;

pub use state::{
    Effect, EnrichmentFailure, Event, Generation, ListView, LoadMode, StaleEnrichment, ViewState,
    WidgetState,
};

use crate::api::PropertyStore;
use crate::bookings::BookingAggregator;
use crate::error::{ControllerError, RetrievalError};
use crate::fetcher::PropertyFetcher;
use crate::models::{Booking, Property, PropertyId};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerConfig {
    pub stale_enrichment: StaleEnrichment,
}

/// Drives a [`ViewState`] against a [`PropertyStore`].
///
/// Page fetches, deletes and edit lookups are awaited inside the operation that
/// issued them. Booking lookups run as independent tasks; their results are
/// only merged when the owner calls [`ListController::next_enrichment`],
/// [`ListController::drain_ready`] or [`ListController::settle`], so every
/// mutation happens through `&mut self`, one event at a time.
pub struct ListController<S> {
    store: Arc<S>,
    fetcher: PropertyFetcher<S>,
    aggregator: BookingAggregator<S>,
    state: ViewState,
    in_flight: JoinSet<Event>,
    view_tx: watch::Sender<ListView>,
}

impl<S: PropertyStore + 'static> ListController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, ControllerConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: ControllerConfig) -> Self {
        let state = ViewState::new(config.stale_enrichment);
        let (view_tx, _) = watch::channel(state.view());

        Self {
            fetcher: PropertyFetcher::new(Arc::clone(&store)),
            aggregator: BookingAggregator::new(Arc::clone(&store)),
            store,
            state,
            in_flight: JoinSet::new(),
            view_tx,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Read model for the rendering layer, republished after every event
    pub fn subscribe(&self) -> watch::Receiver<ListView> {
        self.view_tx.subscribe()
    }

    /// Booking lookups issued but not yet merged
    pub fn pending_enrichments(&self) -> usize {
        self.in_flight.len()
    }

    /// Initial load of the first page
    pub async fn activate(&mut self) -> Result<(), RetrievalError> {
        info!("Activating property list via {}", self.store.source_name());
        self.refresh().await
    }

    /// Reload page 1 and replace the collection with it. On failure the
    /// current collection and cursor are kept.
    pub async fn refresh(&mut self) -> Result<(), RetrievalError> {
        match self.fetcher.first_page().await {
            Ok(page) => {
                let effect = self.dispatch(Event::PageLoaded {
                    mode: LoadMode::Replace,
                    page,
                });
                self.start_enrichment(effect);
                Ok(())
            }
            Err(err) => {
                self.dispatch(Event::PageFailed);
                Err(err)
            }
        }
    }

    /// Append the next page, if there is one
    pub async fn load_more(&mut self) -> Result<(), RetrievalError> {
        let Some(token) = self.state.cursor().next_page else {
            debug!("No further pages to load");
            return Ok(());
        };

        self.dispatch(Event::PageRequested);
        match self.fetcher.fetch_page(token).await {
            Ok(page) => {
                let effect = self.dispatch(Event::PageLoaded {
                    mode: LoadMode::Append,
                    page,
                });
                self.start_enrichment(effect);
                Ok(())
            }
            Err(err) => {
                self.dispatch(Event::PageFailed);
                Err(err)
            }
        }
    }

    /// Keep loading pages until the cursor runs out, or stops moving forward
    pub async fn load_all(&mut self) -> Result<(), RetrievalError> {
        while let Some(requested) = self.state.cursor().next_page {
            self.load_more().await?;

            if let Some(next) = self.state.cursor().next_page {
                if next.number() <= requested.number() {
                    warn!(
                        "Page {} pointed back to page {}, stopping pagination",
                        requested, next
                    );
                    break;
                }
            }
        }
        Ok(())
    }

    pub fn merge_bookings(&mut self, id: PropertyId, bookings: Vec<Booking>) -> bool {
        let merged = self.state.merge_bookings(id, bookings);
        self.publish();
        merged
    }

    /// Delete on the server, then reload. The list is not touched until the
    /// reload confirms the deletion.
    pub async fn delete_property(&mut self, id: PropertyId) -> Result<(), ControllerError> {
        info!("Deleting property {}", id);
        if let Err(err) = self.store.delete_property(id).await {
            warn!("Delete of property {} failed: {}", id, err);
            return Err(err.into());
        }

        let effect = self.dispatch(Event::DeleteConfirmed(id));
        self.follow(effect).await?;
        Ok(())
    }

    pub async fn open_add_widget(&mut self) -> Result<(), RetrievalError> {
        self.transition(WidgetState::Adding).await
    }

    pub async fn close_widget(&mut self) -> Result<(), RetrievalError> {
        self.transition(WidgetState::Closed).await
    }

    /// Show the editor for `id` and load its full record into the edit buffer
    pub async fn open_editor(&mut self, id: PropertyId) -> Result<Property, ControllerError> {
        self.transition(WidgetState::Editing(id)).await?;

        let property = self.store.fetch_property(id).await.map_err(|err| {
            warn!("Could not load property {} for editing: {}", id, err);
            err
        })?;
        self.dispatch(Event::EditLoaded(property.clone()));
        Ok(property)
    }

    pub async fn toggle_add_widget(&mut self) -> Result<(), RetrievalError> {
        let next = if self.state.widget().add_visible() {
            WidgetState::Closed
        } else {
            WidgetState::Adding
        };
        self.transition(next).await
    }

    /// Close the editor if it is open, otherwise reopen it on the last edit target
    pub async fn toggle_update_widget(&mut self) -> Result<(), RetrievalError> {
        if self.state.widget().update_visible() {
            return self.transition(WidgetState::Closed).await;
        }

        match self.state.edit_buffer().map(|p| p.id) {
            Some(id) => self.transition(WidgetState::Editing(id)).await,
            None => {
                warn!("Update widget requested with no property selected");
                Ok(())
            }
        }
    }

    pub async fn begin_edit(&mut self, id: PropertyId) -> Result<Property, ControllerError> {
        self.open_editor(id).await
    }

    /// Merge one finished booking lookup. Returns `false` once nothing is in flight.
    pub async fn next_enrichment(&mut self) -> bool {
        match self.in_flight.join_next().await {
            Some(joined) => {
                self.absorb(joined);
                true
            }
            None => false,
        }
    }

    /// Merge every booking lookup that has already finished, without waiting
    pub fn drain_ready(&mut self) -> usize {
        let mut merged = 0;
        while let Some(joined) = self.in_flight.try_join_next() {
            self.absorb(joined);
            merged += 1;
        }
        merged
    }

    /// Wait for every outstanding booking lookup and merge it
    pub async fn settle(&mut self) {
        while self.next_enrichment().await {}
    }

    fn absorb(&mut self, joined: Result<Event, tokio::task::JoinError>) {
        let event = match joined {
            Ok(event) => event,
            Err(err) => {
                error!("Booking enrichment task failed: {}", err);
                Event::EnrichmentLost {
                    reason: err.to_string(),
                }
            }
        };
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: Event) -> Effect {
        let effect = self.state.apply(event);
        self.publish();
        effect
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.state.view());
    }

    async fn transition(&mut self, next: WidgetState) -> Result<(), RetrievalError> {
        let effect = self.dispatch(Event::WidgetChanged(next));
        self.follow(effect).await
    }

    async fn follow(&mut self, effect: Effect) -> Result<(), RetrievalError> {
        match effect {
            Effect::Refresh => self.refresh().await,
            other => {
                self.start_enrichment(other);
                Ok(())
            }
        }
    }

    fn start_enrichment(&mut self, effect: Effect) {
        let Effect::Enrich { generation, ids } = effect else {
            return;
        };

        debug!(
            "Requesting bookings for {} properties (generation {})",
            ids.len(),
            generation
        );
        for property_id in ids {
            let aggregator = self.aggregator.clone();
            self.in_flight.spawn(async move {
                match aggregator.fetch_bookings(property_id).await {
                    Ok(bookings) => Event::BookingsLoaded {
                        generation,
                        property_id,
                        bookings,
                    },
                    Err(err) => Event::BookingsFailed {
                        generation,
                        property_id,
                        error: err.to_string(),
                    },
                }
            });
        }
    }
}
