//! Client-side controller for a host's list of rental properties: paginated
//! retrieval, per-property booking enrichment, derived booking totals and the
//! add/edit/delete workflow.

pub mod api;
pub mod bookings;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod report;
