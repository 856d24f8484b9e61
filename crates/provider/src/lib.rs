//! Client for the notification provider's webhook-management API.
//!
//! The provider delivers transaction events only for the addresses registered
//! on a webhook. [`WebhookApiClient`] reads and replaces that address list and
//! implements [`holdersync_core::watchlist::WatchlistProviderTrait`].

mod client;

pub use client::{WebhookApiClient, DEFAULT_PROVIDER_API_URL};
