//! HTTP relay between the storefront and the outbound mail provider.
//!
//! The storefront never talks to the provider itself; it queues mail rows and
//! its notifier replays each one against this service, which renders the
//! fixed templates and makes the single authenticated provider call.

pub mod error;
pub mod handlers;
pub mod provider;
pub mod templates;
