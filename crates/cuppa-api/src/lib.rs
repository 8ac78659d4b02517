//! cuppa-api - HTTP API client for the cuppa coffee-subscription backend.
//!
//! The [`ApiClient`] owns the authenticated request pipeline: preflight
//! token-expiry checks, transparent refresh, a single retry on 401, and
//! uniform response decoding. Endpoint methods are grouped by resource in
//! the `auth`, `content`, `orders`, and `subscriptions` modules.

pub mod auth;
mod client;
pub mod content;
mod envelope;
mod error_decode;
pub mod orders;
pub mod subscriptions;
mod validate;

pub use client::{ApiClient, RawResponse, accept, decode, required};
pub use envelope::{Envelope, Meta, Page};
