//! Data access layer for the host's GraphQL APIs.
//!
//! This crate provides:
//! - `GraphQlClient` - POSTs GraphQL documents, forwarding the browser cookie
//! - `SessionCookies` - Captures and re-issues the host session cookies
//! - `TimeoutConfig` - Per-client timeouts
//! - GraphQL documents for the storefront and CLI

mod client;
mod cookie;
pub mod documents;
mod timeout;

pub use client::*;
pub use cookie::*;
pub use timeout::*;
