//! LUXE Core - Shared domain types.
//!
//! This crate provides common types used across all LUXE client components:
//! - `storefront` - The storefront client library (cart, checkout, catalog)
//! - `cli` - Command-line demo and tooling
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, order statuses, and the
//!   validated shipping address

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
