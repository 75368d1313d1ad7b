//! LUXE Storefront client library.
//!
//! Product browsing, cart management, checkout, and order history for the
//! LUXE shop, backed by a remote row store accessed over REST. The cart and
//! checkout services own the client-side consistency model: every cart
//! mutation round-trips through the store before local state changes, and
//! stale responses from racing mutations are discarded.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod services;
pub mod session;
pub mod store;
