//! Core types for the LUXE storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod status;

pub use address::{AddressError, AddressField, ShippingAddress, ShippingInput};
pub use id::*;
pub use status::OrderStatus;
