//! Client-side services for the storefront.
//!
//! # Services
//!
//! - `cart` - Authoritative local view of one user's cart; every mutation
//!   round-trips through the store
//! - `checkout` - Shipping validation and order placement
//! - `catalog` - Product browsing with an in-process cache
//! - `orders` - Order history reads

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

pub use cart::{CartContext, CartService};
pub use catalog::Catalog;
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutState, CheckoutTotals};
pub use orders::OrderHistory;
