//! Session lifecycle.
//!
//! A [`Session`] tracks the signed-in user and owns that user's
//! [`CartService`]. Signing in builds the service and warms it with a
//! fetch; signing out drops local state while the store rows live on for
//! the next sign-in. Cart access while signed out is an error, not an
//! empty cart.

use luxe_core::UserId;
use tracing::{info, instrument};

use crate::services::cart::{CartContext, CartService};
use crate::store::RemoteStore;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Not signed in")]
    SignedOut,
}

/// One client session over a store.
pub struct Session<S> {
    store: S,
    cart: Option<CartService<S>>,
}

impl<S: RemoteStore> Session<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store, cart: None }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.cart.is_some()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.cart.as_ref().map(CartService::user_id)
    }

    /// Sign a user in and warm their cart from the store.
    ///
    /// A failed warming fetch does not block the sign-in; the cart starts
    /// empty and the next fetch reconciles. Signing in over an existing
    /// session replaces it.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn sign_in(&mut self, user_id: UserId) {
        let cart = CartService::new(CartContext {
            user_id,
            store: self.store.clone(),
        });
        // Failures are logged inside fetch; the session still opens
        let _ = cart.fetch().await;
        self.cart = Some(cart);
        info!("Signed in");
    }

    /// Sign out, dropping local cart state. Store rows are untouched and
    /// come back on the next sign-in.
    #[instrument(skip(self))]
    pub fn sign_out(&mut self) {
        self.cart = None;
        info!("Signed out");
    }

    /// The signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SignedOut`] when no user is signed in.
    pub fn cart(&self) -> Result<&CartService<S>, SessionError> {
        self.cart.as_ref().ok_or(SessionError::SignedOut)
    }
}
