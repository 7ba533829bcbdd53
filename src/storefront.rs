//! Storefront facade: one handle wiring configuration, the shared store, persisted
//! client state and the checkout together.

use crate::{
    cart::CartState,
    checkout::Checkout,
    config::{app::AppConfig, storage::open_storage},
    core::{pet, product},
    errors::{Error, Result},
    models::{Cart, NewCartItem, Order, PetStatus},
    session::Session,
    storage::Storage,
    store::{Dataset, Store},
};
use std::sync::Arc;
use tracing::{info, instrument};

/// A running storefront.
#[derive(Debug)]
pub struct Storefront {
    store: Store,
    storage: Arc<dyn Storage>,
    session: Session,
    cart: CartState,
    checkout: Checkout,
}

impl Storefront {
    /// Loads the seed, opens storage and restores the session and cart from it.
    ///
    /// # Errors
    /// Returns an error if the seed cannot be parsed or storage cannot be opened.
    #[instrument(skip(config))]
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let dataset = match &config.seed.dir {
            Some(dir) => Dataset::from_dir(dir)?,
            None => Dataset::seed()?,
        };
        let storage = open_storage(&config.storage).await?;
        Self::with_parts(Store::new(dataset), storage, config).await
    }

    /// Builds a storefront over an existing store and storage backend.
    pub async fn with_parts(
        store: Store,
        storage: Arc<dyn Storage>,
        config: &AppConfig,
    ) -> Result<Self> {
        let session = Session::restore(store.clone(), Arc::clone(&storage)).await?;
        let cart = CartState::restore(Arc::clone(&storage)).await?;
        let checkout = Checkout::from_config(store.clone(), config);

        info!(
            "Storefront ready (signed in: {}, cart lines: {})",
            session.is_authenticated(),
            cart.snapshot().items.len()
        );
        Ok(Self {
            store,
            storage,
            session,
            cart,
            checkout,
        })
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.storage)
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    #[must_use]
    pub const fn checkout(&self) -> &Checkout {
        &self.checkout
    }

    /// Puts `quantity` units of a listed product into the cart.
    ///
    /// # Errors
    /// Returns `Error::ProductNotFound` for an unknown product, plus any cart error.
    pub async fn add_product_to_cart(&self, product_id: &str, quantity: u32) -> Result<Cart> {
        let product = product::get_product(&self.store, product_id)
            .await
            .ok_or_else(|| Error::ProductNotFound {
                id: product_id.to_string(),
            })?;
        self.cart
            .add_item(NewCartItem::from_product(&product, quantity))
            .await
    }

    /// Puts an available pet into the cart.
    ///
    /// # Errors
    /// Returns `Error::PetNotFound` for an unknown pet and `Error::PetUnavailable`
    /// when the pet is not available.
    pub async fn add_pet_to_cart(&self, pet_id: &str) -> Result<Cart> {
        let pet = pet::get_pet(&self.store, pet_id)
            .await
            .ok_or_else(|| Error::PetNotFound {
                id: pet_id.to_string(),
            })?;
        if pet.status != PetStatus::Available {
            return Err(Error::PetUnavailable {
                id: pet.id,
                status: pet.status,
            });
        }
        self.cart.add_item(NewCartItem::from_pet(&pet)).await
    }

    /// Checks out the current cart for the signed-in user.
    ///
    /// # Errors
    /// See [`Checkout::place_order`].
    pub async fn place_order(&self) -> Result<Order> {
        self.checkout.place_order(&self.session, &self.cart).await
    }
}
