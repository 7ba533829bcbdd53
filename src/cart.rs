//! Cart state container.
//!
//! The cart lives in memory, is written to [`Storage`] under [`CART_KEY`] after
//! every mutation, and is published on a watch channel once the write succeeded.
//! If persisting fails the in-memory cart is left as it was.

use crate::{
    core::{generate_id, require_price},
    errors::{Error, Result},
    models::{Cart, CartItem, NewCartItem},
    storage::{CART_KEY, Storage, load_json, save_json},
};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument};

/// The shopper's cart.
#[derive(Debug)]
pub struct CartState {
    storage: Arc<dyn Storage>,
    // Serializes mutations so persist-then-publish happens in order
    cart: Mutex<Cart>,
    published: watch::Sender<Cart>,
}

impl CartState {
    /// Restores the cart persisted in `storage`, re-deriving its total and
    /// dropping lines with no units.
    ///
    /// A stored value that does not decode is removed and the cart starts empty.
    #[instrument(skip_all)]
    pub async fn restore(storage: Arc<dyn Storage>) -> Result<Self> {
        let mut cart: Cart = load_json(storage.as_ref(), CART_KEY)
            .await?
            .unwrap_or_default();
        cart.items.retain(|line| line.quantity > 0);
        cart.recompute_total();
        debug!("Restored cart with {} lines", cart.items.len());

        let (published, _) = watch::channel(cart.clone());
        Ok(Self {
            storage,
            cart: Mutex::new(cart),
            published,
        })
    }

    /// Current contents.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.published.borrow().clone()
    }

    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.published.borrow().item_count()
    }

    /// Watches cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.published.subscribe()
    }

    /// Adds `item`, merging into an existing line for the same pet or product.
    ///
    /// # Errors
    /// Returns `Error::Validation` for a zero quantity or a merged quantity past
    /// `u32::MAX`, `Error::InvalidAmount` for a negative or non-finite price, or a
    /// storage error.
    #[instrument(skip(self, item), fields(item_id = %item.item_id, kind = %item.kind))]
    pub async fn add_item(&self, item: NewCartItem) -> Result<Cart> {
        if item.quantity == 0 {
            return Err(Error::validation("Quantity must be at least 1"));
        }
        require_price(item.price)?;

        self.mutate(|cart| {
            if let Some(line) = cart
                .items
                .iter_mut()
                .find(|line| line.item_id == item.item_id && line.kind == item.kind)
            {
                line.quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| Error::validation("Quantity is too large"))?;
                debug!("Merged into line {} (qty {})", line.id, line.quantity);
            } else {
                cart.items.push(CartItem {
                    id: generate_id("cart-item"),
                    kind: item.kind,
                    item_id: item.item_id,
                    name: item.name,
                    price: item.price,
                    quantity: item.quantity,
                    image_url: item.image_url,
                });
            }
            Ok(())
        })
        .await
    }

    /// Drops a line. Unknown ids leave the cart as it is.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, line_id: &str) -> Result<Cart> {
        self.mutate(|cart| {
            cart.items.retain(|line| line.id != line_id);
            Ok(())
        })
        .await
    }

    /// Sets a line's quantity; zero or less removes the line.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, line_id: &str, quantity: i64) -> Result<Cart> {
        let Ok(quantity) = u32::try_from(quantity) else {
            if quantity <= 0 {
                return self.remove_item(line_id).await;
            }
            return Err(Error::validation(format!("Quantity {quantity} is too large")));
        };
        if quantity == 0 {
            return self.remove_item(line_id).await;
        }

        self.mutate(|cart| {
            if let Some(line) = cart.items.iter_mut().find(|line| line.id == line_id) {
                line.quantity = quantity;
            }
            Ok(())
        })
        .await
    }

    /// Empties the cart.
    pub async fn clear(&self) -> Result<Cart> {
        let cart = self
            .mutate(|cart| {
                cart.items.clear();
                Ok(())
            })
            .await?;
        info!("Cart cleared");
        Ok(cart)
    }

    async fn mutate(&self, f: impl FnOnce(&mut Cart) -> Result<()>) -> Result<Cart> {
        let mut current = self.cart.lock().await;
        let mut next = current.clone();
        f(&mut next)?;
        next.recompute_total();

        save_json(self.storage.as_ref(), CART_KEY, &next).await?;
        *current = next.clone();
        self.published.send_replace(next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::ItemKind;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    fn product(item_id: &str, price: f64, quantity: u32) -> NewCartItem {
        NewCartItem {
            kind: ItemKind::Product,
            item_id: item_id.to_string(),
            name: format!("Product {item_id}"),
            price,
            quantity,
            image_url: String::new(),
        }
    }

    async fn empty_cart() -> Result<(CartState, Arc<MemoryStorage>)> {
        let storage = Arc::new(MemoryStorage::new());
        let cart = CartState::restore(storage.clone()).await?;
        Ok((cart, storage))
    }

    #[tokio::test]
    async fn test_add_merges_same_item() -> Result<()> {
        let (cart, _) = empty_cart().await?;

        let after_first = cart.add_item(product("prod1", 100.0, 2)).await?;
        assert_eq!(after_first.items.len(), 1);
        assert_eq!(after_first.total, 200.0);

        let after_second = cart.add_item(product("prod1", 100.0, 1)).await?;
        assert_eq!(after_second.items.len(), 1);
        assert_eq!(after_second.items[0].quantity, 3);
        assert_eq!(after_second.total, 300.0);
        assert_eq!(cart.item_count(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_id_different_kind_stays_separate() -> Result<()> {
        let (cart, _) = empty_cart().await?;
        cart.add_item(product("x1", 10.0, 1)).await?;

        let mut pet = product("x1", 500.0, 1);
        pet.kind = ItemKind::Pet;
        let snapshot = cart.add_item(pet).await?;

        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.total, 510.0);
        assert!(snapshot.items[0].id.starts_with("cart-item-"));
        assert_ne!(snapshot.items[0].id, snapshot.items[1].id);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_rejects_bad_input() -> Result<()> {
        let (cart, storage) = empty_cart().await?;

        let zero = cart.add_item(product("prod1", 10.0, 0)).await;
        assert!(matches!(zero, Err(Error::Validation { .. })));

        let negative = cart.add_item(product("prod1", -5.0, 1)).await;
        assert!(matches!(negative, Err(Error::InvalidAmount { .. })));

        assert!(cart.snapshot().is_empty());
        assert!(storage.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_past_u32_max_is_rejected() -> Result<()> {
        let (cart, storage) = empty_cart().await?;
        let full = cart.add_item(product("prod1", 1.0, u32::MAX)).await?;
        assert_eq!(cart.item_count(), u64::from(u32::MAX));

        let result = cart.add_item(product("prod1", 1.0, 1)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert_eq!(cart.snapshot(), full);
        let stored: Cart = load_json(storage.as_ref(), CART_KEY).await?.unwrap();
        assert_eq!(stored, full);

        // Counting units across lines does not wrap either
        cart.add_item(product("prod2", 1.0, u32::MAX)).await?;
        assert_eq!(cart.item_count(), 2 * u64::from(u32::MAX));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() -> Result<()> {
        let (cart, _) = empty_cart().await?;
        cart.add_item(product("prod1", 100.0, 1)).await?;
        let line_id = cart.add_item(product("prod2", 50.0, 2)).await?.items[1]
            .id
            .clone();

        let once = cart.remove_item(&line_id).await?;
        let twice = cart.remove_item(&line_id).await?;
        assert_eq!(once, twice);
        assert_eq!(twice.total, 100.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_quantity() -> Result<()> {
        let (cart, _) = empty_cart().await?;
        let line_id = cart.add_item(product("prod1", 25.0, 1)).await?.items[0]
            .id
            .clone();

        let updated = cart.set_quantity(&line_id, 4).await?;
        assert_eq!(updated.items[0].quantity, 4);
        assert_eq!(updated.total, 100.0);

        // Unknown lines are ignored
        assert_eq!(cart.set_quantity("cart-item-nope", 9).await?, updated);

        let removed = cart.set_quantity(&line_id, 0).await?;
        assert!(removed.is_empty());
        assert_eq!(removed.total, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_quantity_removes_line() -> Result<()> {
        let (cart, _) = empty_cart().await?;
        let line_id = cart.add_item(product("prod1", 25.0, 3)).await?.items[0]
            .id
            .clone();

        assert!(cart.set_quantity(&line_id, -2).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_persists_empty_cart() -> Result<()> {
        let (cart, storage) = empty_cart().await?;
        cart.add_item(product("prod1", 25.0, 3)).await?;

        cart.clear().await?;
        let stored: Cart = load_json(storage.as_ref(), CART_KEY).await?.unwrap();
        assert!(stored.is_empty());
        assert_eq!(stored.total, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_recomputes_total() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        let stale = r#"{"items":[{"id":"cart-item-1","type":"product","itemId":"prod2",
            "name":"Toy","price":250,"quantity":2,"imageUrl":""}],"total":1}"#;
        storage.set_item(CART_KEY, stale).await?;

        let cart = CartState::restore(storage).await?;
        assert_eq!(cart.snapshot().total, 500.0);
        assert_eq!(cart.item_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_drops_empty_lines() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        let stored = r#"{"items":[
            {"id":"cart-item-1","type":"product","itemId":"prod2","name":"Toy","price":250,"quantity":0,"imageUrl":""},
            {"id":"cart-item-2","type":"pet","itemId":"pet1","name":"Max","price":500,"quantity":1,"imageUrl":""}
        ],"total":750}"#;
        storage.set_item(CART_KEY, stored).await?;

        let cart = CartState::restore(storage).await?;
        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].id, "cart-item-2");
        assert_eq!(snapshot.total, 500.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_corrupted_cart() -> Result<()> {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(CART_KEY, "[[[").await?;

        let cart = CartState::restore(storage.clone()).await?;
        assert!(cart.snapshot().is_empty());
        assert!(storage.get_item(CART_KEY).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_survives_restart() -> Result<()> {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let first = CartState::restore(storage.clone()).await?;
        first.add_item(product("prod1", 1200.0, 1)).await?;
        let before = first.snapshot();
        drop(first);

        let second = CartState::restore(storage).await?;
        assert_eq!(second.snapshot(), before);
        Ok(())
    }

    #[derive(Debug)]
    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::other("disk full")))
        }

        async fn remove_item(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_cart_unchanged() -> Result<()> {
        let cart = CartState::restore(Arc::new(FailingStorage)).await?;
        let mut rx = cart.subscribe();

        assert!(cart.add_item(product("prod1", 10.0, 1)).await.is_err());
        assert!(cart.snapshot().is_empty());
        assert!(!rx.has_changed().unwrap());
        Ok(())
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() -> Result<()> {
        let (cart, _) = empty_cart().await?;
        let mut rx = cart.subscribe();

        cart.add_item(product("prod1", 10.0, 2)).await?;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().total, 20.0);
        Ok(())
    }
}
