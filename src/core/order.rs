//! Order business logic - creation, payment confirmation and status changes.
//!
//! An order starts `pending` when the cart is checked out, moves to `processing`
//! once payment is collected, and from there is moved by admins. Admin status
//! changes are direct overwrites with no transition rules.

use crate::{
    config::app::PricingConfig,
    core::generate_id,
    errors::{Error, Result},
    models::{CartItem, Order, OrderStatus, PaymentMethod},
    store::{Store, StoreEvent},
};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Price breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
}

impl OrderTotals {
    /// `subtotal + tax + shipping`; shipping is only charged on a positive subtotal.
    #[must_use]
    pub fn compute(subtotal: f64, pricing: &PricingConfig) -> Self {
        let tax = subtotal * pricing.tax_rate;
        let shipping = if subtotal > 0.0 {
            pricing.shipping_fee
        } else {
            0.0
        };
        Self {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }

    /// Totals for a list of lines.
    #[must_use]
    pub fn for_items(items: &[CartItem], pricing: &PricingConfig) -> Self {
        Self::compute(items.iter().map(CartItem::line_total).sum(), pricing)
    }
}

/// Records a pending order for `user_id` with a snapshot of `items`.
///
/// # Errors
/// Returns `Error::EmptyCart` if `items` is empty.
#[instrument(skip(store, items, pricing), fields(lines = items.len()))]
pub async fn create_order(
    store: &Store,
    user_id: &str,
    items: Vec<CartItem>,
    pricing: &PricingConfig,
) -> Result<Order> {
    if items.is_empty() {
        return Err(Error::EmptyCart);
    }

    let totals = OrderTotals::for_items(&items, pricing);
    let now = Utc::now();
    let order = Order {
        id: generate_id("ORD"),
        user_id: user_id.to_string(),
        items,
        subtotal: totals.subtotal,
        tax: totals.tax,
        shipping: totals.shipping,
        total: totals.total,
        status: OrderStatus::Pending,
        payment_method: None,
        created_at: now,
        updated_at: now,
    };
    store.write(|data| data.orders.push(order.clone())).await;

    info!(
        "Order created: {} for user {} (total {:.2})",
        order.id, user_id, order.total
    );
    store.publish(StoreEvent::OrderCreated {
        order_id: order.id.clone(),
    });
    Ok(order)
}

/// Finds an order by id.
pub async fn get_order(store: &Store, order_id: &str) -> Option<Order> {
    store
        .read(|data| data.orders.iter().find(|o| o.id == order_id).cloned())
        .await
}

/// Every order in dataset order.
pub async fn list_orders(store: &Store) -> Vec<Order> {
    store.read(|data| data.orders.clone()).await
}

/// A user's orders, most recent first.
pub async fn list_orders_for_user(store: &Store, user_id: &str) -> Vec<Order> {
    let mut orders: Vec<Order> = store
        .read(|data| {
            data.orders
                .iter()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect()
        })
        .await;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    debug!("Fetched {} orders for user {}", orders.len(), user_id);
    orders
}

/// Marks a pending order as paid: it becomes `processing` with `method` recorded.
///
/// # Errors
/// Returns an error if:
/// - The order does not exist
/// - The order is no longer pending
#[instrument(skip(store))]
pub async fn confirm_payment(store: &Store, order_id: &str, method: PaymentMethod) -> Result<Order> {
    let order = store
        .write(|data| {
            let order = data
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| Error::OrderNotFound {
                    id: order_id.to_string(),
                })?;
            if order.status != OrderStatus::Pending {
                return Err(Error::InvalidOrderState {
                    id: order_id.to_string(),
                    status: order.status,
                });
            }
            order.status = OrderStatus::Processing;
            order.payment_method = Some(method);
            order.updated_at = Utc::now();
            Ok::<_, Error>(order.clone())
        })
        .await?;

    info!("Payment collected for order {} via {}", order_id, method);
    store.publish(StoreEvent::OrderStatusChanged {
        order_id: order_id.to_string(),
        status: OrderStatus::Processing,
    });
    Ok(order)
}

/// Overwrites an order's status.
///
/// # Errors
/// Returns `Error::OrderNotFound` if the order does not exist.
#[instrument(skip(store))]
pub async fn set_order_status(store: &Store, order_id: &str, status: OrderStatus) -> Result<Order> {
    let order = store
        .write(|data| {
            let order = data
                .orders
                .iter_mut()
                .find(|o| o.id == order_id)
                .ok_or_else(|| Error::OrderNotFound {
                    id: order_id.to_string(),
                })?;
            order.status = status;
            order.updated_at = Utc::now();
            Ok::<_, Error>(order.clone())
        })
        .await?;

    info!("Order {} status set to {}", order_id, status);
    store.publish(StoreEvent::OrderStatusChanged {
        order_id: order_id.to_string(),
        status,
    });
    Ok(order)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::ItemKind;
    use crate::test_utils::*;

    #[test]
    fn test_totals_formula() {
        let totals = OrderTotals::compute(1000.0, &PricingConfig::default());
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.tax, 180.0);
        assert_eq!(totals.shipping, 100.0);
        assert_eq!(totals.total, 1280.0);
    }

    #[test]
    fn test_no_shipping_on_zero_subtotal() {
        let totals = OrderTotals::compute(0.0, &PricingConfig::default());
        assert_eq!(totals.shipping, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[tokio::test]
    async fn test_create_order_snapshot_and_totals() -> Result<()> {
        let store = setup_test_store()?;
        let items = vec![test_cart_item("prod1", ItemKind::Product, 100.0, 2)];

        let order = create_order(&store, "user1", items.clone(), &PricingConfig::default()).await?;
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items, items);
        assert_eq!(order.subtotal, 200.0);
        assert_eq!(order.tax, 36.0);
        assert_eq!(order.shipping, 100.0);
        assert_eq!(order.total, 336.0);
        assert!(order.id.starts_with("ORD-"));

        assert_eq!(get_order(&store, &order.id).await, Some(order));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_items() -> Result<()> {
        let store = setup_test_store()?;
        let result = create_order(&store, "user1", Vec::new(), &PricingConfig::default()).await;
        assert!(matches!(result, Err(Error::EmptyCart)));
        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_payment_only_from_pending() -> Result<()> {
        let store = setup_test_store()?;
        let items = vec![test_cart_item("prod2", ItemKind::Product, 250.0, 1)];
        let order = create_order(&store, "user1", items, &PricingConfig::default()).await?;

        let paid = confirm_payment(&store, &order.id, PaymentMethod::Card).await?;
        assert_eq!(paid.status, OrderStatus::Processing);
        assert_eq!(paid.payment_method, Some(PaymentMethod::Card));

        let again = confirm_payment(&store, &order.id, PaymentMethod::Cod).await;
        assert!(matches!(
            again,
            Err(Error::InvalidOrderState {
                status: OrderStatus::Processing,
                ..
            })
        ));

        let missing = confirm_payment(&store, "ORD-missing", PaymentMethod::Card).await;
        assert!(matches!(missing, Err(Error::OrderNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_order_status_is_unguarded() -> Result<()> {
        let store = setup_test_store()?;

        let delivered = set_order_status(&store, "ORD-002", OrderStatus::Delivered).await?;
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let reopened = set_order_status(&store, "ORD-002", OrderStatus::Processing).await?;
        assert_eq!(reopened.status, OrderStatus::Processing);

        let result = set_order_status(&store, "nope", OrderStatus::Cancelled).await;
        assert!(matches!(result, Err(Error::OrderNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_for_user_most_recent_first() -> Result<()> {
        let store = setup_test_store()?;
        let items = vec![test_cart_item("prod1", ItemKind::Product, 1200.0, 1)];
        let newest = create_order(&store, "user1", items, &PricingConfig::default()).await?;

        let orders = list_orders_for_user(&store, "user1").await;
        assert_eq!(orders[0].id, newest.id);
        assert!(orders.iter().all(|o| o.user_id == "user1"));
        assert!(orders.len() >= 2);
        assert!(list_orders(&store).await.len() > orders.len());
        Ok(())
    }
}
