//! Product business logic - Handles all product-related operations.
//!
//! This module provides functions for listing, retrieving, adding and updating
//! products in the shop inventory. Stock is managed here by admins only; placing an
//! order does not consume it.

use crate::{
    core::{generate_id, require_price, require_text},
    errors::{Error, Result},
    models::{Product, ProductCategory},
    store::{Store, StoreEvent},
};
use chrono::Utc;
use tracing::{debug, info, instrument};

/// Details for a product added by an admin.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub category: ProductCategory,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub stock: u32,
}

/// Fields an admin may change on an existing product; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub stock: Option<u32>,
}

/// Retrieves every product in dataset order.
pub async fn list_products(store: &Store) -> Vec<Product> {
    store.read(|data| data.products.clone()).await
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product(store: &Store, product_id: &str) -> Option<Product> {
    let product = store
        .read(|data| data.products.iter().find(|p| p.id == product_id).cloned())
        .await;
    debug!(
        "Product lookup '{}': found = {}",
        product_id,
        product.is_some()
    );
    product
}

/// Products in one category, or all products for `None`.
pub async fn list_products_by_category(
    store: &Store,
    category: Option<ProductCategory>,
) -> Vec<Product> {
    store
        .read(|data| {
            data.products
                .iter()
                .filter(|p| category.is_none_or(|c| p.category == c))
                .cloned()
                .collect()
        })
        .await
}

/// The first `count` products, as shown on the landing page.
pub async fn featured_products(store: &Store, count: usize) -> Vec<Product> {
    store
        .read(|data| data.products.iter().take(count).cloned().collect())
        .await
}

/// Creates a new product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
#[instrument(skip(store))]
pub async fn add_product(store: &Store, new_product: NewProduct) -> Result<Product> {
    require_text("Product name", &new_product.name)?;
    require_price(new_product.price)?;

    let product = Product {
        id: generate_id("prod"),
        name: new_product.name.trim().to_string(),
        category: new_product.category,
        price: new_product.price,
        description: new_product.description,
        image_url: new_product.image_url,
        stock: new_product.stock,
        added_at: Utc::now(),
    };
    store.write(|data| data.products.push(product.clone())).await;

    info!(
        "Added new product '{}' (ID: {}) with price {}",
        product.name, product.id, product.price
    );
    store.publish(StoreEvent::ProductChanged {
        product_id: product.id.clone(),
    });
    Ok(product)
}

/// Applies `update` to an existing product.
///
/// # Errors
/// Returns an error if:
/// - A new name is empty or whitespace-only
/// - A new price is negative or not finite
/// - The product does not exist
#[instrument(skip(store))]
pub async fn update_product(
    store: &Store,
    product_id: &str,
    update: ProductUpdate,
) -> Result<Product> {
    if let Some(name) = &update.name {
        require_text("Product name", name)?;
    }
    if let Some(price) = update.price {
        require_price(price)?;
    }

    let product = store
        .write(|data| {
            let product = data
                .products
                .iter_mut()
                .find(|p| p.id == product_id)
                .ok_or_else(|| Error::ProductNotFound {
                    id: product_id.to_string(),
                })?;

            if let Some(name) = update.name {
                product.name = name.trim().to_string();
            }
            if let Some(price) = update.price {
                product.price = price;
            }
            if let Some(description) = update.description {
                product.description = description;
            }
            if let Some(stock) = update.stock {
                product.stock = stock;
            }
            Ok::<_, Error>(product.clone())
        })
        .await?;

    info!("Updated product {}", product_id);
    store.publish(StoreEvent::ProductChanged {
        product_id: product_id.to_string(),
    });
    Ok(product)
}

/// Sets the stock count of a product.
///
/// # Errors
/// Returns `Error::ProductNotFound` if the product does not exist.
pub async fn set_stock(store: &Store, product_id: &str, stock: u32) -> Result<Product> {
    update_product(
        store,
        product_id,
        ProductUpdate {
            stock: Some(stock),
            ..ProductUpdate::default()
        },
    )
    .await
}
