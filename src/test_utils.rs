//! Shared test utilities for the petstore core.
//!
//! This module provides helpers for building stores, storage backends and
//! records with sensible defaults.

use crate::{
    core::{pet::NewPet, product::NewProduct},
    errors::Result,
    models::{
        AdoptionRequest, AdoptionStatus, CartItem, ItemKind, Pet, PetCategory, PetStatus,
        ProductCategory, Role, User,
    },
    store::{Dataset, Store},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A store holding the embedded seed data.
/// This is the standard setup for repository tests.
pub fn setup_test_store() -> Result<Store> {
    init_test_tracing();
    Store::seeded()
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::storage::create_tables(&db).await?;
    Ok(db)
}

/// A pet listing with sensible defaults.
///
/// # Defaults
/// * `category`: dog
/// * `age`: 12 months
/// * `price`: 500.0
pub fn test_new_pet(name: &str) -> NewPet {
    NewPet {
        name: name.to_string(),
        category: PetCategory::Dog,
        breed: "Mixed".to_string(),
        age: 12,
        price: 500.0,
        description: "Friendly and house trained".to_string(),
        image_url: String::new(),
    }
}

/// A product listing with the given price and 10 units in stock.
pub fn test_new_product(name: &str, price: f64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category: ProductCategory::Toy,
        price,
        description: "Test product".to_string(),
        image_url: String::new(),
        stock: 10,
    }
}

/// A regular account with password `password123`.
pub fn test_user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        name: "Test User".to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        role: Role::User,
        created_at: Utc::now(),
    }
}

/// A cart line whose line id is derived from `item_id`.
pub fn test_cart_item(item_id: &str, kind: ItemKind, price: f64, quantity: u32) -> CartItem {
    CartItem {
        id: format!("cart-item-{item_id}"),
        kind,
        item_id: item_id.to_string(),
        name: format!("Item {item_id}"),
        price,
        quantity,
        image_url: String::new(),
    }
}

/// A store with one available pet, one user (`u1`) and one pending adoption
/// request for that pet.
pub async fn setup_store_with_adoption(pet_id: &str, request_id: &str) -> Store {
    init_test_tracing();
    let now = Utc::now();
    let pet = Pet {
        id: pet_id.to_string(),
        name: "Rex".to_string(),
        category: PetCategory::Dog,
        breed: "Beagle".to_string(),
        age: 24,
        price: 300.0,
        description: "Loves walks".to_string(),
        image_url: String::new(),
        status: PetStatus::Available,
        added_at: now,
    };
    let request = AdoptionRequest {
        id: request_id.to_string(),
        user_id: "u1".to_string(),
        pet_id: pet_id.to_string(),
        status: AdoptionStatus::Pending,
        request_reason: "Fenced garden".to_string(),
        created_at: now,
        updated_at: now,
    };

    Store::new(Dataset {
        users: vec![test_user("u1", "u1@example.com")],
        pets: vec![pet],
        adoption_requests: vec![request],
        ..Dataset::default()
    })
}

/// Forces a pet's status without going through the repositories.
pub async fn set_pet_status_for_test(store: &Store, pet_id: &str, status: PetStatus) {
    store
        .write(|data| {
            if let Some(pet) = data.pets.iter_mut().find(|p| p.id == pet_id) {
                pet.status = status;
            }
        })
        .await;
}
