//! The storefront's collections and their seed data.
//!
//! The default seed is embedded from `data/*.json`; a directory with the same file
//! names can be loaded instead (see `[seed] dir` in the app config).

use crate::errors::{Error, Result};
use crate::models::{AdoptionRequest, ContactMessage, Order, Pet, Product, User};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, instrument};

const USERS_SEED: &str = include_str!("../../data/users.json");
const PETS_SEED: &str = include_str!("../../data/pets.json");
const PRODUCTS_SEED: &str = include_str!("../../data/products.json");
const ORDERS_SEED: &str = include_str!("../../data/orders.json");
const ADOPTION_REQUESTS_SEED: &str = include_str!("../../data/adoption_requests.json");
const CONTACT_MESSAGES_SEED: &str = include_str!("../../data/contact_messages.json");

/// Every collection the storefront reads and mutates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub users: Vec<User>,
    pub pets: Vec<Pet>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub adoption_requests: Vec<AdoptionRequest>,
    pub contact_messages: Vec<ContactMessage>,
}

impl Dataset {
    /// Parses the seed bundled with the crate.
    pub fn seed() -> Result<Self> {
        let dataset = Self {
            users: parse_collection("users.json", USERS_SEED)?,
            pets: parse_collection("pets.json", PETS_SEED)?,
            products: parse_collection("products.json", PRODUCTS_SEED)?,
            orders: parse_collection("orders.json", ORDERS_SEED)?,
            adoption_requests: parse_collection(
                "adoption_requests.json",
                ADOPTION_REQUESTS_SEED,
            )?,
            contact_messages: parse_collection("contact_messages.json", CONTACT_MESSAGES_SEED)?,
        };
        debug!(
            users = dataset.users.len(),
            pets = dataset.pets.len(),
            products = dataset.products.len(),
            "Parsed embedded seed dataset"
        );
        Ok(dataset)
    }

    /// Loads a seed from `dir`. Missing files yield empty collections.
    #[instrument]
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let dataset = Self {
            users: read_collection(dir, "users.json")?,
            pets: read_collection(dir, "pets.json")?,
            products: read_collection(dir, "products.json")?,
            orders: read_collection(dir, "orders.json")?,
            adoption_requests: read_collection(dir, "adoption_requests.json")?,
            contact_messages: read_collection(dir, "contact_messages.json")?,
        };
        info!(
            "Loaded seed dataset from {:?}: {} users, {} pets, {} products",
            dir,
            dataset.users.len(),
            dataset.pets.len(),
            dataset.products.len()
        );
        Ok(dataset)
    }
}

fn parse_collection<T: DeserializeOwned>(name: &str, contents: &str) -> Result<Vec<T>> {
    serde_json::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed file {name}: {e}"),
    })
}

fn read_collection<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = dir.join(name);
    if !path.exists() {
        debug!("Seed file {:?} not present, starting empty", path);
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.display()),
    })?;
    parse_collection(name, &contents)
}
