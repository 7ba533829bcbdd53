//! Storefront domain records.
//!
//! Field names serialize in camelCase and enum values in lowercase so that seed files
//! and persisted session/cart blobs keep the storefront's JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! display_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper
    #[default]
    User,
    /// Inventory, order and adoption manager
    Admin,
}

impl Role {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Where a freshly logged-in user lands.
    #[must_use]
    pub const fn home_route(self) -> &'static str {
        match self {
            Self::User => "/",
            Self::Admin => "/admin",
        }
    }
}

/// A registered account. Passwords are plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (`user-…` for accounts created at runtime)
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email, unique across users
    pub email: String,
    /// Plaintext password
    pub password: String,
    /// Account role
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may use admin operations.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum PetCategory {
    Dog,
    Cat,
    Bird,
    Fish,
    Rabbit,
    Other,
}

impl PetCategory {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Bird => "bird",
            Self::Fish => "fish",
            Self::Rabbit => "rabbit",
            Self::Other => "other",
        }
    }
}

/// Adoption state of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// Can be requested
    Available,
    /// Adopted; terminal
    Adopted,
    /// Has an open adoption request
    Pending,
}

impl PetStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Adopted => "adopted",
            Self::Pending => "pending",
        }
    }
}

/// A pet listed for adoption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub category: PetCategory,
    pub breed: String,
    /// Age in months
    pub age: u32,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub status: PetStatus,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum ProductCategory {
    Food,
    Toy,
    Accessory,
    Medicine,
    Grooming,
    Other,
}

impl ProductCategory {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Toy => "toy",
            Self::Accessory => "accessory",
            Self::Medicine => "medicine",
            Self::Grooming => "grooming",
            Self::Other => "other",
        }
    }
}

/// A shop product. Stock is tracked but purchases do not consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: ProductCategory,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub stock: u32,
    pub added_at: DateTime<Utc>,
}

/// What a cart line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// References a [`Pet`]
    Pet,
    /// References a [`Product`]
    Product,
}

impl ItemKind {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pet => "pet",
            Self::Product => "product",
        }
    }
}

/// One line of a cart or an order snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line id, unique within the cart
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Id of the referenced pet or product
    pub item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub image_url: String,
}

impl CartItem {
    /// `price × quantity`
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// A candidate line handed to the cart; the cart assigns its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub item_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub image_url: String,
}

impl NewCartItem {
    /// One unit of a product.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            kind: ItemKind::Product,
            item_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity,
            image_url: product.image_url.clone(),
        }
    }

    /// A pet; pets are always bought one at a time.
    #[must_use]
    pub fn from_pet(pet: &Pet) -> Self {
        Self {
            kind: ItemKind::Pet,
            item_id: pet.id.clone(),
            name: pet.name.clone(),
            price: pet.price,
            quantity: 1,
            image_url: pet.image_url.clone(),
        }
    }
}

/// The in-progress selection. `total` always equals the sum of line totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cart {
    /// Lines in insertion order
    pub items: Vec<CartItem>,
    /// Derived from `items`
    pub total: f64,
}

impl Cart {
    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Re-derives `total` from the lines.
    pub fn recompute_total(&mut self) {
        self.total = self.subtotal();
    }

    /// Total number of units across lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders are finished.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// How an order was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Card payment
    Card,
    /// Cash on delivery
    Cod,
}

impl PaymentMethod {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cod => "cod",
        }
    }
}

/// A checked-out cart. `items` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub tax: f64,
    #[serde(default)]
    pub shipping: f64,
    pub total: f64,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review state of an adoption request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum AdoptionStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdoptionStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A user's application to adopt a pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequest {
    pub id: String,
    pub user_id: String,
    pub pet_id: String,
    pub status: AdoptionStatus,
    pub request_reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A message left through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

display_as_str!(
    Role,
    PetCategory,
    PetStatus,
    ProductCategory,
    ItemKind,
    OrderStatus,
    PaymentMethod,
    AdoptionStatus,
);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_cart_item_uses_storefront_field_names() {
        let json = r#"{
            "id": "cart-item-1",
            "type": "product",
            "itemId": "prod1",
            "name": "Food",
            "price": 100,
            "quantity": 2,
            "imageUrl": "food.png"
        }"#;

        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ItemKind::Product);
        assert_eq!(item.item_id, "prod1");
        assert_eq!(item.line_total(), 200.0);

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["type"], "product");
        assert_eq!(back["imageUrl"], "food.png");
    }

    #[test]
    fn test_order_breakdown_fields_default_when_absent() {
        let json = r#"{
            "id": "ORD-1",
            "userId": "user1",
            "items": [],
            "total": 50,
            "status": "delivered",
            "createdAt": "2024-01-05T10:00:00Z",
            "updatedAt": "2024-01-06T10:00:00Z"
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.subtotal, 0.0);
        assert_eq!(order.payment_method, None);
        assert!(!order.status.is_open());
    }

    #[test]
    fn test_role_home_route() {
        assert_eq!(Role::Admin.home_route(), "/admin");
        assert_eq!(Role::User.home_route(), "/");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_cart_totals() {
        let mut cart = Cart {
            items: vec![
                CartItem {
                    id: "a".to_string(),
                    kind: ItemKind::Product,
                    item_id: "prod1".to_string(),
                    name: "Food".to_string(),
                    price: 100.0,
                    quantity: 2,
                    image_url: String::new(),
                },
                CartItem {
                    id: "b".to_string(),
                    kind: ItemKind::Pet,
                    item_id: "pet1".to_string(),
                    name: "Max".to_string(),
                    price: 2500.0,
                    quantity: 1,
                    image_url: String::new(),
                },
            ],
            total: 0.0,
        };
        cart.recompute_total();
        assert_eq!(cart.total, 2700.0);
        assert_eq!(cart.item_count(), 3);
    }
}
