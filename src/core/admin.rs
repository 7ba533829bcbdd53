//! Admin business logic - dashboard figures and role-guarded management actions.
//!
//! Every action takes the acting user and refuses non-admins before delegating to
//! the repository that owns the data.

use crate::{
    core::{adoption, order, product, user},
    errors::{Error, Result},
    models::{
        AdoptionRequest, AdoptionStatus, Order, OrderStatus, Pet, PetStatus, Product, Role, User,
    },
    store::Store,
};
use tracing::{info, warn};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    /// Pets that can still be requested
    pub available_pets: usize,
    /// Products with stock left
    pub products_in_inventory: usize,
    pub registered_users: usize,
    /// Requests awaiting review
    pub pending_adoptions: usize,
    /// Orders neither delivered nor cancelled
    pub open_orders: usize,
}

/// An adoption request with whatever its ids still resolve to.
#[derive(Debug, Clone, PartialEq)]
pub struct AdoptionDetails {
    pub request: AdoptionRequest,
    pub pet: Option<Pet>,
    pub user: Option<User>,
}

/// Fails unless `actor` is an admin.
///
/// # Errors
/// Returns `Error::PermissionDenied` for regular users.
pub fn ensure_admin(actor: &User) -> Result<()> {
    if actor.is_admin() {
        return Ok(());
    }
    warn!("User {} attempted an admin action", actor.id);
    Err(Error::PermissionDenied {
        message: format!("{} is not an admin", actor.email),
    })
}

/// Counts shown on the dashboard cards.
pub async fn dashboard_stats(store: &Store) -> DashboardStats {
    store
        .read(|data| DashboardStats {
            available_pets: data
                .pets
                .iter()
                .filter(|p| p.status == PetStatus::Available)
                .count(),
            products_in_inventory: data.products.iter().filter(|p| p.stock > 0).count(),
            registered_users: data.users.len(),
            pending_adoptions: data
                .adoption_requests
                .iter()
                .filter(|r| r.status == AdoptionStatus::Pending)
                .count(),
            open_orders: data.orders.iter().filter(|o| o.status.is_open()).count(),
        })
        .await
}

/// The `limit` most recent adoption requests across all users.
pub async fn recent_adoption_requests(store: &Store, limit: usize) -> Vec<AdoptionRequest> {
    let mut requests = adoption::list_adoption_requests(store).await;
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests.truncate(limit);
    requests
}

/// A request joined with its pet and requester. Dangling ids resolve to `None`.
pub async fn adoption_details(store: &Store, request_id: &str) -> Option<AdoptionDetails> {
    store
        .read(|data| {
            let request = data
                .adoption_requests
                .iter()
                .find(|r| r.id == request_id)?
                .clone();
            let pet = data.pets.iter().find(|p| p.id == request.pet_id).cloned();
            let user = data.users.iter().find(|u| u.id == request.user_id).cloned();
            Some(AdoptionDetails { request, pet, user })
        })
        .await
}

/// Approves an adoption request on behalf of `actor`.
///
/// # Errors
/// Returns an error if `actor` is not an admin or the request or pet is missing.
pub async fn approve(store: &Store, actor: &User, request_id: &str) -> Result<AdoptionRequest> {
    ensure_admin(actor)?;
    let request = adoption::approve_adoption(store, request_id).await?;
    info!("Adoption {} approved by {}", request_id, actor.id);
    Ok(request)
}

/// Rejects an adoption request on behalf of `actor`.
///
/// # Errors
/// Returns an error if `actor` is not an admin or the request or pet is missing.
pub async fn reject(store: &Store, actor: &User, request_id: &str) -> Result<AdoptionRequest> {
    ensure_admin(actor)?;
    let request = adoption::reject_adoption(store, request_id).await?;
    info!("Adoption {} rejected by {}", request_id, actor.id);
    Ok(request)
}

/// Moves an order to `status` on behalf of `actor`.
///
/// # Errors
/// Returns an error if `actor` is not an admin or the order is missing.
pub async fn update_order_status(
    store: &Store,
    actor: &User,
    order_id: &str,
    status: OrderStatus,
) -> Result<Order> {
    ensure_admin(actor)?;
    order::set_order_status(store, order_id, status).await
}

/// Changes another account's role on behalf of `actor`.
///
/// # Errors
/// Returns an error if `actor` is not an admin, tries to demote themselves, or the
/// user is missing.
pub async fn change_user_role(
    store: &Store,
    actor: &User,
    user_id: &str,
    role: Role,
) -> Result<User> {
    ensure_admin(actor)?;
    if actor.id == user_id && role != Role::Admin {
        return Err(Error::validation("Admins cannot remove their own admin role"));
    }
    user::set_user_role(store, user_id, role).await
}

/// Sets a product's stock on behalf of `actor`.
///
/// # Errors
/// Returns an error if `actor` is not an admin or the product is missing.
pub async fn restock_product(
    store: &Store,
    actor: &User,
    product_id: &str,
    stock: u32,
) -> Result<Product> {
    ensure_admin(actor)?;
    product::set_stock(store, product_id, stock).await
}
